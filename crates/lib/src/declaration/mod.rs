//! Build declarations.
//!
//! A build declaration is a Lua script that calls `build_tarballs(...)` once,
//! describing a package's name, version, and products. The script is evaluated
//! in a sandbox where `build_tarballs` only records its arguments, so nothing
//! is built or downloaded.
//!
//! ```lua
//! local name = "Zlib"
//! local version = VersionNumber("1.2.11")
//!
//! local function products(prefix)
//!   return {
//!     LibraryProduct(prefix, "libz", "libz"),
//!   }
//! end
//!
//! build_tarballs(ARGS, name, version, sources, script, supported_platforms(), products, {})
//! ```

pub mod lua;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::prelude::*;
use semver::Version;
use thiserror::Error;
use tracing::{debug, info};

use crate::lua::runtime;

/// Errors that can occur while evaluating a build declaration.
#[derive(Debug, Error)]
pub enum DeclarationError {
  #[error("declaration file not found: {}", .0.display())]
  NotFound(PathBuf),

  /// The script failed, or called a stub with malformed arguments.
  #[error("lua error: {0}")]
  Lua(#[from] LuaError),

  /// The script ran to completion without calling `build_tarballs`.
  #[error("{} never calls build_tarballs", .0.display())]
  NotDeclared(PathBuf),
}

/// An expected build output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Product {
  /// A shared library, found under any of `libnames`.
  Library { libnames: Vec<String>, variable: String },
  Executable { binname: String, variable: String },
  /// Any file, by path relative to the install prefix.
  File { path: String, variable: String },
}

impl Product {
  /// The variable the installer binds this product to
  pub fn variable(&self) -> &str {
    match self {
      Self::Library { variable, .. } | Self::Executable { variable, .. } | Self::File { variable, .. } => variable,
    }
  }
}

/// What a build declaration says about the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDeclaration {
  pub name: String,
  pub version: Version,
  pub products: Vec<Product>,
}

/// Evaluate the declaration script at `path` and return what its
/// `build_tarballs` call declared.
pub fn evaluate_declaration(path: &Path) -> Result<BuildDeclaration, DeclarationError> {
  if !path.is_file() {
    return Err(DeclarationError::NotFound(path.to_path_buf()));
  }

  info!(path = %path.display(), "evaluating build declaration");
  let captured = Rc::new(RefCell::new(None));
  {
    let lua = runtime::create_runtime(captured.clone())?;
    runtime::load_file(&lua, path)?;
  }

  let declaration = captured
    .borrow_mut()
    .take()
    .ok_or_else(|| DeclarationError::NotDeclared(path.to_path_buf()))?;
  debug!(
    name = %declaration.name,
    version = %declaration.version,
    products = declaration.products.len(),
    "captured build declaration"
  );
  Ok(declaration)
}
