//! Globals available to build declaration scripts.
//!
//! Besides `build_tarballs` and the product constructors, declarations
//! usually call a handful of helpers to describe sources, dependencies and
//! target platforms. Those are registered here as inert functions: they
//! return a table recording their arguments and nothing else.

use std::cell::RefCell;
use std::rc::Rc;

use mlua::prelude::*;

use crate::declaration::BuildDeclaration;
use crate::declaration::lua::{PREFIX_REGISTRY_KEY, create_prefix, register_build_tarballs, register_products};

/// Helpers whose results are never inspected.
const INERT_HELPERS: &[&str] = &[
  "ArchiveSource",
  "GitSource",
  "FileSource",
  "DirectorySource",
  "Dependency",
  "BuildDependency",
  "Linux",
  "MacOS",
  "FreeBSD",
  "Windows",
];

/// Platform-list helpers: each returns its first argument (or an empty list).
const PASSTHROUGH_HELPERS: &[&str] = &["supported_platforms", "expand_cxxstring_abis", "expand_gfortran_versions"];

/// Register all declaration globals in the Lua runtime.
pub fn register_globals(lua: &Lua, captured: Rc<RefCell<Option<BuildDeclaration>>>) -> LuaResult<()> {
  let globals = lua.globals();

  globals.set("ARGS", lua.create_table()?)?;

  let prefix = create_prefix(lua)?;
  lua.set_named_registry_value(PREFIX_REGISTRY_KEY, prefix.clone())?;
  globals.set("prefix", prefix)?;

  // VersionNumber("1.2.11") stays a string; build_tarballs parses it
  globals.set(
    "VersionNumber",
    lua.create_function(|_, version: String| Ok(version))?,
  )?;

  for name in INERT_HELPERS {
    let helper = lua.create_function(move |lua, args: LuaMultiValue| {
      let table = lua.create_table()?;
      table.set("type", *name)?;
      table.set("args", lua.create_sequence_from(args)?)?;
      Ok(table)
    })?;
    globals.set(*name, helper)?;
  }

  for name in PASSTHROUGH_HELPERS {
    let helper = lua.create_function(|lua, platforms: Option<LuaTable>| match platforms {
      Some(platforms) => Ok(platforms),
      None => lua.create_table(),
    })?;
    globals.set(*name, helper)?;
  }

  // Scripts print progress for humans; route it through tracing instead of stdout
  globals.set(
    "print",
    lua.create_function(|_, args: LuaMultiValue| {
      let line = args
        .iter()
        .map(|v| v.to_string())
        .collect::<LuaResult<Vec<_>>>()?
        .join("\t");
      tracing::debug!(target: "declaration", "{}", line);
      Ok(())
    })?,
  )?;

  register_products(lua, &globals)?;
  register_build_tarballs(lua, &globals, captured)?;

  Ok(())
}
