//! Lua stubs for `build_tarballs` and the product constructors.
//!
//! Products are plain tables tagged through their metatable's `__type` field,
//! so they can be told apart from arbitrary user tables when
//! `build_tarballs` collects them.

use std::cell::RefCell;
use std::rc::Rc;

use mlua::prelude::*;

use super::{BuildDeclaration, Product};
use crate::util::version::parse_version;

pub const PRODUCT_TYPE: &str = "Product";
pub const PREFIX_TYPE: &str = "Prefix";
pub const PREFIX_REGISTRY_KEY: &str = "buildjl.prefix";

/// Returns the `__type` marker of a table's metatable, if any
pub fn type_marker(table: &LuaTable) -> Option<String> {
  table.metatable().and_then(|mt| mt.get::<String>("__type").ok())
}

fn is_prefix(value: &LuaValue) -> bool {
  matches!(value, LuaValue::Table(t) if type_marker(t).as_deref() == Some(PREFIX_TYPE))
}

/// Create the inert `prefix` placeholder handed to product functions.
pub fn create_prefix(lua: &Lua) -> LuaResult<LuaTable> {
  let prefix = lua.create_table()?;
  prefix.set("path", "${prefix}")?;
  let mt = lua.create_table()?;
  mt.set("__type", PREFIX_TYPE)?;
  mt.set("__tostring", lua.create_function(|_, _: LuaValue| Ok("prefix"))?)?;
  prefix.set_metatable(Some(mt))?;
  Ok(prefix)
}

/// Product variables end up as installer-side identifiers.
fn is_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '!')
}

/// Accept both `"libz"` and `":libz"` spellings.
fn parse_variable(ctor: &str, value: LuaValue) -> LuaResult<String> {
  let raw = match value {
    LuaValue::String(s) => s.to_str()?.to_string(),
    other => {
      return Err(LuaError::external(format!(
        "{}: variable name must be a string, got {}",
        ctor,
        other.type_name()
      )));
    }
  };
  let variable = raw.strip_prefix(':').unwrap_or(&raw).to_string();
  if !is_identifier(&variable) {
    return Err(LuaError::external(format!(
      "{}: '{}' is not a valid variable name",
      ctor, raw
    )));
  }
  Ok(variable)
}

fn parse_string(ctor: &str, what: &str, value: LuaValue) -> LuaResult<String> {
  match value {
    LuaValue::String(s) => Ok(s.to_str()?.to_string()),
    other => Err(LuaError::external(format!(
      "{}: {} must be a string, got {}",
      ctor,
      what,
      other.type_name()
    ))),
  }
}

fn parse_string_list(ctor: &str, what: &str, value: LuaValue) -> LuaResult<Vec<String>> {
  match value {
    LuaValue::Table(t) => {
      let names = t
        .sequence_values::<LuaValue>()
        .map(|v| parse_string(ctor, what, v?))
        .collect::<LuaResult<Vec<_>>>()?;
      if names.is_empty() {
        return Err(LuaError::external(format!("{}: {} must not be empty", ctor, what)));
      }
      Ok(names)
    }
    other => Ok(vec![parse_string(ctor, what, other)?]),
  }
}

/// Drop a leading `prefix` placeholder and return exactly two arguments.
fn product_args(ctor: &str, args: LuaMultiValue) -> LuaResult<(LuaValue, LuaValue)> {
  let mut args: Vec<LuaValue> = args.into_iter().collect();
  if args.first().is_some_and(is_prefix) {
    args.remove(0);
  }
  match <[LuaValue; 2]>::try_from(args) {
    Ok([target, variable]) => Ok((target, variable)),
    Err(args) => Err(LuaError::external(format!(
      "{}: expected ([prefix,] target, variable), got {} argument(s)",
      ctor,
      args.len()
    ))),
  }
}

fn product_to_lua(lua: &Lua, product: &Product) -> LuaResult<LuaTable> {
  let table = lua.create_table()?;
  match product {
    Product::Library { libnames, variable } => {
      table.set("kind", "library")?;
      table.set("libnames", libnames.clone())?;
      table.set("variable", variable.as_str())?;
    }
    Product::Executable { binname, variable } => {
      table.set("kind", "executable")?;
      table.set("binname", binname.as_str())?;
      table.set("variable", variable.as_str())?;
    }
    Product::File { path, variable } => {
      table.set("kind", "file")?;
      table.set("path", path.as_str())?;
      table.set("variable", variable.as_str())?;
    }
  }
  let mt = lua.create_table()?;
  mt.set("__type", PRODUCT_TYPE)?;
  table.set_metatable(Some(mt))?;
  Ok(table)
}

/// Convert a tagged product table back into a [`Product`].
pub fn product_from_lua(table: &LuaTable) -> LuaResult<Product> {
  if type_marker(table).as_deref() != Some(PRODUCT_TYPE) {
    return Err(LuaError::external(
      "products must be created with LibraryProduct, ExecutableProduct or FileProduct",
    ));
  }
  let kind: String = table.get("kind")?;
  let variable: String = table.get("variable")?;
  match kind.as_str() {
    "library" => Ok(Product::Library {
      libnames: table.get("libnames")?,
      variable,
    }),
    "executable" => Ok(Product::Executable {
      binname: table.get("binname")?,
      variable,
    }),
    "file" => Ok(Product::File {
      path: table.get("path")?,
      variable,
    }),
    other => Err(LuaError::external(format!("unknown product kind '{}'", other))),
  }
}

/// Register `LibraryProduct`, `ExecutableProduct` and `FileProduct` as globals.
pub fn register_products(lua: &Lua, globals: &LuaTable) -> LuaResult<()> {
  globals.set(
    "LibraryProduct",
    lua.create_function(|lua, args: LuaMultiValue| {
      let (libnames, variable) = product_args("LibraryProduct", args)?;
      let product = Product::Library {
        libnames: parse_string_list("LibraryProduct", "library names", libnames)?,
        variable: parse_variable("LibraryProduct", variable)?,
      };
      product_to_lua(lua, &product)
    })?,
  )?;

  globals.set(
    "ExecutableProduct",
    lua.create_function(|lua, args: LuaMultiValue| {
      let (binname, variable) = product_args("ExecutableProduct", args)?;
      let product = Product::Executable {
        binname: parse_string("ExecutableProduct", "binary name", binname)?,
        variable: parse_variable("ExecutableProduct", variable)?,
      };
      product_to_lua(lua, &product)
    })?,
  )?;

  globals.set(
    "FileProduct",
    lua.create_function(|lua, args: LuaMultiValue| {
      let (path, variable) = product_args("FileProduct", args)?;
      let product = Product::File {
        path: parse_string("FileProduct", "path", path)?,
        variable: parse_variable("FileProduct", variable)?,
      };
      product_to_lua(lua, &product)
    })?,
  )?;

  Ok(())
}

/// Resolve the `products` argument, which may be a list or a function of the prefix.
fn resolve_products(lua: &Lua, value: LuaValue) -> LuaResult<Vec<Product>> {
  let table = match value {
    LuaValue::Table(t) => t,
    LuaValue::Function(f) => {
      let prefix: LuaTable = lua.named_registry_value(PREFIX_REGISTRY_KEY)?;
      match f.call::<LuaValue>(prefix)? {
        LuaValue::Table(t) => t,
        other => {
          return Err(LuaError::external(format!(
            "build_tarballs: products function must return a table, got {}",
            other.type_name()
          )));
        }
      }
    }
    other => {
      return Err(LuaError::external(format!(
        "build_tarballs: products must be a table or a function of prefix, got {}",
        other.type_name()
      )));
    }
  };

  table
    .sequence_values::<LuaTable>()
    .map(|product| product_from_lua(&product?))
    .collect()
}

/// Register the `build_tarballs` stub.
///
/// Accepts `(name, version, sources, script, platforms, products, dependencies [, opts])`,
/// optionally preceded by a table of command-line arguments (`ARGS`). Only
/// `name`, `version` and `products` are captured; everything else is ignored.
/// A second call is an error.
pub fn register_build_tarballs(
  lua: &Lua,
  globals: &LuaTable,
  captured: Rc<RefCell<Option<BuildDeclaration>>>,
) -> LuaResult<()> {
  let build_tarballs = lua.create_function(move |lua, args: LuaMultiValue| {
    if captured.borrow().is_some() {
      return Err(LuaError::external("build_tarballs may only be called once"));
    }

    let mut args: Vec<LuaValue> = args.into_iter().collect();
    if matches!(args.first(), Some(LuaValue::Table(_))) {
      args.remove(0);
    }
    if !(7..=8).contains(&args.len()) {
      return Err(LuaError::external(format!(
        "build_tarballs: expected (name, version, sources, script, platforms, products, dependencies [, opts]), got {} argument(s)",
        args.len()
      )));
    }

    let mut args = args.into_iter();
    let mut next = || args.next().unwrap_or(LuaValue::Nil);
    let name = parse_string("build_tarballs", "name", next())?;
    let version_str = parse_string("build_tarballs", "version", next())?;
    let version = parse_version(&version_str)
      .map_err(|e| LuaError::external(format!("build_tarballs: invalid version '{}': {}", version_str, e)))?;
    let _sources = next();
    let _script = next();
    let _platforms = next();
    let products = resolve_products(lua, next())?;

    *captured.borrow_mut() = Some(BuildDeclaration {
      name,
      version,
      products,
    });
    Ok(())
  })?;
  globals.set("build_tarballs", build_tarballs)?;
  Ok(())
}
