use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use mlua::prelude::*;

use crate::consts::SANDBOX_MEMORY_LIMIT;
use crate::declaration::BuildDeclaration;
use crate::lua::globals;

/// Globals from the base library that can reach the filesystem or load code.
const BLOCKED_GLOBALS: &[&str] = &["dofile", "loadfile", "load", "require", "collectgarbage"];

/// Create a sandboxed Lua runtime for evaluating a build declaration.
///
/// Only the `table`, `string`, `math` and `utf8` libraries are loaded; `io`,
/// `os`, `package` and `debug` are absent and code-loading functions are
/// removed. A call to `build_tarballs` stores its declaration in `captured`.
pub fn create_runtime(captured: Rc<RefCell<Option<BuildDeclaration>>>) -> LuaResult<Lua> {
  let lua = Lua::new_with(
    LuaStdLib::TABLE | LuaStdLib::STRING | LuaStdLib::MATH | LuaStdLib::UTF8,
    LuaOptions::default(),
  )?;
  lua.set_memory_limit(SANDBOX_MEMORY_LIMIT)?;

  let lua_globals = lua.globals();
  for name in BLOCKED_GLOBALS {
    lua_globals.set(*name, LuaValue::Nil)?;
  }

  globals::register_globals(&lua, captured)?;

  Ok(lua)
}

/// Load and execute a Lua file at the given path.
/// Sets the `SCRIPT_DIR` global to the directory of the loaded file.
pub fn load_file(lua: &Lua, path: &Path) -> LuaResult<LuaValue> {
  let canonical_path = dunce::canonicalize(path)
    .map_err(|e| LuaError::external(format!("cannot canonicalize '{}': {}", path.display(), e)))?;
  let content = std::fs::read_to_string(&canonical_path)
    .map_err(|e| LuaError::external(format!("cannot read '{}': {}", canonical_path.display(), e)))?;

  lua.globals().set(
    "SCRIPT_DIR",
    canonical_path
      .parent()
      .unwrap_or(Path::new(""))
      .to_string_lossy()
      .to_string(),
  )?;

  let result = lua
    .load(&content)
    .set_name(format!("@{}", canonical_path.display()))
    .eval::<LuaValue>()?;
  Ok(result)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn create_test_lua() -> LuaResult<Lua> {
    create_runtime(Rc::new(RefCell::new(None)))
  }

  #[test]
  fn string_and_table_libraries_available() -> LuaResult<()> {
    let lua = create_test_lua()?;
    let joined: String = lua.load(r#"return table.concat({"a", string.upper("b")}, ",")"#).eval()?;
    assert_eq!(joined, "a,B");
    Ok(())
  }

  #[test]
  fn blocked_globals_are_nil() -> LuaResult<()> {
    let lua = create_test_lua()?;
    for name in BLOCKED_GLOBALS.iter().chain(&["io", "os", "package", "debug"]) {
      let value: LuaValue = lua.globals().get(*name)?;
      assert!(value.is_nil(), "{} should not be reachable", name);
    }
    Ok(())
  }

  #[test]
  fn memory_limit_stops_runaway_scripts() -> LuaResult<()> {
    let lua = create_test_lua()?;
    let result = lua
      .load(
        r#"
          local t = {}
          for i = 1, 1e9 do t[i] = string.rep("x", 1024) .. i end
        "#,
      )
      .exec();
    assert!(result.is_err());
    Ok(())
  }

  #[test]
  fn load_file_sets_script_dir() -> LuaResult<()> {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("decl.lua");
    std::fs::write(&path, "return SCRIPT_DIR").unwrap();

    let lua = create_test_lua()?;
    let dir: String = lua.unpack(load_file(&lua, &path)?)?;
    let expected = dunce::canonicalize(temp.path()).unwrap();
    assert_eq!(dir, expected.to_string_lossy());
    Ok(())
  }
}
