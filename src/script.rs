//! Embedded Lua glue.
//!
//! Everything that touches `mlua` directly outside of the per-file execution
//! scope lives here: evaluating script sources into trees and turning Lua
//! values back into JSON or text.

use mlua::{Function, Lua, LuaOptions, LuaSerdeExt, StdLib, Table, Value};

use crate::config::ConfigTree;

/// Errors from evaluating a script source.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("{0}")]
    Lua(#[from] mlua::Error),

    #[error("script did not evaluate to an object (got {0})")]
    NotAnObject(&'static str),
}

/// Chunk name shown verbatim in Lua error messages.
pub fn chunk_name(label: &str) -> String {
    format!("={}", label)
}

/// Base functions that reach the filesystem.
const FILE_LOADERS: &[&str] = &["dofile", "loadfile"];

/// Create a Lua state for script code.
///
/// Only `table`, `string`, `math` and `utf8` are loaded on top of the base
/// library, and the base file loaders are removed. Scripts have no `io`,
/// `os`, `package` or `debug`.
pub fn new_state() -> mlua::Result<Lua> {
    let lua = Lua::new_with(
        StdLib::TABLE | StdLib::STRING | StdLib::MATH | StdLib::UTF8,
        LuaOptions::default(),
    )?;
    for name in FILE_LOADERS {
        lua.globals().set(*name, Value::Nil)?;
    }
    Ok(lua)
}

/// Build the `array` function: `array(t)` marks `t` (or a new empty table)
/// as a sequence, so it converts to a JSON array even when empty.
pub fn create_array_function(lua: &Lua) -> mlua::Result<Function> {
    lua.create_function(|lua, table: Option<Table>| {
        let table = match table {
            Some(table) => table,
            None => lua.create_table()?,
        };
        let setmetatable: Function = lua.globals().get("setmetatable")?;
        setmetatable.call::<Table>((table, lua.array_metatable()))
    })
}

/// Evaluate `source` in a fresh Lua state and convert its result to a tree.
///
/// The chunk sees the `array` function in addition to the script libraries.
pub fn evaluate_object(source: &str, label: &str) -> Result<ConfigTree, ScriptError> {
    let lua = new_state()?;
    lua.globals().set("array", create_array_function(&lua)?)?;
    let value: Value = lua.load(source).set_name(chunk_name(label)).eval()?;

    if !value.is_table() {
        return Err(ScriptError::NotAnObject(value.type_name()));
    }

    match lua_to_json(&lua, value)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(ScriptError::NotAnObject("array")),
    }
}

/// Convert a Lua value to JSON.
///
/// An empty table converts to an empty object unless it was built with
/// `array`.
pub fn lua_to_json(lua: &Lua, value: Value) -> mlua::Result<serde_json::Value> {
    lua.from_value(value)
}

/// Render a block result as text.
///
/// `Ok(None)` means the value carries nothing to insert: `nil` or JSON null.
pub fn display_value(lua: &Lua, value: Value) -> mlua::Result<Option<String>> {
    match value {
        Value::Nil => Ok(None),
        Value::LightUserData(ud) if ud.0.is_null() => Ok(None),
        Value::Boolean(b) => Ok(Some(b.to_string())),
        Value::Integer(_) | Value::Number(_) | Value::String(_) => {
            Ok(lua.coerce_string(value)?.map(|s| s.to_string_lossy()))
        }
        Value::Table(_) => {
            let json = lua_to_json(lua, value)?;
            serde_json::to_string(&json)
                .map(Some)
                .map_err(mlua::Error::external)
        }
        other => Err(mlua::Error::runtime(format!(
            "cannot render a {} value as text",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn display(code: &str) -> Option<String> {
        let lua = new_state().unwrap();
        let value: Value = lua.load(code).eval().unwrap();
        display_value(&lua, value).unwrap()
    }

    #[test]
    fn test_evaluate_object() {
        let tree = evaluate_object("return { a = { b = 1 }, ['c.d'] = 'x' }", "t").unwrap();
        assert_eq!(
            serde_json::Value::Object(tree),
            json!({"a": {"b": 1}, "c.d": "x"})
        );
    }

    #[test]
    fn test_evaluate_object_empty_table() {
        let tree = evaluate_object("return {}", "t").unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_evaluate_object_array_constructor() {
        let tree = evaluate_object(
            "return { pins = array {}, ids = array { 1, 2 }, none = array() }",
            "t",
        )
        .unwrap();
        assert_eq!(
            serde_json::Value::Object(tree),
            json!({"pins": [], "ids": [1, 2], "none": []})
        );
    }

    #[test]
    fn test_state_has_no_host_access() {
        let tree = evaluate_object(
            "return { io = type(io), os = type(os), dofile = type(dofile), \
             loadfile = type(loadfile), require = type(require), string = type(string) }",
            "t",
        )
        .unwrap();
        assert_eq!(
            serde_json::Value::Object(tree),
            json!({
                "io": "nil",
                "os": "nil",
                "dofile": "nil",
                "loadfile": "nil",
                "require": "nil",
                "string": "table"
            })
        );
    }

    #[test]
    fn test_evaluate_object_rejects_scalar() {
        let err = evaluate_object("return 'x'", "t").unwrap_err();
        assert_eq!(err.to_string(), "script did not evaluate to an object (got string)");
    }

    #[test]
    fn test_evaluate_object_rejects_sequence() {
        let err = evaluate_object("return { 1, 2, 3 }", "t").unwrap_err();
        assert!(matches!(err, ScriptError::NotAnObject("array")));
    }

    #[test]
    fn test_evaluate_object_reports_lua_error_with_label() {
        let err = evaluate_object("error('boom')", "cfg/x.config.lua").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("cfg/x.config.lua"));
        assert!(message.contains("boom"));
    }

    #[test]
    fn test_display_values() {
        assert_eq!(display("nil"), None);
        assert_eq!(display("'text'"), Some("text".to_string()));
        assert_eq!(display("40 + 2"), Some("42".to_string()));
        assert_eq!(display("1.5"), Some("1.5".to_string()));
        assert_eq!(display("true"), Some("true".to_string()));
        assert_eq!(display("{ a = 1 }"), Some(r#"{"a":1}"#.to_string()));
    }

    #[test]
    fn test_display_rejects_functions() {
        let lua = new_state().unwrap();
        let value: Value = lua.load("function() end").eval().unwrap();
        let err = display_value(&lua, value).unwrap_err();
        assert!(err.to_string().contains("cannot render a function"));
    }
}
