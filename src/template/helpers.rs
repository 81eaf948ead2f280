//! Code-generation helpers exposed to blocks as the `gen` table.

use mlua::{Lua, Result, Table, Value};
use ppgen_format::Formatter;

use crate::script;

/// Build the `gen` table.
pub fn create_gen_table(lua: &Lua, formatter: &Formatter) -> Result<Table> {
    let helpers = lua.create_table()?;

    // gen.format(code, indent?)
    let formatter = formatter.clone();
    helpers.set(
        "format",
        lua.create_function(move |_, (code, prefix): (String, Option<String>)| {
            Ok(formatter.format(&code, prefix.as_deref().unwrap_or("")))
        })?,
    )?;

    // gen.indent(text, prefix)
    helpers.set(
        "indent",
        lua.create_function(|_, (text, prefix): (String, String)| Ok(indent(&text, &prefix)))?,
    )?;

    // gen.quote(text)
    helpers.set(
        "quote",
        lua.create_function(|_, text: String| Ok(quote(&text)))?,
    )?;

    // gen.json(value, pretty?)
    helpers.set(
        "json",
        lua.create_function(|lua, (value, pretty): (Value, Option<bool>)| {
            let json = script::lua_to_json(lua, value)?;
            let text = if pretty.unwrap_or(false) {
                serde_json::to_string_pretty(&json)
            } else {
                serde_json::to_string(&json)
            };
            text.map_err(mlua::Error::external)
        })?,
    )?;

    // gen.array(list?)
    helpers.set("array", script::create_array_function(lua)?)?;

    // gen.join(list, separator?)
    helpers.set(
        "join",
        lua.create_function(|lua, (list, separator): (Table, Option<String>)| {
            let mut parts = Vec::new();
            for value in list.sequence_values::<Value>() {
                let value = value?;
                let type_name = value.type_name();
                match script::display_value(lua, value)? {
                    Some(text) => parts.push(text),
                    None => {
                        return Err(mlua::Error::runtime(format!(
                            "gen.join: cannot join a {} element",
                            type_name
                        )))
                    }
                }
            }
            Ok(parts.join(separator.as_deref().unwrap_or("")))
        })?,
    )?;

    Ok(helpers)
}

/// Prefix every line that has content with `prefix`.
pub fn indent(text: &str, prefix: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Quote `text` as a C string literal.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
