//! Per-file execution scope.
//!
//! Every input file gets its own Lua state. The state is seeded with:
//! - `config`: a deep copy of the frozen configuration tree
//! - `gen`: code-generation helpers
//! - `host`: host primitives
//! - the extra globals from `ppgen.globals`
//!
//! Blocks of one file run in order against the same state, so globals and
//! `config` mutations made by a block are visible to the blocks after it.
//! Nothing in the state outlives the file. The state has no `io` or `os`;
//! `host` is the only way out.

use mlua::{Lua, LuaSerdeExt, Table, Value};
use ppgen_format::Formatter;
use std::path::Path;

use super::helpers::create_gen_table;
use super::scanner::ScriptBlock;
use crate::config::{ConfigTree, EngineSettings};
use crate::script;

/// Bindings shared by every per-file scope of a run.
#[derive(Debug, Clone, Default)]
pub struct BaseScope {
    globals: ConfigTree,
    formatter: Formatter,
}

impl BaseScope {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            globals: settings.globals.clone(),
            formatter: settings
                .indent
                .as_deref()
                .map(Formatter::new)
                .unwrap_or_default(),
        }
    }
}

/// The binding environment for one input file.
pub struct ExecutionScope {
    lua: Lua,
}

impl ExecutionScope {
    /// Build a fresh scope for `file`, which will be written to `output`.
    pub fn new(
        base: &BaseScope,
        config: &ConfigTree,
        file: &Path,
        output: &Path,
    ) -> mlua::Result<Self> {
        let lua = script::new_state()?;
        let globals = lua.globals();

        globals.set("config", lua.to_value(config)?)?;
        globals.set("gen", create_gen_table(&lua, &base.formatter)?)?;
        globals.set("host", create_host_table(&lua, file, output)?)?;
        for (name, value) in &base.globals {
            globals.set(name.as_str(), lua.to_value(value)?)?;
        }

        Ok(Self { lua })
    }

    /// Evaluate one block and render its result.
    ///
    /// The block is run as an expression when it parses as one, otherwise as
    /// a statement block whose `return` value is the result. Lua positions in
    /// errors are relative to the block (`block:N:`); callers add the file
    /// and line.
    pub fn evaluate(&self, block: &ScriptBlock<'_>) -> mlua::Result<Option<String>> {
        let value: Value = self
            .lua
            .load(block.code)
            .set_name(script::chunk_name("block"))
            .eval()?;
        script::display_value(&self.lua, value)
    }

    /// Current value of a global, converted to JSON. `nil` reads as null.
    pub fn global(&self, name: &str) -> mlua::Result<serde_json::Value> {
        let value: Value = self.lua.globals().get(name)?;
        script::lua_to_json(&self.lua, value)
    }
}

fn create_host_table(lua: &Lua, file: &Path, output: &Path) -> mlua::Result<Table> {
    let host = lua.create_table()?;
    host.set("file", file.to_string_lossy().to_string())?;
    host.set("output", output.to_string_lossy().to_string())?;

    let source = file.display().to_string();
    host.set(
        "log",
        lua.create_function(move |_, message: String| {
            tracing::info!(target: "ppgen::script", file = %source, "{}", message);
            Ok(())
        })?,
    )?;

    host.set(
        "env",
        lua.create_function(|_, name: String| Ok(std::env::var(name).ok()))?,
    )?;

    Ok(host)
}
