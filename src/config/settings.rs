//! Engine settings from the reserved `ppgen` namespace.

use serde_json::Value;

use super::merge::{kind_name, ConfigTree};
use super::ConfigError;

/// Top-level key reserved for engine behavior.
pub const RESERVED_NAMESPACE: &str = "ppgen";

/// Global names every execution scope defines itself.
pub const BUILTIN_BINDINGS: &[&str] = &["config", "gen", "host"];

/// Settings that control template processing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineSettings {
    /// Extra globals injected into every execution scope.
    pub globals: ConfigTree,
    /// Text prefixed verbatim to every generated output.
    pub preamble: Option<String>,
    /// Indent unit used by `gen.format`.
    pub indent: Option<String>,
}

impl EngineSettings {
    /// Read settings from `ppgen.globals`, `ppgen.preamble` and `ppgen.indent`.
    pub fn from_tree(tree: &ConfigTree) -> Result<Self, ConfigError> {
        let Some(namespace) = tree.get(RESERVED_NAMESPACE) else {
            return Ok(Self::default());
        };

        let Value::Object(namespace) = namespace else {
            return Err(invalid(
                RESERVED_NAMESPACE.to_string(),
                format!("expected an object, found {}", kind_name(namespace)),
            ));
        };

        let globals = match namespace.get("globals") {
            None => ConfigTree::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                return Err(invalid(
                    format!("{}.globals", RESERVED_NAMESPACE),
                    format!("expected an object, found {}", kind_name(other)),
                ))
            }
        };

        if let Some(name) = globals
            .keys()
            .find(|name| BUILTIN_BINDINGS.contains(&name.as_str()))
        {
            return Err(invalid(
                format!("{}.globals", RESERVED_NAMESPACE),
                format!("'{}' is a built-in binding and cannot be overridden", name),
            ));
        }

        Ok(Self {
            globals,
            preamble: optional_string(namespace, "preamble")?,
            indent: optional_string(namespace, "indent")?,
        })
    }
}

fn optional_string(namespace: &ConfigTree, key: &str) -> Result<Option<String>, ConfigError> {
    match namespace.get(key) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(invalid(
            format!("{}.{}", RESERVED_NAMESPACE, key),
            format!("expected a string, found {}", kind_name(other)),
        )),
    }
}

fn invalid(key: String, message: String) -> ConfigError {
    ConfigError::Settings { key, message }
}
