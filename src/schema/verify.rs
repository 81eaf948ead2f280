//! Shape verification of a configuration tree against a schema document.
//!
//! A schema mirrors the configuration it describes:
//! - a string is a type expression: `string`, `number`, `integer`,
//!   `boolean`, `array`, `object`, `null` or `any`, alternatives joined with
//!   `|`, and a trailing `?` for an optional key
//! - an object requires an object and recurses into its declared keys
//! - `[]` requires any array, `[S]` requires an array whose elements match `S`

use serde_json::Value;
use std::fmt;

use crate::config::{kind_name, ConfigTree, KeyPath};

/// How undeclared configuration keys are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyMode {
    /// Keys the schema does not declare are tolerated.
    #[default]
    Lenient,
    /// Keys the schema does not declare are violations.
    Strict,
}

/// One reason a configuration does not satisfy a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: KeyPath,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// The verification capability applied to each schema document.
pub trait Verifier {
    /// Check `config` against `schema`, returning every violation found.
    fn verify(&self, config: &ConfigTree, schema: &ConfigTree) -> Vec<Violation>;
}

/// Verifier for shape schemas.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeVerifier {
    mode: VerifyMode,
}

impl ShapeVerifier {
    pub fn new(mode: VerifyMode) -> Self {
        Self { mode }
    }

    pub fn lenient() -> Self {
        Self::new(VerifyMode::Lenient)
    }

    pub fn strict() -> Self {
        Self::new(VerifyMode::Strict)
    }

    fn check_object(
        &self,
        config: &ConfigTree,
        schema: &ConfigTree,
        path: &KeyPath,
        out: &mut Vec<Violation>,
    ) {
        for (key, expected) in schema {
            let key_path = path.child(key);
            match config.get(key) {
                Some(actual) => self.check_value(actual, expected, &key_path, out),
                None if is_optional(expected) => {}
                None => out.push(Violation {
                    path: key_path,
                    message: "required key is missing".to_string(),
                }),
            }
        }

        if self.mode == VerifyMode::Strict {
            for key in config.keys().filter(|key| !schema.contains_key(*key)) {
                out.push(Violation {
                    path: path.child(key),
                    message: "key is not declared by the schema".to_string(),
                });
            }
        }
    }

    fn check_value(&self, actual: &Value, expected: &Value, path: &KeyPath, out: &mut Vec<Violation>) {
        let mismatch = |expected: &str| Violation {
            path: path.clone(),
            message: format!("expected {}, found {}", expected, kind_name(actual)),
        };

        match expected {
            Value::String(expr) => match TypeExpr::parse(expr) {
                Ok(ty) if ty.accepts(actual) => {}
                Ok(_) => out.push(mismatch(expr.trim_end_matches('?'))),
                Err(message) => out.push(Violation {
                    path: path.clone(),
                    message,
                }),
            },
            Value::Object(schema) => match actual {
                Value::Object(config) => self.check_object(config, schema, path, out),
                _ => out.push(mismatch("object")),
            },
            Value::Array(items) => {
                let Value::Array(values) = actual else {
                    out.push(mismatch("array"));
                    return;
                };
                match items.as_slice() {
                    [] => {}
                    [item] => {
                        for (i, value) in values.iter().enumerate() {
                            self.check_value(value, item, &path.child(&i.to_string()), out);
                        }
                    }
                    _ => out.push(Violation {
                        path: path.clone(),
                        message: "array schema must have at most one element".to_string(),
                    }),
                }
            }
            other => out.push(Violation {
                path: path.clone(),
                message: format!("invalid schema entry of kind {}", kind_name(other)),
            }),
        }
    }
}

impl Verifier for ShapeVerifier {
    fn verify(&self, config: &ConfigTree, schema: &ConfigTree) -> Vec<Violation> {
        let mut out = Vec::new();
        self.check_object(config, schema, &KeyPath::root(), &mut out);
        out
    }
}

fn is_optional(expected: &Value) -> bool {
    matches!(expected, Value::String(expr) if expr.trim_end().ends_with('?'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BaseType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
    Any,
}

impl BaseType {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "string" => BaseType::String,
            "number" => BaseType::Number,
            "integer" => BaseType::Integer,
            "boolean" => BaseType::Boolean,
            "array" => BaseType::Array,
            "object" => BaseType::Object,
            "null" => BaseType::Null,
            "any" => BaseType::Any,
            _ => return None,
        })
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            BaseType::String => value.is_string(),
            BaseType::Number => value.is_number(),
            BaseType::Integer => value.is_i64() || value.is_u64(),
            BaseType::Boolean => value.is_boolean(),
            BaseType::Array => value.is_array(),
            BaseType::Object => value.is_object(),
            BaseType::Null => value.is_null(),
            BaseType::Any => true,
        }
    }
}

/// A parsed type expression such as `string|null?`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TypeExpr {
    alternatives: Vec<BaseType>,
}

impl TypeExpr {
    fn parse(expr: &str) -> Result<Self, String> {
        let body = expr.trim().trim_end_matches('?');
        let alternatives = body
            .split('|')
            .map(|name| {
                BaseType::parse(name.trim())
                    .ok_or_else(|| format!("unknown type '{}' in schema", name.trim()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alternatives })
    }

    fn accepts(&self, value: &Value) -> bool {
        self.alternatives.iter().any(|ty| ty.accepts(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: Value) -> ConfigTree {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn check(verifier: ShapeVerifier, config: Value, schema: Value) -> Vec<String> {
        verifier
            .verify(&tree(config), &tree(schema))
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_matching_config() {
        let violations = check(
            ShapeVerifier::lenient(),
            json!({"name": "x", "pins": [1, 2], "board": {"rev": 3, "extra": true}}),
            json!({"name": "string", "pins": ["integer"], "board": {"rev": "number"}}),
        );
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_missing_key() {
        let violations = check(
            ShapeVerifier::lenient(),
            json!({"board": {}}),
            json!({"board": {"rev": "integer"}}),
        );
        assert_eq!(violations, vec!["board.rev: required key is missing"]);
    }

    #[test]
    fn test_optional_key() {
        let violations = check(
            ShapeVerifier::lenient(),
            json!({}),
            json!({"label": "string?"}),
        );
        assert!(violations.is_empty());

        let violations = check(
            ShapeVerifier::lenient(),
            json!({"label": 3}),
            json!({"label": "string?"}),
        );
        assert_eq!(violations, vec!["label: expected string, found number"]);
    }

    #[test]
    fn test_type_mismatch_and_alternatives() {
        let violations = check(
            ShapeVerifier::lenient(),
            json!({"a": 1.5, "b": null, "c": "x"}),
            json!({"a": "integer", "b": "string|null", "c": {"d": "any"}}),
        );
        assert_eq!(
            violations,
            vec!["a: expected integer, found number", "c: expected object, found string"]
        );
    }

    #[test]
    fn test_array_elements_checked() {
        let violations = check(
            ShapeVerifier::lenient(),
            json!({"items": [{"id": 1}, {"id": "two"}], "tags": "x"}),
            json!({"items": [{"id": "integer"}], "tags": []}),
        );
        assert_eq!(
            violations,
            vec!["items.1.id: expected integer, found string", "tags: expected array, found string"]
        );
    }

    #[test]
    fn test_strict_mode_reports_undeclared_keys() {
        let config = json!({"a": 1, "b": {"c": 1, "d": 2}});
        let schema = json!({"a": "integer", "b": {"c": "integer"}});

        assert!(check(ShapeVerifier::lenient(), config.clone(), schema.clone()).is_empty());
        assert_eq!(
            check(ShapeVerifier::strict(), config, schema),
            vec!["b.d: key is not declared by the schema"]
        );
    }

    #[test]
    fn test_unknown_type_name() {
        let violations = check(ShapeVerifier::lenient(), json!({"a": 1}), json!({"a": "int"}));
        assert_eq!(violations, vec!["a: unknown type 'int' in schema"]);
    }

    #[test]
    fn test_invalid_schema_entries() {
        let violations = check(
            ShapeVerifier::lenient(),
            json!({"a": [1], "b": 1}),
            json!({"a": ["integer", "string"], "b": 7}),
        );
        assert_eq!(
            violations,
            vec![
                "a: array schema must have at most one element",
                "b: invalid schema entry of kind number",
            ]
        );
    }
}
