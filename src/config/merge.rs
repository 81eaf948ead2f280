//! Configuration merge logic
//!
//! Merge semantics:
//! - Objects: deep-merge by key (recursive)
//! - Arrays: concatenate, destination elements first
//! - Anything else at a shared key: conflict, even for equal scalars

use serde_json::{Map, Value};
use std::fmt;

/// A configuration tree: string keys to scalars, arrays or nested trees.
pub type ConfigTree = Map<String, Value>;

/// Dotted path to a key inside a configuration tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// The path of the tree root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of `key` below this path.
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        Self(segments)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0.join("."))
        }
    }
}

/// Two values at the same path that cannot be combined.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("merge conflict at '{path}': cannot merge {incoming} into {existing}")]
pub struct MergeConflict {
    /// Full dotted path of the conflicting key.
    pub path: KeyPath,
    /// Kind of the value already present.
    pub existing: &'static str,
    /// Kind of the value being merged in.
    pub incoming: &'static str,
}

/// Short name of a JSON value's kind, used in diagnostics.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Merge `src` into `dest`.
///
/// `path` is the location of `dest` inside the whole tree and is only used
/// to name conflicts. On error `dest` may be partially merged; callers abort
/// the run anyway.
pub fn merge(dest: &mut ConfigTree, src: ConfigTree, path: &KeyPath) -> Result<(), MergeConflict> {
    for (key, incoming) in src {
        match dest.get_mut(&key) {
            Some(existing) => merge_value(existing, incoming, &path.child(&key))?,
            None => {
                dest.insert(key, incoming);
            }
        }
    }
    Ok(())
}

fn merge_value(existing: &mut Value, incoming: Value, path: &KeyPath) -> Result<(), MergeConflict> {
    match (existing, incoming) {
        (Value::Object(dest), Value::Object(src)) => merge(dest, src, path),
        (Value::Array(dest), Value::Array(src)) => {
            dest.extend(src);
            Ok(())
        }
        (existing, incoming) => Err(MergeConflict {
            path: path.clone(),
            existing: kind_name(existing),
            incoming: kind_name(&incoming),
        }),
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

    #[test]
    fn test_add_new_key() {
        let mut dest = tree(json!({"a": 1}));
        merge(&mut dest, tree(json!({"b": 2})), &KeyPath::root()).unwrap();
        assert_eq!(Value::Object(dest), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_object_deep_merge() {
        let mut dest = tree(json!({"cache": {"derived_data": "off"}}));
        let src = tree(json!({"cache": {"spm": "on"}}));
        merge(&mut dest, src, &KeyPath::root()).unwrap();
        assert_eq!(
            Value::Object(dest),
            json!({"cache": {"derived_data": "off", "spm": "on"}})
        );
    }

    #[test]
    fn test_array_concatenation_preserves_order() {
        let mut dest = tree(json!({"schemes": ["A", "B", "C"]}));
        let src = tree(json!({"schemes": ["X", "Y"]}));
        merge(&mut dest, src, &KeyPath::root()).unwrap();
        assert_eq!(dest["schemes"], json!(["A", "B", "C", "X", "Y"]));
    }

    #[test]
    fn test_scalar_collision_conflicts() {
        let mut dest = tree(json!({"timeout": 100}));
        let err = merge(&mut dest, tree(json!({"timeout": 100})), &KeyPath::root()).unwrap_err();
        assert_eq!(err.path.to_string(), "timeout");
        assert_eq!(err.existing, "number");
    }

    #[test]
    fn test_object_against_scalar_conflicts_both_ways() {
        let mut dest = tree(json!({"a": {"b": {"c": 1}}}));
        let err = merge(&mut dest, tree(json!({"a": {"b": 5}})), &KeyPath::root()).unwrap_err();
        assert_eq!(err.path.to_string(), "a.b");
        assert_eq!((err.existing, err.incoming), ("object", "number"));

        let mut dest = tree(json!({"a": {"b": 5}}));
        let err = merge(&mut dest, tree(json!({"a": {"b": {"c": 1}}})), &KeyPath::root())
            .unwrap_err();
        assert_eq!(err.path.to_string(), "a.b");
        assert_eq!((err.existing, err.incoming), ("number", "object"));
    }

    #[test]
    fn test_array_against_object_conflicts() {
        let mut dest = tree(json!({"list": [1]}));
        let err = merge(&mut dest, tree(json!({"list": {"x": 1}})), &KeyPath::root()).unwrap_err();
        assert_eq!(err.to_string(), "merge conflict at 'list': cannot merge object into array");
    }

    #[test]
    fn test_conflict_path_includes_enclosing_path() {
        let mut dest = tree(json!({"x": 1}));
        let base = KeyPath::root().child("outer").child("inner");
        let err = merge(&mut dest, tree(json!({"x": 2})), &base).unwrap_err();
        assert_eq!(err.path.to_string(), "outer.inner.x");
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let mut dest = tree(json!({"Key": 1}));
        merge(&mut dest, tree(json!({"key": 2})), &KeyPath::root()).unwrap();
        assert_eq!(dest.len(), 2);
    }

    #[test]
    fn test_key_path_display() {
        assert_eq!(KeyPath::root().to_string(), "<root>");
        assert_eq!(KeyPath::root().child("a").child("b").to_string(), "a.b");
    }
}
