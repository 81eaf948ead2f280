//! Dotted-key explosion.
//!
//! `{"a.b.c": 1}` becomes `{"a": {"b": {"c": 1}}}`. The produced chain is
//! merged into the enclosing object with the usual merge rules, so an
//! exploded key can collide with a literal one.

use serde_json::Value;

use super::merge::{merge, ConfigTree, KeyPath, MergeConflict};

/// Separator between segments of a compound key.
pub const SEPARATOR: char = '.';

/// Rewrite every dotted key in `tree`, recursively.
///
/// `path` is the location of `tree` inside the whole configuration. Applying
/// `explode` to an already exploded tree changes nothing.
pub fn explode(tree: &mut ConfigTree, path: &KeyPath) -> Result<(), MergeConflict> {
    let dotted: Vec<String> = tree
        .keys()
        .filter(|key| key.contains(SEPARATOR))
        .cloned()
        .collect();

    for key in dotted {
        let Some(value) = tree.remove(&key) else {
            continue;
        };
        merge(tree, chain(&key, value), path)?;
    }

    for (key, value) in tree.iter_mut() {
        if let Value::Object(child) = value {
            explode(child, &path.child(key))?;
        }
    }

    Ok(())
}

/// Build `{"a": {"b": {"c": value}}}` from `"a.b.c"`.
fn chain(key: &str, value: Value) -> ConfigTree {
    let mut segments = key.split(SEPARATOR).rev();
    let mut nested = value;
    let mut innermost = segments.next().unwrap_or_default().to_string();

    for segment in segments {
        let mut level = ConfigTree::new();
        level.insert(innermost, nested);
        nested = Value::Object(level);
        innermost = segment.to_string();
    }

    let mut top = ConfigTree::new();
    top.insert(innermost, nested);
    top
}
