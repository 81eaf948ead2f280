//! Source discovery and loading.
//!
//! Config and schema documents share one file convention:
//! `<name>.<role>.json` is parsed as strict JSON and `<name>.<role>.lua` is
//! evaluated as a Lua chunk that must return a table.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::merge::ConfigTree;
use super::ConfigError;
use crate::script;

/// Which kind of document a source provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRole {
    Config,
    Schema,
}

impl SourceRole {
    /// Middle part of the file name convention.
    pub fn infix(self) -> &'static str {
        match self {
            SourceRole::Config => "config",
            SourceRole::Schema => "schema",
        }
    }
}

/// How a source file is turned into a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Json,
    Lua,
}

impl SourceFormat {
    /// Pick the format from the file extension; anything but `.lua` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("lua") => SourceFormat::Lua,
            _ => SourceFormat::Json,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            SourceFormat::Json => "json",
            SourceFormat::Lua => "lua",
        }
    }
}

/// Return the format if `file_name` follows the naming convention for `role`.
pub fn match_convention(file_name: &str, role: SourceRole) -> Option<SourceFormat> {
    [SourceFormat::Json, SourceFormat::Lua]
        .into_iter()
        .find(|format| {
            let suffix = format!(".{}.{}", role.infix(), format.extension());
            file_name.len() > suffix.len() && file_name.ends_with(&suffix)
        })
}

/// Expand source arguments into an ordered list of files.
///
/// Files are taken as given. Directories contribute their direct children
/// that follow the convention for `role`, in file-name order.
pub fn discover(paths: &[PathBuf], role: SourceRole) -> Result<Vec<PathBuf>, ConfigError> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            return Err(ConfigError::PathInvalid(path.clone()));
        }

        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e.into(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let matches = entry
                .file_name()
                .to_str()
                .and_then(|name| match_convention(name, role))
                .is_some();
            if matches {
                files.push(entry.into_path());
            }
        }
    }

    Ok(files)
}

/// A parsed source document with provenance.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub path: PathBuf,
    pub format: SourceFormat,
    /// SHA-256 digest of the raw file bytes.
    pub digest: String,
    /// Raw, not yet exploded tree.
    pub tree: ConfigTree,
}

/// Read and parse one source file.
pub fn load(path: &Path) -> Result<LoadedSource, ConfigError> {
    let bytes = fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let text = String::from_utf8(bytes).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: format!("invalid UTF-8: {}", e),
    })?;

    let format = SourceFormat::from_path(path);
    let tree = match format {
        SourceFormat::Json => parse_json(&text),
        SourceFormat::Lua => script::evaluate_object(&text, &path.to_string_lossy())
            .map_err(|e| e.to_string()),
    }
    .map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })?;

    tracing::debug!(path = %path.display(), ?format, %digest, "loaded source");

    Ok(LoadedSource {
        path: path.to_path_buf(),
        format,
        digest,
        tree,
    })
}

fn parse_json(text: &str) -> Result<ConfigTree, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!(
            "top-level value must be an object, found {}",
            super::merge::kind_name(&other)
        )),
        Err(e) => Err(format!("JSON parse error: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_match_convention() {
        assert_eq!(
            match_convention("base.config.json", SourceRole::Config),
            Some(SourceFormat::Json)
        );
        assert_eq!(
            match_convention("base.config.lua", SourceRole::Config),
            Some(SourceFormat::Lua)
        );
        assert_eq!(match_convention("base.schema.json", SourceRole::Config), None);
        assert_eq!(match_convention(".config.json", SourceRole::Config), None);
        assert_eq!(match_convention("config.json", SourceRole::Config), None);
        assert_eq!(
            match_convention("base.schema.lua", SourceRole::Schema),
            Some(SourceFormat::Lua)
        );
    }

    #[test]
    fn test_discover_directory_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.config.json"), "{}").unwrap();
        fs::write(dir.path().join("a.config.lua"), "return {}").unwrap();
        fs::write(dir.path().join("c.schema.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested.config.json")).unwrap();

        let files = discover(&[dir.path().to_path_buf()], SourceRole::Config).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.config.lua", "b.config.json"]);
    }

    #[test]
    fn test_discover_explicit_file_keeps_argument_order() {
        let dir = TempDir::new().unwrap();
        let second = dir.path().join("z.json");
        let first = dir.path().join("a.json");
        fs::write(&second, "{}").unwrap();
        fs::write(&first, "{}").unwrap();

        let files = discover(&[second.clone(), first.clone()], SourceRole::Config).unwrap();
        assert_eq!(files, vec![second, first]);
    }

    #[test]
    fn test_discover_missing_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let err = discover(&[missing.clone()], SourceRole::Schema).unwrap_err();
        assert!(matches!(err, ConfigError::PathInvalid(p) if p == missing));
    }

    #[test]
    fn test_load_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.config.json");
        fs::write(&path, r#"{"a.b": 1}"#).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.format, SourceFormat::Json);
        assert_eq!(loaded.digest.len(), 64);
        assert_eq!(Value::Object(loaded.tree), json!({"a.b": 1}));
    }

    #[test]
    fn test_load_lua() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.config.lua");
        fs::write(&path, "local n = 2\nreturn { count = n * 21, name = 'x' }").unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.format, SourceFormat::Lua);
        assert_eq!(Value::Object(loaded.tree), json!({"count": 42, "name": "x"}));
    }

    #[test]
    fn test_load_rejects_non_object_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.config.json");
        fs::write(&path, "[1, 2]").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("x.config.json"));
        assert!(err.to_string().contains("found array"));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.config.json");
        fs::write(&path, "{\"a\": ").unwrap();

        assert!(matches!(load(&path).unwrap_err(), ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_rejects_lua_without_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.config.lua");
        fs::write(&path, "return 5").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("did not evaluate to an object"));
    }
}
