//! Schema verification of the merged configuration
//!
//! Each schema source is loaded and exploded like a config source but never
//! merged with other schemas: every document is an independent check against
//! the final configuration. Checks run in discovery order and stop at the
//! first document that reports a violation.

mod verify;

pub use verify::{ShapeVerifier, Verifier, VerifyMode, Violation};

use std::path::PathBuf;
use thiserror::Error;

use crate::config::{self, ConfigError, ConfigTree, KeyPath, SourceRole};
use crate::error::ErrorKind;

/// Errors during schema loading or verification
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error(transparent)]
    Source(#[from] ConfigError),

    #[error("schema {} rejected the configuration: {}", schema.display(), join(violations))]
    Violation {
        schema: PathBuf,
        violations: Vec<Violation>,
    },
}

impl SchemaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchemaError::Source(e) => e.kind(),
            SchemaError::Violation { .. } => ErrorKind::SchemaViolation,
        }
    }
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One exploded schema document.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    pub path: PathBuf,
    pub tree: ConfigTree,
}

/// Discover, load and explode every schema source.
pub fn load_schemas(paths: &[PathBuf]) -> Result<Vec<SchemaDocument>, SchemaError> {
    let files = config::discover(paths, SourceRole::Schema)?;
    let mut documents = Vec::with_capacity(files.len());

    for file in files {
        let loaded = config::load(&file)?;
        let mut tree = loaded.tree;
        config::explode(&mut tree, &KeyPath::root()).map_err(|conflict| {
            ConfigError::MergeConflict {
                path: file.clone(),
                conflict,
            }
        })?;
        documents.push(SchemaDocument { path: file, tree });
    }

    Ok(documents)
}

/// Verify `config` against each document in order, failing on the first
/// document with any violation.
pub fn verify_all(
    config: &ConfigTree,
    documents: &[SchemaDocument],
    verifier: &dyn Verifier,
) -> Result<(), SchemaError> {
    for document in documents {
        let violations = verifier.verify(config, &document.tree);
        if !violations.is_empty() {
            return Err(SchemaError::Violation {
                schema: document.path.clone(),
                violations,
            });
        }
        tracing::info!(schema = %document.path.display(), "schema verified");
    }
    Ok(())
}
