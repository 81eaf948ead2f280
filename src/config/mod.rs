//! Configuration loading, explosion and merging
//!
//! Builds one configuration tree from an ordered list of sources:
//! 1. Discover sources (explicit files, or matching files in directories)
//! 2. Parse each into a raw tree (strict JSON or a Lua chunk)
//! 3. Explode dotted keys in each raw tree
//! 4. Merge left to right into one accumulator

mod effective;
mod explode;
mod merge;
mod settings;
mod source;

pub use effective::{fold_layer, ConfigSource, EffectiveConfig};
pub use explode::{explode, SEPARATOR};
pub use merge::{kind_name, merge, ConfigTree, KeyPath, MergeConflict};
pub use settings::{EngineSettings, BUILTIN_BINDINGS, RESERVED_NAMESPACE};
pub use source::{discover, load, match_convention, LoadedSource, SourceFormat, SourceRole};

use std::io;
use std::path::PathBuf;

use crate::error::ErrorKind;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("path does not exist: {}", .0.display())]
    PathInvalid(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{}: {conflict}", path.display())]
    MergeConflict {
        path: PathBuf,
        #[source]
        conflict: MergeConflict,
    },

    #[error("invalid '{key}' setting: {message}")]
    Settings { key: String, message: String },
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::PathInvalid(_) => ErrorKind::PathInvalid,
            ConfigError::Io { .. } => ErrorKind::Io,
            ConfigError::Parse { .. } | ConfigError::Settings { .. } => ErrorKind::Parse,
            ConfigError::MergeConflict { .. } => ErrorKind::MergeConflict,
        }
    }
}
