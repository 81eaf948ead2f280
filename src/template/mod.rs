//! Template processing
//!
//! A template is text with embedded script blocks. Each input file is
//! scanned, its blocks are evaluated in order against a per-file execution
//! scope, and every block is replaced by its rendered result.

mod engine;
mod helpers;
mod output;
mod scanner;
mod scope;

pub use engine::TemplateEngine;
pub use helpers::{create_gen_table, indent, quote};
pub use output::{derive_output, resolve_outputs, TEMPLATE_SUFFIX};
pub use scanner::{scan, ScriptBlock};
pub use scope::{BaseScope, ExecutionScope};

use std::io;
use std::path::PathBuf;

use crate::error::ErrorKind;

/// Template errors
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("input file does not exist: {}", .0.display())]
    PathInvalid(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: {message}", file.display())]
    Evaluation {
        file: PathBuf,
        line: usize,
        message: String,
    },

    #[error("failed to set up execution scope for {}: {source}", file.display())]
    Scope {
        file: PathBuf,
        #[source]
        source: mlua::Error,
    },

    #[error("{0}")]
    OutputResolution(String),
}

impl TemplateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TemplateError::PathInvalid(_) => ErrorKind::PathInvalid,
            TemplateError::Read { .. } | TemplateError::Write { .. } => ErrorKind::Io,
            TemplateError::Evaluation { .. } | TemplateError::Scope { .. } => {
                ErrorKind::Evaluation
            }
            TemplateError::OutputResolution(_) => ErrorKind::OutputResolution,
        }
    }
}
