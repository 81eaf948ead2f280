//! Pipeline orchestration
//!
//! One run goes through these stages, strictly in order:
//! - Resolve the destination of every input file
//! - Build the effective configuration from the config sources
//! - Verify it against every schema source
//! - Process each input file with its own execution scope
//! - Optionally write a JSON run report
//!
//! The first fatal error aborts the run. Nothing is written before the
//! configuration has been built and verified.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, ConfigSource, EffectiveConfig};
use crate::error::ErrorKind;
use crate::schema::{self, SchemaError, ShapeVerifier};
use crate::template::{self, TemplateEngine, TemplateError};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("failed to write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Config(e) => e.kind(),
            PipelineError::Schema(e) => e.kind(),
            PipelineError::Template(e) => e.kind(),
            PipelineError::Report { .. } => ErrorKind::Io,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Inputs of one run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Config sources, files or directories, in merge order.
    pub config: Vec<PathBuf>,

    /// Schema sources, files or directories, in verification order.
    pub schemas: Vec<PathBuf>,

    /// Template files, processed in order.
    pub inputs: Vec<PathBuf>,

    /// Explicit destination, only valid with a single input.
    pub output: Option<PathBuf>,

    /// Where to write the JSON run report.
    pub report: Option<PathBuf>,
}

/// What a successful run did.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Config sources in merge order, with their digests.
    pub config_sources: Vec<ConfigSource>,

    /// Number of schema documents the configuration passed.
    pub schemas_checked: usize,

    /// Files written, in processing order.
    pub outputs: Vec<PathBuf>,
}

impl PipelineReport {
    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("JSON error: {}", e))
        })?;
        fs::write(path, json)
    }
}

/// Run the whole pipeline.
pub fn run(options: &PipelineOptions) -> PipelineResult<PipelineReport> {
    let jobs = template::resolve_outputs(&options.inputs, options.output.as_deref())?;

    let config = EffectiveConfig::build(&options.config)?;
    tracing::debug!(sources = config.sources().len(), "configuration built");

    let documents = schema::load_schemas(&options.schemas)?;
    schema::verify_all(config.tree(), &documents, &ShapeVerifier::lenient())?;

    let engine = TemplateEngine::new(&config);
    let mut outputs = Vec::with_capacity(jobs.len());
    for (input, output) in jobs {
        engine.process(&input, &output)?;
        outputs.push(output);
    }

    let report = PipelineReport {
        config_sources: config.sources().to_vec(),
        schemas_checked: documents.len(),
        outputs,
    };

    if let Some(path) = &options.report {
        report
            .write_to_file(path)
            .map_err(|source| PipelineError::Report {
                path: path.clone(),
                source,
            })?;
        tracing::info!(path = %path.display(), "wrote run report");
    }

    Ok(report)
}
