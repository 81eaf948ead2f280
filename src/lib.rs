//! ppgen - configuration-driven source preprocessor
//!
//! Merges layered configuration sources into one tree, verifies it against
//! shape schemas, and renders template files whose embedded Lua blocks see
//! that configuration.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod schema;
pub mod script;
pub mod template;

pub use config::{ConfigError, ConfigTree, EffectiveConfig, KeyPath};
pub use error::ErrorKind;
pub use pipeline::{run, PipelineError, PipelineOptions, PipelineReport, PipelineResult};
pub use schema::{SchemaError, ShapeVerifier, Verifier, VerifyMode};
pub use template::{TemplateEngine, TemplateError};
