//! Effective configuration with provenance
//!
//! The effective configuration is the single tree built from every config
//! source, plus a record of where each layer came from. It is frozen once
//! built: nothing downstream gets mutable access.

use serde::Serialize;
use std::path::PathBuf;

use super::explode::explode;
use super::merge::{merge, ConfigTree, KeyPath, MergeConflict};
use super::settings::EngineSettings;
use super::source::{self, SourceFormat, SourceRole};
use super::ConfigError;

/// A contributing config source, as listed in the run report.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub format: SourceFormat,
    /// SHA-256 digest of the raw file bytes.
    pub digest: String,
}

/// Merged configuration tree plus its sources in merge order.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    tree: ConfigTree,
    sources: Vec<ConfigSource>,
    settings: EngineSettings,
}

/// Explode `raw` and merge it into `acc`.
pub fn fold_layer(acc: &mut ConfigTree, mut raw: ConfigTree) -> Result<(), MergeConflict> {
    let root = KeyPath::root();
    explode(&mut raw, &root)?;
    merge(acc, raw, &root)
}

impl EffectiveConfig {
    /// Build the configuration from source arguments (files or directories).
    ///
    /// Sources are folded left to right. The first unreadable, malformed or
    /// conflicting source aborts the build.
    pub fn build(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        let files = source::discover(paths, SourceRole::Config)?;

        let mut tree = ConfigTree::new();
        let mut sources = Vec::with_capacity(files.len());

        for file in files {
            let loaded = source::load(&file)?;
            fold_layer(&mut tree, loaded.tree).map_err(|conflict| ConfigError::MergeConflict {
                path: file.clone(),
                conflict,
            })?;

            tracing::info!(path = %file.display(), digest = %loaded.digest, "merged config source");
            sources.push(ConfigSource {
                path: loaded.path,
                format: loaded.format,
                digest: loaded.digest,
            });
        }

        Self::from_tree(tree, sources)
    }

    /// Wrap an already merged tree.
    pub fn from_tree(tree: ConfigTree, sources: Vec<ConfigSource>) -> Result<Self, ConfigError> {
        let settings = EngineSettings::from_tree(&tree)?;
        Ok(Self {
            tree,
            sources,
            settings,
        })
    }

    /// The merged tree.
    pub fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    /// Contributing sources in merge order.
    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    /// Engine settings read from the reserved namespace.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}
