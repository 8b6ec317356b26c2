//! # CLI Command Implementations
//!
//! Each subcommand of the `feature-model` tool lives in its own file with an
//! `Args` struct derived with `clap` and an `execute` function that calls
//! into the `feature_model` library.
//!
//! This module also holds what the commands share: artifact resolver
//! options and the loading of features from files, directories and
//! repositories.

pub mod aggregate;
pub mod assemble;
pub mod fetch;
pub mod regions;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use feature_model::artifact::{ArtifactManager, ArtifactManagerConfig};
use feature_model::builder::{FeatureProvider, MapFeatureProvider};
use feature_model::defaults::{default_cache_dir, default_repository_urls};
use feature_model::json::read_feature_file;
use feature_model::model::{ArtifactId, Feature};

/// Artifact resolution options shared by the commands
#[derive(Args, Debug, Clone, Default)]
pub struct ResolverArgs {
    /// Repository URL to search, may be repeated (defaults to Maven Central)
    #[arg(
        long = "repository",
        value_name = "URL",
        env = "FEATURE_MODEL_REPOSITORIES",
        value_delimiter = ','
    )]
    pub repositories: Vec<String>,

    /// Artifact cache directory
    #[arg(long, value_name = "PATH", env = "FEATURE_MODEL_CACHE")]
    pub cache_dir: Option<PathBuf>,
}

impl ResolverArgs {
    pub fn config(&self) -> ArtifactManagerConfig {
        let repositories = if self.repositories.is_empty() {
            default_repository_urls()
        } else {
            self.repositories.clone()
        };
        let cache_dir = self.cache_dir.clone().unwrap_or_else(default_cache_dir);
        ArtifactManagerConfig::new(repositories, cache_dir)
    }

    pub fn manager(&self) -> Result<ArtifactManager> {
        let config = self.config();
        log::debug!(
            "Resolving artifacts from {:?}, caching in {}",
            config.repository_urls,
            config.cache_dir.display()
        );
        ArtifactManager::new(config).context("Failed to set up the artifact manager")
    }
}

/// Read a feature from a file, or from a repository when `reference` is not
/// an existing file.
pub fn read_feature_reference(reference: &str, manager: &ArtifactManager) -> Result<Feature> {
    let path = Path::new(reference);
    if path.is_file() {
        return read_feature_file(path)
            .with_context(|| format!("Failed to read feature {}", path.display()));
    }
    let handler = manager
        .get_artifact_handler(reference)
        .with_context(|| format!("Failed to resolve feature {}", reference))?;
    read_feature_file(handler.file())
        .with_context(|| format!("Failed to read feature {}", handler.url()))
}

/// Read every `*.json` feature in `dir`.
pub fn features_in_dir(dir: &Path) -> Result<Vec<Feature>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read features directory {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();
    paths
        .iter()
        .map(|path| {
            read_feature_file(path).with_context(|| format!("Failed to read feature {}", path.display()))
        })
        .collect()
}

/// A provider for included features: features found in `dirs` first, then
/// the repositories of `manager`.
pub fn feature_provider(
    dirs: &[PathBuf],
    manager: Arc<ArtifactManager>,
) -> Result<impl FeatureProvider + 'static> {
    let mut local = MapFeatureProvider::new();
    for dir in dirs {
        for feature in features_in_dir(dir)? {
            local.insert(feature);
        }
    }
    log::debug!("Found {} local features", local.len());

    Ok(move |id: &ArtifactId| -> Option<Feature> {
        local.provide(id).or_else(|| {
            let resolved = manager
                .get_artifact_handler(&id.to_mvn_url())
                .and_then(|handler| read_feature_file(handler.file()));
            match resolved {
                Ok(feature) => Some(feature),
                Err(e) => {
                    log::debug!("Feature {} not available: {}", id, e);
                    None
                }
            }
        })
    })
}
