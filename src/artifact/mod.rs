//! # Artifact Resolution
//!
//! Resolves an artifact reference to a canonical URL and a local file.
//!
//! References come in four shapes:
//!
//! - `mvn:group/artifact/version[/type[/classifier]]`, looked up in every
//!   configured repository in order
//! - `:path/in/repository`, also looked up in the repositories
//! - an absolute URL such as `https://host/a.jar` or `file:///tmp/a.jar`,
//!   handed to the provider registered for its scheme
//! - a plain filesystem path, which must exist
//!
//! For repository lookups of `-SNAPSHOT` artifacts the repository's
//! `maven-metadata.xml` is consulted when the plain SNAPSHOT file is not
//! available, and the timestamped build is fetched instead.

pub mod metadata;
pub mod provider;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use url::Url;

use crate::defaults::{default_cache_dir, default_repository_urls};
use crate::error::{Error, Result};
use crate::model::ArtifactId;

pub use provider::{ArtifactProvider, DefaultArtifactProvider, Downloader, HttpDownloader, ANY_SCHEME};

/// Where to look for artifacts and where to cache them.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactManagerConfig {
    pub repository_urls: Vec<String>,
    pub cache_dir: PathBuf,
}

impl Default for ArtifactManagerConfig {
    fn default() -> Self {
        Self {
            repository_urls: default_repository_urls(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl ArtifactManagerConfig {
    pub fn new(repository_urls: Vec<String>, cache_dir: PathBuf) -> Self {
        Self {
            repository_urls,
            cache_dir,
        }
    }
}

/// State shared with providers: the cache directory and usage counters.
#[derive(Debug, Default)]
pub struct ProviderContext {
    cache_dir: PathBuf,
    cached: AtomicUsize,
    downloaded: AtomicUsize,
    local: AtomicUsize,
}

impl ProviderContext {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            ..Default::default()
        }
    }

    pub fn cache_directory(&self) -> &Path {
        &self.cache_dir
    }

    pub fn inc_cached_artifacts(&self) {
        self.cached.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_downloaded_artifacts(&self) {
        self.downloaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_local_artifacts(&self) {
        self.local.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cached_artifacts(&self) -> usize {
        self.cached.load(Ordering::Relaxed)
    }

    pub fn downloaded_artifacts(&self) -> usize {
        self.downloaded.load(Ordering::Relaxed)
    }

    pub fn local_artifacts(&self) -> usize {
        self.local.load(Ordering::Relaxed)
    }
}

/// A resolved artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHandler {
    url: String,
    file: PathBuf,
}

impl ArtifactHandler {
    pub fn new(url: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            file: file.into(),
        }
    }

    /// The canonical URL of the artifact.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The local copy.
    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Resolves artifact references through a set of providers.
///
/// Providers are shut down on [`ArtifactManager::shutdown`] or when the
/// manager is dropped.
pub struct ArtifactManager {
    config: ArtifactManagerConfig,
    context: Arc<ProviderContext>,
    providers: BTreeMap<String, Box<dyn ArtifactProvider>>,
}

impl ArtifactManager {
    /// A manager using only the default provider.
    pub fn new(config: ArtifactManagerConfig) -> Result<Self> {
        Self::with_providers(config, BTreeMap::new())
    }

    /// A manager using `providers`, keyed by URL scheme.
    ///
    /// A [`DefaultArtifactProvider`] is added under `*` unless one is
    /// already registered there.
    ///
    /// # Errors
    ///
    /// Returns the first provider initialisation error. Providers are shut
    /// down before it is returned.
    pub fn with_providers(
        config: ArtifactManagerConfig,
        mut providers: BTreeMap<String, Box<dyn ArtifactProvider>>,
    ) -> Result<Self> {
        providers
            .entry(ANY_SCHEME.to_string())
            .or_insert_with(|| Box::new(DefaultArtifactProvider::new()));

        let context = Arc::new(ProviderContext::new(config.cache_dir.clone()));
        let mut manager = Self {
            config,
            context,
            providers,
        };
        let mut failure = None;
        for provider in manager.providers.values_mut() {
            if let Err(e) = provider.init(manager.context.clone()) {
                failure = Some(e);
                break;
            }
        }
        match failure {
            Some(e) => {
                manager.shutdown();
                Err(e)
            }
            None => Ok(manager),
        }
    }

    pub fn config(&self) -> &ArtifactManagerConfig {
        &self.config
    }

    pub fn context(&self) -> &ProviderContext {
        &self.context
    }

    /// Shut down every provider. Calling it again does nothing.
    pub fn shutdown(&mut self) {
        for provider in self.providers.values_mut() {
            provider.shutdown();
        }
        self.providers.clear();
    }

    fn provider_for(&self, url: &str) -> Result<&dyn ArtifactProvider> {
        let scheme = url.split_once(':').map_or("", |(scheme, _)| scheme);
        self.providers
            .get(scheme)
            .or_else(|| self.providers.get(ANY_SCHEME))
            .map(|p| p.as_ref())
            .ok_or_else(|| Error::NoProvider {
                url: url.to_string(),
            })
    }

    fn get_from_providers(&self, url: &str, relative_cache_path: &str) -> Result<Option<PathBuf>> {
        Ok(self
            .provider_for(url)?
            .get_artifact(url, relative_cache_path)
            .filter(|file| file.exists()))
    }

    /// Resolve a reference to its URL and local file.
    ///
    /// # Errors
    ///
    /// - `Error::ArtifactNotFound` if no provider or repository has it
    /// - `Error::NoProvider` if nothing handles the URL's scheme
    /// - `Error::InvalidArtifactId` for a malformed `mvn:` URL
    pub fn get_artifact_handler(&self, reference: &str) -> Result<ArtifactHandler> {
        log::debug!("Trying to get artifact for {}", reference);

        let path = if reference.starts_with("mvn:") {
            ArtifactId::from_mvn_url(reference)?.to_mvn_path()
        } else if let Some(path) = reference.strip_prefix(':') {
            path.to_string()
        } else if reference.find(":/").is_some_and(|pos| pos > 0) {
            let relative = absolute_url_path(reference);
            return match self.get_from_providers(reference, relative)? {
                Some(file) => Ok(ArtifactHandler::new(reference, file)),
                None => Err(not_found(reference, None)),
            };
        } else {
            return local_file(reference);
        };

        log::debug!("Querying repositories for {}", path);
        for repository in &self.config.repository_urls {
            let artifact_url = format!("{}/{}", repository.trim_end_matches('/'), path);
            log::debug!("Checking {}", artifact_url);
            if let Some(file) = self.get_from_providers(&artifact_url, &path)? {
                log::debug!("Found artifact {}", artifact_url);
                return Ok(ArtifactHandler::new(artifact_url, file));
            }

            if is_snapshot_url(&artifact_url) {
                match self.resolve_snapshot(&artifact_url, &path) {
                    Ok(Some(handler)) => return Ok(handler),
                    Ok(None) => {}
                    Err(e) => log::debug!("Snapshot lookup for {} failed: {}", artifact_url, e),
                }
            }
        }

        Err(not_found(reference, Some("any repository")))
    }

    /// Find the timestamped build of a SNAPSHOT through the repository
    /// metadata next to it.
    fn resolve_snapshot(&self, artifact_url: &str, path: &str) -> Result<Option<ArtifactHandler>> {
        let Some((directory, name)) = artifact_url.rsplit_once('/') else {
            return Ok(None);
        };
        let metadata_url = format!("{}/maven-metadata.xml", directory);
        let metadata = self.get_artifact_handler(&metadata_url)?;
        let xml = std::fs::read_to_string(metadata.file()).map_err(Error::Io)?;

        let Some(latest) = metadata::latest_snapshot(&metadata_url, &xml)? else {
            return Ok(None);
        };
        let full_url = format!("{}/{}", directory, name.replace("SNAPSHOT", &latest));
        log::debug!("Resolved {} to {}", artifact_url, full_url);
        match self.get_from_providers(&full_url, path)? {
            Some(file) => Ok(Some(ArtifactHandler::new(artifact_url, file))),
            None => Err(not_found(&full_url, None)),
        }
    }

    /// Resolve many references on the rayon pool.
    ///
    /// Results are in input order; every failure is reported.
    pub fn fetch_all<S: AsRef<str> + Sync>(&self, references: &[S]) -> Vec<Result<ArtifactHandler>> {
        references
            .par_iter()
            .map(|reference| self.get_artifact_handler(reference.as_ref()))
            .collect()
    }
}

impl Drop for ArtifactManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ArtifactManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactManager")
            .field("config", &self.config)
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn not_found(url: &str, location: Option<&str>) -> Error {
    Error::ArtifactNotFound {
        url: url.to_string(),
        location: location.map(str::to_string),
    }
}

/// The part of an absolute URL after the scheme and its slashes.
fn absolute_url_path(url: &str) -> &str {
    url.split_once(":/")
        .map_or(url, |(_, rest)| rest.trim_start_matches('/'))
}

fn is_snapshot_url(url: &str) -> bool {
    url.rsplit_once('/')
        .is_some_and(|(_, name)| name.contains("-SNAPSHOT"))
}

fn local_file(reference: &str) -> Result<ArtifactHandler> {
    let path = Path::new(reference);
    if !path.exists() {
        return Err(not_found(reference, None));
    }
    let absolute = std::path::absolute(path).map_err(Error::Io)?;
    let url = Url::from_file_path(&absolute).map_err(|_| not_found(reference, None))?;
    Ok(ArtifactHandler::new(url.to_string(), absolute))
}
