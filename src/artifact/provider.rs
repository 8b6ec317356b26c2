//! Artifact providers.
//!
//! A provider turns an absolute URL into a local file. The manager picks
//! a provider by URL scheme, falling back to the one registered for `*`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use url::Url;

use super::ProviderContext;
use crate::error::{Error, Result};

/// Scheme key of the catch-all provider.
pub const ANY_SCHEME: &str = "*";

/// Resolves absolute URLs to local files.
pub trait ArtifactProvider: Send + Sync {
    /// Called once by the manager before any lookup.
    fn init(&mut self, _context: Arc<ProviderContext>) -> Result<()> {
        Ok(())
    }

    /// Called when the manager shuts down. Must tolerate a provider that
    /// was never initialised.
    fn shutdown(&mut self) {}

    /// The local file for `url`, or `None` if this provider cannot supply
    /// it. `relative_cache_path` is where a copy may be cached.
    fn get_artifact(&self, url: &str, relative_cache_path: &str) -> Option<PathBuf>;
}

/// Copies the content behind a URL to a local file.
pub trait Downloader: Send + Sync {
    fn download(&self, url: &str, target: &Path) -> Result<()>;
}

/// Downloads over HTTP(S) with a blocking client.
#[derive(Debug, Default)]
pub struct HttpDownloader;

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, target: &Path) -> Result<()> {
        let network = |message: String| Error::Network {
            url: url.to_string(),
            message,
        };
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| network(e.to_string()))?;
        let response = client.get(url).send().map_err(|e| network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(network(format!("HTTP {}", response.status())));
        }
        let bytes = response.bytes().map_err(|e| network(e.to_string()))?;
        std::fs::write(target, &bytes).map_err(Error::Io)
    }
}

/// Download to a sibling `.part` file, renamed onto `target` once complete.
fn download_into(downloader: &dyn Downloader, url: &str, target: &Path) -> Result<()> {
    let mut partial = target.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);
    let result = downloader
        .download(url, &partial)
        .and_then(|_| std::fs::rename(&partial, target).map_err(Error::Io));
    if result.is_err() {
        let _ = std::fs::remove_file(&partial);
    }
    result
}

/// The catch-all provider.
///
/// Existing `file:` URLs are returned in place. Anything else is
/// downloaded once into the cache directory and reused afterwards.
pub struct DefaultArtifactProvider {
    context: Option<Arc<ProviderContext>>,
    downloader: Box<dyn Downloader>,
}

impl DefaultArtifactProvider {
    pub fn new() -> Self {
        Self::with_downloader(HttpDownloader)
    }

    pub fn with_downloader(downloader: impl Downloader + 'static) -> Self {
        Self {
            context: None,
            downloader: Box::new(downloader),
        }
    }
}

impl Default for DefaultArtifactProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DefaultArtifactProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultArtifactProvider")
            .field("initialised", &self.context.is_some())
            .finish()
    }
}

impl ArtifactProvider for DefaultArtifactProvider {
    fn init(&mut self, context: Arc<ProviderContext>) -> Result<()> {
        self.context = Some(context);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.context = None;
    }

    fn get_artifact(&self, url: &str, relative_cache_path: &str) -> Option<PathBuf> {
        let context = self.context.as_ref()?;

        log::debug!("Checking url to be local file {}", url);
        if let Ok(parsed) = Url::parse(url) {
            if parsed.scheme() == "file" {
                let path = parsed.to_file_path().ok()?;
                if path.exists() {
                    context.inc_local_artifacts();
                    return Some(path);
                }
                return None;
            }
        }
        if !url.contains(':') {
            return None;
        }

        log::debug!("Checking remote url {}", url);
        let cache_file = context.cache_directory().join(relative_cache_path);
        if cache_file.exists() {
            context.inc_cached_artifacts();
            return Some(cache_file);
        }

        let fetched = cache_file
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .map_err(Error::Io)
            .and_then(|_| download_into(self.downloader.as_ref(), url, &cache_file));
        match fetched {
            Ok(()) => {
                context.inc_downloaded_artifacts();
                Some(cache_file)
            }
            Err(e) => {
                log::warn!("Artifact not found in one repository: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Writes the URL into the target file and counts calls.
    #[derive(Default)]
    struct Echo {
        calls: Arc<AtomicUsize>,
    }

    impl Downloader for Echo {
        fn download(&self, url: &str, target: &Path) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::fs::write(target, url).map_err(Error::Io)
        }
    }

    struct Failing;

    impl Downloader for Failing {
        fn download(&self, url: &str, _target: &Path) -> Result<()> {
            Err(Error::Network {
                url: url.to_string(),
                message: "HTTP 404 Not Found".to_string(),
            })
        }
    }

    /// Writes part of the content, then fails.
    struct Truncated;

    impl Downloader for Truncated {
        fn download(&self, url: &str, target: &Path) -> Result<()> {
            std::fs::write(target, "PK").map_err(Error::Io)?;
            Err(Error::Network {
                url: url.to_string(),
                message: "connection reset".to_string(),
            })
        }
    }

    fn provider(downloader: impl Downloader + 'static, cache: &Path) -> DefaultArtifactProvider {
        let mut provider = DefaultArtifactProvider::with_downloader(downloader);
        provider
            .init(Arc::new(ProviderContext::new(cache.to_path_buf())))
            .unwrap();
        provider
    }

    #[test]
    fn test_existing_file_url_is_returned_in_place() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.jar");
        std::fs::write(&file, "jar").unwrap();
        let url = Url::from_file_path(&file).unwrap().to_string();

        let provider = provider(Failing, &temp.path().join("cache"));
        assert_eq!(provider.get_artifact(&url, "a.jar"), Some(file));
    }

    #[test]
    fn test_missing_file_url_is_not_downloaded() {
        let temp = TempDir::new().unwrap();
        let url = Url::from_file_path(temp.path().join("missing.jar"))
            .unwrap()
            .to_string();
        let provider = provider(Failing, &temp.path().join("cache"));
        assert_eq!(provider.get_artifact(&url, "missing.jar"), None);
    }

    #[test]
    fn test_download_then_cache() {
        let temp = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = provider(
            Echo {
                calls: calls.clone(),
            },
            temp.path(),
        );

        let url = "https://repo.example/g/a/1/a-1.jar";
        let first = provider.get_artifact(url, "g/a/1/a-1.jar").unwrap();
        let second = provider.get_artifact(url, "g/a/1/a-1.jar").unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(&first).unwrap(), url);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let context = provider.context.as_ref().unwrap();
        assert_eq!(context.downloaded_artifacts(), 1);
        assert_eq!(context.cached_artifacts(), 1);
    }

    #[test]
    fn test_download_failure_is_not_found() {
        let temp = TempDir::new().unwrap();
        let provider = provider(Failing, temp.path());
        assert_eq!(
            provider.get_artifact("https://repo.example/a.jar", "a.jar"),
            None
        );
        assert!(!temp.path().join("a.jar").exists());
    }

    #[test]
    fn test_interrupted_download_leaves_no_cache_entry() {
        let temp = TempDir::new().unwrap();
        let interrupted = provider(Truncated, temp.path());
        let url = "https://repo.example/g/a/1/a-1.jar";
        assert_eq!(interrupted.get_artifact(url, "g/a/1/a-1.jar"), None);
        assert!(!temp.path().join("g/a/1/a-1.jar").exists());
        assert!(!temp.path().join("g/a/1/a-1.jar.part").exists());

        let retry = provider(Echo::default(), temp.path());
        assert!(retry.get_artifact(url, "g/a/1/a-1.jar").is_some());
    }

    #[test]
    fn test_uninitialised_provider_finds_nothing() {
        let provider = DefaultArtifactProvider::with_downloader(Failing);
        assert_eq!(provider.get_artifact("https://repo.example/a.jar", "a.jar"), None);
    }
}
