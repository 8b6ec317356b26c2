//! Default values for feature-model configuration.
//!
//! This module provides centralized default values used by the artifact
//! manager and the commands, ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// The repository searched when no repository URL is configured.
pub const MAVEN_CENTRAL_URL: &str = "https://repo1.maven.org/maven2";

/// Returns the default artifact cache directory.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/feature-model` (XDG Base Directory)
/// - macOS: `~/Library/Caches/feature-model`
/// - Windows: `{FOLDERID_LocalAppData}\feature-model`
///
/// Falls back to `.feature-model-cache` in the current directory if the
/// platform cache directory cannot be determined.
///
/// This can be overridden by the `--cache-dir` CLI flag or the
/// `FEATURE_MODEL_CACHE` environment variable.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".feature-model-cache"))
        .join("feature-model")
}

/// Returns the repositories searched by default.
pub fn default_repository_urls() -> Vec<String> {
    vec![MAVEN_CENTRAL_URL.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cache_dir_returns_path() {
        let cache_dir = default_cache_dir();
        assert!(cache_dir.ends_with("feature-model"));
    }

    #[test]
    fn test_default_cache_dir_is_absolute_or_fallback() {
        let cache_dir = default_cache_dir();
        // Either absolute (normal case) or relative fallback
        assert!(
            cache_dir.is_absolute() || cache_dir.starts_with(".feature-model-cache"),
            "Expected absolute path or fallback, got: {:?}",
            cache_dir
        );
    }

    #[test]
    fn test_default_repositories_contain_central() {
        assert_eq!(default_repository_urls(), vec![MAVEN_CENTRAL_URL]);
    }
}
