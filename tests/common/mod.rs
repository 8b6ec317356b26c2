//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_feature("base.json", features::BASE)
//!         .with_bundle("org.example", "api", "1.0.0", "org.example.api");
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::features;
    pub use super::TestFixture;
}

/// Feature documents used across tests.
#[allow(dead_code)]
pub mod features {
    /// A base feature with one bundle, a configuration and a region.
    pub const BASE: &str = r#"{
  "id": "org.example:base:1.0.0",
  "bundles": [
    { "id": "org.example:api:1.0.0", "start-order": "1" }
  ],
  "configurations": {
    "org.example.Service": { "enabled": true }
  },
  "api-regions:JSON|false": [
    { "name": "global", "exports": ["org.example.api"] }
  ]
}"#;

    /// Includes the base feature, removes its configuration and upgrades
    /// nothing.
    pub const APP: &str = r#"{
  "id": "org.example:app:1.0.0",
  "includes": [
    { "id": "org.example:base:1.0.0", "removals": { "configurations": ["org.example.Service"] } }
  ],
  "bundles": ["org.example:impl:1.0.0"],
  "framework-properties": { "org.osgi.framework.bootdelegation": "sun.*" }
}"#;

    /// Includes itself through a second feature.
    pub const LOOP_A: &str = r#"{ "id": "org.example:loop-a:1.0.0", "includes": ["org.example:loop-b:1.0.0"] }"#;
    pub const LOOP_B: &str = r#"{ "id": "org.example:loop-b:1.0.0", "includes": ["org.example:loop-a:1.0.0"] }"#;

    /// Two features with the same bundle in different versions.
    pub const OLD_API: &str = r#"{ "id": "org.example:old:1.0.0", "bundles": ["org.example:api:1.0.0"] }"#;
    pub const NEW_API: &str = r#"{ "id": "org.example:new:1.0.0", "bundles": ["org.example:api:2.0.0"] }"#;

    /// Features with regions for visibility tests.
    pub const PROVIDER: &str = r#"{
  "id": "org.example:provider:1.0.0",
  "bundles": ["org.example:provider:1.0.0"],
  "api-regions:JSON|true": [
    { "name": "global", "exports": ["org.example.shared"] },
    { "name": "internal", "exports": ["org.example.hidden"] }
  ]
}"#;

    pub const CONSUMER: &str = r#"{
  "id": "org.example:consumer:1.0.0",
  "bundles": ["org.example:consumer:1.0.0"],
  "api-regions:JSON|true": [
    { "name": "global", "exports": [] }
  ]
}"#;
}

/// A test fixture that provides a temporary directory holding features and
/// a Maven layout repository.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a feature file under `features/`.
    pub fn with_feature(self, name: &str, content: &str) -> Self {
        self.temp_dir
            .child("features")
            .child(name)
            .write_str(content)
            .expect("Failed to write feature");
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a file to the repository, at a Maven layout path.
    pub fn with_repository_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child("repository")
            .child(path)
            .write_str(content)
            .expect("Failed to write repository file");
        self
    }

    /// Add a bundle jar to the repository with the given manifest headers.
    pub fn with_bundle(self, group: &str, artifact: &str, version: &str, bsn: &str) -> Self {
        let path = self.repository_path().join(format!(
            "{}/{}/{}/{}-{}.jar",
            group.replace('.', "/"),
            artifact,
            version,
            artifact,
            version
        ));
        std::fs::create_dir_all(path.parent().expect("jar path has a parent"))
            .expect("Failed to create repository directory");
        let manifest = format!(
            "Manifest-Version: 1.0\r\nBundle-SymbolicName: {}\r\nBundle-Version: {}\r\n\r\n",
            bsn, version
        );
        let mut writer = zip::ZipWriter::new(std::fs::File::create(&path).expect("Failed to create jar"));
        writer
            .start_file("META-INF/MANIFEST.MF", zip::write::SimpleFileOptions::default())
            .expect("Failed to start manifest");
        writer
            .write_all(manifest.as_bytes())
            .expect("Failed to write manifest");
        writer.finish().expect("Failed to finish jar");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn features_path(&self) -> PathBuf {
        self.temp_dir.path().join("features")
    }

    pub fn feature_path(&self, name: &str) -> PathBuf {
        self.features_path().join(name)
    }

    pub fn repository_path(&self) -> PathBuf {
        self.temp_dir.path().join("repository")
    }

    /// The repository as a `file:` URL.
    pub fn repository_url(&self) -> String {
        url::Url::from_directory_path(self.repository_path())
            .expect("repository path is absolute")
            .to_string()
    }

    pub fn cache_path(&self) -> PathBuf {
        self.temp_dir.path().join("cache")
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command running in this fixture's directory, resolving
    /// artifacts from the fixture repository only.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("feature-model");
        cmd.current_dir(self.path())
            .env("FEATURE_MODEL_REPOSITORIES", self.repository_url())
            .env("FEATURE_MODEL_CACHE", self.cache_path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_feature() {
        let fixture = TestFixture::new().with_feature("base.json", features::BASE);
        assert!(fixture.feature_path("base.json").exists());
    }

    #[test]
    fn test_fixture_with_bundle() {
        let fixture = TestFixture::new().with_bundle("org.example", "api", "1.0.0", "org.example.api");
        assert!(fixture
            .repository_path()
            .join("org/example/api/1.0.0/api-1.0.0.jar")
            .exists());
        assert!(fixture.repository_url().starts_with("file://"));
    }
}
