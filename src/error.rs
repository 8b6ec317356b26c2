//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `feature-model` library. It uses the `thiserror` library to create a
//! single `Error` enum that covers every failure the library can report,
//! with enough context in each variant to tell the caller which feature,
//! extension or artifact was at fault.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the library.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the library to simplify function signatures.
//!
//! The variants fall into a few groups:
//!
//! - Malformed input: feature documents, artifact ids, versions, metadata
//!   and extension contents that cannot be interpreted.
//! - Fatal merge conflicts: extensions of the same name but different type,
//!   and JSON extensions whose root types differ.
//! - Missing dependencies: includes that no provider can supply, and
//!   recursive include chains.
//! - Artifact resolution: missing providers, artifacts not found anywhere,
//!   network failures and repository metadata problems.
//! - Wrapped library errors: I/O, JSON, URL parsing, zip archives.
//!
//! Region filtering never produces an error; the resolver hook only logs.

use thiserror::Error;

/// Main error type for feature model operations
#[derive(Error, Debug)]
pub enum Error {
    /// A feature document could not be parsed.
    ///
    /// `location` names the file or source the document came from, when
    /// known.
    #[error("Feature parsing error{}: {message}", location.as_ref().map(|l| format!(" in {}", l)).unwrap_or_default())]
    FeatureParse {
        message: String,
        location: Option<String>,
    },

    /// An artifact id string could not be parsed or is incomplete.
    #[error("Invalid artifact id '{value}': {message}")]
    InvalidArtifactId { value: String, message: String },

    /// A version string cannot be interpreted as an OSGi version.
    #[error("Invalid version {version}")]
    InvalidVersion { version: String },

    /// Artifact metadata holds a value that does not fit its key.
    #[error("Invalid metadata '{key}' for {artifact}: {value}")]
    InvalidMetadata {
        artifact: String,
        key: String,
        value: String,
    },

    /// Two extensions with the same name but different types met during a
    /// merge.
    #[error("Found different types for extension {name} : {target_type} and {source_type}")]
    ExtensionTypeMismatch {
        name: String,
        target_type: String,
        source_type: String,
    },

    /// The JSON roots of two same-named extensions are not the same kind.
    #[error("JSON type mismatch for extension {name} : {target_type} and {source_type}")]
    JsonTypeMismatch {
        name: String,
        target_type: String,
        source_type: String,
    },

    /// A feature include could not be provided.
    #[error("Unable to find included feature {id}")]
    MissingInclude { id: String },

    /// A feature includes itself, directly or through other includes.
    #[error("Recursive inclusion of {id} via {chain}")]
    RecursiveInclude { id: String, chain: String },

    /// No registered provider accepts the URL scheme.
    #[error("No artifact provider found for {url}")]
    NoProvider { url: String },

    /// Every provider and repository was tried without finding the artifact.
    #[error("Artifact {url} not found{}", location.as_ref().map(|l| format!(" in {}", l)).unwrap_or_default())]
    ArtifactNotFound {
        url: String,
        location: Option<String>,
    },

    /// An error occurred during a network operation.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// A `maven-metadata.xml` document could not be read.
    #[error("Repository metadata error: {url} - {message}")]
    Metadata { url: String, message: String },

    /// A jar manifest is missing or unusable.
    #[error("Manifest error: {path} - {message}")]
    Manifest { path: String, message: String },

    /// Region data could not be derived or loaded.
    #[error("Region data error: {message}")]
    RegionData { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A zip archive error, wrapped from `zip::result::ZipError`.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
