//! # Feature Model
//!
//! The in-memory entities the rest of the crate works on. These are plain
//! data types whose only behaviour is keeping their own invariants:
//!
//! - [`ArtifactId`] coordinates with *same* (version independent) and
//!   *equal* comparisons, and their mvn id, mvn url and repository path
//!   forms;
//! - [`Artifact`] and [`Artifacts`]/[`Bundles`] lists grouped by start order;
//! - [`Configuration`] keyed by PID or factory PID and name;
//! - [`Extension`] payloads whose type never changes;
//! - [`Capability`] and [`Requirement`] declarations;
//! - [`Feature`] and [`Application`].

pub mod application;
pub mod artifact;
pub mod capability;
pub mod configuration;
pub mod extension;
pub mod feature;
pub mod version;

pub use application::Application;
pub use artifact::{Artifact, ArtifactId, Artifacts, Bundles, START_ORDER_KEY};
pub use capability::{Capability, Requirement, PACKAGE_NAMESPACE};
pub use configuration::{
    Configuration, ConfigurationKey, Configurations, ARTIFACT_PROPERTY, CONFIGURATOR_PREFIX,
};
pub use extension::{Extension, ExtensionContent, ExtensionType, Extensions};
pub use feature::{Feature, Include, IncludeRemovals};
pub use version::OsgiVersion;
