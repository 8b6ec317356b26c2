//! # Feature Model Library
//!
//! This library implements the OSGi feature model: features and
//! applications, their JSON form, the resolution of the artifacts they
//! reference, the rules for merging them, and API regions controlling which
//! packages bundles of different features may see. It backs the
//! `feature-model` command-line tool but is usable on its own.
//!
//! ## Quick Example
//!
//! ```
//! use feature_model::builder::{assemble_feature, BuilderContext, MapFeatureProvider};
//! use feature_model::json::read_feature;
//!
//! let base = read_feature(r#"{"id": "g:base:1", "bundles": ["g:api:1.0"]}"#, None).unwrap();
//! let app = read_feature(
//!     r#"{"id": "g:app:1", "includes": ["g:base:1"], "bundles": ["g:impl:1.0"]}"#,
//!     None,
//! )
//! .unwrap();
//!
//! let context = BuilderContext::new(MapFeatureProvider::from_iter([base]));
//! let assembled = assemble_feature(&app, &context).unwrap();
//! assert!(assembled.is_assembled());
//! assert_eq!(assembled.bundles.len(), 2);
//! ```
//!
//! ## Core Concepts
//!
//! - **Model (`model`)**: artifact ids, bundles, configurations,
//!   extensions, features and applications.
//! - **Feature JSON (`json`)**: reading features and writing features and
//!   applications.
//! - **Artifact resolution (`artifact`)**: turns `mvn:` URLs, repository
//!   paths, URLs and file paths into local files through a chain of
//!   providers with a download cache.
//! - **Merging (`merge`)**: per-section merge rules and pluggable extension
//!   handlers.
//! - **Builders (`builder`)**: feature assembly from includes and
//!   application assembly from features.
//! - **API regions (`regions`)**: region metadata merging, derivation of
//!   region property files, and the resolver hook enforcing them.
//!
//! ## Execution Flow
//!
//! 1.  **Reading**: features are parsed from JSON.
//! 2.  **Resolution**: included features and bundles are fetched through
//!     the artifact manager.
//! 3.  **Assembly**: includes are merged in order, then the feature's own
//!     content on top.
//! 4.  **Derivation**: extension handlers post-process the result, writing
//!     region data.
//! 5.  **Enforcement**: the region enforcer loads the data and its resolver
//!     hook filters package candidates.

pub mod artifact;
pub mod builder;
pub mod defaults;
pub mod error;
pub mod json;
pub mod manifest;
pub mod merge;
pub mod model;
pub mod regions;

mod model_proptest;
