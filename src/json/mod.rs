//! # Feature JSON
//!
//! Reading and writing of the Feature JSON document format.
//!
//! ```json
//! {
//!   "id": "org.example:my-feature:1.0.0",
//!   "variables": { "port": "8080" },
//!   "includes": ["org.example:base:1.0.0"],
//!   "bundles": [
//!     "org.example:api:1.0.0",
//!     { "id": "org.example:impl:1.0.0", "start-order": 5 }
//!   ],
//!   "configurations": { "org.example.server": { "port": "${port}" } },
//!   "framework-properties": { "org.osgi.framework.bootdelegation": "sun.*" },
//!   "api-regions:JSON|false": [ { "name": "global", "exports": ["org.example.api"] } ]
//! }
//! ```
//!
//! Every key that is not a known section is an extension, named
//! `name[:TYPE][|required]`.

pub mod reader;
pub mod writer;

pub use reader::{read_feature, read_feature_file, read_feature_with_id};
pub use writer::{
    application_to_json, feature_to_json, write_application, write_application_file,
    write_feature, write_feature_file,
};

pub(crate) const MODEL_VERSION: &str = "model-version";
pub(crate) const ID: &str = "id";
pub(crate) const TITLE: &str = "title";
pub(crate) const DESCRIPTION: &str = "description";
pub(crate) const VENDOR: &str = "vendor";
pub(crate) const LICENSE: &str = "license";
pub(crate) const VARIABLES: &str = "variables";
pub(crate) const INCLUDES: &str = "includes";
pub(crate) const REMOVALS: &str = "removals";
pub(crate) const REQUIREMENTS: &str = "requirements";
pub(crate) const CAPABILITIES: &str = "capabilities";
pub(crate) const BUNDLES: &str = "bundles";
pub(crate) const CONFIGURATIONS: &str = "configurations";
pub(crate) const FRAMEWORK_PROPERTIES: &str = "framework-properties";
pub(crate) const EXTENSIONS: &str = "extensions";
pub(crate) const ARTIFACTS: &str = "artifacts";
pub(crate) const NAME: &str = "name";
pub(crate) const NAMESPACE: &str = "namespace";
pub(crate) const ATTRIBUTES: &str = "attributes";
pub(crate) const DIRECTIVES: &str = "directives";
pub(crate) const FRAMEWORK: &str = "framework";
pub(crate) const FEATURES: &str = "features";

/// Keys that are document sections and cannot name an extension.
pub(crate) const RESERVED_KEYS: &[&str] = &[
    MODEL_VERSION,
    ID,
    TITLE,
    DESCRIPTION,
    VENDOR,
    LICENSE,
    VARIABLES,
    INCLUDES,
    REQUIREMENTS,
    CAPABILITIES,
    BUNDLES,
    CONFIGURATIONS,
    FRAMEWORK_PROPERTIES,
];
