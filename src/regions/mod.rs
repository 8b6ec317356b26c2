//! # API Regions
//!
//! Package visibility between features.
//!
//! A feature declares its regions in the `api-regions` JSON extension:
//!
//! ```json
//! [
//!   { "name": "global", "exports": ["org.example.api"] },
//!   { "name": "internal", "exports": ["org.example.impl"] }
//! ]
//! ```
//!
//! The pieces fit together as follows:
//!
//! - [`ApiRegionsMergeHandler`] merges the extension when features are
//!   assembled, tagging each region with the feature that declared it.
//! - [`RegionMapHandler`] and [`BundleSymbolicNameHandler`] derive the
//!   region maps from an assembled feature and persist them as property
//!   files.
//! - [`RegionEnforcer`] loads those files into an immutable
//!   [`RegionMaps`] snapshot.
//! - [`ResolverHook`] uses the snapshot to drop package candidates that
//!   the requiring bundle is not allowed to see.
//!
//! ## Region inheritance
//!
//! Within the regions declared by one feature, each region also exports
//! everything exported by the regions declared before it. The `global`
//! region keeps its own list but passes it on. For
//! `[global{a,b}, deprecated{c}, internal{d}]`, `internal` exports
//! `d, a, b, c`.

pub mod derive;
pub mod enforcer;
pub mod hook;
pub mod merge_handler;
pub mod properties;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::OsgiVersion;

pub use derive::{ArtifactSource, BundleSymbolicNameHandler, RegionMapHandler};
pub use enforcer::RegionEnforcer;
pub use hook::{BundleCapability, BundleRequirement, BundleRevisionInfo, ResolverHook};
pub use merge_handler::ApiRegionsMergeHandler;
pub use properties::Properties;

pub const API_REGIONS_NAME: &str = "api-regions";
pub const GLOBAL_REGION: &str = "global";
/// Metadata key naming the feature a bundle or region came from.
pub const ORG_FEATURE_KEY: &str = "org-feature";

pub const IDBSNVER_FILENAME: &str = "idbsnver.properties";
pub const BUNDLE_FEATURE_FILENAME: &str = "bundles.properties";
pub const FEATURE_REGION_FILENAME: &str = "features.properties";
pub const REGION_PACKAGE_FILENAME: &str = "regions.properties";

/// Prefix of the configuration keys locating the region files, e.g.
/// `whitelisting.regions.properties`.
pub const PROPERTIES_PREFIX: &str = "whitelisting.";
/// Configuration key listing the enabled regions, comma separated.
pub const ENABLED_REGIONS_KEY: &str = "whitelisting.regions";

/// One entry of the `api-regions` extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionEntry {
    pub name: String,
    #[serde(default)]
    pub exports: Vec<String>,
    #[serde(rename = "org-feature", default, skip_serializing_if = "Option::is_none")]
    pub org_feature: Option<String>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, Value>,
}

impl RegionEntry {
    pub fn new(name: &str, exports: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            exports: exports.iter().map(|e| e.to_string()).collect(),
            org_feature: None,
            other: serde_json::Map::new(),
        }
    }
}

/// Read the entries of an `api-regions` extension. `null` reads as no
/// entries.
pub fn parse_regions(value: &Value) -> Result<Vec<RegionEntry>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value.clone()).map_err(|e| Error::RegionData {
        message: format!("Invalid {} extension: {}", API_REGIONS_NAME, e),
    })
}

pub fn regions_to_json(entries: &[RegionEntry]) -> Result<Value> {
    serde_json::to_value(entries).map_err(Error::Json)
}

fn inherit<'a>(entries: impl Iterator<Item = &'a mut RegionEntry>) {
    let mut inherited: Vec<String> = Vec::new();
    for entry in entries {
        if entry.name != GLOBAL_REGION {
            for package in &inherited {
                if !entry.exports.contains(package) {
                    entry.exports.push(package.clone());
                }
            }
        }
        for package in &entry.exports {
            if !inherited.contains(package) {
                inherited.push(package.clone());
            }
        }
    }
}

/// Apply region inheritance to entries declared by a single feature.
///
/// Applying it a second time changes nothing.
pub fn apply_inheritance(entries: &mut [RegionEntry]) {
    inherit(entries.iter_mut());
}

/// Apply region inheritance separately to the entries of each declaring
/// feature. Entries without `org-feature` belong to `default_feature`.
pub fn apply_inheritance_by_feature(entries: &mut [RegionEntry], default_feature: &str) {
    let owner = |entry: &RegionEntry| -> String {
        entry
            .org_feature
            .clone()
            .unwrap_or_else(|| default_feature.to_string())
    };
    let owners: BTreeSet<String> = entries.iter().map(owner).collect();
    for current in owners {
        inherit(entries.iter_mut().filter(|e| owner(e) == current));
    }
}

/// Locations of the four region property files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDataFiles {
    pub idbsnver: PathBuf,
    pub bundles: PathBuf,
    pub features: PathBuf,
    pub regions: PathBuf,
}

impl RegionDataFiles {
    /// All files under `directory`, with their default names.
    pub fn in_directory(directory: &Path) -> Self {
        Self {
            idbsnver: directory.join(IDBSNVER_FILENAME),
            bundles: directory.join(BUNDLE_FEATURE_FILENAME),
            features: directory.join(FEATURE_REGION_FILENAME),
            regions: directory.join(REGION_PACKAGE_FILENAME),
        }
    }

    /// Files located by `whitelisting.*` configuration keys. A key that is
    /// not set falls back to `directory`.
    ///
    /// Values are paths or `file:` URLs.
    ///
    /// # Errors
    ///
    /// Returns `Error::RegionData` for a file that has neither a key nor a
    /// fallback directory.
    pub fn from_config(config: &BTreeMap<String, String>, directory: Option<&Path>) -> Result<Self> {
        let locate = |name: &str| -> Result<PathBuf> {
            let key = format!("{}{}", PROPERTIES_PREFIX, name);
            match config.get(&key) {
                Some(value) => config_path(value),
                None => directory.map(|d| d.join(name)).ok_or_else(|| Error::RegionData {
                    message: format!("No location configured for {}", key),
                }),
            }
        };
        Ok(Self {
            idbsnver: locate(IDBSNVER_FILENAME)?,
            bundles: locate(BUNDLE_FEATURE_FILENAME)?,
            features: locate(FEATURE_REGION_FILENAME)?,
            regions: locate(REGION_PACKAGE_FILENAME)?,
        })
    }
}

fn config_path(value: &str) -> Result<PathBuf> {
    if value.starts_with("file:") {
        let url = url::Url::parse(value)?;
        return url.to_file_path().map_err(|_| Error::RegionData {
            message: format!("Not a local file: {}", value),
        });
    }
    Ok(PathBuf::from(value))
}

/// The derived region data, as consumed by the resolver hook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionMaps {
    /// (symbolic name, version) to the artifact ids providing that bundle.
    pub bsn_version: BTreeMap<(String, OsgiVersion), Vec<String>>,
    /// Artifact id to the features that contain it.
    pub bundle_features: BTreeMap<String, BTreeSet<String>>,
    /// Feature id to the regions it takes part in.
    pub feature_regions: BTreeMap<String, BTreeSet<String>>,
    /// Region name to the packages it exports.
    pub region_packages: BTreeMap<String, BTreeSet<String>>,
}

impl RegionMaps {
    /// Load the maps from their property files. Missing files give empty
    /// maps.
    pub fn load(files: &RegionDataFiles) -> Result<Self> {
        Self::from_properties(
            &Properties::load(&files.idbsnver)?,
            &Properties::load(&files.bundles)?,
            &Properties::load(&files.features)?,
            &Properties::load(&files.regions)?,
        )
    }

    pub fn from_properties(
        idbsnver: &Properties,
        bundles: &Properties,
        features: &Properties,
        regions: &Properties,
    ) -> Result<Self> {
        let mut bsn_version: BTreeMap<(String, OsgiVersion), Vec<String>> = BTreeMap::new();
        for (artifact, value) in idbsnver.iter() {
            let (bsn, version) = value.split_once('~').ok_or_else(|| Error::RegionData {
                message: format!("Invalid symbolic name and version for {}: {}", artifact, value),
            })?;
            let version = OsgiVersion::parse(version.trim())?;
            bsn_version
                .entry((bsn.trim().to_string(), version))
                .or_default()
                .push(artifact.to_string());
        }

        Ok(Self {
            bsn_version,
            bundle_features: set_map(bundles),
            feature_regions: set_map(features),
            region_packages: set_map(regions),
        })
    }
}

fn set_map(properties: &Properties) -> BTreeMap<String, BTreeSet<String>> {
    properties
        .iter()
        .map(|(key, value)| {
            (
                key.to_string(),
                properties::split_list(value).map(str::to_string).collect(),
            )
        })
        .collect()
}
