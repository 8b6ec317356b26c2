//! Resolver hook filtering package candidates by region.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::{RegionMaps, GLOBAL_REGION};
use crate::model::{OsgiVersion, PACKAGE_NAMESPACE};

/// Identity of a bundle revision as seen by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRevisionInfo {
    pub bundle_id: u64,
    pub symbolic_name: String,
    pub version: OsgiVersion,
}

impl BundleRevisionInfo {
    pub fn new(bundle_id: u64, symbolic_name: &str, version: OsgiVersion) -> Self {
        Self {
            bundle_id,
            symbolic_name: symbolic_name.to_string(),
            version,
        }
    }

    fn key(&self) -> (String, OsgiVersion) {
        (self.symbolic_name.clone(), self.version.clone())
    }
}

/// A requirement and the revision declaring it.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleRequirement {
    pub namespace: String,
    pub revision: BundleRevisionInfo,
}

impl BundleRequirement {
    pub fn new(namespace: &str, revision: BundleRevisionInfo) -> Self {
        Self {
            namespace: namespace.to_string(),
            revision,
        }
    }
}

impl fmt::Display for BundleRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} {}",
            self.namespace, self.revision.symbolic_name, self.revision.version
        )
    }
}

/// A capability offered to satisfy a requirement.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleCapability {
    pub namespace: String,
    pub attributes: std::collections::BTreeMap<String, Value>,
    pub revision: BundleRevisionInfo,
}

impl BundleCapability {
    /// A package export of `package` by `revision`.
    pub fn package(package: &str, revision: BundleRevisionInfo) -> Self {
        Self {
            namespace: PACKAGE_NAMESPACE.to_string(),
            attributes: [(PACKAGE_NAMESPACE.to_string(), Value::from(package))]
                .into_iter()
                .collect(),
            revision,
        }
    }

    /// The exported package name, for package capabilities.
    pub fn package_name(&self) -> Option<&str> {
        self.attributes.get(PACKAGE_NAMESPACE).and_then(Value::as_str)
    }
}

/// Hides package capabilities the requiring bundle may not see.
///
/// A candidate stays visible if any of these hold:
///
/// - it is provided by the system bundle (id 0) or by the requirer itself
/// - its bundle, or all its features, are unknown to the region data
/// - it shares a feature with the requirer
/// - one of its features declares no regions
/// - its package is exported by the `global` region
/// - its package is exported by a region that both its feature and a
///   feature of the requirer take part in
///
/// Requirements outside the package namespace are never filtered.
#[derive(Debug, Clone)]
pub struct ResolverHook {
    maps: Arc<RegionMaps>,
}

impl ResolverHook {
    pub fn new(maps: Arc<RegionMaps>) -> Self {
        Self { maps }
    }

    pub fn maps(&self) -> &RegionMaps {
        &self.maps
    }

    /// Remove invisible candidates in place.
    pub fn filter_matches(
        &self,
        requirement: &BundleRequirement,
        candidates: &mut Vec<BundleCapability>,
    ) {
        if requirement.namespace != PACKAGE_NAMESPACE {
            return;
        }
        let requirer_features = self.features_of(&requirement.revision);
        let requirer_regions: BTreeSet<&str> = requirer_features
            .iter()
            .filter_map(|feature| self.maps.feature_regions.get(*feature))
            .flatten()
            .map(String::as_str)
            .collect();

        let before = candidates.len();
        candidates.retain(|candidate| {
            self.is_visible(requirement, &requirer_features, &requirer_regions, candidate)
        });
        if candidates.len() < before {
            log::info!(
                "Removed one or more candidates for requirement {} as they are not in the correct region",
                requirement
            );
        }
    }

    /// The visible subset of `candidates`.
    pub fn filter_candidates(
        &self,
        requirement: &BundleRequirement,
        candidates: &[BundleCapability],
    ) -> Vec<BundleCapability> {
        let mut visible = candidates.to_vec();
        self.filter_matches(requirement, &mut visible);
        visible
    }

    fn features_of(&self, revision: &BundleRevisionInfo) -> BTreeSet<&str> {
        self.maps
            .bsn_version
            .get(&revision.key())
            .into_iter()
            .flatten()
            .filter_map(|artifact| self.maps.bundle_features.get(artifact))
            .flatten()
            .map(String::as_str)
            .collect()
    }

    fn is_visible(
        &self,
        requirement: &BundleRequirement,
        requirer_features: &BTreeSet<&str>,
        requirer_regions: &BTreeSet<&str>,
        candidate: &BundleCapability,
    ) -> bool {
        let provider = &candidate.revision;
        if provider.bundle_id == 0 || provider.bundle_id == requirement.revision.bundle_id {
            return true;
        }
        if !self.maps.bsn_version.contains_key(&provider.key()) {
            return true;
        }
        let provider_features = self.features_of(provider);
        if provider_features.is_empty() {
            return true;
        }

        let package = candidate.package_name();
        let exports = |region: &str| -> bool {
            package.is_some_and(|package| {
                self.maps
                    .region_packages
                    .get(region)
                    .is_some_and(|packages| packages.contains(package))
            })
        };
        if exports(GLOBAL_REGION) {
            return true;
        }

        for feature in &provider_features {
            if requirer_features.contains(feature) {
                return true;
            }
            let regions = match self.maps.feature_regions.get(*feature) {
                Some(regions) if !regions.is_empty() => regions,
                _ => return true,
            };
            if regions
                .iter()
                .any(|region| requirer_regions.contains(region.as_str()) && exports(region))
            {
                return true;
            }
        }
        false
    }
}
