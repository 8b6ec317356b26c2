//! Features and their includes.

use std::collections::BTreeMap;

use super::artifact::{ArtifactId, Bundles};
use super::capability::{Capability, Requirement};
use super::configuration::Configurations;
use super::extension::Extensions;

/// What to strip from an included feature before it is merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncludeRemovals {
    /// Bundles removed by exact id. Configurations bound to them go too.
    pub bundles: Vec<ArtifactId>,
    /// Configuration keys (`pid` or `factory~name`). A `@property` suffix
    /// removes only that property.
    pub configurations: Vec<String>,
    pub framework_properties: Vec<String>,
    /// Whole extensions removed by name.
    pub extensions: Vec<String>,
    /// Artifacts removed from the named artifact extension.
    pub artifact_extensions: BTreeMap<String, Vec<ArtifactId>>,
}

impl IncludeRemovals {
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
            && self.configurations.is_empty()
            && self.framework_properties.is_empty()
            && self.extensions.is_empty()
            && self.artifact_extensions.is_empty()
    }
}

/// A reference to another feature that is merged in on assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct Include {
    pub id: ArtifactId,
    pub removals: IncludeRemovals,
}

impl Include {
    pub fn new(id: ArtifactId) -> Self {
        Self {
            id,
            removals: IncludeRemovals::default(),
        }
    }
}

/// A feature: a named, versioned unit of bundles, configurations,
/// framework properties and extensions.
///
/// A feature read from JSON may still carry includes. Assembly resolves
/// them and produces a copy for which [`Feature::is_assembled`] is `true`
/// and whose include list is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: ArtifactId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub vendor: Option<String>,
    pub license: Option<String>,
    pub variables: BTreeMap<String, String>,
    pub includes: Vec<Include>,
    pub bundles: Bundles,
    pub configurations: Configurations,
    pub framework_properties: BTreeMap<String, String>,
    pub requirements: Vec<Requirement>,
    pub capabilities: Vec<Capability>,
    pub extensions: Extensions,
    assembled: bool,
}

impl Feature {
    pub fn new(id: ArtifactId) -> Self {
        Self {
            id,
            title: None,
            description: None,
            vendor: None,
            license: None,
            variables: BTreeMap::new(),
            includes: Vec::new(),
            bundles: Bundles::new(),
            configurations: Configurations::new(),
            framework_properties: BTreeMap::new(),
            requirements: Vec::new(),
            capabilities: Vec::new(),
            extensions: Extensions::new(),
            assembled: false,
        }
    }

    pub fn is_assembled(&self) -> bool {
        self.assembled
    }

    pub(crate) fn mark_assembled(&mut self) {
        self.includes.clear();
        self.assembled = true;
    }

    /// A feature with this feature's id and descriptive fields but no
    /// content.
    pub fn header_copy(&self) -> Feature {
        let mut copy = Feature::new(self.id.clone());
        copy.title = self.title.clone();
        copy.description = self.description.clone();
        copy.vendor = self.vendor.clone();
        copy.license = self.license.clone();
        copy.variables = self.variables.clone();
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::artifact::Artifact;

    #[test]
    fn test_new_feature_is_not_assembled() {
        let f = Feature::new(ArtifactId::parse("g:f:1").unwrap());
        assert!(!f.is_assembled());
        assert!(f.includes.is_empty());
    }

    #[test]
    fn test_mark_assembled_clears_includes() {
        let mut f = Feature::new(ArtifactId::parse("g:f:1").unwrap());
        f.includes.push(Include::new(ArtifactId::parse("g:inc:1").unwrap()));
        f.mark_assembled();
        assert!(f.is_assembled());
        assert!(f.includes.is_empty());
    }

    #[test]
    fn test_header_copy_drops_content() {
        let mut f = Feature::new(ArtifactId::parse("g:f:1").unwrap());
        f.title = Some("Title".to_string());
        f.bundles.add(Artifact::new(ArtifactId::parse("g:b:1").unwrap()));
        let copy = f.header_copy();
        assert_eq!(copy.title.as_deref(), Some("Title"));
        assert!(copy.bundles.is_empty());
    }
}
