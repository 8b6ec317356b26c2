//! The final aggregate built from one or more features.

use std::collections::BTreeMap;

use super::artifact::{ArtifactId, Bundles};
use super::configuration::Configurations;
use super::extension::Extensions;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Application {
    pub framework: Option<ArtifactId>,
    feature_ids: Vec<ArtifactId>,
    pub bundles: Bundles,
    pub configurations: Configurations,
    pub framework_properties: BTreeMap<String, String>,
    pub extensions: Extensions,
}

impl Application {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of the features the application was built from, in the order
    /// they were added.
    pub fn feature_ids(&self) -> &[ArtifactId] {
        &self.feature_ids
    }

    pub fn add_feature_id(&mut self, id: ArtifactId) {
        if !self.feature_ids.contains(&id) {
            self.feature_ids.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_ids_are_a_set() {
        let mut app = Application::new();
        let id = ArtifactId::parse("g:f:1").unwrap();
        app.add_feature_id(id.clone());
        app.add_feature_id(id);
        app.add_feature_id(ArtifactId::parse("g:f:2").unwrap());
        assert_eq!(app.feature_ids().len(), 2);
    }
}
