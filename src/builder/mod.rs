//! # Builders
//!
//! Assembly of features and applications on top of the merge engine.
//!
//! - [`assemble_feature`] resolves a feature's includes transitively,
//!   applies each include's removals and merges everything into a single
//!   assembled feature.
//! - [`assemble_application`] folds a set of features into an
//!   [`Application`](crate::model::Application), keeping only the highest
//!   version of each feature.
//!
//! Included features are looked up through a [`FeatureProvider`] held by
//! the [`BuilderContext`], together with the extension handlers used for
//! every merge.

pub mod application;
pub mod feature;

use std::collections::BTreeMap;

use crate::merge::{ExtensionHandler, ExtensionHandlers};
use crate::model::{ArtifactId, Feature};

pub use application::{assemble_application, assemble_application_from_ids};
pub use feature::assemble_feature;

/// Supplies features by id.
pub trait FeatureProvider {
    fn provide(&self, id: &ArtifactId) -> Option<Feature>;
}

impl<F> FeatureProvider for F
where
    F: Fn(&ArtifactId) -> Option<Feature>,
{
    fn provide(&self, id: &ArtifactId) -> Option<Feature> {
        self(id)
    }
}

/// A provider backed by an in-memory map of features.
#[derive(Debug, Clone, Default)]
pub struct MapFeatureProvider {
    features: BTreeMap<ArtifactId, Feature>,
}

impl MapFeatureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: Feature) {
        self.features.insert(feature.id.clone(), feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl FromIterator<Feature> for MapFeatureProvider {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        let mut provider = Self::new();
        for feature in iter {
            provider.insert(feature);
        }
        provider
    }
}

impl FeatureProvider for MapFeatureProvider {
    fn provide(&self, id: &ArtifactId) -> Option<Feature> {
        self.features.get(id).cloned()
    }
}

/// Everything a builder needs besides the features themselves.
pub struct BuilderContext {
    provider: Box<dyn FeatureProvider>,
    handlers: ExtensionHandlers,
}

impl BuilderContext {
    pub fn new(provider: impl FeatureProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            handlers: ExtensionHandlers::new(),
        }
    }

    pub fn with_handler(mut self, handler: impl ExtensionHandler + 'static) -> Self {
        self.handlers.register(Box::new(handler));
        self
    }

    pub fn with_handlers(mut self, handlers: ExtensionHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn provider(&self) -> &dyn FeatureProvider {
        self.provider.as_ref()
    }

    pub fn handlers(&self) -> &ExtensionHandlers {
        &self.handlers
    }
}

impl std::fmt::Debug for BuilderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderContext")
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}
