//! Application assembly.

use super::feature::assemble_with;
use super::{BuilderContext, FeatureProvider};
use crate::error::{Error, Result};
use crate::merge::merge_application;
use crate::model::{Application, ArtifactId, Feature};

/// Looks among a fixed set of features before asking the context.
struct LocalFirst<'a> {
    features: &'a [Feature],
    fallback: &'a dyn FeatureProvider,
}

impl FeatureProvider for LocalFirst<'_> {
    fn provide(&self, id: &ArtifactId) -> Option<Feature> {
        self.features
            .iter()
            .find(|f| &f.id == id)
            .cloned()
            .or_else(|| self.fallback.provide(id))
    }
}

/// Keep one feature per *same* id, preferring the strictly higher version.
fn dedupe(features: &[Feature]) -> Vec<&Feature> {
    let mut selected: Vec<&Feature> = Vec::new();
    for feature in features {
        match selected.iter_mut().find(|f| f.id.is_same(&feature.id)) {
            Some(existing) => {
                if feature.id.osgi_version() > existing.id.osgi_version() {
                    log::debug!("Using {} instead of {}", feature.id, existing.id);
                    *existing = feature;
                }
            }
            None => selected.push(feature),
        }
    }
    selected
}

/// Fold `features` into an application.
///
/// Starts from `app` when given, otherwise from an empty application.
/// Features sharing a *same* id are reduced to the highest version, the
/// rest are sorted by id, assembled and merged in with
/// [`ArtifactMerge::Highest`](crate::merge::ArtifactMerge::Highest).
/// Includes are looked up among `features` first, then through the
/// context's provider.
///
/// # Errors
///
/// Any assembly or merge error; no partial application is returned.
pub fn assemble_application(
    app: Option<Application>,
    context: &BuilderContext,
    features: &[Feature],
) -> Result<Application> {
    let mut app = app.unwrap_or_default();

    let mut selected = dedupe(features);
    selected.sort_by(|a, b| a.id.cmp(&b.id));

    let provider = LocalFirst {
        features,
        fallback: context.provider(),
    };
    for feature in selected {
        let assembled = assemble_with(feature, &provider, context.handlers())?;
        merge_application(&mut app, &assembled)?;
    }
    Ok(app)
}

/// Like [`assemble_application`], but the features are looked up by id
/// through the context's provider.
///
/// # Errors
///
/// Returns `Error::MissingInclude` for an id the provider cannot supply.
pub fn assemble_application_from_ids(
    app: Option<Application>,
    context: &BuilderContext,
    ids: &[ArtifactId],
) -> Result<Application> {
    let features = ids
        .iter()
        .map(|id| {
            context
                .provider()
                .provide(id)
                .ok_or_else(|| Error::MissingInclude { id: id.to_mvn_id() })
        })
        .collect::<Result<Vec<_>>>()?;
    assemble_application(app, context, &features)
}
