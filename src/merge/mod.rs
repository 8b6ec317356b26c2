//! # Merge Engine
//!
//! Merges the content of one feature into another, or of a feature into an
//! application. Every section of a feature has its own rule:
//!
//! - **Bundles** and **artifact extensions**: one artifact per *same* id.
//!   [`ArtifactMerge::Latest`] lets the incoming artifact replace the
//!   existing one, [`ArtifactMerge::Highest`] keeps the existing one only
//!   if its OSGi version is strictly higher.
//! - **Configurations**: matched by key, properties overridden one by one.
//! - **Framework properties**: key overwrite.
//! - **Requirements and capabilities**: added unless an equal one exists.
//! - **Extensions**: matched by name, with a fatal error if the types
//!   differ. A registered [`ExtensionHandler`] takes over if it claims the
//!   name; otherwise text is appended on a new line, JSON is merged
//!   structurally (see [`json`]) and artifact lists follow the artifact
//!   rule. All handlers then post-process every extension of the result.
//!
//! The `merge_*` functions mutate an explicitly borrowed target and never
//! touch the source. [`merged_feature`] wraps them for callers that want a
//! new value instead.

pub mod handler;
pub mod json;

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::model::{
    Application, Artifact, Artifacts, Configurations, Extension, ExtensionContent, Extensions,
    Feature,
};

pub use handler::{ExtensionHandler, ExtensionHandlers};

/// How two versions of the same artifact are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtifactMerge {
    /// The artifact merged last wins.
    #[default]
    Latest,
    /// The artifact with the highest OSGi version wins.
    Highest,
}

/// Merge `source` into `target`.
///
/// # Errors
///
/// Fails if two extensions of the same name have different types, if two
/// JSON extensions have different root types, if a bundle has an invalid
/// start order, or if an extension handler fails.
pub fn merge_feature(
    target: &mut Feature,
    source: &Feature,
    alg: ArtifactMerge,
    handlers: &ExtensionHandlers,
) -> Result<()> {
    merge_bundles(&mut target.bundles, &source.bundles, alg)?;
    merge_configurations(&mut target.configurations, &source.configurations);
    merge_framework_properties(&mut target.framework_properties, &source.framework_properties);
    merge_unique(&mut target.requirements, &source.requirements);
    merge_unique(&mut target.capabilities, &source.capabilities);
    merge_feature_extensions(target, source, alg, handlers)?;
    post_process(target, handlers)
}

/// Merge `source` into a copy of `target` and return the copy.
pub fn merged_feature(
    target: &Feature,
    source: &Feature,
    alg: ArtifactMerge,
    handlers: &ExtensionHandlers,
) -> Result<Feature> {
    let mut result = target.clone();
    merge_feature(&mut result, source, alg, handlers)?;
    Ok(result)
}

/// Fold an assembled feature into an application.
///
/// Uses [`ArtifactMerge::Highest`] and no extension handlers; requirements
/// and capabilities are not carried into applications.
pub fn merge_application(app: &mut Application, feature: &Feature) -> Result<()> {
    merge_bundles(&mut app.bundles, &feature.bundles, ArtifactMerge::Highest)?;
    merge_configurations(&mut app.configurations, &feature.configurations);
    merge_framework_properties(&mut app.framework_properties, &feature.framework_properties);
    for extension in &feature.extensions {
        merge_extension(&mut app.extensions, extension, ArtifactMerge::Highest)?;
    }
    app.add_feature_id(feature.id.clone());
    Ok(())
}

/// Run every handler's post-processing for every extension of `feature`.
pub fn post_process(feature: &mut Feature, handlers: &ExtensionHandlers) -> Result<()> {
    if handlers.is_empty() {
        return Ok(());
    }
    for name in feature.extensions.names() {
        for handler in handlers.iter() {
            handler.post_process(feature, &name)?;
        }
    }
    Ok(())
}

/// Merge bundles, visiting the source in start order.
pub fn merge_bundles(target: &mut Artifacts, source: &Artifacts, alg: ArtifactMerge) -> Result<()> {
    for (_, group) in source.by_start_order()? {
        for artifact in group {
            merge_artifact(target, artifact, alg);
        }
    }
    Ok(())
}

/// Apply the same-id rule for one incoming artifact.
fn merge_artifact(target: &mut Artifacts, artifact: &Artifact, alg: ArtifactMerge) {
    if let Some(existing) = target.get_same(artifact.id()) {
        if alg == ArtifactMerge::Highest
            && existing.id().osgi_version() > artifact.id().osgi_version()
        {
            log::debug!(
                "Keeping {} over lower version {}",
                existing.id(),
                artifact.id()
            );
            return;
        }
        log::debug!("Replacing {} with {}", existing.id(), artifact.id());
    }
    target.remove_same(artifact.id());
    target.add(artifact.clone());
}

/// Merge configurations by key, overriding properties one by one.
pub fn merge_configurations(target: &mut Configurations, source: &Configurations) {
    for configuration in source {
        match target.get_mut(configuration.key()) {
            Some(existing) => {
                let properties = existing.properties_mut();
                for (name, value) in configuration.properties() {
                    properties.insert(name.clone(), value.clone());
                }
            }
            None => target.add(configuration.clone()),
        }
    }
}

pub fn merge_framework_properties(
    target: &mut BTreeMap<String, String>,
    source: &BTreeMap<String, String>,
) {
    for (key, value) in source {
        target.insert(key.clone(), value.clone());
    }
}

/// Append every source element that has no equal in the target.
pub fn merge_unique<T: PartialEq + Clone>(target: &mut Vec<T>, source: &[T]) {
    for item in source {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

fn merge_feature_extensions(
    target: &mut Feature,
    source: &Feature,
    alg: ArtifactMerge,
    handlers: &ExtensionHandlers,
) -> Result<()> {
    for extension in &source.extensions {
        if let Some(current) = target.extensions.get(extension.name()) {
            check_same_type(current, extension)?;
        }
        match handlers.merger_for(extension.name()) {
            Some(handler) => handler.merge(target, source, extension.name())?,
            None => merge_extension(&mut target.extensions, extension, alg)?,
        }
    }
    Ok(())
}

fn check_same_type(current: &Extension, incoming: &Extension) -> Result<()> {
    if current.extension_type() != incoming.extension_type() {
        return Err(Error::ExtensionTypeMismatch {
            name: incoming.name().to_string(),
            target_type: current.extension_type().to_string(),
            source_type: incoming.extension_type().to_string(),
        });
    }
    Ok(())
}

/// Built-in merge of one extension into a set of extensions.
pub fn merge_extension(
    target: &mut Extensions,
    incoming: &Extension,
    alg: ArtifactMerge,
) -> Result<()> {
    let Some(current) = target.get_mut(incoming.name()) else {
        target.add(incoming.clone());
        return Ok(());
    };
    check_same_type(current, incoming)?;

    match incoming.content() {
        ExtensionContent::Text(text) => {
            if let Some(current_text) = current.text_mut() {
                current_text.push('\n');
                current_text.push_str(text);
            }
        }
        ExtensionContent::Json(json) => {
            if let Some(current_json) = current.json_mut() {
                json::merge_json_extension(incoming.name(), current_json, json)?;
            }
        }
        ExtensionContent::Artifacts(artifacts) => {
            if let Some(current_artifacts) = current.artifacts_mut() {
                for artifact in artifacts {
                    merge_artifact(current_artifacts, artifact, alg);
                }
            }
        }
    }
    Ok(())
}
