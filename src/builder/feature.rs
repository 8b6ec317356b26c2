//! Feature assembly.
//!
//! Includes are resolved depth first, in declaration order. Each included
//! feature is assembled on its own, trimmed by the include's removals and
//! merged into the result with [`ArtifactMerge::Latest`]. The including
//! feature's own content is merged last, so it wins over anything it
//! includes.

use super::{BuilderContext, FeatureProvider};
use crate::error::{Error, Result};
use crate::merge::{merge_feature, ArtifactMerge, ExtensionHandlers};
use crate::model::{ConfigurationKey, Feature, IncludeRemovals};

/// Assemble `feature`, resolving its includes through the context.
///
/// Already assembled features are returned unchanged. The result has no
/// includes and reports [`Feature::is_assembled`].
///
/// # Errors
///
/// - `Error::MissingInclude` if the provider cannot supply an include
/// - `Error::RecursiveInclude` if a feature ends up including itself
/// - any merge error
///
/// Nothing is returned for a failed assembly; the input is never modified.
pub fn assemble_feature(feature: &Feature, context: &BuilderContext) -> Result<Feature> {
    assemble_with(feature, context.provider(), context.handlers())
}

pub(crate) fn assemble_with(
    feature: &Feature,
    provider: &dyn FeatureProvider,
    handlers: &ExtensionHandlers,
) -> Result<Feature> {
    assemble(feature, provider, handlers, &mut Vec::new())
}

fn assemble(
    feature: &Feature,
    provider: &dyn FeatureProvider,
    handlers: &ExtensionHandlers,
    processing: &mut Vec<String>,
) -> Result<Feature> {
    if feature.is_assembled() {
        return Ok(feature.clone());
    }

    let mvn_id = feature.id.to_mvn_id();
    if processing.contains(&mvn_id) {
        return Err(Error::RecursiveInclude {
            id: mvn_id,
            chain: format!("[{}]", processing.join(", ")),
        });
    }
    processing.push(mvn_id);

    let mut result = if feature.includes.is_empty() {
        feature.clone()
    } else {
        let mut result = feature.header_copy();
        for include in &feature.includes {
            log::debug!("Including {} into {}", include.id, feature.id);
            let included = provider
                .provide(&include.id)
                .ok_or_else(|| Error::MissingInclude {
                    id: include.id.to_mvn_id(),
                })?;
            let mut assembled = assemble(&included, provider, handlers, processing)?;
            apply_removals(&mut assembled, &include.removals);
            merge_feature(&mut result, &assembled, ArtifactMerge::Latest, handlers)?;
        }
        merge_feature(&mut result, feature, ArtifactMerge::Latest, handlers)?;
        result
    };

    processing.pop();
    result.mark_assembled();
    Ok(result)
}

/// Strip what an include asks to remove from the included feature.
pub fn apply_removals(feature: &mut Feature, removals: &IncludeRemovals) {
    for bundle in &removals.bundles {
        feature.bundles.remove_exact(bundle);
        let mvn_id = bundle.to_mvn_id();
        feature
            .configurations
            .retain(|c| c.artifact() != Some(mvn_id.as_str()));
    }

    for removal in &removals.configurations {
        let (key, property) = match removal.split_once('@') {
            Some((key, property)) => (key, Some(property)),
            None => (removal.as_str(), None),
        };
        let key = ConfigurationKey::parse(key);
        match property {
            None => {
                feature.configurations.remove(&key);
            }
            Some(property) => {
                if let Some(configuration) = feature.configurations.get_mut(&key) {
                    configuration.properties_mut().remove(property);
                }
            }
        }
    }

    for property in &removals.framework_properties {
        feature.framework_properties.remove(property);
    }

    for name in &removals.extensions {
        feature.extensions.remove(name);
    }

    for (name, ids) in &removals.artifact_extensions {
        if let Some(artifacts) = feature
            .extensions
            .get_mut(name)
            .and_then(|e| e.artifacts_mut())
        {
            for id in ids {
                artifacts.remove_exact(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MapFeatureProvider;
    use crate::model::{
        Artifact, ArtifactId, Artifacts, Configuration, Extension, Include, ARTIFACT_PROPERTY,
    };
    use serde_json::json;

    fn id(s: &str) -> ArtifactId {
        ArtifactId::parse(s).unwrap()
    }

    fn with_bundles(fid: &str, bundles: &[&str]) -> Feature {
        let mut f = Feature::new(id(fid));
        for b in bundles {
            f.bundles.add(Artifact::new(id(b)));
        }
        f
    }

    fn bundle_ids(f: &Feature) -> Vec<String> {
        f.bundles.iter().map(|a| a.id().to_mvn_id()).collect()
    }

    mod assemble_tests {
        use super::*;

        #[test]
        fn test_feature_without_includes_is_copied() {
            let f = with_bundles("g:f:1", &["g:a:1"]);
            let context = BuilderContext::new(MapFeatureProvider::new());
            let assembled = assemble_feature(&f, &context).unwrap();
            assert!(assembled.is_assembled());
            assert_eq!(bundle_ids(&assembled), vec!["g:a:1"]);
            assert!(!f.is_assembled());
        }

        #[test]
        fn test_own_content_wins_over_includes() {
            let base = with_bundles("g:base:1", &["g:a:2", "g:b:1"]);
            let mut f = with_bundles("g:f:1", &["g:a:1"]);
            f.includes.push(Include::new(id("g:base:1")));

            let context = BuilderContext::new(MapFeatureProvider::from_iter([base]));
            let assembled = assemble_feature(&f, &context).unwrap();
            assert!(assembled.includes.is_empty());
            assert_eq!(bundle_ids(&assembled), vec!["g:b:1", "g:a:1"]);
        }

        #[test]
        fn test_transitive_includes() {
            let leaf = with_bundles("g:leaf:1", &["g:l:1"]);
            let mut mid = with_bundles("g:mid:1", &["g:m:1"]);
            mid.includes.push(Include::new(id("g:leaf:1")));
            let mut top = with_bundles("g:top:1", &["g:t:1"]);
            top.includes.push(Include::new(id("g:mid:1")));

            let context = BuilderContext::new(MapFeatureProvider::from_iter([leaf, mid]));
            let assembled = assemble_feature(&top, &context).unwrap();
            assert_eq!(bundle_ids(&assembled), vec!["g:l:1", "g:m:1", "g:t:1"]);
        }

        #[test]
        fn test_missing_include_fails() {
            let mut f = Feature::new(id("g:f:1"));
            f.includes.push(Include::new(id("g:missing:1")));
            let context = BuilderContext::new(MapFeatureProvider::new());
            let err = assemble_feature(&f, &context).unwrap_err();
            assert!(matches!(err, Error::MissingInclude { .. }));
            assert!(err.to_string().contains("g:missing:1"));
        }

        #[test]
        fn test_recursive_include_fails() {
            let mut a = Feature::new(id("g:a:1"));
            a.includes.push(Include::new(id("g:b:1")));
            let mut b = Feature::new(id("g:b:1"));
            b.includes.push(Include::new(id("g:a:1")));

            let context = BuilderContext::new(MapFeatureProvider::from_iter([a.clone(), b]));
            let err = assemble_feature(&a, &context).unwrap_err();
            assert!(matches!(err, Error::RecursiveInclude { .. }));
            assert!(err.to_string().contains("[g:a:1, g:b:1]"));
        }

        #[test]
        fn test_diamond_include_is_not_recursive() {
            let shared = with_bundles("g:shared:1", &["g:s:1"]);
            let mut left = Feature::new(id("g:left:1"));
            left.includes.push(Include::new(id("g:shared:1")));
            let mut right = Feature::new(id("g:right:1"));
            right.includes.push(Include::new(id("g:shared:1")));
            let mut top = Feature::new(id("g:top:1"));
            top.includes.push(Include::new(id("g:left:1")));
            top.includes.push(Include::new(id("g:right:1")));

            let context =
                BuilderContext::new(MapFeatureProvider::from_iter([shared, left, right]));
            let assembled = assemble_feature(&top, &context).unwrap();
            assert_eq!(bundle_ids(&assembled), vec!["g:s:1"]);
        }
    }

    mod removal_tests {
        use super::*;

        fn included() -> Feature {
            let mut f = with_bundles("g:inc:1", &["g:a:1", "g:b:1"]);
            f.configurations.add(
                Configuration::singleton("bound").with_property(ARTIFACT_PROPERTY, json!("g:a:1")),
            );
            f.configurations.add(
                Configuration::singleton("keep")
                    .with_property("x", json!(1))
                    .with_property("y", json!(2)),
            );
            f.configurations.add(Configuration::factory("fac", "one"));
            f.framework_properties.insert("p".to_string(), "v".to_string());
            f.extensions.add(Extension::text("notes", "n"));
            let mut content = Artifacts::new();
            content.add(Artifact::new(id("g:c:1")));
            content.add(Artifact::new(id("g:d:1")));
            f.extensions.add(Extension::artifacts("content", content));
            f
        }

        #[test]
        fn test_bundle_removal_drops_bound_configurations() {
            let mut f = included();
            let removals = IncludeRemovals {
                bundles: vec![id("g:a:1")],
                ..Default::default()
            };
            apply_removals(&mut f, &removals);
            assert_eq!(bundle_ids(&f), vec!["g:b:1"]);
            assert!(!f.configurations.contains(&ConfigurationKey::parse("bound")));
            assert!(f.configurations.contains(&ConfigurationKey::parse("keep")));
        }

        #[test]
        fn test_configuration_and_property_removal() {
            let mut f = included();
            let removals = IncludeRemovals {
                configurations: vec!["fac~one".to_string(), "keep@x".to_string()],
                framework_properties: vec!["p".to_string()],
                ..Default::default()
            };
            apply_removals(&mut f, &removals);
            assert!(!f.configurations.contains(&ConfigurationKey::parse("fac~one")));
            let keep = f.configurations.get(&ConfigurationKey::parse("keep")).unwrap();
            assert!(keep.properties().get("x").is_none());
            assert_eq!(keep.properties().get("y"), Some(&json!(2)));
            assert!(f.framework_properties.is_empty());
        }

        #[test]
        fn test_extension_removals() {
            let mut f = included();
            let mut removals = IncludeRemovals {
                extensions: vec!["notes".to_string()],
                ..Default::default()
            };
            removals
                .artifact_extensions
                .insert("content".to_string(), vec![id("g:c:1")]);
            apply_removals(&mut f, &removals);
            assert!(f.extensions.get("notes").is_none());
            let content = f.extensions.get("content").unwrap().as_artifacts().unwrap();
            assert_eq!(content.len(), 1);
            assert!(content.contains_exact(&id("g:d:1")));
        }

        #[test]
        fn test_removals_apply_before_merge() {
            let inc = included();
            let mut f = Feature::new(id("g:f:1"));
            let mut include = Include::new(id("g:inc:1"));
            include.removals.bundles.push(id("g:b:1"));
            f.includes.push(include);

            let context = BuilderContext::new(MapFeatureProvider::from_iter([inc]));
            let assembled = assemble_feature(&f, &context).unwrap();
            assert_eq!(bundle_ids(&assembled), vec!["g:a:1"]);
        }
    }
}
