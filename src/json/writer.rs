//! Feature and application JSON writers.
//!
//! The output reads back with [`read_feature`](super::read_feature):
//! configurations bound to a bundle are nested under that bundle, and
//! extension keys always carry their type and state.

use std::path::Path;

use serde_json::{Map, Value};

use super::*;
use crate::error::{Error, Result};
use crate::model::{
    Application, Artifacts, Configurations, Extension, ExtensionContent, Extensions, Feature,
    IncludeRemovals, ARTIFACT_PROPERTY,
};

/// Convert a feature into its JSON document.
pub fn feature_to_json(feature: &Feature) -> Value {
    let mut map = Map::new();
    map.insert(MODEL_VERSION.to_string(), Value::from("1"));
    map.insert(ID.to_string(), Value::from(feature.id.to_mvn_id()));
    for (key, value) in [
        (TITLE, &feature.title),
        (DESCRIPTION, &feature.description),
        (VENDOR, &feature.vendor),
        (LICENSE, &feature.license),
    ] {
        if let Some(value) = value {
            map.insert(key.to_string(), Value::from(value.as_str()));
        }
    }
    if !feature.variables.is_empty() {
        map.insert(
            VARIABLES.to_string(),
            string_map(feature.variables.iter()),
        );
    }

    if !feature.includes.is_empty() {
        let includes = feature
            .includes
            .iter()
            .map(|include| {
                if include.removals.is_empty() {
                    Value::from(include.id.to_mvn_id())
                } else {
                    let mut entry = Map::new();
                    entry.insert(ID.to_string(), Value::from(include.id.to_mvn_id()));
                    entry.insert(REMOVALS.to_string(), removals_to_json(&include.removals));
                    Value::Object(entry)
                }
            })
            .collect();
        map.insert(INCLUDES.to_string(), Value::Array(includes));
    }

    if !feature.requirements.is_empty() {
        let requirements = feature
            .requirements
            .iter()
            .map(|r| resource_to_json(&r.namespace, &r.attributes, &r.directives))
            .collect();
        map.insert(REQUIREMENTS.to_string(), Value::Array(requirements));
    }
    if !feature.capabilities.is_empty() {
        let capabilities = feature
            .capabilities
            .iter()
            .map(|c| resource_to_json(&c.namespace, &c.attributes, &c.directives))
            .collect();
        map.insert(CAPABILITIES.to_string(), Value::Array(capabilities));
    }

    write_content(
        &mut map,
        &feature.bundles,
        &feature.configurations,
        &feature.framework_properties,
        &feature.extensions,
    );
    Value::Object(map)
}

/// Convert an application into its JSON document.
pub fn application_to_json(app: &Application) -> Value {
    let mut map = Map::new();
    if let Some(framework) = &app.framework {
        map.insert(FRAMEWORK.to_string(), Value::from(framework.to_mvn_id()));
    }
    if !app.feature_ids().is_empty() {
        let features = app
            .feature_ids()
            .iter()
            .map(|id| Value::from(id.to_mvn_id()))
            .collect();
        map.insert(FEATURES.to_string(), Value::Array(features));
    }
    write_content(
        &mut map,
        &app.bundles,
        &app.configurations,
        &app.framework_properties,
        &app.extensions,
    );
    Value::Object(map)
}

/// Serialise a feature as pretty-printed JSON.
pub fn write_feature(feature: &Feature) -> Result<String> {
    serde_json::to_string_pretty(&feature_to_json(feature)).map_err(Error::Json)
}

/// Serialise an application as pretty-printed JSON.
pub fn write_application(app: &Application) -> Result<String> {
    serde_json::to_string_pretty(&application_to_json(app)).map_err(Error::Json)
}

/// Write a feature document to `path`, creating parent directories.
pub fn write_feature_file<P: AsRef<Path>>(feature: &Feature, path: P) -> Result<()> {
    write_file(path.as_ref(), &write_feature(feature)?)
}

/// Write an application document to `path`, creating parent directories.
pub fn write_application_file<P: AsRef<Path>>(app: &Application, path: P) -> Result<()> {
    write_file(path.as_ref(), &write_application(app)?)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }
    }
    std::fs::write(path, content).map_err(Error::Io)
}

fn string_map<'a>(entries: impl Iterator<Item = (&'a String, &'a String)>) -> Value {
    Value::Object(
        entries
            .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
            .collect(),
    )
}

fn removals_to_json(removals: &IncludeRemovals) -> Value {
    let mut map = Map::new();
    if !removals.bundles.is_empty() {
        let bundles = removals
            .bundles
            .iter()
            .map(|id| Value::from(id.to_mvn_id()))
            .collect();
        map.insert(BUNDLES.to_string(), Value::Array(bundles));
    }
    if !removals.configurations.is_empty() {
        map.insert(
            CONFIGURATIONS.to_string(),
            Value::from(removals.configurations.clone()),
        );
    }
    if !removals.framework_properties.is_empty() {
        map.insert(
            FRAMEWORK_PROPERTIES.to_string(),
            Value::from(removals.framework_properties.clone()),
        );
    }
    if !removals.extensions.is_empty() || !removals.artifact_extensions.is_empty() {
        let mut extensions: Vec<Value> = removals
            .extensions
            .iter()
            .map(|name| Value::from(name.as_str()))
            .collect();
        for (name, ids) in &removals.artifact_extensions {
            let mut entry = Map::new();
            entry.insert(NAME.to_string(), Value::from(name.as_str()));
            entry.insert(
                ARTIFACTS.to_string(),
                ids.iter().map(|id| Value::from(id.to_mvn_id())).collect(),
            );
            extensions.push(Value::Object(entry));
        }
        map.insert(EXTENSIONS.to_string(), Value::Array(extensions));
    }
    Value::Object(map)
}

fn resource_to_json(
    namespace: &str,
    attributes: &std::collections::BTreeMap<String, Value>,
    directives: &std::collections::BTreeMap<String, String>,
) -> Value {
    let mut map = Map::new();
    map.insert(NAMESPACE.to_string(), Value::from(namespace));
    if !attributes.is_empty() {
        map.insert(
            ATTRIBUTES.to_string(),
            Value::Object(attributes.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        );
    }
    if !directives.is_empty() {
        map.insert(DIRECTIVES.to_string(), string_map(directives.iter()));
    }
    Value::Object(map)
}

/// Bundles, configurations, framework properties and extensions.
fn write_content(
    map: &mut Map<String, Value>,
    bundles: &Artifacts,
    configurations: &Configurations,
    framework_properties: &std::collections::BTreeMap<String, String>,
    extensions: &Extensions,
) {
    if !bundles.is_empty() {
        map.insert(
            BUNDLES.to_string(),
            artifacts_to_json(bundles, Some(configurations)),
        );
    }

    let unbound: Map<String, Value> = configurations
        .iter()
        .filter(|c| {
            c.artifact()
                .and_then(|owner| crate::model::ArtifactId::from_mvn_id(owner).ok())
                .is_none_or(|owner| !bundles.contains_exact(&owner))
        })
        .map(|c| (c.key().to_string(), properties_to_json(c.properties())))
        .collect();
    if !unbound.is_empty() {
        map.insert(CONFIGURATIONS.to_string(), Value::Object(unbound));
    }

    if !framework_properties.is_empty() {
        map.insert(
            FRAMEWORK_PROPERTIES.to_string(),
            string_map(framework_properties.iter()),
        );
    }

    for extension in extensions {
        map.insert(extension_key(extension), extension_to_json(extension));
    }
}

fn properties_to_json(properties: &Map<String, Value>) -> Value {
    Value::Object(
        properties
            .iter()
            .filter(|(name, _)| name.as_str() != ARTIFACT_PROPERTY)
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
    )
}

fn artifacts_to_json(artifacts: &Artifacts, configurations: Option<&Configurations>) -> Value {
    let entries = artifacts
        .iter()
        .map(|artifact| {
            let mvn_id = artifact.id().to_mvn_id();
            let bound: Map<String, Value> = configurations
                .into_iter()
                .flat_map(|c| c.iter())
                .filter(|c| c.artifact() == Some(mvn_id.as_str()))
                .map(|c| (c.key().to_string(), properties_to_json(c.properties())))
                .collect();
            if artifact.metadata().is_empty() && bound.is_empty() {
                return Value::from(mvn_id);
            }
            let mut entry = Map::new();
            entry.insert(ID.to_string(), Value::from(mvn_id));
            for (key, value) in artifact.metadata() {
                entry.insert(key.clone(), Value::from(value.as_str()));
            }
            if !bound.is_empty() {
                entry.insert(CONFIGURATIONS.to_string(), Value::Object(bound));
            }
            Value::Object(entry)
        })
        .collect();
    Value::Array(entries)
}

fn extension_key(extension: &Extension) -> String {
    format!(
        "{}:{}|{}",
        extension.name(),
        extension.extension_type(),
        extension.is_required()
    )
}

fn extension_to_json(extension: &Extension) -> Value {
    match extension.content() {
        ExtensionContent::Text(text) => Value::from(text.as_str()),
        ExtensionContent::Json(json) => json.clone(),
        ExtensionContent::Artifacts(artifacts) => artifacts_to_json(artifacts, None),
    }
}
