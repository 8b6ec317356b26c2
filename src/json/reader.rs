//! Feature JSON reader.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde_json::{Map, Value};

use super::*;
use crate::error::{Error, Result};
use crate::model::{
    Artifact, ArtifactId, Artifacts, Capability, Configuration, ConfigurationKey, Configurations,
    Extension, ExtensionType, Feature, Include, IncludeRemovals, Requirement, ARTIFACT_PROPERTY,
    CONFIGURATOR_PREFIX,
};

/// Parse a feature document.
///
/// `location` is only used in error messages.
///
/// # Errors
///
/// Returns `Error::FeatureParse` for malformed documents and
/// `Error::InvalidArtifactId` for unparsable ids.
pub fn read_feature(content: &str, location: Option<&str>) -> Result<Feature> {
    FeatureReader::new(location)?.read(content, None)
}

/// Parse a feature document whose `id` may be omitted, in which case `id`
/// is used.
pub fn read_feature_with_id(
    content: &str,
    location: Option<&str>,
    id: &ArtifactId,
) -> Result<Feature> {
    FeatureReader::new(location)?.read(content, Some(id))
}

/// Read and parse a feature file.
pub fn read_feature_file<P: AsRef<Path>>(path: P) -> Result<Feature> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    read_feature(&content, Some(&path.display().to_string()))
}

/// Remove every object key starting with `#`, at any depth.
fn strip_comments(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !key.starts_with('#'));
            for child in map.values_mut() {
                strip_comments(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                strip_comments(item);
            }
        }
        _ => {}
    }
}

/// Scalars that may stand in for a string.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

struct FeatureReader<'a> {
    location: Option<&'a str>,
    placeholder: Regex,
    variables: BTreeMap<String, String>,
}

impl<'a> FeatureReader<'a> {
    fn new(location: Option<&'a str>) -> Result<Self> {
        Ok(Self {
            location,
            placeholder: Regex::new(r"\$\{([^}]+)\}").map_err(Error::Regex)?,
            variables: BTreeMap::new(),
        })
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::FeatureParse {
            message: message.into(),
            location: self.location.map(str::to_string),
        }
    }

    fn read(&mut self, content: &str, default_id: Option<&ArtifactId>) -> Result<Feature> {
        let mut root: Value = serde_json::from_str(content)
            .map_err(|e| self.error(format!("Invalid JSON: {}", e)))?;
        strip_comments(&mut root);
        let Value::Object(map) = root else {
            return Err(self.error("A feature must be a JSON object"));
        };

        self.check_model_version(map.get(MODEL_VERSION))?;
        if let Some(value) = map.get(VARIABLES) {
            self.variables = self.read_variables(value)?;
        }

        let id = match map.get(ID) {
            Some(value) => {
                let id = self.expect_str(value, ID)?;
                ArtifactId::parse(&self.substitute(id)?)?
            }
            None => default_id
                .cloned()
                .ok_or_else(|| self.error("Feature id is missing"))?,
        };

        let mut feature = Feature::new(id);
        feature.variables = self.variables.clone();
        feature.title = self.optional_string(&map, TITLE)?;
        feature.description = self.optional_string(&map, DESCRIPTION)?;
        feature.vendor = self.optional_string(&map, VENDOR)?;
        feature.license = self.optional_string(&map, LICENSE)?;

        if let Some(value) = map.get(INCLUDES) {
            feature.includes = self.read_includes(value)?;
        }
        if let Some(value) = map.get(REQUIREMENTS) {
            feature.requirements = self
                .read_resources(value, REQUIREMENTS)?
                .into_iter()
                .map(|(namespace, attributes, directives)| Requirement {
                    namespace,
                    attributes,
                    directives,
                })
                .collect();
        }
        if let Some(value) = map.get(CAPABILITIES) {
            feature.capabilities = self
                .read_resources(value, CAPABILITIES)?
                .into_iter()
                .map(|(namespace, attributes, directives)| Capability {
                    namespace,
                    attributes,
                    directives,
                })
                .collect();
        }
        if let Some(value) = map.get(BUNDLES) {
            self.read_bundles(value, &mut feature.bundles, &mut feature.configurations)?;
        }
        if let Some(value) = map.get(CONFIGURATIONS) {
            self.read_configurations(value, None, &mut feature.configurations)?;
        }
        if let Some(value) = map.get(FRAMEWORK_PROPERTIES) {
            feature.framework_properties = self.read_framework_properties(value)?;
        }

        for (key, value) in &map {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let extension = self.read_extension(key, value)?;
            if feature.extensions.get(extension.name()).is_some() {
                return Err(self.error(format!("Duplicate extension {}", extension.name())));
            }
            feature.extensions.add(extension);
        }

        Ok(feature)
    }

    fn check_model_version(&self, value: Option<&Value>) -> Result<()> {
        match value {
            None => Ok(()),
            Some(value) if scalar_to_string(value).as_deref() == Some("1") => Ok(()),
            Some(value) => Err(self.error(format!("Unsupported model version {}", value))),
        }
    }

    fn expect_str<'v>(&self, value: &'v Value, what: &str) -> Result<&'v str> {
        value
            .as_str()
            .ok_or_else(|| self.error(format!("{} must be a string", what)))
    }

    fn expect_array<'v>(&self, value: &'v Value, what: &str) -> Result<&'v Vec<Value>> {
        value
            .as_array()
            .ok_or_else(|| self.error(format!("{} must be a JSON array", what)))
    }

    fn expect_object<'v>(&self, value: &'v Value, what: &str) -> Result<&'v Map<String, Value>> {
        value
            .as_object()
            .ok_or_else(|| self.error(format!("{} must be a JSON object", what)))
    }

    fn optional_string(&self, map: &Map<String, Value>, key: &str) -> Result<Option<String>> {
        map.get(key)
            .map(|v| self.expect_str(v, key).map(str::to_string))
            .transpose()
    }

    fn string_list(&self, value: &Value, what: &str) -> Result<Vec<String>> {
        self.expect_array(value, what)?
            .iter()
            .map(|v| self.expect_str(v, what).map(str::to_string))
            .collect()
    }

    fn read_variables(&self, value: &Value) -> Result<BTreeMap<String, String>> {
        self.expect_object(value, VARIABLES)?
            .iter()
            .map(|(name, value)| {
                scalar_to_string(value)
                    .map(|v| (name.clone(), v))
                    .ok_or_else(|| self.error(format!("Variable {} must be a scalar", name)))
            })
            .collect()
    }

    /// Replace every `${name}` placeholder.
    fn substitute(&self, text: &str) -> Result<String> {
        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        for captures in self.placeholder.captures_iter(text) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let value = self
                .variables
                .get(name.as_str())
                .ok_or_else(|| self.error(format!("Undefined variable: {}", name.as_str())))?;
            result.push_str(&text[last..whole.start()]);
            result.push_str(value);
            last = whole.end();
        }
        result.push_str(&text[last..]);
        Ok(result)
    }

    fn substitute_value(&self, value: &Value) -> Result<Value> {
        Ok(match value {
            Value::String(s) => Value::String(self.substitute(s)?),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|v| self.substitute_value(v))
                    .collect::<Result<_>>()?,
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), self.substitute_value(v)?)))
                    .collect::<Result<_>>()?,
            ),
            other => other.clone(),
        })
    }

    fn read_id(&self, value: &Value, what: &str) -> Result<ArtifactId> {
        ArtifactId::parse(&self.substitute(self.expect_str(value, what)?)?)
    }

    fn read_includes(&self, value: &Value) -> Result<Vec<Include>> {
        let mut includes: Vec<Include> = Vec::new();
        for entry in self.expect_array(value, INCLUDES)? {
            let include = match entry {
                Value::String(_) => Include::new(self.read_id(entry, INCLUDES)?),
                Value::Object(map) => {
                    let id = map
                        .get(ID)
                        .ok_or_else(|| self.error("Include is missing an id"))?;
                    let mut include = Include::new(self.read_id(id, ID)?);
                    if let Some(removals) = map.get(REMOVALS) {
                        include.removals = self.read_removals(removals)?;
                    }
                    include
                }
                _ => return Err(self.error("Include must be a string or an object")),
            };
            if includes.iter().any(|i| i.id == include.id) {
                return Err(self.error(format!("Duplicate include {}", include.id)));
            }
            includes.push(include);
        }
        Ok(includes)
    }

    fn read_removals(&self, value: &Value) -> Result<IncludeRemovals> {
        let map = self.expect_object(value, REMOVALS)?;
        let mut removals = IncludeRemovals::default();
        if let Some(bundles) = map.get(BUNDLES) {
            for bundle in self.expect_array(bundles, BUNDLES)? {
                removals.bundles.push(self.read_id(bundle, BUNDLES)?);
            }
        }
        if let Some(configurations) = map.get(CONFIGURATIONS) {
            removals.configurations = self.string_list(configurations, CONFIGURATIONS)?;
        }
        if let Some(properties) = map.get(FRAMEWORK_PROPERTIES) {
            removals.framework_properties = self.string_list(properties, FRAMEWORK_PROPERTIES)?;
        }
        if let Some(extensions) = map.get(EXTENSIONS) {
            for extension in self.expect_array(extensions, EXTENSIONS)? {
                match extension {
                    Value::String(name) => removals.extensions.push(name.clone()),
                    Value::Object(entry) => {
                        let name = entry
                            .get(NAME)
                            .ok_or_else(|| self.error("Extension removal is missing a name"))?;
                        let name = self.expect_str(name, NAME)?.to_string();
                        let mut ids = Vec::new();
                        if let Some(artifacts) = entry.get(ARTIFACTS) {
                            for artifact in self.expect_array(artifacts, ARTIFACTS)? {
                                ids.push(self.read_id(artifact, ARTIFACTS)?);
                            }
                        }
                        removals.artifact_extensions.insert(name, ids);
                    }
                    _ => return Err(self.error("Extension removal must be a string or an object")),
                }
            }
        }
        Ok(removals)
    }

    #[allow(clippy::type_complexity)]
    fn read_resources(
        &self,
        value: &Value,
        what: &str,
    ) -> Result<Vec<(String, BTreeMap<String, Value>, BTreeMap<String, String>)>> {
        let mut resources = Vec::new();
        for entry in self.expect_array(value, what)? {
            let map = self.expect_object(entry, what)?;
            let namespace = map
                .get(NAMESPACE)
                .ok_or_else(|| self.error(format!("Namespace is missing in {}", what)))?;
            let namespace = self.substitute(self.expect_str(namespace, NAMESPACE)?)?;

            let mut attributes = BTreeMap::new();
            if let Some(attrs) = map.get(ATTRIBUTES) {
                for (key, value) in self.expect_object(attrs, ATTRIBUTES)? {
                    attributes.insert(key.clone(), self.substitute_value(value)?);
                }
            }
            let mut directives = BTreeMap::new();
            if let Some(dirs) = map.get(DIRECTIVES) {
                for (key, value) in self.expect_object(dirs, DIRECTIVES)? {
                    let value = scalar_to_string(value)
                        .ok_or_else(|| self.error(format!("Directive {} must be a scalar", key)))?;
                    directives.insert(key.clone(), self.substitute(&value)?);
                }
            }
            resources.push((namespace, attributes, directives));
        }
        Ok(resources)
    }

    /// An artifact entry, plus its nested configurations if any.
    fn read_artifact<'v>(
        &self,
        entry: &'v Value,
        what: &str,
    ) -> Result<(Artifact, Option<&'v Value>)> {
        match entry {
            Value::String(_) => Ok((Artifact::new(self.read_id(entry, what)?), None)),
            Value::Object(map) => {
                let id = map
                    .get(ID)
                    .ok_or_else(|| self.error(format!("Artifact in {} is missing an id", what)))?;
                let mut artifact = Artifact::new(self.read_id(id, ID)?);
                let mut configurations = None;
                for (key, value) in map {
                    match key.as_str() {
                        ID => {}
                        CONFIGURATIONS => configurations = Some(value),
                        _ => {
                            let value =
                                scalar_to_string(value).ok_or_else(|| Error::InvalidMetadata {
                                    artifact: artifact.id().to_mvn_id(),
                                    key: key.clone(),
                                    value: value.to_string(),
                                })?;
                            artifact.metadata_mut().insert(key.clone(), value);
                        }
                    }
                }
                Ok((artifact, configurations))
            }
            _ => Err(self.error(format!("Artifact in {} must be a string or an object", what))),
        }
    }

    fn read_bundles(
        &self,
        value: &Value,
        bundles: &mut Artifacts,
        configurations: &mut Configurations,
    ) -> Result<()> {
        for entry in self.expect_array(value, BUNDLES)? {
            let (bundle, nested) = self.read_artifact(entry, BUNDLES)?;
            if bundles.contains_exact(bundle.id()) {
                return Err(self.error(format!("Duplicate bundle {}", bundle.id())));
            }
            if let Some(nested) = nested {
                let owner = bundle.id().to_mvn_id();
                self.read_configurations(nested, Some(&owner), configurations)?;
            }
            bundles.add(bundle);
        }
        Ok(())
    }

    fn read_configurations(
        &self,
        value: &Value,
        owner: Option<&str>,
        configurations: &mut Configurations,
    ) -> Result<()> {
        for (key, properties) in self.expect_object(value, CONFIGURATIONS)? {
            let key = ConfigurationKey::parse(key);
            if configurations.contains(&key) {
                return Err(self.error(format!("Duplicate configuration {}", key)));
            }
            let mut configuration = Configuration::new(key);
            for (name, value) in self.expect_object(properties, CONFIGURATIONS)? {
                if name.starts_with(CONFIGURATOR_PREFIX) {
                    return Err(self.error(format!(
                        "Configuration {} uses the internal property prefix: {}",
                        configuration.key(),
                        name
                    )));
                }
                configuration
                    .properties_mut()
                    .insert(name.clone(), self.substitute_value(value)?);
            }
            if let Some(owner) = owner {
                configuration
                    .properties_mut()
                    .insert(ARTIFACT_PROPERTY.to_string(), Value::String(owner.to_string()));
            }
            configurations.add(configuration);
        }
        Ok(())
    }

    fn read_framework_properties(&self, value: &Value) -> Result<BTreeMap<String, String>> {
        let mut properties = BTreeMap::new();
        for (key, value) in self.expect_object(value, FRAMEWORK_PROPERTIES)? {
            let value = scalar_to_string(value)
                .ok_or_else(|| self.error(format!("Framework property {} must be a scalar", key)))?;
            properties.insert(key.clone(), self.substitute(&value)?);
        }
        Ok(properties)
    }

    fn read_extension(&self, key: &str, value: &Value) -> Result<Extension> {
        let (head, required) = match key.split_once('|') {
            Some((head, flag)) => match flag.to_ascii_lowercase().as_str() {
                "true" | "required" => (head, true),
                "false" | "optional" => (head, false),
                _ => return Err(self.error(format!("Invalid extension state in {}", key))),
            },
            None => (key, false),
        };
        let (name, extension_type) = match head.split_once(':') {
            Some((name, kind)) => (name, kind.parse::<ExtensionType>()?),
            None => (head, ExtensionType::Artifacts),
        };
        if name.is_empty() {
            return Err(self.error(format!("Extension name missing in {}", key)));
        }
        if RESERVED_KEYS.contains(&name) {
            return Err(self.error(format!("Extension is using reserved name: {}", name)));
        }

        let extension = match extension_type {
            ExtensionType::Text => {
                let text = match value {
                    Value::String(text) => text.clone(),
                    Value::Array(lines) => {
                        let mut text = String::new();
                        for line in lines {
                            text.push_str(self.expect_str(line, name)?);
                            text.push('\n');
                        }
                        text
                    }
                    _ => {
                        return Err(self.error(format!(
                            "TEXT extension {} must be a string or an array of strings",
                            name
                        )))
                    }
                };
                Extension::text(name, &text)
            }
            ExtensionType::Json => {
                if !value.is_object() && !value.is_array() {
                    return Err(self.error(format!(
                        "JSON extension {} must be an object or an array",
                        name
                    )));
                }
                Extension::json(name, value.clone())
            }
            ExtensionType::Artifacts => {
                let mut artifacts = Artifacts::new();
                for entry in self.expect_array(value, name)? {
                    let (artifact, nested) = self.read_artifact(entry, name)?;
                    if nested.is_some() {
                        return Err(self.error(format!(
                            "Configurations are only allowed for bundles, found in {}",
                            name
                        )));
                    }
                    if artifacts.contains_exact(artifact.id()) {
                        return Err(self.error(format!(
                            "Duplicate artifact {} in extension {}",
                            artifact.id(),
                            name
                        )));
                    }
                    artifacts.add(artifact);
                }
                Extension::artifacts(name, artifacts)
            }
        };
        Ok(extension.required(required))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtensionContent;
    use serde_json::json;

    fn read(content: &str) -> Result<Feature> {
        read_feature(content, Some("test.json"))
    }

    mod document_tests {
        use super::*;

        #[test]
        fn test_minimal_feature() {
            let feature = read(r#"{"id": "g:f:1.0.0"}"#).unwrap();
            assert_eq!(feature.id.to_mvn_id(), "g:f:1.0.0");
            assert!(feature.bundles.is_empty());
            assert!(!feature.is_assembled());
        }

        #[test]
        fn test_missing_id_uses_supplied_id() {
            let id = ArtifactId::parse("g:given:1").unwrap();
            let feature = read_feature_with_id(r#"{"title": "T"}"#, None, &id).unwrap();
            assert_eq!(feature.id, id);
            assert_eq!(feature.title.as_deref(), Some("T"));
            assert!(read(r#"{"title": "T"}"#).is_err());
        }

        #[test]
        fn test_invalid_json_names_location() {
            let err = read("{ not json").unwrap_err();
            let display = err.to_string();
            assert!(display.contains("test.json"));
            assert!(display.contains("Invalid JSON"));
        }

        #[test]
        fn test_model_version() {
            assert!(read(r#"{"model-version": "1", "id": "g:f:1"}"#).is_ok());
            let err = read(r#"{"model-version": "2", "id": "g:f:1"}"#).unwrap_err();
            assert!(err.to_string().contains("Unsupported model version"));
        }

        #[test]
        fn test_comments_are_stripped_at_any_depth() {
            let feature = read(
                r##"{
                    "#": "top level comment",
                    "id": "g:f:1",
                    "configurations": { "pid": { "#note": "x", "a": 1 } }
                }"##,
            )
            .unwrap();
            let config = feature
                .configurations
                .get(&ConfigurationKey::parse("pid"))
                .unwrap();
            assert_eq!(config.properties().len(), 1);
            assert!(feature.extensions.is_empty());
        }
    }

    mod variable_tests {
        use super::*;

        #[test]
        fn test_variables_are_substituted() {
            let feature = read(
                r#"{
                    "id": "g:f:${v}",
                    "variables": { "v": "1.2", "port": 8080 },
                    "bundles": ["g:b:${v}"],
                    "framework-properties": { "http.port": "${port}" },
                    "configurations": { "pid": { "url": "http://localhost:${port}/", "list": ["${v}"] } }
                }"#,
            )
            .unwrap();
            assert_eq!(feature.id.version(), "1.2");
            assert!(feature
                .bundles
                .contains_exact(&ArtifactId::parse("g:b:1.2").unwrap()));
            assert_eq!(
                feature.framework_properties.get("http.port").map(String::as_str),
                Some("8080")
            );
            let config = feature
                .configurations
                .get(&ConfigurationKey::parse("pid"))
                .unwrap();
            assert_eq!(config.properties().get("url"), Some(&json!("http://localhost:8080/")));
            assert_eq!(config.properties().get("list"), Some(&json!(["1.2"])));
        }

        #[test]
        fn test_undefined_variable_fails() {
            let err = read(r#"{"id": "g:f:1", "framework-properties": {"a": "${nope}"}}"#)
                .unwrap_err();
            assert!(err.to_string().contains("Undefined variable: nope"));
        }
    }

    mod section_tests {
        use super::*;

        #[test]
        fn test_bundles_with_metadata_and_configurations() {
            let feature = read(
                r#"{
                    "id": "g:f:1",
                    "bundles": [
                        "g:a:1",
                        { "id": "g:b:1", "start-order": 5, "flag": true,
                          "configurations": { "b.pid": { "k": "v" } } }
                    ]
                }"#,
            )
            .unwrap();
            assert_eq!(feature.bundles.len(), 2);
            let b = feature
                .bundles
                .get_exact(&ArtifactId::parse("g:b:1").unwrap())
                .unwrap();
            assert_eq!(b.start_order().unwrap(), 5);
            assert_eq!(b.metadata().get("flag").map(String::as_str), Some("true"));
            let config = feature
                .configurations
                .get(&ConfigurationKey::parse("b.pid"))
                .unwrap();
            assert_eq!(config.artifact(), Some("g:b:1"));
        }

        #[test]
        fn test_duplicates_are_rejected() {
            assert!(read(r#"{"id": "g:f:1", "bundles": ["g:a:1", "g:a:1"]}"#).is_err());
            assert!(read(
                r#"{"id": "g:f:1",
                    "bundles": [{"id": "g:a:1", "configurations": {"pid": {}}}],
                    "configurations": {"pid": {}}}"#
            )
            .is_err());
            assert!(read(r#"{"id": "g:f:1", "includes": ["g:i:1", "g:i:1"]}"#).is_err());
            assert!(read(r#"{"id": "g:f:1", "notes:TEXT": "a", "notes:JSON": {}}"#).is_err());
        }

        #[test]
        fn test_internal_configuration_properties_are_rejected() {
            let err = read(
                r#"{"id": "g:f:1", "configurations": {"pid": {":configurator:artifact-id": "x"}}}"#,
            )
            .unwrap_err();
            assert!(err.to_string().contains(":configurator:artifact-id"));
        }

        #[test]
        fn test_factory_configuration_key() {
            let feature =
                read(r#"{"id": "g:f:1", "configurations": {"factory~name": {"a": 1}}}"#).unwrap();
            let config = feature.configurations.iter().next().unwrap();
            assert!(config.is_factory());
        }

        #[test]
        fn test_includes_with_removals() {
            let feature = read(
                r#"{
                    "id": "g:f:1",
                    "includes": [
                        "g:plain:1",
                        { "id": "g:inc:1", "removals": {
                            "bundles": ["g:b:1"],
                            "configurations": ["pid", "other@prop"],
                            "framework-properties": ["fp"],
                            "extensions": ["text-ext", {"name": "content", "artifacts": ["g:c:1"]}]
                        } }
                    ]
                }"#,
            )
            .unwrap();
            assert_eq!(feature.includes.len(), 2);
            assert!(feature.includes[0].removals.is_empty());
            let removals = &feature.includes[1].removals;
            assert_eq!(removals.bundles.len(), 1);
            assert_eq!(removals.configurations, vec!["pid", "other@prop"]);
            assert_eq!(removals.framework_properties, vec!["fp"]);
            assert_eq!(removals.extensions, vec!["text-ext"]);
            assert_eq!(removals.artifact_extensions["content"].len(), 1);
        }

        #[test]
        fn test_requirements_and_capabilities() {
            let feature = read(
                r#"{
                    "id": "g:f:1",
                    "requirements": [{ "namespace": "osgi.contract",
                                       "directives": { "filter": "(osgi.contract=JavaServlet)" } }],
                    "capabilities": [{ "namespace": "osgi.implementation",
                                       "attributes": { "osgi.implementation": "osgi.http", "version:Version": "1.1" } }]
                }"#,
            )
            .unwrap();
            assert_eq!(feature.requirements.len(), 1);
            assert_eq!(feature.requirements[0].namespace, "osgi.contract");
            assert_eq!(
                feature.requirements[0].directives.get("filter").map(String::as_str),
                Some("(osgi.contract=JavaServlet)")
            );
            assert_eq!(
                feature.capabilities[0].attributes.get("osgi.implementation"),
                Some(&json!("osgi.http"))
            );
        }
    }

    mod extension_tests {
        use super::*;

        #[test]
        fn test_extension_types_and_state() {
            let feature = read(
                r#"{
                    "id": "g:f:1",
                    "notes:TEXT|true": ["line one", "line two"],
                    "api-regions:JSON|false": [{"name": "global"}],
                    "content": ["g:c:1", {"id": "g:d:1", "hash": "abc"}]
                }"#,
            )
            .unwrap();
            let notes = feature.extensions.get("notes").unwrap();
            assert!(notes.is_required());
            assert_eq!(notes.as_text(), Some("line one\nline two\n"));

            let regions = feature.extensions.get("api-regions").unwrap();
            assert!(!regions.is_required());
            assert_eq!(regions.as_json(), Some(&json!([{"name": "global"}])));

            let content = feature.extensions.get("content").unwrap();
            assert_eq!(content.extension_type(), ExtensionType::Artifacts);
            assert!(matches!(content.content(), ExtensionContent::Artifacts(a) if a.len() == 2));
        }

        #[test]
        fn test_reserved_extension_name_fails() {
            let err = read(r#"{"id": "g:f:1", "bundles:TEXT": "x"}"#).unwrap_err();
            assert!(err.to_string().contains("reserved name"));
        }

        #[test]
        fn test_json_extension_must_be_structured() {
            assert!(read(r#"{"id": "g:f:1", "x:JSON": "scalar"}"#).is_err());
        }

        #[test]
        fn test_unknown_extension_type_fails() {
            assert!(read(r#"{"id": "g:f:1", "x:BINARY": "scalar"}"#).is_err());
        }
    }
}
