//! OSGi configurations.

use std::fmt;

use serde_json::{Map, Value};

/// Internal property binding a configuration to the bundle that declared it.
///
/// Feature documents may not set it themselves; the reader adds it to
/// configurations nested in a bundle entry.
pub const ARTIFACT_PROPERTY: &str = ":configurator:artifact-id";

/// Prefix reserved for internal configuration properties.
pub const CONFIGURATOR_PREFIX: &str = ":configurator:";

/// Identity of a configuration: a PID, or a factory PID plus a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigurationKey {
    Singleton(String),
    Factory { factory_pid: String, name: String },
}

impl ConfigurationKey {
    /// Parse `pid` or `factoryPid~name`.
    pub fn parse(value: &str) -> Self {
        match value.split_once('~') {
            Some((factory_pid, name)) => ConfigurationKey::Factory {
                factory_pid: factory_pid.to_string(),
                name: name.to_string(),
            },
            None => ConfigurationKey::Singleton(value.to_string()),
        }
    }
}

impl fmt::Display for ConfigurationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationKey::Singleton(pid) => f.write_str(pid),
            ConfigurationKey::Factory { factory_pid, name } => {
                write!(f, "{}~{}", factory_pid, name)
            }
        }
    }
}

/// A configuration with its properties.
///
/// Configurations compare equal when their keys match; the properties are
/// not part of the identity.
#[derive(Debug, Clone)]
pub struct Configuration {
    key: ConfigurationKey,
    properties: Map<String, Value>,
}

impl Configuration {
    pub fn new(key: ConfigurationKey) -> Self {
        Self {
            key,
            properties: Map::new(),
        }
    }

    pub fn singleton(pid: &str) -> Self {
        Self::new(ConfigurationKey::Singleton(pid.to_string()))
    }

    pub fn factory(factory_pid: &str, name: &str) -> Self {
        Self::new(ConfigurationKey::Factory {
            factory_pid: factory_pid.to_string(),
            name: name.to_string(),
        })
    }

    pub fn key(&self) -> &ConfigurationKey {
        &self.key
    }

    pub fn is_factory(&self) -> bool {
        matches!(self.key, ConfigurationKey::Factory { .. })
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.properties
    }

    pub fn with_property(mut self, name: &str, value: Value) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    /// The mvn id of the bundle this configuration belongs to, if any.
    pub fn artifact(&self) -> Option<&str> {
        self.properties.get(ARTIFACT_PROPERTY).and_then(Value::as_str)
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

/// The configurations of a feature or application, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configurations {
    items: Vec<Configuration>,
}

impl Configurations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, configuration: Configuration) {
        self.items.push(configuration);
    }

    pub fn get(&self, key: &ConfigurationKey) -> Option<&Configuration> {
        self.items.iter().find(|c| c.key() == key)
    }

    pub fn get_mut(&mut self, key: &ConfigurationKey) -> Option<&mut Configuration> {
        self.items.iter_mut().find(|c| c.key() == key)
    }

    pub fn contains(&self, key: &ConfigurationKey) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &ConfigurationKey) -> Option<Configuration> {
        let pos = self.items.iter().position(|c| c.key() == key)?;
        Some(self.items.remove(pos))
    }

    pub fn retain(&mut self, f: impl FnMut(&Configuration) -> bool) {
        self.items.retain(f);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Configuration> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a> IntoIterator for &'a Configurations {
    type Item = &'a Configuration;
    type IntoIter = std::slice::Iter<'a, Configuration>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
