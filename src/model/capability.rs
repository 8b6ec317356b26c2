//! Capability and requirement declarations.
//!
//! Both share the OSGi resource shape: a namespace, typed attributes and
//! string directives. Equality is structural.

use std::collections::BTreeMap;

use serde_json::Value;

/// Namespace of exported and imported packages.
pub const PACKAGE_NAMESPACE: &str = "osgi.wiring.package";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Capability {
    pub namespace: String,
    pub attributes: BTreeMap<String, Value>,
    pub directives: BTreeMap<String, String>,
}

impl Capability {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: &str, value: Value) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }

    pub fn with_directive(mut self, key: &str, value: &str) -> Self {
        self.directives.insert(key.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Requirement {
    pub namespace: String,
    pub attributes: BTreeMap<String, Value>,
    pub directives: BTreeMap<String, String>,
}

impl Requirement {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: &str, value: Value) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }

    pub fn with_directive(mut self, key: &str, value: &str) -> Self {
        self.directives.insert(key.to_string(), value.to_string());
        self
    }
}
