//! Typed feature extensions.
//!
//! An extension is a named payload of one of three kinds. The kind is fixed
//! when the extension is created: content can only be changed through the
//! accessor that matches it, so an extension never changes type.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::artifact::Artifacts;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionType {
    Text,
    Json,
    Artifacts,
}

impl ExtensionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionType::Text => "TEXT",
            ExtensionType::Json => "JSON",
            ExtensionType::Artifacts => "ARTIFACTS",
        }
    }
}

impl fmt::Display for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtensionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TEXT" => Ok(ExtensionType::Text),
            "JSON" => Ok(ExtensionType::Json),
            "ARTIFACTS" => Ok(ExtensionType::Artifacts),
            _ => Err(Error::FeatureParse {
                message: format!("Unknown extension type {}", s),
                location: None,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionContent {
    Text(String),
    Json(Value),
    Artifacts(Artifacts),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    name: String,
    required: bool,
    content: ExtensionContent,
}

impl Extension {
    /// An empty extension of the given type.
    pub fn new(extension_type: ExtensionType, name: &str, required: bool) -> Self {
        let content = match extension_type {
            ExtensionType::Text => ExtensionContent::Text(String::new()),
            ExtensionType::Json => ExtensionContent::Json(Value::Null),
            ExtensionType::Artifacts => ExtensionContent::Artifacts(Artifacts::new()),
        };
        Self {
            name: name.to_string(),
            required,
            content,
        }
    }

    pub fn text(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            required: false,
            content: ExtensionContent::Text(text.to_string()),
        }
    }

    pub fn json(name: &str, json: Value) -> Self {
        Self {
            name: name.to_string(),
            required: false,
            content: ExtensionContent::Json(json),
        }
    }

    pub fn artifacts(name: &str, artifacts: Artifacts) -> Self {
        Self {
            name: name.to_string(),
            required: false,
            content: ExtensionContent::Artifacts(artifacts),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn extension_type(&self) -> ExtensionType {
        match self.content {
            ExtensionContent::Text(_) => ExtensionType::Text,
            ExtensionContent::Json(_) => ExtensionType::Json,
            ExtensionContent::Artifacts(_) => ExtensionType::Artifacts,
        }
    }

    pub fn content(&self) -> &ExtensionContent {
        &self.content
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            ExtensionContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match &self.content {
            ExtensionContent::Json(json) => Some(json),
            _ => None,
        }
    }

    pub fn as_artifacts(&self) -> Option<&Artifacts> {
        match &self.content {
            ExtensionContent::Artifacts(artifacts) => Some(artifacts),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut String> {
        match &mut self.content {
            ExtensionContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn json_mut(&mut self) -> Option<&mut Value> {
        match &mut self.content {
            ExtensionContent::Json(json) => Some(json),
            _ => None,
        }
    }

    pub fn artifacts_mut(&mut self) -> Option<&mut Artifacts> {
        match &mut self.content {
            ExtensionContent::Artifacts(artifacts) => Some(artifacts),
            _ => None,
        }
    }
}

/// Extensions keyed by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extensions {
    items: Vec<Extension>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an extension, replacing any extension with the same name.
    pub fn add(&mut self, extension: Extension) {
        match self.items.iter_mut().find(|e| e.name() == extension.name()) {
            Some(existing) => *existing = extension,
            None => self.items.push(extension),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Extension> {
        self.items.iter().find(|e| e.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Extension> {
        self.items.iter_mut().find(|e| e.name() == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Extension> {
        let pos = self.items.iter().position(|e| e.name() == name)?;
        Some(self.items.remove(pos))
    }

    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(|e| e.name().to_string()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Extension> {
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

impl<'a> IntoIterator for &'a Extensions {
    type Item = &'a Extension;
    type IntoIter = std::slice::Iter<'a, Extension>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
