//! Artifact coordinates and artifact collections.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use super::version::OsgiVersion;
use crate::error::{Error, Result};

/// Metadata key holding a bundle's start order.
pub const START_ORDER_KEY: &str = "start-order";

const DEFAULT_TYPE: &str = "jar";

/// A Maven coordinate: `group:artifact[:type[:classifier]]:version`.
///
/// Two ids are *equal* when all five parts match. Two ids are the *same*
/// artifact ([`ArtifactId::is_same`]) when everything but the version
/// matches.
#[derive(Debug, Clone)]
pub struct ArtifactId {
    group_id: String,
    artifact_id: String,
    version: String,
    classifier: Option<String>,
    artifact_type: String,
}

impl ArtifactId {
    /// Create a new id.
    ///
    /// An empty or `bundle` type becomes `jar`, an empty classifier is
    /// dropped, and the version must be convertible to an OSGi version.
    pub fn new(
        group_id: &str,
        artifact_id: &str,
        version: &str,
        classifier: Option<&str>,
        artifact_type: Option<&str>,
    ) -> Result<Self> {
        let coordinates = format!("{}:{}:{}", group_id, artifact_id, version);
        for (part, value) in [
            ("group id", group_id),
            ("artifact id", artifact_id),
            ("version", version),
        ] {
            if value.is_empty() {
                return Err(Error::InvalidArtifactId {
                    value: coordinates.clone(),
                    message: format!("missing {}", part),
                });
            }
        }
        OsgiVersion::from_maven(version)?;

        let artifact_type = match artifact_type {
            None | Some("") | Some("bundle") => DEFAULT_TYPE.to_string(),
            Some(t) => t.to_string(),
        };
        let classifier = classifier.filter(|c| !c.is_empty()).map(str::to_string);

        Ok(Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
            classifier,
            artifact_type,
        })
    }

    /// Parse either a mvn id or a mvn url.
    pub fn parse(value: &str) -> Result<Self> {
        if value.starts_with("mvn:") {
            Self::from_mvn_url(value)
        } else if value.contains(':') {
            Self::from_mvn_id(value)
        } else if value.contains('/') {
            Self::from_mvn_url(value)
        } else {
            Err(Error::InvalidArtifactId {
                value: value.to_string(),
                message: "unable to parse mvn coordinates/url".to_string(),
            })
        }
    }

    /// Parse `group:artifact[:type[:classifier]]:version`.
    pub fn from_mvn_id(coordinates: &str) -> Result<Self> {
        let parts: Vec<&str> = coordinates.split(':').collect();
        if parts.len() < 3 || parts.len() > 5 {
            return Err(Error::InvalidArtifactId {
                value: coordinates.to_string(),
                message: "expected 3 to 5 colon separated parts".to_string(),
            });
        }
        let version = parts[parts.len() - 1];
        let artifact_type = (parts.len() > 3).then(|| parts[2]);
        let classifier = (parts.len() > 4).then(|| parts[3]);
        Self::new(parts[0], parts[1], version, classifier, artifact_type)
    }

    /// Parse `mvn:group/artifact/version[/type[/classifier]]`.
    ///
    /// The `mvn:` prefix is optional, repository markers (`!`) are rejected.
    pub fn from_mvn_url(url: &str) -> Result<Self> {
        if url.contains(':') && !url.starts_with("mvn:") {
            return Err(Error::InvalidArtifactId {
                value: url.to_string(),
                message: "invalid mvn url".to_string(),
            });
        }
        if url.contains('!') {
            return Err(Error::InvalidArtifactId {
                value: url.to_string(),
                message: "repository urls are not supported for maven artifacts".to_string(),
            });
        }
        let coordinates = url.strip_prefix("mvn:").unwrap_or(url);
        let parts: Vec<Option<&str>> = coordinates
            .split('/')
            .map(|p| if p.is_empty() { None } else { Some(p) })
            .collect();
        if parts.len() > 5 {
            return Err(Error::InvalidArtifactId {
                value: url.to_string(),
                message: "too many path segments".to_string(),
            });
        }
        let part = |idx: usize| parts.get(idx).copied().flatten();
        Self::new(
            part(0).unwrap_or_default(),
            part(1).unwrap_or_default(),
            part(2).unwrap_or_default(),
            part(4),
            part(3),
        )
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    pub fn artifact_type(&self) -> &str {
        &self.artifact_type
    }

    /// The version as an OSGi version.
    pub fn osgi_version(&self) -> OsgiVersion {
        // validated on construction
        OsgiVersion::from_maven(&self.version).unwrap_or_default()
    }

    /// A copy of this id with another version.
    pub fn with_version(&self, version: &str) -> Result<Self> {
        Self::new(
            &self.group_id,
            &self.artifact_id,
            version,
            self.classifier.as_deref(),
            Some(&self.artifact_type),
        )
    }

    /// Same artifact, ignoring the version.
    pub fn is_same(&self, other: &ArtifactId) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.artifact_type == other.artifact_type
            && self.classifier == other.classifier
    }

    fn write_suffix(&self, sb: &mut String, separator: char) {
        if self.classifier.is_some() || self.artifact_type != DEFAULT_TYPE {
            sb.push(separator);
            sb.push_str(&self.artifact_type);
            if let Some(classifier) = &self.classifier {
                sb.push(separator);
                sb.push_str(classifier);
            }
        }
    }

    pub fn to_mvn_id(&self) -> String {
        let mut sb = format!("{}:{}", self.group_id, self.artifact_id);
        self.write_suffix(&mut sb, ':');
        sb.push(':');
        sb.push_str(&self.version);
        sb
    }

    pub fn to_mvn_url(&self) -> String {
        let mut sb = format!(
            "mvn:{}/{}/{}",
            self.group_id, self.artifact_id, self.version
        );
        self.write_suffix(&mut sb, '/');
        sb
    }

    /// The repository relative path, without a leading slash.
    pub fn to_mvn_path(&self) -> String {
        let mut sb = format!(
            "{}/{}/{}/{}-{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version,
            self.artifact_id,
            self.version
        );
        if let Some(classifier) = &self.classifier {
            sb.push('-');
            sb.push_str(classifier);
        }
        sb.push('.');
        sb.push_str(&self.artifact_type);
        sb
    }
}

impl PartialEq for ArtifactId {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other) && self.version == other.version
    }
}

impl Eq for ArtifactId {}

impl Hash for ArtifactId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group_id.hash(state);
        self.artifact_id.hash(state);
        self.version.hash(state);
        self.classifier.hash(state);
        self.artifact_type.hash(state);
    }
}

impl Ord for ArtifactId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_mvn_url().cmp(&other.to_mvn_url()).then_with(|| {
            (
                &self.group_id,
                &self.artifact_id,
                &self.version,
                &self.artifact_type,
                &self.classifier,
            )
                .cmp(&(
                    &other.group_id,
                    &other.artifact_id,
                    &other.version,
                    &other.artifact_type,
                    &other.classifier,
                ))
        })
    }
}

impl PartialOrd for ArtifactId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_mvn_id())
    }
}

impl FromStr for ArtifactId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// An artifact id with free-form string metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    id: ArtifactId,
    metadata: BTreeMap<String, String>,
}

impl Artifact {
    pub fn new(id: ArtifactId) -> Self {
        Self {
            id,
            metadata: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &ArtifactId {
        &self.id
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.metadata
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    /// The start order, `0` when none is set.
    pub fn start_order(&self) -> Result<u32> {
        match self.metadata.get(START_ORDER_KEY) {
            None => Ok(0),
            Some(value) => value
                .trim()
                .parse::<u32>()
                .map_err(|_| Error::InvalidMetadata {
                    artifact: self.id.to_mvn_id(),
                    key: START_ORDER_KEY.to_string(),
                    value: value.clone(),
                }),
        }
    }

    pub fn set_start_order(&mut self, start_order: u32) {
        self.metadata
            .insert(START_ORDER_KEY.to_string(), start_order.to_string());
    }
}

/// An ordered list of artifacts.
///
/// Used for the bundles of a feature and for the content of artifact
/// extensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Artifacts {
    items: Vec<Artifact>,
}

/// Bundles are an artifact list grouped by start order.
pub type Bundles = Artifacts;

impl Artifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, artifact: Artifact) {
        self.items.push(artifact);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Artifact> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Artifact> {
        self.items.iter_mut()
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

    pub fn get_exact(&self, id: &ArtifactId) -> Option<&Artifact> {
        self.items.iter().find(|a| a.id() == id)
    }

    pub fn get_same(&self, id: &ArtifactId) -> Option<&Artifact> {
        self.items.iter().find(|a| a.id().is_same(id))
    }

    pub fn contains_exact(&self, id: &ArtifactId) -> bool {
        self.get_exact(id).is_some()
    }

    pub fn contains_same(&self, id: &ArtifactId) -> bool {
        self.get_same(id).is_some()
    }

    /// Remove the artifact with exactly this id. Returns whether one was
    /// removed.
    pub fn remove_exact(&mut self, id: &ArtifactId) -> bool {
        let before = self.items.len();
        self.items.retain(|a| a.id() != id);
        before != self.items.len()
    }

    /// Remove every artifact that is the same as `id`, whatever its version.
    pub fn remove_same(&mut self, id: &ArtifactId) -> bool {
        let before = self.items.len();
        self.items.retain(|a| !a.id().is_same(id));
        before != self.items.len()
    }

    /// Group the artifacts by start order.
    ///
    /// Groups are sorted ascending with start order `0` (framework default)
    /// last. Within a group the declaration order is kept.
    pub fn by_start_order(&self) -> Result<Vec<(u32, Vec<&Artifact>)>> {
        let mut groups: BTreeMap<(bool, u32), Vec<&Artifact>> = BTreeMap::new();
        for artifact in &self.items {
            let order = artifact.start_order()?;
            groups.entry((order == 0, order)).or_default().push(artifact);
        }
        Ok(groups
            .into_iter()
            .map(|((_, order), artifacts)| (order, artifacts))
            .collect())
    }
}

impl<'a> IntoIterator for &'a Artifacts {
    type Item = &'a Artifact;
    type IntoIter = std::slice::Iter<'a, Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Artifact> for Artifacts {
    fn from_iter<I: IntoIterator<Item = Artifact>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
