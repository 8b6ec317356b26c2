//! Jar manifest reading.
//!
//! Only the main section of `META-INF/MANIFEST.MF` is read, which is where
//! the OSGi bundle headers live.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::OsgiVersion;

pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";
pub const BUNDLE_SYMBOLIC_NAME: &str = "Bundle-SymbolicName";
pub const BUNDLE_VERSION: &str = "Bundle-Version";

/// Main attributes of a jar manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    attributes: BTreeMap<String, String>,
}

impl Manifest {
    /// Parse manifest text. Lines starting with a single space continue
    /// the previous header.
    pub fn parse(content: &str) -> Self {
        let mut attributes = BTreeMap::new();
        let mut current: Option<(String, String)> = None;

        for line in content.lines() {
            if line.is_empty() {
                break;
            }
            if let Some(continuation) = line.strip_prefix(' ') {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(continuation);
                }
                continue;
            }
            if let Some((name, value)) = current.take() {
                attributes.insert(name, value);
            }
            if let Some((name, value)) = line.split_once(':') {
                let value = value.strip_prefix(' ').unwrap_or(value);
                current = Some((name.trim().to_string(), value.to_string()));
            }
        }
        if let Some((name, value)) = current {
            attributes.insert(name, value);
        }
        Self { attributes }
    }

    /// Read the manifest of a jar file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Manifest` if the jar has no manifest, or a wrapped
    /// I/O or archive error.
    pub fn from_jar(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(Error::Io)?;
        let mut archive = zip::ZipArchive::new(file)?;
        let mut entry = archive.by_name(MANIFEST_PATH).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => Error::Manifest {
                path: path.display().to_string(),
                message: "no manifest found".to_string(),
            },
            other => Error::Zip(other),
        })?;
        let mut content = String::new();
        entry.read_to_string(&mut content).map_err(Error::Io)?;
        Ok(Self::parse(&content))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The symbolic name without its directives.
    pub fn symbolic_name(&self) -> Option<&str> {
        self.get(BUNDLE_SYMBOLIC_NAME)
            .map(|bsn| bsn.split(';').next().unwrap_or(bsn).trim())
            .filter(|bsn| !bsn.is_empty())
    }

    /// The bundle version, `0.0.0` when absent.
    pub fn bundle_version(&self) -> Result<OsgiVersion> {
        match self.get(BUNDLE_VERSION) {
            Some(version) => OsgiVersion::parse(version.trim()),
            None => Ok(OsgiVersion::default()),
        }
    }
}
