//! # OSGi Versions
//!
//! Bundles are compared by OSGi version, not by their Maven version string.
//! An OSGi version has exactly three numeric segments and an optional
//! qualifier, and orders numerically first and lexicographically on the
//! qualifier last.
//!
//! Maven versions are far looser (`1.0-SNAPSHOT`, `2.4`, `1_2`,
//! `1.2.3.4.5`), so [`OsgiVersion::from_maven`] normalises them:
//!
//! - a `-` in the last of fewer than four segments starts the qualifier
//!   (`1.0-SNAPSHOT` becomes `1.0.0.SNAPSHOT`);
//! - otherwise `_` separates segments (`1_2` becomes `1.2.0`);
//! - with four or more segments, a `-` suffix on the micro segment is moved
//!   in front of the qualifier;
//! - segments beyond the fourth are folded into the qualifier;
//! - qualifier characters outside `[A-Za-z0-9_-]` become `_`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// An OSGi version: `major.minor.micro[.qualifier]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct OsgiVersion {
    major: u32,
    minor: u32,
    micro: u32,
    qualifier: String,
}

impl OsgiVersion {
    pub fn new(major: u32, minor: u32, micro: u32, qualifier: impl Into<String>) -> Self {
        Self {
            major,
            minor,
            micro,
            qualifier: qualifier.into(),
        }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn micro(&self) -> u32 {
        self.micro
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// Parse a strict OSGi version string such as `1.2.3` or `1.2.3.SNAPSHOT`.
    ///
    /// Missing minor and micro segments default to zero.
    pub fn parse(version: &str) -> Result<Self> {
        let trimmed = version.trim();
        if trimmed.is_empty() {
            return Err(invalid(version));
        }
        let mut parts = trimmed.splitn(4, '.');
        let major = parse_segment(parts.next(), version)?;
        let minor = parse_segment(parts.next(), version)?;
        let micro = parse_segment(parts.next(), version)?;
        let qualifier = parts.next().unwrap_or_default();
        if !qualifier.chars().all(is_qualifier_char) {
            return Err(invalid(version));
        }
        Ok(Self::new(major, minor, micro, qualifier))
    }

    /// Convert a Maven version string into an OSGi version.
    pub fn from_maven(version: &str) -> Result<Self> {
        let mut parts: Vec<String> = version.split('.').map(str::to_string).collect();

        if parts.len() < 4 {
            let last = parts.len() - 1;
            if let Some(pos) = parts[last].find('-') {
                let qualifier = parts[last][pos + 1..].to_string();
                parts[last].truncate(pos);
                parts.resize(3, "0".to_string());
                parts.push(qualifier);
            } else {
                // NUMBER_NUMBER style versions
                parts = parts
                    .iter()
                    .flat_map(|part| split_underscores(part))
                    .collect();
            }
        }

        if parts.len() >= 4 {
            if let Some(pos) = parts[2].find('-') {
                parts[3] = format!("{}.{}", &parts[2][pos + 1..], parts[3]);
                parts[2].truncate(pos);
            }
        }

        if parts.len() > 4 {
            let tail = parts.split_off(4);
            parts[3] = std::iter::once(parts[3].clone())
                .chain(tail)
                .collect::<Vec<_>>()
                .join(".");
        }

        let qualifier = parts
            .get(3)
            .map(|q| {
                q.chars()
                    .map(|c| if is_qualifier_char(c) { c } else { '_' })
                    .collect::<String>()
            })
            .unwrap_or_default();

        Ok(Self::new(
            parse_number(&parts[0], version)?,
            parts
                .get(1)
                .map(|p| parse_number(p, version))
                .transpose()?
                .unwrap_or(0),
            parts
                .get(2)
                .map(|p| parse_number(p, version))
                .transpose()?
                .unwrap_or(0),
            qualifier,
        ))
    }
}

/// Split a segment on `_`, keeping a trailing underscore attached.
fn split_underscores(part: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut rest = part;
    while let Some(pos) = rest.find('_') {
        if pos + 1 >= rest.len() {
            break;
        }
        result.push(rest[..pos].to_string());
        rest = &rest[pos + 1..];
    }
    result.push(rest.to_string());
    result
}

fn is_qualifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn parse_segment(segment: Option<&str>, version: &str) -> Result<u32> {
    match segment {
        None => Ok(0),
        Some(s) => parse_number(s, version),
    }
}

fn parse_number(segment: &str, version: &str) -> Result<u32> {
    segment.parse::<u32>().map_err(|_| invalid(version))
}

fn invalid(version: &str) -> Error {
    Error::InvalidVersion {
        version: version.to_string(),
    }
}

impl Ord for OsgiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.micro.cmp(&other.micro))
            .then_with(|| self.qualifier.cmp(&other.qualifier))
    }
}

impl PartialOrd for OsgiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for OsgiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}

impl FromStr for OsgiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod maven_conversion_tests {
        use super::*;

        fn convert(version: &str) -> String {
            OsgiVersion::from_maven(version).unwrap().to_string()
        }

        #[test]
        fn test_plain_versions() {
            assert_eq!(convert("1"), "1.0.0");
            assert_eq!(convert("1.2"), "1.2.0");
            assert_eq!(convert("1.2.3"), "1.2.3");
        }

        #[test]
        fn test_snapshot_qualifier() {
            assert_eq!(convert("1.0-SNAPSHOT"), "1.0.0.SNAPSHOT");
            assert_eq!(convert("1-SNAPSHOT"), "1.0.0.SNAPSHOT");
            assert_eq!(convert("1.2.3-beta-1"), "1.2.3.beta-1");
        }

        #[test]
        fn test_underscore_segments() {
            assert_eq!(convert("1_2"), "1.2.0");
            assert_eq!(convert("1_2_3"), "1.2.3");
        }

        #[test]
        fn test_four_segments() {
            assert_eq!(convert("1.2.3.4"), "1.2.3.4");
            assert_eq!(convert("1.2.3-RC1.4"), "1.2.3.RC1_4");
        }

        #[test]
        fn test_extra_segments_fold_into_qualifier() {
            // '.' is not a qualifier character
            assert_eq!(convert("1.2.3.a.b"), "1.2.3.a_b");
        }

        #[test]
        fn test_qualifier_is_sanitised() {
            assert_eq!(convert("1.0.0.a+b"), "1.0.0.a_b");
        }

        #[test]
        fn test_non_numeric_version_is_rejected() {
            assert!(OsgiVersion::from_maven("abc").is_err());
            assert!(OsgiVersion::from_maven("1.x").is_err());
            assert!(OsgiVersion::from_maven("").is_err());
        }
    }

    mod ordering_tests {
        use super::*;

        #[test]
        fn test_numeric_ordering() {
            let v1 = OsgiVersion::parse("1.10.0").unwrap();
            let v2 = OsgiVersion::parse("1.9.0").unwrap();
            assert!(v1 > v2);
        }

        #[test]
        fn test_qualifier_ordering() {
            let release = OsgiVersion::parse("1.0.0").unwrap();
            let snapshot = OsgiVersion::parse("1.0.0.SNAPSHOT").unwrap();
            assert!(snapshot > release);
            assert_eq!(release, OsgiVersion::new(1, 0, 0, ""));
        }

        #[test]
        fn test_parse_and_display() {
            let v: OsgiVersion = "2.1".parse().unwrap();
            assert_eq!(v.to_string(), "2.1.0");
            assert_eq!(v.major(), 2);
            assert_eq!(v.minor(), 1);
            assert_eq!(v.micro(), 0);
            assert!(OsgiVersion::parse("1.0.0.bad!").is_err());
        }
    }
}
