//! Maven repository metadata.
//!
//! Only the part needed for SNAPSHOT resolution is read: the
//! `metadata/versioning/snapshot` element of a `maven-metadata.xml`.

use xot::{NameId, Node, Xot};

use crate::error::{Error, Result};

const METADATA_NAMESPACES: &[&str] = &[
    "http://maven.apache.org/METADATA/1.0.0",
    "http://maven.apache.org/METADATA/1.1.0",
];

/// Resolve element names with or without a Maven metadata namespace.
struct Names {
    names: Vec<(NameId, &'static str)>,
}

impl Names {
    fn new(xot: &mut Xot, locals: &[&'static str]) -> Self {
        let mut names = Vec::new();
        for local in locals {
            names.push((xot.add_name(local), *local));
            for namespace in METADATA_NAMESPACES {
                let ns = xot.add_namespace(namespace);
                names.push((xot.add_name_ns(local, ns), *local));
            }
        }
        Self { names }
    }

    fn is(&self, xot: &Xot, node: Node, local: &str) -> bool {
        xot.element(node).is_some_and(|element| {
            self.names
                .iter()
                .any(|(id, name)| *name == local && *id == element.name())
        })
    }
}

fn child(xot: &Xot, names: &Names, parent: Node, local: &str) -> Option<Node> {
    xot.children(parent).find(|node| names.is(xot, *node, local))
}

/// The `timestamp-buildNumber` of the latest SNAPSHOT build.
///
/// Returns `Ok(None)` when the document carries no snapshot information.
///
/// # Errors
///
/// Returns `Error::Metadata` if the document is not well-formed XML.
pub fn latest_snapshot(url: &str, xml: &str) -> Result<Option<String>> {
    let mut xot = Xot::new();
    let names = Names::new(
        &mut xot,
        &["metadata", "versioning", "snapshot", "timestamp", "buildNumber"],
    );
    let document = xot.parse(xml).map_err(|e| Error::Metadata {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    let root = xot.document_element(document).map_err(|e| Error::Metadata {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    if !names.is(&xot, root, "metadata") {
        return Ok(None);
    }

    let Some(snapshot) = child(&xot, &names, root, "versioning")
        .and_then(|versioning| child(&xot, &names, versioning, "snapshot"))
    else {
        return Ok(None);
    };
    let text = |local: &str| {
        child(&xot, &names, snapshot, local)
            .and_then(|node| xot.text_content_str(node))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    Ok(match (text("timestamp"), text("buildNumber")) {
        (Some(timestamp), Some(build_number)) => Some(format!("{}-{}", timestamp, build_number)),
        _ => None,
    })
}
