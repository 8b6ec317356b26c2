//! Derivation of region data from assembled features.
//!
//! Both handlers hook into merge post-processing of the `api-regions`
//! extension and persist their results as property files. Files that
//! already exist are loaded first and extended, so several features can
//! contribute to the same data set.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::properties::{split_list, Properties};
use super::{
    apply_inheritance_by_feature, parse_regions, RegionDataFiles, API_REGIONS_NAME,
    ORG_FEATURE_KEY,
};
use crate::artifact::ArtifactManager;
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::merge::ExtensionHandler;
use crate::model::{ArtifactId, Feature};

/// Add `item` to a comma-joined list unless it is already there.
fn append_unique(properties: &mut Properties, key: &str, item: &str) {
    let current = properties.get(key).unwrap_or_default().to_string();
    if split_list(&current).any(|existing| existing == item) {
        return;
    }
    let value = if current.is_empty() {
        item.to_string()
    } else {
        format!("{},{}", current, item)
    };
    properties.insert(key, value);
}

/// Union `items` into a sorted comma-joined set.
fn union_into<'a>(properties: &mut Properties, key: &str, items: impl IntoIterator<Item = &'a str>) {
    let mut set: BTreeSet<String> = split_list(properties.get(key).unwrap_or_default())
        .map(str::to_string)
        .collect();
    set.extend(items.into_iter().map(str::to_string));
    let value = set.into_iter().collect::<Vec<_>>().join(",");
    properties.insert(key, value);
}

fn poisoned(context: &str) -> Error {
    Error::LockPoisoned {
        context: context.to_string(),
    }
}

#[derive(Debug, Default)]
struct RegionProperties {
    bundles: Properties,
    features: Properties,
    regions: Properties,
}

/// Writes the bundle to feature, feature to region and region to package
/// files.
///
/// For every bundle, the owning feature is its `org-feature` metadata, or
/// the assembled feature itself. For every region entry, the owning
/// feature is the entry's `org-feature`, or again the assembled feature.
/// Region exports are expanded by inheritance before they are recorded.
#[derive(Debug)]
pub struct RegionMapHandler {
    files: RegionDataFiles,
    state: Mutex<RegionProperties>,
}

impl RegionMapHandler {
    /// Create a handler writing to `files`, starting from their current
    /// content.
    pub fn new(files: RegionDataFiles) -> Result<Self> {
        let state = RegionProperties {
            bundles: Properties::load(&files.bundles)?,
            features: Properties::load(&files.features)?,
            regions: Properties::load(&files.regions)?,
        };
        Ok(Self {
            files,
            state: Mutex::new(state),
        })
    }

    pub fn files(&self) -> &RegionDataFiles {
        &self.files
    }
}

impl ExtensionHandler for RegionMapHandler {
    fn post_process(&self, feature: &mut Feature, name: &str) -> Result<()> {
        if name != API_REGIONS_NAME {
            return Ok(());
        }
        let Some(value) = feature.extensions.get(name).and_then(|e| e.as_json()) else {
            return Ok(());
        };
        let feature_id = feature.id.to_mvn_id();
        let mut entries = parse_regions(value)?;
        apply_inheritance_by_feature(&mut entries, &feature_id);

        let mut state = self.state.lock().map_err(|_| poisoned("region map state"))?;
        for bundle in &feature.bundles {
            let owner = bundle
                .metadata()
                .get(ORG_FEATURE_KEY)
                .cloned()
                .unwrap_or_else(|| feature_id.clone());
            append_unique(&mut state.bundles, &bundle.id().to_mvn_id(), &owner);
        }
        for entry in &entries {
            let owner = entry.org_feature.as_deref().unwrap_or(&feature_id);
            union_into(&mut state.features, owner, [entry.name.as_str()]);
            union_into(
                &mut state.regions,
                &entry.name,
                entry.exports.iter().map(String::as_str),
            );
        }

        log::debug!(
            "Derived regions of {}: {} bundles, {} regions",
            feature_id,
            feature.bundles.len(),
            entries.len()
        );
        state.bundles.store(&self.files.bundles)?;
        state.features.store(&self.files.features)?;
        state.regions.store(&self.files.regions)?;
        Ok(())
    }
}

/// Locates the local file of an artifact.
pub trait ArtifactSource {
    fn artifact_file(&self, id: &ArtifactId) -> Result<PathBuf>;
}

impl ArtifactSource for ArtifactManager {
    fn artifact_file(&self, id: &ArtifactId) -> Result<PathBuf> {
        let handler = self.get_artifact_handler(&id.to_mvn_url())?;
        Ok(handler.file().to_path_buf())
    }
}

impl<T: ArtifactSource + ?Sized> ArtifactSource for Arc<T> {
    fn artifact_file(&self, id: &ArtifactId) -> Result<PathBuf> {
        (**self).artifact_file(id)
    }
}

/// Writes the artifact id to `symbolic-name~version` file.
///
/// Every bundle of the feature is resolved through the artifact source and
/// its manifest read. Artifacts without a symbolic name are not bundles
/// and are skipped.
#[derive(Debug)]
pub struct BundleSymbolicNameHandler<S> {
    file: PathBuf,
    source: S,
    state: Mutex<Properties>,
}

impl<S: ArtifactSource> BundleSymbolicNameHandler<S> {
    pub fn new(file: &Path, source: S) -> Result<Self> {
        Ok(Self {
            file: file.to_path_buf(),
            source,
            state: Mutex::new(Properties::load(file)?),
        })
    }
}

impl<S: ArtifactSource> ExtensionHandler for BundleSymbolicNameHandler<S> {
    fn post_process(&self, feature: &mut Feature, name: &str) -> Result<()> {
        if name != API_REGIONS_NAME {
            return Ok(());
        }
        let mut state = self
            .state
            .lock()
            .map_err(|_| poisoned("symbolic name state"))?;
        for bundle in &feature.bundles {
            let id = bundle.id().to_mvn_id();
            if state.get(&id).is_some() {
                continue;
            }
            let file = self.source.artifact_file(bundle.id())?;
            let manifest = Manifest::from_jar(&file)?;
            let Some(bsn) = manifest.symbolic_name() else {
                log::warn!("{} has no {} header, skipping", id, crate::manifest::BUNDLE_SYMBOLIC_NAME);
                continue;
            };
            let version = manifest.bundle_version()?;
            state.insert(id, format!("{}~{}", bsn, version));
        }
        state.store(&self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::{post_process, ExtensionHandlers};
    use crate::model::{Artifact, Extension};
    use crate::regions::RegionMaps;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn id(s: &str) -> ArtifactId {
        ArtifactId::parse(s).unwrap()
    }

    fn regions_feature() -> Feature {
        let mut feature = Feature::new(id("g:app:1"));
        feature.bundles.add(Artifact::new(id("g:b1:1")));
        feature
            .bundles
            .add(Artifact::new(id("g:b2:1")).with_metadata(ORG_FEATURE_KEY, "g:lib:1"));
        feature.extensions.add(Extension::json(
            API_REGIONS_NAME,
            json!([
                {"name": "global", "exports": ["a"]},
                {"name": "internal", "exports": ["b"]},
                {"name": "global", "exports": ["c"], "org-feature": "g:lib:1"}
            ]),
        ));
        feature
    }

    #[test]
    fn test_union_keeps_existing_items_sorted() {
        let mut properties = Properties::new();
        properties.insert("g:f:1", "internal,global");
        let added = String::from("deprecated");
        union_into(&mut properties, "g:f:1", [added.as_str(), "global"]);
        assert_eq!(properties.get("g:f:1"), Some("deprecated,global,internal"));

        union_into(&mut properties, "g:new:1", ["b", "a"]);
        assert_eq!(properties.get("g:new:1"), Some("a,b"));
    }

    #[test]
    fn test_append_keeps_insertion_order() {
        let mut properties = Properties::new();
        append_unique(&mut properties, "g:b:1", "g:f2:1");
        append_unique(&mut properties, "g:b:1", "g:f1:1");
        append_unique(&mut properties, "g:b:1", "g:f2:1");
        assert_eq!(properties.get("g:b:1"), Some("g:f2:1,g:f1:1"));
    }

    mod region_map_tests {
        use super::*;

        #[test]
        fn test_writes_three_files() {
            let temp = TempDir::new().unwrap();
            let files = RegionDataFiles::in_directory(temp.path());
            let handlers = ExtensionHandlers::new().with(RegionMapHandler::new(files.clone()).unwrap());
            let mut feature = regions_feature();
            post_process(&mut feature, &handlers).unwrap();

            let maps = RegionMaps::load(&files).unwrap();
            assert!(maps.bundle_features["g:b1:1"].contains("g:app:1"));
            assert!(maps.bundle_features["g:b2:1"].contains("g:lib:1"));
            assert_eq!(maps.feature_regions["g:app:1"].len(), 2);
            assert!(maps.feature_regions["g:lib:1"].contains("global"));
            let global: Vec<_> = maps.region_packages["global"].iter().cloned().collect();
            assert_eq!(global, vec!["a", "c"]);
            let internal: Vec<_> = maps.region_packages["internal"].iter().cloned().collect();
            assert_eq!(internal, vec!["a", "b"]);
        }

        #[test]
        fn test_extends_existing_files() {
            let temp = TempDir::new().unwrap();
            let files = RegionDataFiles::in_directory(temp.path());
            let mut existing = Properties::new();
            existing.insert("g:b1:1", "g:other:1");
            existing.store(&files.bundles).unwrap();

            let handler = RegionMapHandler::new(files.clone()).unwrap();
            let mut feature = regions_feature();
            handler.post_process(&mut feature, API_REGIONS_NAME).unwrap();
            handler.post_process(&mut feature, API_REGIONS_NAME).unwrap();

            let bundles = Properties::load(&files.bundles).unwrap();
            assert_eq!(bundles.get("g:b1:1"), Some("g:other:1,g:app:1"));
        }

        #[test]
        fn test_ignores_other_extensions() {
            let temp = TempDir::new().unwrap();
            let files = RegionDataFiles::in_directory(temp.path());
            let handler = RegionMapHandler::new(files.clone()).unwrap();
            let mut feature = regions_feature();
            handler.post_process(&mut feature, "content-packages").unwrap();
            assert!(!files.bundles.exists());
        }
    }

    mod symbolic_name_tests {
        use super::*;

        struct Jars(BTreeMap<String, PathBuf>);

        impl ArtifactSource for Jars {
            fn artifact_file(&self, id: &ArtifactId) -> Result<PathBuf> {
                self.0
                    .get(&id.to_mvn_id())
                    .cloned()
                    .ok_or_else(|| Error::ArtifactNotFound {
                        url: id.to_mvn_url(),
                        location: None,
                    })
            }
        }

        fn jar(dir: &Path, name: &str, manifest: &str) -> PathBuf {
            let path = dir.join(name);
            let mut writer = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
            writer
                .start_file(crate::manifest::MANIFEST_PATH, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(manifest.as_bytes()).unwrap();
            writer.finish().unwrap();
            path
        }

        #[test]
        fn test_writes_symbolic_names() {
            let temp = TempDir::new().unwrap();
            let jars = Jars(BTreeMap::from([
                (
                    "g:b1:1".to_string(),
                    jar(temp.path(), "b1.jar", "Bundle-SymbolicName: org.b1\nBundle-Version: 1.0.0\n"),
                ),
                (
                    "g:b2:1".to_string(),
                    jar(temp.path(), "b2.jar", "Manifest-Version: 1.0\n"),
                ),
            ]));
            let file = temp.path().join("out/idbsnver.properties");
            let handler = BundleSymbolicNameHandler::new(&file, jars).unwrap();
            let mut feature = regions_feature();
            handler.post_process(&mut feature, API_REGIONS_NAME).unwrap();

            let written = Properties::load(&file).unwrap();
            assert_eq!(written.get("g:b1:1"), Some("org.b1~1.0.0"));
            assert_eq!(written.get("g:b2:1"), None);
        }

        #[test]
        fn test_missing_artifact_fails() {
            let temp = TempDir::new().unwrap();
            let file = temp.path().join("idbsnver.properties");
            let handler = BundleSymbolicNameHandler::new(&file, Jars(BTreeMap::new())).unwrap();
            let mut feature = regions_feature();
            assert!(handler.post_process(&mut feature, API_REGIONS_NAME).is_err());
        }
    }
}
