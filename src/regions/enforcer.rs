//! Region enforcement entry point.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, RwLock};

use super::properties::split_list;
use super::{RegionDataFiles, RegionMaps, ResolverHook, ENABLED_REGIONS_KEY};
use crate::error::Result;

/// Holds the current region data and hands out resolver hooks.
///
/// Each hook works on the snapshot that was current when it was created.
/// [`RegionEnforcer::reload`] swaps in a new snapshot without disturbing
/// hooks already in use.
#[derive(Debug)]
pub struct RegionEnforcer {
    files: RegionDataFiles,
    enabled_regions: BTreeSet<String>,
    maps: RwLock<Arc<RegionMaps>>,
}

impl RegionEnforcer {
    pub fn new(files: RegionDataFiles, enabled_regions: impl IntoIterator<Item = String>) -> Result<Self> {
        let maps = RegionMaps::load(&files)?;
        let enabled_regions: BTreeSet<String> = enabled_regions.into_iter().collect();
        log::info!(
            "Region enforcement loaded {} bundles, {} regions, enabled regions: {:?}",
            maps.bsn_version.len(),
            maps.region_packages.len(),
            enabled_regions
        );
        Ok(Self {
            files,
            enabled_regions,
            maps: RwLock::new(Arc::new(maps)),
        })
    }

    /// Build from `whitelisting.*` configuration keys, see
    /// [`RegionDataFiles::from_config`]. Enabled regions are read from
    /// `whitelisting.regions`.
    pub fn from_config(config: &BTreeMap<String, String>, directory: Option<&Path>) -> Result<Self> {
        let files = RegionDataFiles::from_config(config, directory)?;
        let enabled = config
            .get(ENABLED_REGIONS_KEY)
            .map(|value| split_list(value).map(str::to_string).collect::<Vec<_>>())
            .unwrap_or_default();
        Self::new(files, enabled)
    }

    /// Re-read the region files and publish them as the new snapshot.
    pub fn reload(&self) -> Result<()> {
        let maps = Arc::new(RegionMaps::load(&self.files)?);
        let mut current = self.maps.write().unwrap_or_else(|e| e.into_inner());
        *current = maps;
        log::debug!("Reloaded region data from {}", self.files.regions.display());
        Ok(())
    }

    /// The region data currently in effect.
    pub fn snapshot(&self) -> Arc<RegionMaps> {
        self.maps.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// A hook over the current snapshot, or `None` when no region is
    /// enabled.
    pub fn begin(&self) -> Option<ResolverHook> {
        if self.enabled_regions.is_empty() {
            return None;
        }
        Some(ResolverHook::new(self.snapshot()))
    }

    pub fn enabled_regions(&self) -> &BTreeSet<String> {
        &self.enabled_regions
    }

    pub fn files(&self) -> &RegionDataFiles {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::Properties;
    use tempfile::TempDir;

    fn write_regions(files: &RegionDataFiles, packages: &str) {
        let mut regions = Properties::new();
        regions.insert("global", packages);
        regions.store(&files.regions).unwrap();
    }

    #[test]
    fn test_no_enabled_regions_means_no_hook() {
        let temp = TempDir::new().unwrap();
        let enforcer = RegionEnforcer::new(RegionDataFiles::in_directory(temp.path()), Vec::new()).unwrap();
        assert!(enforcer.begin().is_none());
    }

    #[test]
    fn test_missing_files_load_empty() {
        let temp = TempDir::new().unwrap();
        let enforcer =
            RegionEnforcer::new(RegionDataFiles::in_directory(temp.path()), vec!["global".to_string()]).unwrap();
        let hook = enforcer.begin().unwrap();
        assert_eq!(hook.maps(), &RegionMaps::default());
    }

    #[test]
    fn test_reload_keeps_old_snapshots() {
        let temp = TempDir::new().unwrap();
        let files = RegionDataFiles::in_directory(temp.path());
        write_regions(&files, "a");
        let enforcer = RegionEnforcer::new(files.clone(), vec!["global".to_string()]).unwrap();
        let before = enforcer.begin().unwrap();

        write_regions(&files, "a,b");
        enforcer.reload().unwrap();

        assert_eq!(before.maps().region_packages["global"].len(), 1);
        assert_eq!(enforcer.snapshot().region_packages["global"].len(), 2);
    }

    #[test]
    fn test_from_config() {
        let temp = TempDir::new().unwrap();
        let config = BTreeMap::from([(ENABLED_REGIONS_KEY.to_string(), "global, internal".to_string())]);
        let enforcer = RegionEnforcer::from_config(&config, Some(temp.path())).unwrap();
        assert_eq!(enforcer.enabled_regions().len(), 2);
        assert_eq!(enforcer.files().regions, temp.path().join("regions.properties"));
    }

    #[test]
    fn test_invalid_data_is_reported() {
        let temp = TempDir::new().unwrap();
        let files = RegionDataFiles::in_directory(temp.path());
        let mut idbsnver = Properties::new();
        idbsnver.insert("g:a:1", "broken");
        idbsnver.store(&files.idbsnver).unwrap();
        assert!(RegionEnforcer::new(files, Vec::new()).is_err());
    }
}
