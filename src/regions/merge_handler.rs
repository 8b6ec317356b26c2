//! Merging of the `api-regions` extension.

use super::{parse_regions, regions_to_json, API_REGIONS_NAME};
use crate::error::{Error, Result};
use crate::merge::ExtensionHandler;
use crate::model::{Extension, Feature};

/// Merges `api-regions` so that every region remembers the feature that
/// declared it.
///
/// Target entries are kept as they are. Incoming entries without an
/// `org-feature` are tagged with the source feature id and receive the
/// exports of the regions the source declared before them. Entries that
/// are already tagged come from an earlier merge and are copied unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApiRegionsMergeHandler;

impl ExtensionHandler for ApiRegionsMergeHandler {
    fn can_merge(&self, name: &str) -> bool {
        name == API_REGIONS_NAME
    }

    fn merge(&self, target: &mut Feature, source: &Feature, name: &str) -> Result<()> {
        let Some(incoming) = source.extensions.get(name) else {
            return Ok(());
        };
        let source_json = incoming.as_json().ok_or_else(|| Error::RegionData {
            message: format!("{} must be a JSON extension", name),
        })?;

        let mut fresh = Vec::new();
        let mut tagged = Vec::new();
        for mut entry in parse_regions(source_json)? {
            let own = entry.org_feature.is_none();
            if own {
                entry.org_feature = Some(source.id.to_mvn_id());
            }
            fresh.push(own);
            tagged.push(entry);
        }
        super::inherit(
            tagged
                .iter_mut()
                .zip(&fresh)
                .filter(|(_, own)| **own)
                .map(|(entry, _)| entry),
        );

        match target.extensions.get_mut(name) {
            Some(existing) => {
                let json = existing.json_mut().ok_or_else(|| Error::RegionData {
                    message: format!("{} must be a JSON extension", name),
                })?;
                let mut entries = parse_regions(json)?;
                entries.extend(tagged);
                *json = regions_to_json(&entries)?;
            }
            None => {
                target.extensions.add(
                    Extension::json(name, regions_to_json(&tagged)?)
                        .required(incoming.is_required()),
                );
            }
        }
        Ok(())
    }
}
