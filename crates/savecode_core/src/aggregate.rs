use std::collections::BTreeMap;

use crate::core_api::{CharacterGroup, JobGroup, SaveCodeRecord};
use crate::job::classify;
use crate::name_map::NameMapping;

/// Groups records by character name, sorted by name, each group newest
/// first. Records whose timestamps tie keep their input order.
pub fn group_by_character(
    records: &[SaveCodeRecord],
    mapping: Option<&NameMapping>,
) -> Vec<CharacterGroup> {
    let mut by_name: BTreeMap<String, Vec<SaveCodeRecord>> = BTreeMap::new();
    for record in records {
        let name = match mapping {
            Some(mapping) => mapping.display_name(&record.character_name),
            None => record.character_name.as_str(),
        };
        let mut record = record.clone();
        if record.character_name != name {
            record.character_name = name.to_string();
        }
        by_name.entry(record.character_name.clone()).or_default().push(record);
    }

    by_name
        .into_iter()
        .filter_map(|(name, mut records)| {
            records.sort_by(|a, b| b.modified.cmp(&a.modified));
            let last_modified = records.first()?.modified;
            Some(CharacterGroup {
                name,
                count: records.len(),
                last_modified,
                records,
            })
        })
        .collect()
}

/// Buckets character groups by job label, labels ascending.
pub fn group_by_job(groups: &[CharacterGroup]) -> Vec<JobGroup> {
    let mut by_job: BTreeMap<String, Vec<CharacterGroup>> = BTreeMap::new();
    for group in groups {
        by_job
            .entry(classify(group).as_str().to_string())
            .or_default()
            .push(group.clone());
    }
    by_job
        .into_iter()
        .map(|(job, characters)| JobGroup { job, characters })
        .collect()
}
