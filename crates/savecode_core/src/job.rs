use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core_api::{CharacterGroup, SaveCodeRecord};
use crate::text::parse_integer;

/// Coarse character class. Inference from stats is approximate: the largest
/// stat wins, nothing more.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Job {
    Physical,
    Magical,
    Spiritual,
    Unclassified,
    /// Job tag written into the save file itself.
    Tagged(String),
}

impl Job {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Physical => "physical",
            Self::Magical => "magical",
            Self::Spiritual => "spiritual",
            Self::Unclassified => "unclassified",
            Self::Tagged(tag) => tag,
        }
    }

    /// Picks the weakly largest stat; ties go physical, then magical.
    pub fn from_stats(physical: Option<i64>, magical: Option<i64>, spiritual: Option<i64>) -> Self {
        if physical.is_none() && magical.is_none() && spiritual.is_none() {
            return Self::Unclassified;
        }
        let physical = physical.unwrap_or(0);
        let magical = magical.unwrap_or(0);
        let spiritual = spiritual.unwrap_or(0);

        if physical >= magical && physical >= spiritual {
            Self::Physical
        } else if magical >= spiritual {
            Self::Magical
        } else {
            Self::Spiritual
        }
    }

    pub fn infer_from_record(record: &SaveCodeRecord) -> Self {
        Self::from_stats(
            parse_integer(&record.physical_power),
            parse_integer(&record.magical_power),
            parse_integer(&record.spiritual_power),
        )
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify(group: &CharacterGroup) -> Job {
    let tagged = group
        .records
        .iter()
        .filter_map(|record| record.job.as_deref())
        .find(|tag| !tag.trim().is_empty());
    if let Some(tag) = tagged {
        return Job::Tagged(tag.to_string());
    }

    match group.latest() {
        Some(latest) => Job::infer_from_record(latest),
        None => Job::Unclassified,
    }
}
