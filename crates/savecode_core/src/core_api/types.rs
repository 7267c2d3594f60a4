use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder stored in numeric fields that are missing or not a number.
pub const UNKNOWN_VALUE: &str = "unknown";

pub const MAX_ITEM_SLOTS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveCodeRecord {
    pub character_name: String,
    pub save_code: String,
    pub file_name: String,
    pub file_path: PathBuf,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default = "unknown_value")]
    pub level: String,
    #[serde(default = "unknown_value")]
    pub gold: String,
    #[serde(default = "unknown_value")]
    pub wood: String,
    #[serde(default = "unknown_value")]
    pub experience: String,
    #[serde(default = "unknown_value")]
    pub physical_power: String,
    #[serde(default = "unknown_value")]
    pub magical_power: String,
    #[serde(default = "unknown_value")]
    pub spiritual_power: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
}

fn unknown_value() -> String {
    UNKNOWN_VALUE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterGroup {
    pub name: String,
    /// Newest modification first.
    pub records: Vec<SaveCodeRecord>,
    pub count: usize,
    pub last_modified: DateTime<Utc>,
}

impl CharacterGroup {
    pub fn latest(&self) -> Option<&SaveCodeRecord> {
        self.records.first()
    }

    pub fn summary(&self) -> String {
        if self.count == 1 {
            "1 save".to_string()
        } else {
            format!("{} saves", self.count)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobGroup {
    pub job: String,
    pub characters: Vec<CharacterGroup>,
}

/// Why a persisted document could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    NotFound,
    Unreadable(String),
    Malformed(String),
}

impl FallbackReason {
    pub fn describe(&self) -> String {
        match self {
            Self::NotFound => "not found".to_string(),
            Self::Unreadable(detail) => format!("unreadable: {detail}"),
            Self::Malformed(detail) => format!("malformed: {detail}"),
        }
    }
}

/// Result of loading a persisted document that callers are allowed to
/// replace with a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome<T> {
    Loaded(T),
    Fallback(FallbackReason),
}

impl<T> LoadOutcome<T> {
    pub fn loaded(self) -> Option<T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Fallback(_) => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            Self::Loaded(_) => None,
            Self::Fallback(reason) => Some(reason),
        }
    }
}

impl<T: Default> LoadOutcome<T> {
    pub fn unwrap_or_default(self) -> T {
        self.loaded().unwrap_or_default()
    }
}
