//! Persisted analysis snapshot and its reconciliation against a live folder.
//!
//! The snapshot is one JSON document that is always rewritten whole. It is
//! trusted only when the folder, the file count and every file's last-write
//! time match what was recorded; content is never hashed, so a file rewritten
//! with an identical timestamp is treated as unchanged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core_api::{CoreError, CoreErrorCode, FallbackReason, LoadOutcome, SaveCodeRecord};
use crate::persist::{read_json, remove_file_if_exists, write_json_pretty};
use crate::record::modified_time;

pub const CACHE_VERSION: &str = "1.0";

fn cache_version() -> String {
    CACHE_VERSION.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub folder_path: PathBuf,
    #[serde(default)]
    pub last_analyzed: DateTime<Utc>,
    /// File name to last-write time at analysis.
    #[serde(default)]
    pub file_timestamps: BTreeMap<String, DateTime<Utc>>,
    #[serde(default)]
    pub records: Vec<SaveCodeRecord>,
    #[serde(default)]
    pub total_files: usize,
    #[serde(default = "cache_version")]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    Valid,
    Stale(String),
}

impl Freshness {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl CacheSnapshot {
    pub fn new(
        folder_path: impl Into<PathBuf>,
        file_timestamps: BTreeMap<String, DateTime<Utc>>,
        records: Vec<SaveCodeRecord>,
        last_analyzed: DateTime<Utc>,
    ) -> Self {
        Self {
            folder_path: folder_path.into(),
            last_analyzed,
            total_files: file_timestamps.len(),
            file_timestamps,
            records,
            version: cache_version(),
        }
    }

    pub fn load(path: &Path) -> LoadOutcome<Self> {
        match read_json::<Self>(path) {
            LoadOutcome::Loaded(snapshot) if snapshot.version != CACHE_VERSION => {
                LoadOutcome::Fallback(FallbackReason::Malformed(format!(
                    "unsupported cache version '{}', expected '{CACHE_VERSION}'",
                    snapshot.version
                )))
            }
            other => other,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        write_json_pretty(path, self, CoreErrorCode::Cache)
    }

    /// Deletes the cache file. Returns whether a file was removed.
    pub fn clear(path: &Path) -> Result<bool, CoreError> {
        remove_file_if_exists(path, CoreErrorCode::Cache)
    }

    pub fn check_freshness(&self, folder: &Path, current_files: &[PathBuf]) -> Freshness {
        if self.folder_path != folder {
            return Freshness::Stale(format!(
                "cached folder {} differs from {}",
                self.folder_path.display(),
                folder.display()
            ));
        }
        if self.total_files != current_files.len() {
            return Freshness::Stale(format!(
                "file count changed from {} to {}",
                self.total_files,
                current_files.len()
            ));
        }

        for path in current_files {
            let Some(file_name) = path.file_name() else {
                return Freshness::Stale(format!("{} has no file name", path.display()));
            };
            let file_name = file_name.to_string_lossy();
            let Some(stored) = self.file_timestamps.get(file_name.as_ref()) else {
                return Freshness::Stale(format!("{file_name} is new"));
            };
            match modified_time(path) {
                Ok(live) if live == *stored => {}
                Ok(_) => return Freshness::Stale(format!("{file_name} was modified")),
                Err(e) => return Freshness::Stale(e.to_string()),
            }
        }

        debug!(folder = %folder.display(), files = current_files.len(), "cache is fresh");
        Freshness::Valid
    }
}

pub fn is_cache_valid(snapshot: &CacheSnapshot, folder: &Path, current_files: &[PathBuf]) -> bool {
    snapshot.check_freshness(folder, current_files).is_valid()
}
