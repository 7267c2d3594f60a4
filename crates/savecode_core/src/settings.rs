use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode, LoadOutcome};
use crate::persist::{read_json, write_json_pretty};

pub const SETTINGS_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    LastModified,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSettings {
    pub key: SortKey,
    pub descending: bool,
}

/// Flat sort tag written by older settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegacySortOption {
    NameAsc,
    NameDesc,
    DateDesc,
    DateAsc,
    CountDesc,
}

pub fn migrate_legacy_sort(legacy: LegacySortOption) -> SortSettings {
    let (key, descending) = match legacy {
        LegacySortOption::NameAsc => (SortKey::Name, false),
        LegacySortOption::NameDesc => (SortKey::Name, true),
        LegacySortOption::DateDesc => (SortKey::LastModified, true),
        LegacySortOption::DateAsc => (SortKey::LastModified, false),
        LegacySortOption::CountDesc => (SortKey::Count, true),
    };
    SortSettings { key, descending }
}

fn default_true() -> bool {
    true
}

fn settings_version() -> String {
    SETTINGS_VERSION.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub last_folder: Option<PathBuf>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub auto_load: bool,
    #[serde(default = "settings_version")]
    pub version: String,
    #[serde(default)]
    pub sort: Option<SortSettings>,
    #[serde(default, rename = "sort_option", skip_serializing)]
    legacy_sort: Option<LegacySortOption>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            last_folder: None,
            last_updated: None,
            auto_load: true,
            version: settings_version(),
            sort: None,
            legacy_sort: None,
        }
    }
}

impl AppSettings {
    pub fn load(path: &Path) -> LoadOutcome<Self> {
        match read_json::<Self>(path) {
            LoadOutcome::Loaded(mut settings) => {
                settings.migrate();
                LoadOutcome::Loaded(settings)
            }
            LoadOutcome::Fallback(reason) => LoadOutcome::Fallback(reason),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        write_json_pretty(path, self, CoreErrorCode::Settings)
    }

    /// Structured sort settings win over a legacy tag.
    fn migrate(&mut self) {
        if let Some(legacy) = self.legacy_sort.take()
            && self.sort.is_none()
        {
            self.sort = Some(migrate_legacy_sort(legacy));
        }
        self.version = settings_version();
    }

    pub fn sort_settings(&self) -> SortSettings {
        self.sort.unwrap_or_default()
    }

    pub fn remember_folder(&mut self, folder: &Path, at: DateTime<Utc>) {
        self.last_folder = Some(folder.to_path_buf());
        self.last_updated = Some(at);
    }

    /// Folder to open at startup, if auto-load is on.
    pub fn startup_folder(&self) -> Option<&Path> {
        if self.auto_load {
            self.last_folder.as_deref()
        } else {
            None
        }
    }
}
