use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::aggregate::{group_by_character, group_by_job};
use crate::cache::{CacheSnapshot, Freshness};
use crate::name_map::NameMapping;
use crate::record::{modified_time, parse_file};
use crate::settings::AppSettings;

use super::error::{CoreError, CoreErrorCode};
use super::types::{CharacterGroup, FallbackReason, JobGroup, LoadOutcome, SaveCodeRecord};

const CACHE_FILE_NAME: &str = "analysis_cache.json";
const SETTINGS_FILE_NAME: &str = "settings.json";
const NAME_MAP_FILE_NAME: &str = "character_names.json";
const APP_DIR_NAME: &str = "savecode";
const SAVE_FILE_EXTENSION: &str = "txt";

/// Locations of every file the engine owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub cache_path: PathBuf,
    pub settings_path: PathBuf,
    pub name_map_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            cache_path: dir.join(CACHE_FILE_NAME),
            settings_path: dir.join(SETTINGS_FILE_NAME),
            name_map_path: Some(dir.join(NAME_MAP_FILE_NAME)),
        }
    }

    /// Platform data directory, or the working directory when none exists.
    pub fn default_location() -> Self {
        let base = dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR_NAME));
        Self::in_dir(&base)
    }

    pub fn with_name_map(mut self, path: Option<PathBuf>) -> Self {
        self.name_map_path = path;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisSource {
    Cache,
    Rescan { reason: String },
}

impl AnalysisSource {
    pub fn is_cache(&self) -> bool {
        matches!(self, Self::Cache)
    }
}

#[derive(Debug, Clone)]
pub struct Analysis {
    folder: PathBuf,
    source: AnalysisSource,
    analyzed_at: DateTime<Utc>,
    total_files: usize,
    records: Vec<SaveCodeRecord>,
    groups: Vec<CharacterGroup>,
    status_messages: Vec<String>,
}

impl Analysis {
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn source(&self) -> &AnalysisSource {
        &self.source
    }

    pub fn analyzed_at(&self) -> DateTime<Utc> {
        self.analyzed_at
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }

    pub fn records(&self) -> &[SaveCodeRecord] {
        &self.records
    }

    pub fn character_groups(&self) -> &[CharacterGroup] {
        &self.groups
    }

    pub fn character(&self, name: &str) -> Option<&CharacterGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn job_groups(&self) -> Vec<JobGroup> {
        group_by_job(&self.groups)
    }

    /// Non-fatal problems hit while producing this analysis.
    pub fn status_messages(&self) -> &[String] {
        &self.status_messages
    }
}

#[derive(Debug, Clone)]
pub struct Engine {
    storage: StorageConfig,
    names: NameMapping,
}

impl Engine {
    /// Loads the name mapping if one is configured; a missing or broken
    /// mapping file leaves names untouched.
    pub fn new(storage: StorageConfig) -> Self {
        let names = match storage.name_map_path.as_deref().map(NameMapping::load) {
            Some(LoadOutcome::Loaded(names)) => names,
            Some(LoadOutcome::Fallback(FallbackReason::NotFound)) | None => NameMapping::new(),
            Some(LoadOutcome::Fallback(reason)) => {
                warn!(reason = %reason.describe(), "ignoring character name mapping");
                NameMapping::new()
            }
        };
        Self { storage, names }
    }

    pub fn with_names(storage: StorageConfig, names: NameMapping) -> Self {
        Self { storage, names }
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn names(&self) -> &NameMapping {
        &self.names
    }

    /// Top-level `.txt` files in `folder`, sorted by path. Links to files are
    /// listed under the link's own name.
    pub fn list_save_files(&self, folder: &Path) -> Result<Vec<PathBuf>, CoreError> {
        if !folder.exists() {
            return Err(CoreError::new(
                CoreErrorCode::Io,
                format!("{} does not exist", folder.display()),
            ));
        }
        if !folder.is_dir() {
            return Err(CoreError::new(
                CoreErrorCode::InvalidInput,
                format!("{} is not a folder", folder.display()),
            ));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                CoreError::new(
                    CoreErrorCode::Io,
                    format!("failed to list {}: {e}", folder.display()),
                )
            })?;
            // Symlinked saves count; dangling links do not.
            if !entry.path().is_file() {
                continue;
            }
            let is_save = entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(SAVE_FILE_EXTENSION));
            if is_save {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }

    pub fn load_cache(&self) -> LoadOutcome<CacheSnapshot> {
        CacheSnapshot::load(&self.storage.cache_path)
    }

    pub fn clear_cache(&self) -> Result<bool, CoreError> {
        let removed = CacheSnapshot::clear(&self.storage.cache_path)?;
        if removed {
            info!(path = %self.storage.cache_path.display(), "cache cleared");
        }
        Ok(removed)
    }

    pub fn load_settings(&self) -> LoadOutcome<AppSettings> {
        AppSettings::load(&self.storage.settings_path)
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<(), CoreError> {
        settings.save(&self.storage.settings_path)
    }

    /// Reuses the cached snapshot when it still matches the folder, otherwise
    /// parses every file and replaces the snapshot.
    pub fn analyze(&self, folder: &Path) -> Result<Analysis, CoreError> {
        let files = self.list_save_files(folder)?;

        let reason = match self.load_cache() {
            LoadOutcome::Loaded(snapshot) => match snapshot.check_freshness(folder, &files) {
                Freshness::Valid => return Ok(self.analysis_from_cache(snapshot)),
                Freshness::Stale(reason) => reason,
            },
            LoadOutcome::Fallback(reason) => format!("cache {}", reason.describe()),
        };
        debug!(folder = %folder.display(), %reason, "cache unusable");
        Ok(self.scan(folder, files, reason))
    }

    /// Full pass that ignores any cached snapshot.
    pub fn rescan(&self, folder: &Path) -> Result<Analysis, CoreError> {
        let files = self.list_save_files(folder)?;
        Ok(self.scan(folder, files, "rescan requested".to_string()))
    }

    fn analysis_from_cache(&self, snapshot: CacheSnapshot) -> Analysis {
        info!(
            folder = %snapshot.folder_path.display(),
            records = snapshot.records.len(),
            "using cached analysis"
        );
        let groups = group_by_character(&snapshot.records, Some(&self.names));
        Analysis {
            folder: snapshot.folder_path,
            source: AnalysisSource::Cache,
            analyzed_at: snapshot.last_analyzed,
            total_files: snapshot.total_files,
            records: snapshot.records,
            groups,
            status_messages: Vec::new(),
        }
    }

    fn scan(&self, folder: &Path, files: Vec<PathBuf>, reason: String) -> Analysis {
        info!(folder = %folder.display(), files = files.len(), %reason, "scanning save files");

        let mut timestamps = BTreeMap::new();
        let mut records = Vec::new();
        let mut status_messages = Vec::new();
        for path in &files {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            match modified_time(path) {
                Ok(modified) => {
                    timestamps.insert(file_name, modified);
                }
                Err(e) => debug!(error = %e, "no timestamp for cache entry"),
            }
            if let Some(record) = parse_file(path) {
                records.push(record);
            }
        }

        let analyzed_at = Utc::now();
        let mut snapshot = CacheSnapshot::new(folder, timestamps, records, analyzed_at);
        snapshot.total_files = files.len();
        match snapshot.save(&self.storage.cache_path) {
            Ok(()) => info!(
                path = %self.storage.cache_path.display(),
                records = snapshot.records.len(),
                "cache written"
            ),
            Err(e) => {
                warn!(error = %e, "cache not written");
                status_messages.push(format!("cache not saved: {}", e.message));
            }
        }

        let groups = group_by_character(&snapshot.records, Some(&self.names));
        Analysis {
            folder: folder.to_path_buf(),
            source: AnalysisSource::Rescan { reason },
            analyzed_at,
            total_files: files.len(),
            records: snapshot.records,
            groups,
            status_messages,
        }
    }
}
