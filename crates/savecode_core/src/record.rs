use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core_api::{CoreError, SaveCodeRecord};
use crate::extract::{ExtractedFields, FieldTag, extract_fields};

/// Filesystem facts captured alongside the extracted fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub file_name: String,
    pub file_path: PathBuf,
    pub modified: DateTime<Utc>,
}

impl FileMetadata {
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let modified = modified_time(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            file_name,
            file_path: path.to_path_buf(),
            modified,
        })
    }
}

/// Live last-write time of `path`.
pub fn modified_time(path: &Path) -> Result<DateTime<Utc>, CoreError> {
    let metadata =
        fs::metadata(path).map_err(|e| CoreError::io(format!("stat {}", path.display()), e))?;
    let modified = metadata
        .modified()
        .map_err(|e| CoreError::io(format!("mtime of {}", path.display()), e))?;
    Ok(DateTime::<Utc>::from(modified))
}

/// Returns `None` when the mandatory name or code is missing.
pub fn build_record(
    fields: &ExtractedFields,
    metadata: FileMetadata,
    content: String,
) -> Option<SaveCodeRecord> {
    let character_name = fields.get(FieldTag::CharacterName)?.trim();
    let save_code = fields.get(FieldTag::SaveCode)?.trim();
    if character_name.is_empty() || save_code.is_empty() {
        return None;
    }

    Some(SaveCodeRecord {
        character_name: character_name.to_string(),
        save_code: save_code.to_string(),
        file_name: metadata.file_name,
        file_path: metadata.file_path,
        modified: metadata.modified,
        content,
        items: fields.items(),
        level: fields.numeric(FieldTag::Level),
        gold: fields.numeric(FieldTag::Gold),
        wood: fields.numeric(FieldTag::Wood),
        experience: fields.numeric(FieldTag::Experience),
        physical_power: fields.numeric(FieldTag::PhysicalPower),
        magical_power: fields.numeric(FieldTag::MagicalPower),
        spiritual_power: fields.numeric(FieldTag::SpiritualPower),
        job: fields.get(FieldTag::Job).map(ToOwned::to_owned),
    })
}

/// Parses text that has already been read, with metadata supplied by the
/// caller.
pub fn parse_content(content: &str, metadata: FileMetadata) -> Option<SaveCodeRecord> {
    let fields = extract_fields(content);
    build_record(&fields, metadata, content.to_string())
}

/// Reads and parses one file. Unreadable or incomplete files yield `None`.
pub fn parse_file(path: &Path) -> Option<SaveCodeRecord> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "skipping unreadable save file");
            return None;
        }
    };
    let metadata = match FileMetadata::from_path(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "skipping save file without metadata");
            return None;
        }
    };
    let content = String::from_utf8_lossy(&bytes);
    let record = parse_content(&content, metadata);
    if record.is_none() {
        debug!(path = %path.display(), "not a save file: missing name or code");
    }
    record
}
