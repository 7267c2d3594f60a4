use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core_api::{CoreError, CoreErrorCode, FallbackReason, LoadOutcome};

pub fn read_json<T: DeserializeOwned>(path: &Path) -> LoadOutcome<T> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return LoadOutcome::Fallback(FallbackReason::NotFound);
        }
        Err(e) => {
            return LoadOutcome::Fallback(FallbackReason::Unreadable(format!(
                "{}: {e}",
                path.display()
            )));
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => LoadOutcome::Loaded(value),
        Err(e) => LoadOutcome::Fallback(FallbackReason::Malformed(format!(
            "{}: {e}",
            path.display()
        ))),
    }
}

/// Writes `value` as indented JSON, creating parent directories first.
pub fn write_json_pretty<T: Serialize>(
    path: &Path,
    value: &T,
    code: CoreErrorCode,
) -> Result<(), CoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| {
            CoreError::new(
                code,
                format!("failed to create directory {}: {e}", parent.display()),
            )
        })?;
    }
    let rendered = serde_json::to_string_pretty(value).map_err(|e| {
        CoreError::new(code, format!("failed to serialize {}: {e}", path.display()))
    })?;
    fs::write(path, rendered)
        .map_err(|e| CoreError::new(code, format!("failed to write {}: {e}", path.display())))
}

/// Removes `path`; a file that is already gone is not an error.
pub fn remove_file_if_exists(path: &Path, code: CoreErrorCode) -> Result<bool, CoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CoreError::new(
            code,
            format!("failed to delete {}: {e}", path.display()),
        )),
    }
}
