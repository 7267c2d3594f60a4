use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::core_api::{CoreError, CoreErrorCode, LoadOutcome};
use crate::persist::read_json;

/// Raw in-file identifier(s): a single string, a comma separated string, or
/// a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NameField {
    One(String),
    Many(Vec<String>),
}

impl NameField {
    fn identifiers(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::One(joined) => joined.split(',').collect(),
            Self::Many(names) => names.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct MappingEntry {
    #[serde(alias = "names", alias = "Name")]
    name: NameField,
    #[serde(alias = "display_name", alias = "displayName", alias = "DisplayName")]
    display: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMapping {
    display_names: BTreeMap<String, String>,
}

impl NameMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let entries: Vec<MappingEntry> = serde_json::from_str(json).map_err(|e| {
            CoreError::new(CoreErrorCode::Parse, format!("invalid name mapping: {e}"))
        })?;
        Ok(Self::from_entries(entries))
    }

    fn from_entries(entries: Vec<MappingEntry>) -> Self {
        let mut mapping = Self::new();
        for entry in entries {
            let display = entry.display.trim();
            if display.is_empty() {
                continue;
            }
            for identifier in entry.name.identifiers() {
                mapping.insert_if_absent(identifier, display.to_string());
            }
        }
        mapping
    }

    pub fn load(path: &Path) -> LoadOutcome<Self> {
        match read_json::<Vec<MappingEntry>>(path) {
            LoadOutcome::Loaded(entries) => LoadOutcome::Loaded(Self::from_entries(entries)),
            LoadOutcome::Fallback(reason) => LoadOutcome::Fallback(reason),
        }
    }

    /// First mapping for an identifier wins.
    pub fn insert_if_absent(&mut self, identifier: impl Into<String>, display: impl Into<String>) {
        self.display_names
            .entry(identifier.into())
            .or_insert_with(|| display.into());
    }

    pub fn display_name<'a>(&'a self, raw: &'a str) -> &'a str {
        self.display_names
            .get(raw)
            .map(String::as_str)
            .unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.display_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.display_names.is_empty()
    }
}
