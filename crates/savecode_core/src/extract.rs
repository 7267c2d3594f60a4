//! Label-driven field extraction from save-code text files.
//!
//! Every field owns an ordered list of candidate patterns. The first pattern
//! is anchored to the `call Preload( "Label: value" )` convention used by the
//! game's save writer; the second accepts the bare label at the start of a
//! line (`Label: value` or `Label = "value"`). The first non-empty match wins.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::core_api::MAX_ITEM_SLOTS;
use crate::text::{clean_text, format_numeric_field};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldTag {
    CharacterName,
    SaveCode,
    Level,
    Gold,
    Wood,
    PhysicalPower,
    MagicalPower,
    SpiritualPower,
    Experience,
    Job,
    /// One-based inventory slot.
    Item(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Numeric,
}

impl FieldTag {
    pub const SCALARS: [FieldTag; 10] = [
        FieldTag::CharacterName,
        FieldTag::SaveCode,
        FieldTag::Level,
        FieldTag::Gold,
        FieldTag::Wood,
        FieldTag::PhysicalPower,
        FieldTag::MagicalPower,
        FieldTag::SpiritualPower,
        FieldTag::Experience,
        FieldTag::Job,
    ];

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::CharacterName | Self::SaveCode | Self::Job | Self::Item(_) => FieldKind::Text,
            Self::Level
            | Self::Gold
            | Self::Wood
            | Self::PhysicalPower
            | Self::MagicalPower
            | Self::SpiritualPower
            | Self::Experience => FieldKind::Numeric,
        }
    }

    /// Regex alternation of the labels accepted for this field.
    fn labels(&self) -> String {
        match self {
            Self::CharacterName => r"character\s+name|character|hero|name".to_string(),
            Self::SaveCode => r"save\s+code|load\s+code|code".to_string(),
            Self::Level => r"level|lv".to_string(),
            Self::Gold => r"gold".to_string(),
            Self::Wood => r"wood|lumber".to_string(),
            Self::PhysicalPower => r"physical\s+power|physical".to_string(),
            Self::MagicalPower => r"magical\s+power|magic\s+power|magical".to_string(),
            Self::SpiritualPower => r"spiritual\s+power|spirit\s+power|spiritual".to_string(),
            Self::Experience => r"experience|exp|xp".to_string(),
            Self::Job => r"job|class".to_string(),
            Self::Item(slot) => format!(r"item\s*{slot}|slot\s*{slot}"),
        }
    }
}

fn candidate_patterns(labels: &str) -> Vec<Regex> {
    let preload = format!(
        r#"(?i)call\s+Preload\s*\(\s*"\s*(?:{labels})\s*[:=]\s*([^"\r\n]*)"\s*\)"#
    );
    let bare = format!(r"(?im)^[ \t]*(?:{labels})[ \t]*[:=][ \t]*([^\r\n]*)");
    [preload, bare]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("field patterns are static and valid"))
        .collect()
}

static FIELD_PATTERNS: LazyLock<Vec<(FieldTag, Vec<Regex>)>> = LazyLock::new(|| {
    let items = (1..=MAX_ITEM_SLOTS as u8).map(FieldTag::Item);
    FieldTag::SCALARS
        .into_iter()
        .chain(items)
        .map(|tag| (tag, candidate_patterns(&tag.labels())))
        .collect()
});

/// Post-processed field values pulled out of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    values: BTreeMap<FieldTag, String>,
}

impl ExtractedFields {
    pub fn get(&self, tag: FieldTag) -> Option<&str> {
        self.values.get(&tag).map(String::as_str)
    }

    /// Numeric fields are always present; text fields only when non-empty.
    pub fn numeric(&self, tag: FieldTag) -> String {
        self.get(tag)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format_numeric_field(None))
    }

    /// Occupied inventory slots in slot order.
    pub fn items(&self) -> Vec<String> {
        (1..=MAX_ITEM_SLOTS as u8)
            .filter_map(|slot| self.get(FieldTag::Item(slot)))
            .map(ToOwned::to_owned)
            .collect()
    }
}

fn first_match<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .find(|value| !clean_text(value).is_empty())
    })
}

pub fn extract_fields(text: &str) -> ExtractedFields {
    let mut values = BTreeMap::new();
    for (tag, patterns) in FIELD_PATTERNS.iter() {
        let raw = first_match(patterns, text);
        match tag.kind() {
            FieldKind::Numeric => {
                values.insert(*tag, format_numeric_field(raw));
            }
            FieldKind::Text => {
                let Some(raw) = raw else { continue };
                let cleaned = clean_text(raw);
                if !cleaned.is_empty() {
                    values.insert(*tag, cleaned);
                }
            }
        }
    }
    ExtractedFields { values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_api::UNKNOWN_VALUE;

    const PRELOAD_FILE: &str = r#"function PreloadFiles takes nothing returns nothing
    call PreloadStart()
    call Preload( "Name: |cffffcc00Aria|r" )
    call Preload( "Code: ABC-123-XYZ" )
    call Preload( "Level: 50" )
    call Preload( "Gold: 1234567" )
    call Preload( "Item 1: |cff00ff00Sword of Dawn|r" )
    call Preload( "Item 3: [ff0000]Ruby Ring[-]" )
    call PreloadEnd( 0.0 )
endfunction
"#;

    #[test]
    fn preload_lines_are_extracted() {
        let fields = extract_fields(PRELOAD_FILE);
        assert_eq!(fields.get(FieldTag::CharacterName), Some("Aria"));
        assert_eq!(fields.get(FieldTag::SaveCode), Some("ABC-123-XYZ"));
        assert_eq!(fields.get(FieldTag::Level), Some("50"));
        assert_eq!(fields.get(FieldTag::Gold), Some("1,234,567"));
        assert_eq!(fields.items(), vec!["Sword of Dawn", "Ruby Ring"]);
    }

    #[test]
    fn bare_labels_are_used_as_fallback() {
        let text = "name=\"Aria\"\ncode = \"ABC-123-XYZ\"\nWood: 300\nlevel: high\n";
        let fields = extract_fields(text);
        assert_eq!(fields.get(FieldTag::CharacterName), Some("Aria"));
        assert_eq!(fields.get(FieldTag::SaveCode), Some("ABC-123-XYZ"));
        assert_eq!(fields.get(FieldTag::Wood), Some("300"));
        assert_eq!(fields.get(FieldTag::Level), Some(UNKNOWN_VALUE));
    }

    #[test]
    fn preload_form_wins_over_bare_label() {
        let text = "name: Decoy\ncall Preload( \"Name: Real\" )\n";
        let fields = extract_fields(text);
        assert_eq!(fields.get(FieldTag::CharacterName), Some("Real"));
    }

    #[test]
    fn labels_are_case_insensitive() {
        let text = "CALL PRELOAD( \"PHYSICAL POWER: 900\" )\nMagical Power: 12\n";
        let fields = extract_fields(text);
        assert_eq!(fields.get(FieldTag::PhysicalPower), Some("900"));
        assert_eq!(fields.get(FieldTag::MagicalPower), Some("12"));
        assert_eq!(fields.get(FieldTag::SpiritualPower), Some(UNKNOWN_VALUE));
    }

    #[test]
    fn missing_numeric_fields_are_unknown_and_text_fields_absent() {
        let fields = extract_fields("nothing to see here");
        assert_eq!(fields.get(FieldTag::CharacterName), None);
        assert_eq!(fields.get(FieldTag::Job), None);
        assert_eq!(fields.numeric(FieldTag::Experience), UNKNOWN_VALUE);
        assert!(fields.items().is_empty());
    }

    #[test]
    fn empty_primary_value_falls_through() {
        let text = "call Preload( \"Name: \" )\nname: Backup\n";
        let fields = extract_fields(text);
        assert_eq!(fields.get(FieldTag::CharacterName), Some("Backup"));
    }

    #[test]
    fn colour_only_primary_value_falls_through() {
        let text = "call Preload( \"Name: |cffffcc00|r\" )\nname: Backup\ncode: XYZ\n";
        let fields = extract_fields(text);
        assert_eq!(fields.get(FieldTag::CharacterName), Some("Backup"));
        assert_eq!(fields.get(FieldTag::SaveCode), Some("XYZ"));
    }
}
