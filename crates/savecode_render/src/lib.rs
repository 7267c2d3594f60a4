use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use savecode_core::core_api::{
    Analysis, AnalysisSource, CharacterGroup, JobGroup, SaveCodeRecord,
};
use savecode_core::job::classify;
use savecode_core::settings::{SortKey, SortSettings};
use serde_json::{Map as JsonMap, Value as JsonValue};

const NAME_COL_WIDTH: usize = 24;
const SAVES_COL_WIDTH: usize = 6;
const MODIFIED_COL_WIDTH: usize = 18;
const LEVEL_COL_WIDTH: usize = 8;
const FILE_COL_WIDTH: usize = 24;
const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const WRITE_OK: &str = "writing to String cannot fail";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    /// Show full file paths instead of bare file names.
    pub verbose: bool,
}

/// Character groups in display order. Ties fall back to name ascending.
pub fn sorted_groups(groups: &[CharacterGroup], sort: SortSettings) -> Vec<&CharacterGroup> {
    let mut sorted: Vec<&CharacterGroup> = groups.iter().collect();
    sorted.sort_by(|a, b| {
        let primary = match sort.key {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::LastModified => a.last_modified.cmp(&b.last_modified),
            SortKey::Count => a.count.cmp(&b.count),
        };
        let primary = if sort.descending {
            primary.reverse()
        } else {
            primary
        };
        primary.then_with(|| a.name.cmp(&b.name))
    });
    sorted
}

pub fn render_json_analysis(analysis: &Analysis, sort: SortSettings, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(analysis_json(analysis, sort)),
    }
}

pub fn render_json_character(group: &CharacterGroup, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(character_json(group)),
    }
}

pub fn render_json_jobs(jobs: &[JobGroup], sort: SortSettings, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Array(
            jobs.iter()
                .map(|job| {
                    let mut m = JsonMap::new();
                    m.insert("job".to_string(), JsonValue::String(job.job.clone()));
                    m.insert(
                        "characters".to_string(),
                        JsonValue::Array(
                            sorted_groups(&job.characters, sort)
                                .into_iter()
                                .map(|group| JsonValue::String(group.name.clone()))
                                .collect(),
                        ),
                    );
                    JsonValue::Object(m)
                })
                .collect(),
        ),
    }
}

fn analysis_json(analysis: &Analysis, sort: SortSettings) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    out.insert(
        "folder".to_string(),
        JsonValue::String(analysis.folder().display().to_string()),
    );
    match analysis.source() {
        AnalysisSource::Cache => {
            out.insert("source".to_string(), JsonValue::String("cache".to_string()));
        }
        AnalysisSource::Rescan { reason } => {
            out.insert("source".to_string(), JsonValue::String("rescan".to_string()));
            out.insert("reason".to_string(), JsonValue::String(reason.clone()));
        }
    }
    out.insert(
        "analyzed_at".to_string(),
        JsonValue::String(format_json_time(analysis.analyzed_at())),
    );
    out.insert(
        "total_files".to_string(),
        JsonValue::from(analysis.total_files()),
    );
    out.insert(
        "record_count".to_string(),
        JsonValue::from(analysis.records().len()),
    );
    out.insert(
        "characters".to_string(),
        JsonValue::Array(
            sorted_groups(analysis.character_groups(), sort)
                .into_iter()
                .map(|group| JsonValue::Object(character_json(group)))
                .collect(),
        ),
    );
    out.insert(
        "status_messages".to_string(),
        JsonValue::Array(
            analysis
                .status_messages()
                .iter()
                .map(|msg| JsonValue::String(msg.clone()))
                .collect(),
        ),
    );
    out
}

fn character_json(group: &CharacterGroup) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    out.insert("name".to_string(), JsonValue::String(group.name.clone()));
    out.insert("count".to_string(), JsonValue::from(group.count));
    out.insert(
        "last_modified".to_string(),
        JsonValue::String(format_json_time(group.last_modified)),
    );
    out.insert(
        "job".to_string(),
        JsonValue::String(classify(group).as_str().to_string()),
    );
    out.insert(
        "latest".to_string(),
        match group.latest() {
            Some(record) => JsonValue::Object(stats_json(record)),
            None => JsonValue::Null,
        },
    );
    out.insert(
        "saves".to_string(),
        JsonValue::Array(group.records.iter().map(save_json).collect()),
    );
    out
}

fn stats_json(record: &SaveCodeRecord) -> JsonMap<String, JsonValue> {
    let mut m = JsonMap::new();
    m.insert("level".to_string(), JsonValue::String(record.level.clone()));
    m.insert(
        "experience".to_string(),
        JsonValue::String(record.experience.clone()),
    );
    m.insert("gold".to_string(), JsonValue::String(record.gold.clone()));
    m.insert("wood".to_string(), JsonValue::String(record.wood.clone()));
    m.insert(
        "physical_power".to_string(),
        JsonValue::String(record.physical_power.clone()),
    );
    m.insert(
        "magical_power".to_string(),
        JsonValue::String(record.magical_power.clone()),
    );
    m.insert(
        "spiritual_power".to_string(),
        JsonValue::String(record.spiritual_power.clone()),
    );
    m.insert(
        "items".to_string(),
        JsonValue::Array(
            record
                .items
                .iter()
                .map(|item| JsonValue::String(item.clone()))
                .collect(),
        ),
    );
    m
}

fn save_json(record: &SaveCodeRecord) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert(
        "file_name".to_string(),
        JsonValue::String(record.file_name.clone()),
    );
    m.insert(
        "modified".to_string(),
        JsonValue::String(format_json_time(record.modified)),
    );
    m.insert(
        "save_code".to_string(),
        JsonValue::String(record.save_code.clone()),
    );
    JsonValue::Object(m)
}

/// Header block plus one row per character.
pub fn render_character_table(analysis: &Analysis, sort: SortSettings) -> String {
    let mut out = String::new();
    writeln!(&mut out, "Folder: {}", analysis.folder().display()).expect(WRITE_OK);
    match analysis.source() {
        AnalysisSource::Cache => writeln!(&mut out, "Source: cache").expect(WRITE_OK),
        AnalysisSource::Rescan { reason } => {
            writeln!(&mut out, "Source: rescan ({reason})").expect(WRITE_OK)
        }
    }
    writeln!(
        &mut out,
        "Files: {}  Saves: {}  Characters: {}  Analyzed: {}",
        analysis.total_files(),
        analysis.records().len(),
        analysis.character_groups().len(),
        format_display_time(analysis.analyzed_at()),
    )
    .expect(WRITE_OK);
    writeln!(&mut out).expect(WRITE_OK);

    let groups = sorted_groups(analysis.character_groups(), sort);
    if groups.is_empty() {
        writeln!(&mut out, "No save codes found.").expect(WRITE_OK);
    } else {
        writeln!(
            &mut out,
            "{:<NAME_COL_WIDTH$}{:>SAVES_COL_WIDTH$}  {:<MODIFIED_COL_WIDTH$}  {:<LEVEL_COL_WIDTH$}Job",
            "Character", "Saves", "Last modified", "Level"
        )
        .expect(WRITE_OK);
        for group in groups {
            let level = group.latest().map(|r| r.level.as_str()).unwrap_or("");
            writeln!(
                &mut out,
                "{:<NAME_COL_WIDTH$}{:>SAVES_COL_WIDTH$}  {:<MODIFIED_COL_WIDTH$}  {:<LEVEL_COL_WIDTH$}{}",
                group.name,
                group.count,
                format_display_time(group.last_modified),
                level,
                classify(group),
            )
            .expect(WRITE_OK);
        }
    }

    write_status_messages(&mut out, analysis.status_messages());
    out
}

/// Latest stats, items and every save code for one character.
pub fn render_character_sheet(group: &CharacterGroup, options: TextRenderOptions) -> String {
    let mut out = String::new();
    writeln!(&mut out, "=== {} ===", group.name).expect(WRITE_OK);
    writeln!(&mut out, "Job: {}", classify(group)).expect(WRITE_OK);
    writeln!(
        &mut out,
        "Saves: {}  Last modified: {}",
        group.summary(),
        format_display_time(group.last_modified)
    )
    .expect(WRITE_OK);

    if let Some(latest) = group.latest() {
        writeln!(&mut out).expect(WRITE_OK);
        writeln!(
            &mut out,
            "Level: {}  Experience: {}",
            latest.level, latest.experience
        )
        .expect(WRITE_OK);
        writeln!(&mut out, "Gold: {}  Wood: {}", latest.gold, latest.wood).expect(WRITE_OK);
        writeln!(
            &mut out,
            "Physical: {}  Magical: {}  Spiritual: {}",
            latest.physical_power, latest.magical_power, latest.spiritual_power
        )
        .expect(WRITE_OK);

        writeln!(&mut out).expect(WRITE_OK);
        writeln!(&mut out, "Items:").expect(WRITE_OK);
        if latest.items.is_empty() {
            writeln!(&mut out, "  none").expect(WRITE_OK);
        } else {
            for (slot, item) in latest.items.iter().enumerate() {
                writeln!(&mut out, "  {}. {item}", slot + 1).expect(WRITE_OK);
            }
        }
    }

    writeln!(&mut out).expect(WRITE_OK);
    writeln!(&mut out, "Save codes:").expect(WRITE_OK);
    for record in &group.records {
        let file = if options.verbose {
            record.file_path.display().to_string()
        } else {
            record.file_name.clone()
        };
        writeln!(
            &mut out,
            "  {:<FILE_COL_WIDTH$}  {}  {}",
            file,
            format_display_time(record.modified),
            record.save_code
        )
        .expect(WRITE_OK);
    }
    out
}

pub fn render_job_listing(jobs: &[JobGroup], sort: SortSettings) -> String {
    let mut out = String::new();
    if jobs.is_empty() {
        writeln!(&mut out, "No characters found.").expect(WRITE_OK);
        return out;
    }
    for (idx, job) in jobs.iter().enumerate() {
        if idx > 0 {
            writeln!(&mut out).expect(WRITE_OK);
        }
        writeln!(&mut out, "{} ({})", job.job, job.characters.len()).expect(WRITE_OK);
        for group in sorted_groups(&job.characters, sort) {
            writeln!(
                &mut out,
                "  {:<NAME_COL_WIDTH$}{}",
                group.name,
                group.summary()
            )
            .expect(WRITE_OK);
        }
    }
    out
}

fn write_status_messages(out: &mut String, messages: &[String]) {
    if messages.is_empty() {
        return;
    }
    writeln!(out).expect(WRITE_OK);
    for message in messages {
        writeln!(out, "warning: {message}").expect(WRITE_OK);
    }
}

fn format_json_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn format_display_time(at: DateTime<Utc>) -> String {
    at.format(DISPLAY_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::TimeZone;

    use super::*;

    fn group(name: &str, count: usize, minute: u32) -> CharacterGroup {
        let modified = Utc
            .with_ymd_and_hms(2024, 3, 1, 12, minute, 0)
            .single()
            .expect("valid timestamp");
        let record = SaveCodeRecord {
            character_name: name.to_string(),
            save_code: "CODE".to_string(),
            file_name: format!("{name}.txt"),
            file_path: PathBuf::from(format!("/saves/{name}.txt")),
            modified,
            content: String::new(),
            items: Vec::new(),
            level: "1".to_string(),
            gold: "unknown".to_string(),
            wood: "unknown".to_string(),
            experience: "unknown".to_string(),
            physical_power: "unknown".to_string(),
            magical_power: "unknown".to_string(),
            spiritual_power: "unknown".to_string(),
            job: None,
        };
        CharacterGroup {
            name: name.to_string(),
            records: vec![record; count],
            count,
            last_modified: modified,
        }
    }

    fn names(groups: &[&CharacterGroup]) -> Vec<String> {
        groups.iter().map(|g| g.name.clone()).collect()
    }

    #[test]
    fn sorts_by_each_key() {
        let groups = vec![group("Borin", 1, 30), group("Aria", 3, 10), group("Cale", 2, 20)];

        let by_name = sorted_groups(&groups, SortSettings::default());
        assert_eq!(names(&by_name), vec!["Aria", "Borin", "Cale"]);

        let newest_first = sorted_groups(
            &groups,
            SortSettings {
                key: SortKey::LastModified,
                descending: true,
            },
        );
        assert_eq!(names(&newest_first), vec!["Borin", "Cale", "Aria"]);

        let most_saves = sorted_groups(
            &groups,
            SortSettings {
                key: SortKey::Count,
                descending: true,
            },
        );
        assert_eq!(names(&most_saves), vec!["Aria", "Cale", "Borin"]);
    }

    #[test]
    fn equal_keys_fall_back_to_name() {
        let groups = vec![group("Cale", 2, 0), group("Aria", 2, 0), group("Borin", 2, 0)];
        let sorted = sorted_groups(
            &groups,
            SortSettings {
                key: SortKey::Count,
                descending: true,
            },
        );
        assert_eq!(names(&sorted), vec!["Aria", "Borin", "Cale"]);
    }

    #[test]
    fn sheet_without_items_says_none() {
        let text = render_character_sheet(&group("Aria", 1, 0), TextRenderOptions::default());
        assert!(text.contains("Items:\n  none\n"));
        assert!(text.contains("Aria.txt"));
        assert!(!text.contains("/saves/"));
    }
}
