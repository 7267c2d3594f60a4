use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use filetime::{FileTime, set_file_mtime};
use serde_json::Value;

fn run_cli(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_savecode"))
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .env_remove("SAVECODE_LOG")
        .output()
        .expect("failed to run savecode CLI")
}

fn write_save(dir: &Path, file: &str, name: &str, code: &str, mtime: i64) {
    let path = dir.join(file);
    fs::write(
        &path,
        format!("call Preload( \"Name: {name}\" )\ncall Preload( \"Code: {code}\" )\n"),
    )
    .expect("write fixture");
    set_file_mtime(&path, FileTime::from_unix_time(mtime, 0)).expect("set mtime");
}

fn sample_folder() -> tempfile::TempDir {
    let saves = tempfile::tempdir().expect("temp dir");
    write_save(saves.path(), "aria_1.txt", "Aria", "A-1", 1_700_000_000);
    write_save(saves.path(), "aria_2.txt", "Aria", "A-2", 1_700_000_900);
    write_save(saves.path(), "borin.txt", "Borin", "B-1", 1_700_000_300);
    write_save(saves.path(), "borin_2.txt", "Borin", "B-2", 1_700_000_400);
    write_save(saves.path(), "borin_3.txt", "Borin", "B-3", 1_700_000_500);
    saves
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn folder_arg(dir: &tempfile::TempDir) -> String {
    dir.path().to_string_lossy().into_owned()
}

fn settings_json(data: &Path) -> Value {
    let text = fs::read_to_string(data.join("settings.json")).expect("settings written");
    serde_json::from_str(&text).expect("settings should be JSON")
}

#[test]
fn table_lists_characters_and_remembers_folder() {
    let saves = sample_folder();
    let data = tempfile::tempdir().expect("temp dir");

    let output = run_cli(data.path(), &[&folder_arg(&saves)]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Characters: 2"));
    assert!(text.contains("Aria"));
    assert!(text.contains("Borin"));
    assert!(data.path().join("analysis_cache.json").is_file());

    let settings = settings_json(data.path());
    let expected = fs::canonicalize(saves.path()).expect("canonical folder");
    assert_eq!(settings["last_folder"], expected.to_string_lossy().as_ref());
    assert!(settings["last_updated"].is_string());
}

#[test]
fn missing_folder_argument_reuses_last_folder() {
    let saves = sample_folder();
    let data = tempfile::tempdir().expect("temp dir");

    assert!(run_cli(data.path(), &[&folder_arg(&saves)]).status.success());
    let output = run_cli(data.path(), &["--json"]);
    assert!(output.status.success());

    let value: Value = serde_json::from_str(&stdout(&output)).expect("json output");
    assert_eq!(value["source"], "cache");
    assert_eq!(value["characters"].as_array().map(Vec::len), Some(2));
}

#[test]
fn missing_folder_argument_without_history_is_usage_error() {
    let data = tempfile::tempdir().expect("temp dir");
    let output = run_cli(data.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No folder given"));
}

#[test]
fn unreadable_folder_exits_with_error() {
    let data = tempfile::tempdir().expect("temp dir");
    let missing = data.path().join("does-not-exist");
    let output = run_cli(data.path(), &[&missing.to_string_lossy()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error analyzing"));
}

#[test]
fn character_sheet_shows_codes_newest_first() {
    let saves = sample_folder();
    let data = tempfile::tempdir().expect("temp dir");

    let output = run_cli(data.path(), &[&folder_arg(&saves), "--character", "Aria"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("=== Aria ==="));
    let newest = text.find("A-2").expect("newest code");
    let oldest = text.find("A-1").expect("oldest code");
    assert!(newest < oldest);

    let missing = run_cli(data.path(), &[&folder_arg(&saves), "--character", "Nobody"]);
    assert_eq!(missing.status.code(), Some(1));
}

#[test]
fn jobs_json_groups_every_character() {
    let saves = sample_folder();
    let data = tempfile::tempdir().expect("temp dir");

    let output = run_cli(data.path(), &[&folder_arg(&saves), "--jobs", "--json"]);
    assert!(output.status.success());
    let value: Value = serde_json::from_str(&stdout(&output)).expect("json output");
    let jobs = value.as_array().expect("jobs array");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["job"], "unclassified");
    assert_eq!(jobs[0]["characters"][0], "Aria");
    assert_eq!(jobs[0]["characters"][1], "Borin");
}

#[test]
fn sort_flags_order_output_and_are_remembered() {
    let saves = sample_folder();
    let data = tempfile::tempdir().expect("temp dir");

    let output = run_cli(
        data.path(),
        &[&folder_arg(&saves), "--json", "--sort", "count", "--desc"],
    );
    assert!(output.status.success());
    let value: Value = serde_json::from_str(&stdout(&output)).expect("json output");
    assert_eq!(value["characters"][0]["name"], "Borin");

    let settings = settings_json(data.path());
    assert_eq!(settings["sort"]["key"], "count");
    assert_eq!(settings["sort"]["descending"], true);

    let output = run_cli(data.path(), &["--json"]);
    let value: Value = serde_json::from_str(&stdout(&output)).expect("json output");
    assert_eq!(value["characters"][0]["name"], "Borin");
}

#[test]
fn rescan_flag_bypasses_cache() {
    let saves = sample_folder();
    let data = tempfile::tempdir().expect("temp dir");

    assert!(run_cli(data.path(), &[&folder_arg(&saves)]).status.success());
    let output = run_cli(data.path(), &[&folder_arg(&saves), "--rescan", "--json"]);
    let value: Value = serde_json::from_str(&stdout(&output)).expect("json output");
    assert_eq!(value["source"], "rescan");
    assert_eq!(value["reason"], "rescan requested");
}

#[test]
fn clear_cache_without_folder_only_clears() {
    let saves = sample_folder();
    let data = tempfile::tempdir().expect("temp dir");

    assert!(run_cli(data.path(), &[&folder_arg(&saves)]).status.success());
    let cache = data.path().join("analysis_cache.json");
    assert!(cache.is_file());

    let output = run_cli(data.path(), &["--clear-cache"]);
    assert!(output.status.success());
    assert!(!cache.exists());
    assert!(stdout(&output).is_empty());
}

#[test]
fn name_mapping_file_renames_characters() {
    let saves = sample_folder();
    let data = tempfile::tempdir().expect("temp dir");
    let names = data.path().join("custom_names.json");
    fs::write(&names, r#"[{ "name": "Aria", "display": "Aria the Bold" }]"#).expect("write");

    let output = run_cli(
        data.path(),
        &[&folder_arg(&saves), "--json", "--names", &names.to_string_lossy()],
    );
    assert!(output.status.success());
    let value: Value = serde_json::from_str(&stdout(&output)).expect("json output");
    assert_eq!(value["characters"][0]["name"], "Aria the Bold");
}

#[test]
fn no_save_settings_leaves_settings_untouched() {
    let saves = sample_folder();
    let data = tempfile::tempdir().expect("temp dir");

    let output = run_cli(data.path(), &[&folder_arg(&saves), "--no-save-settings"]);
    assert!(output.status.success());
    assert!(!data.path().join("settings.json").exists());
}
