mod logging;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use chrono::Utc;
use clap::{Parser, ValueEnum};
use savecode_core::core_api::{Analysis, Engine, FallbackReason, LoadOutcome, StorageConfig};
use savecode_core::settings::{AppSettings, SortKey, SortSettings};
use savecode_render::{
    JsonStyle, TextRenderOptions, render_character_sheet, render_character_table,
    render_job_listing, render_json_analysis, render_json_character, render_json_jobs,
};
use serde_json::Value as JsonValue;
use tracing::warn;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SortArg {
    Name,
    Date,
    Count,
}

impl SortArg {
    fn key(self) -> SortKey {
        match self {
            Self::Name => SortKey::Name,
            Self::Date => SortKey::LastModified,
            Self::Count => SortKey::Count,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Folder of save-code text files. Defaults to the last analyzed folder.
    #[arg(value_name = "FOLDER")]
    folder: Option<PathBuf>,
    /// Ignore the cache and parse every file again.
    #[arg(long)]
    rescan: bool,
    #[arg(long)]
    json: bool,
    /// Show one character's saves instead of the summary table.
    #[arg(long, value_name = "NAME", conflicts_with = "jobs")]
    character: Option<String>,
    /// List characters grouped by job.
    #[arg(long)]
    jobs: bool,
    /// Delete the cached analysis before doing anything else.
    #[arg(long = "clear-cache")]
    clear_cache: bool,
    /// Directory holding the cache, settings and name mapping.
    #[arg(long = "data-dir", value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Character name mapping file.
    #[arg(long, value_name = "FILE")]
    names: Option<PathBuf>,
    #[arg(long, value_enum)]
    sort: Option<SortArg>,
    #[arg(long)]
    desc: bool,
    /// Show full file paths.
    #[arg(long)]
    verbose: bool,
    #[arg(long = "no-save-settings")]
    no_save_settings: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logger();

    let mut storage = match &cli.data_dir {
        Some(dir) => StorageConfig::in_dir(dir),
        None => StorageConfig::default_location(),
    };
    if let Some(names) = &cli.names {
        storage = storage.with_name_map(Some(names.clone()));
    }
    let engine = Engine::new(storage);

    if cli.clear_cache {
        match engine.clear_cache() {
            Ok(true) => eprintln!("Cache cleared."),
            Ok(false) => eprintln!("No cache to clear."),
            Err(e) => {
                eprintln!("Error clearing cache: {e}");
                process::exit(1);
            }
        }
        if cli.folder.is_none() {
            return;
        }
    }

    let mut settings = load_settings(&engine);
    let Some(folder) = cli
        .folder
        .clone()
        .or_else(|| settings.startup_folder().map(Path::to_path_buf))
    else {
        eprintln!("No folder given and no previously analyzed folder to reopen.");
        process::exit(2);
    };
    let folder = fs::canonicalize(&folder).unwrap_or(folder);

    let result = if cli.rescan {
        engine.rescan(&folder)
    } else {
        engine.analyze(&folder)
    };
    let analysis = result.unwrap_or_else(|e| {
        eprintln!("Error analyzing {}: {e}", folder.display());
        process::exit(1);
    });

    let sort = resolve_sort(&cli, &settings);
    print_output(&cli, &analysis, sort);

    if !cli.no_save_settings {
        settings.remember_folder(&folder, Utc::now());
        if cli.sort.is_some() || cli.desc {
            settings.sort = Some(sort);
        }
        if let Err(e) = engine.save_settings(&settings) {
            warn!(error = %e, "settings not saved");
            eprintln!("Warning: settings not saved: {e}");
        }
    }
}

fn load_settings(engine: &Engine) -> AppSettings {
    match engine.load_settings() {
        LoadOutcome::Loaded(settings) => settings,
        LoadOutcome::Fallback(FallbackReason::NotFound) => AppSettings::default(),
        LoadOutcome::Fallback(reason) => {
            warn!(reason = %reason.describe(), "using default settings");
            AppSettings::default()
        }
    }
}

/// Command-line sort flags override the remembered ones.
fn resolve_sort(cli: &Cli, settings: &AppSettings) -> SortSettings {
    let mut sort = settings.sort_settings();
    if let Some(arg) = cli.sort {
        sort = SortSettings {
            key: arg.key(),
            descending: cli.desc,
        };
    } else if cli.desc {
        sort.descending = true;
    }
    sort
}

fn print_output(cli: &Cli, analysis: &Analysis, sort: SortSettings) {
    let options = TextRenderOptions {
        verbose: cli.verbose,
    };

    if let Some(name) = &cli.character {
        let Some(group) = analysis.character(name) else {
            eprintln!("No character named '{name}' in {}", analysis.folder().display());
            process::exit(1);
        };
        if cli.json {
            print_json(&render_json_character(group, JsonStyle::CanonicalV1));
        } else {
            print!("{}", render_character_sheet(group, options));
        }
        print_status_messages(analysis);
        return;
    }

    if cli.jobs {
        let jobs = analysis.job_groups();
        if cli.json {
            print_json(&render_json_jobs(&jobs, sort, JsonStyle::CanonicalV1));
        } else {
            print!("{}", render_job_listing(&jobs, sort));
        }
        print_status_messages(analysis);
        return;
    }

    if cli.json {
        print_json(&render_json_analysis(analysis, sort, JsonStyle::CanonicalV1));
    } else {
        print!("{}", render_character_table(analysis, sort));
    }
}

fn print_json(json: &JsonValue) {
    let rendered = serde_json::to_string_pretty(json).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}

fn print_status_messages(analysis: &Analysis) {
    for message in analysis.status_messages() {
        eprintln!("Warning: {message}");
    }
}
