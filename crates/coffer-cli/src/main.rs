//! coffer-manifest - Export gear coffer contents from game sheets
//!
//! This tool finds single-slot gear coffers in the item sheet, matches them
//! against crafting recipes, and writes the resulting manifests as CSV.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use coffer_core::{
    classify_items, find_coffer_candidates, GameData, GameDataOptions, Item, Language,
    ManifestBuilder, ManifestRules, Recipe, ReportWriter, Sheet,
};
use std::path::PathBuf;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Export gear coffer lists and coffer content manifests
#[derive(Parser, Debug)]
#[command(name = "coffer-manifest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Game data root containing the exported sheets
    data_root: PathBuf,

    /// Run mode: `list` writes only the coffer list, anything else builds manifests
    mode: Option<String>,

    /// Output directory for the CSV reports
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Language of the sheets to load
    #[arg(long, value_enum, default_value = "en")]
    language: LanguageArg,

    /// Keep recipes that need a master book and have difficulty stars
    #[arg(long)]
    keep_master_recipes: bool,

    /// Log sheet checksum mismatches instead of aborting
    #[arg(long)]
    no_checksum_panic: bool,
}

/// Sheet language
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LanguageArg {
    /// English
    En,
    /// Japanese
    Ja,
    /// German
    De,
    /// French
    Fr,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::En => Language::English,
            LanguageArg::Ja => Language::Japanese,
            LanguageArg::De => Language::German,
            LanguageArg::Fr => Language::French,
        }
    }
}

/// What the run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Every item that looks like a gear coffer
    List,
    /// Classified coffers and their manifests
    Manifests,
}

impl Mode {
    fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some(mode) if mode.eq_ignore_ascii_case("list") => Mode::List,
            _ => Mode::Manifests,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let (items, recipes) = load_tables(cli)?;
    let writer = ReportWriter::new(&cli.output);

    match Mode::from_arg(cli.mode.as_deref()) {
        Mode::List => generate_coffer_list(&writer, &items),
        Mode::Manifests => generate_manifests(cli, &writer, &items, &recipes),
    }

    Ok(())
}

/// Open the game data and load both sheets; any failure here ends the run
fn load_tables(cli: &Cli) -> Result<(Sheet<Item>, Sheet<Recipe>)> {
    let options = GameDataOptions::new()
        .language(cli.language.into())
        .panic_on_checksum_mismatch(!cli.no_checksum_panic);

    let game_data = GameData::open(&cli.data_root, options).with_context(|| {
        format!(
            "Error initializing game data at {}",
            cli.data_root.display()
        )
    })?;
    let tables = game_data
        .load_tables()
        .context("Error loading item and recipe sheets")?;

    info!("Game data is ready: {}", game_data.data_path().display());
    Ok(tables)
}

fn generate_coffer_list(writer: &ReportWriter, items: &Sheet<Item>) {
    let list = find_coffer_candidates(items);
    info!(
        "Found {} gear coffers of any type in {} rows.",
        list.coffers.len(),
        list.rows_scanned
    );

    log_write("coffer list", writer.write_coffer_list(&list));
}

fn generate_manifests(
    cli: &Cli,
    writer: &ReportWriter,
    items: &Sheet<Item>,
    recipes: &Sheet<Recipe>,
) {
    let classification = classify_items(items);
    info!(
        "Found {} single-slot coffers in {} rows.",
        classification.coffers.len(),
        classification.rows_scanned
    );
    log_write("coffer data", writer.write_coffer_data(&classification));

    let rules = ManifestRules::new().exclude_master_recipes(!cli.keep_master_recipes);
    let manifests = ManifestBuilder::with_rules(rules).build(&classification, items, recipes);

    info!(
        "Ignored {} blacklisted coffers (out of {} expected).",
        manifests.blacklisted, manifests.blacklist_size
    );
    if manifests.blacklisted != manifests.blacklist_size {
        warn!("Some blacklisted coffers were not found; the blacklist may be stale");
    }

    log_write("coffer manifests", writer.write_manifests(&manifests));
    log_write(
        "resolved coffer manifests",
        writer.write_resolved_manifests(&manifests, items),
    );

    info!(
        "Exported manifests for {} coffers that met all requirements.",
        manifests.len()
    );
}

/// Report the outcome of one file write; failures never stop the run
fn log_write(what: &str, result: coffer_core::Result<PathBuf>) {
    match result {
        Ok(path) => info!("Wrote {} to {}", what, path.display()),
        Err(e) => error!("Error writing {}: {}", what, e),
    }
}
