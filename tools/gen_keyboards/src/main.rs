//! Generate the shengyun finals keyboards and write them into the Trime skin.
//!
//! Usage:
//!   cargo run -p gen_keyboards -- table
//!   cargo run -p gen_keyboards -- table --dry-run > preview.yaml
//!   cargo run -p gen_keyboards -- --config data/gen_keyboards.toml legacy --lines 97:1299

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shengyun_core::{
    generate_legacy, merge_table_mode, splice_lines, GeneratorConfig, LayoutGrid, MaskConfig,
    PhoneticTable, Region, TrimeDocument,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "gen_keyboards")]
#[command(about = "Generate shengyun finals keyboards for a Trime skin")]
struct Args {
    /// TOML configuration; built-in defaults are used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Build every layer from the syllable table and merge by keyboard id
    Table {
        /// Initial × final syllable table (TSV)
        #[arg(long)]
        table: Option<PathBuf>,

        /// Finals grid (CSV)
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Trime skin to update
        #[arg(long)]
        document: Option<PathBuf>,

        /// Print the merged skin to stdout instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Render the hand-masked 9-column layers and splice them in as text
    Legacy {
        /// 4-row finals grid (CSV)
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Masked finals per initial
        #[arg(long)]
        mask: Option<PathBuf>,

        /// Trime skin to update
        #[arg(long)]
        document: Option<PathBuf>,

        /// Replace this 1-based inclusive line range (START:END) instead of
        /// the marker-delimited region
        #[arg(long)]
        lines: Option<Region>,

        /// Also write the generated text here for review
        #[arg(long)]
        review_output: Option<PathBuf>,

        /// Print the spliced skin to stdout instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_table(
    config: &GeneratorConfig,
    table: PathBuf,
    layout: PathBuf,
    document: PathBuf,
    dry_run: bool,
) -> Result<()> {
    info!(path = %table.display(), "parsing syllable table");
    let table = PhoneticTable::load_tsv(&table)?;
    info!(combinations = table.combination_count(), "syllable table loaded");

    let grid = LayoutGrid::load_csv(&layout)?;
    info!(path = %layout.display(), rows = grid.rows.len(), "layout loaded");

    let mut doc = TrimeDocument::load(&document)?;
    let report = merge_table_mode(&mut doc, &table, &grid, config)?;

    if dry_run {
        print!("{}", doc.to_yaml_string()?);
        return Ok(());
    }

    doc.save(&document)?;
    info!(
        path = %document.display(),
        zero = 1,
        initials = config.initials_order.len(),
        universal = 1,
        created_initials_keyboard = report.initials_keyboard_created,
        "updated skin"
    );
    Ok(())
}

fn run_legacy(
    config: &GeneratorConfig,
    layout: PathBuf,
    mask: PathBuf,
    document: PathBuf,
    region: Region,
    review_output: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    let grid = LayoutGrid::load_csv(&layout)?;
    let masks = MaskConfig::load(&mask)?;
    info!(
        layout = %layout.display(),
        mask = %mask.display(),
        initials = masks.initial_count(),
        "inputs loaded"
    );

    let output = generate_legacy(&grid, &masks, config)?;
    let generated = output.combined();

    if let Some(path) = review_output {
        std::fs::write(&path, &generated)
            .with_context(|| format!("write review output {}", path.display()))?;
        info!(path = %path.display(), "saved generated layers for review");
    }

    let original = std::fs::read_to_string(&document)
        .with_context(|| format!("read {}", document.display()))?;
    let spliced = splice_lines(&original, &region, &generated)
        .with_context(|| format!("splice into {}", document.display()))?;

    if dry_run {
        print!("{spliced}");
        return Ok(());
    }

    std::fs::write(&document, &spliced)
        .with_context(|| format!("write {}", document.display()))?;
    info!(
        path = %document.display(),
        region = ?region,
        layers = output.initials.len() + 1,
        total_lines = spliced.lines().count(),
        "updated skin"
    );
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GeneratorConfig::load_toml(path)?,
        None => GeneratorConfig::default(),
    };
    let paths = config.paths.clone();

    match args.mode {
        Mode::Table {
            table,
            layout,
            document,
            dry_run,
        } => run_table(
            &config,
            table.unwrap_or(paths.table),
            layout.unwrap_or(paths.layout),
            document.unwrap_or(paths.document),
            dry_run,
        ),
        Mode::Legacy {
            layout,
            mask,
            document,
            lines,
            review_output,
            dry_run,
        } => run_legacy(
            &config,
            layout.unwrap_or(paths.legacy_layout),
            mask.unwrap_or(paths.mask),
            document.unwrap_or(paths.document),
            lines.unwrap_or_else(|| config.marker_region()),
            review_output.or(paths.review_output),
            dry_run,
        ),
    }
}
