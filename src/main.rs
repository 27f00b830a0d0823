use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

mod cells;
mod config;
mod db;
mod grid;
mod input;
mod models;
mod palette;
mod periods;
mod report;
mod slots;
mod telemetry;

use config::Settings;
use grid::DayFilter;
use palette::PaletteHandle;

#[derive(Parser)]
#[command(name = "erica-board")]
#[command(about = "ERICA evaluation history and section timetable renderer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the palette schema
    InitDb,
    /// Store the built-in score colors
    SeedPalette,
    /// Print the column sequence of an evaluation history export
    Columns {
        #[arg(long)]
        history: PathBuf,
    },
    /// Render the ERICA evaluation history table
    History {
        #[arg(long)]
        history: PathBuf,
        #[arg(long, value_enum, default_value = "markdown")]
        format: Format,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render a section timetable
    Timetable {
        /// Section schedule configuration; omit for an unconfigured section
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        schedule: PathBuf,
        /// Show a single day (1 = Monday .. 7 = Sunday)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=7))]
        day: Option<u8>,
        #[arg(long)]
        section: Option<String>,
        #[arg(long, value_enum, default_value = "markdown")]
        format: Format,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load()?;
    telemetry::init_tracing(&settings.telemetry)?;

    match cli.command {
        Commands::InitDb => {
            let pool = connect(&settings).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::SeedPalette => {
            let pool = connect(&settings).await?;
            let written = db::seed_palette(&pool).await?;
            println!("Stored {written} palette colors.");
        }
        Commands::Columns { history } => {
            let bundle = input::load_history(&history)?;
            let columns = periods::build_columns(
                &bundle.weeks,
                &bundle.qnas,
                &bundle.months,
                bundle.bimester.as_ref(),
            );

            if columns.is_empty() {
                println!("No evaluation periods recorded.");
                return Ok(());
            }

            for (position, column) in columns.iter().enumerate() {
                let kind = format!("{:?}", column.kind());
                println!("{:>3} {:<8} {}", position + 1, kind, column.label());
            }
        }
        Commands::History {
            history,
            format,
            out,
        } => {
            let bundle = input::load_history(&history)?;
            let columns = periods::build_columns(
                &bundle.weeks,
                &bundle.qnas,
                &bundle.months,
                bundle.bimester.as_ref(),
            );
            let mut colors = palette_handle(&settings)?;
            let palette = colors.settle(settings.palette_wait).await;

            let rendered = match format {
                Format::Markdown => report::history_markdown(&bundle.students, &columns, &palette),
                Format::Json => report::history_json(&bundle.students, &columns, &palette)?,
            };
            emit(out.as_deref(), &rendered)?;
        }
        Commands::Timetable {
            config,
            schedule,
            day,
            section,
            format,
            out,
        } => {
            let config = match config {
                Some(path) => Some(input::load_section_config(&path)?),
                None => None,
            };
            let slots = match &config {
                Some(config) => slots::generate_time_slots(config)
                    .context("section schedule configuration is invalid")?,
                None => Vec::new(),
            };
            let records = input::load_schedule(&schedule)?;
            let filter = day.map(DayFilter::Single).unwrap_or(DayFilter::All);

            let view = grid::compose_view(config.as_ref(), Some(records.as_slice()), &slots, filter);
            let rendered = match format {
                Format::Markdown => report::timetable_markdown(section.as_deref(), &view),
                Format::Json => report::timetable_json(&view)?,
            };
            emit(out.as_deref(), &rendered)?;
        }
    }

    Ok(())
}

async fn connect(settings: &Settings) -> anyhow::Result<PgPool> {
    let database_url = settings
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to manage the palette store")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

/// Colors come from Postgres when it is configured; rendering never waits
/// on it beyond the configured grace period.
fn palette_handle(settings: &Settings) -> anyhow::Result<PaletteHandle> {
    let Some(database_url) = settings.database_url.as_deref() else {
        return Ok(PaletteHandle::defaults_only());
    };

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(settings.palette_wait)
        .connect_lazy(database_url)
        .context("DATABASE_URL is not a valid Postgres URL")?;

    Ok(PaletteHandle::spawn(async move { db::fetch_palette(&pool).await }))
}

fn emit(out: Option<&Path>, rendered: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
