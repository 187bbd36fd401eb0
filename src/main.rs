//! # talk_scrape
//!
//! Extracts talk and speaker metadata from conference listing pages and
//! writes it out as a JSON file.
//!
//! ## Features
//!
//! - JugRu talk cards with avatars resized on the JugRu image host
//! - JugRu talk cards with the site logo inlined as an SVG `data:` URI
//! - Ontiko talk blocks with avatars taken from inline `background-image`
//! - Selector overrides from a YAML file for when the markup moves
//! - OpenGraph PNG cards rendered from a JugRu export
//!
//! ## Usage
//!
//! ```sh
//! talk_scrape jugru --url https://jpoint.ru/en/talks/
//! talk_scrape ontiko --file abstracts.html --base-url https://highload.ru/
//! talk_scrape opengraph jugru_talks.json --font roboto
//! ```
//!
//! ## Architecture
//!
//! One straight pass per run:
//! 1. **Loading**: read the saved page or download it
//! 2. **Extraction**: one record per talk card, in document order
//! 3. **Logo** (JugRu, optional): download and inline the logo
//! 4. **Output**: write `jugru_talks.json` or `ontiko_talks.json`
//!
//! The `opengraph` command reads such an export back and renders one card
//! per speaker (see [`render`]).

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod logo;
mod models;
mod outputs;
mod page;
mod render;
mod scrapers;
mod utils;

use cli::{Cli, Command, PageArgs};
use error::ScrapeError;
use models::Export;
use outputs::json;
use page::{Page, load_page};
use scrapers::{jugru, ontiko};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("talk_scrape starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    if let Err(e) = run(&args).await {
        error!(error = %e, "Run failed");
        return Err(e.into());
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");

    Ok(())
}

/// Execute one subcommand end to end.
///
/// Scrapers write nothing unless extraction succeeds as a whole.
async fn run(args: &Cli) -> Result<(), ScrapeError> {
    match &args.command {
        Command::Jugru { page, with_logo } => {
            let selectors = config::load_selectors(args.selectors.as_deref()).await?;
            let page = load(page).await?;
            let export =
                jugru::scrape(&page, &selectors.jugru, *with_logo, args.missing_field_policy())
                    .await?;
            emit(args, &export, jugru::OUTPUT_FILENAME).await
        }
        Command::Ontiko { page } => {
            let selectors = config::load_selectors(args.selectors.as_deref()).await?;
            let page = load(page).await?;
            let export = ontiko::scrape(&page, &selectors.ontiko, args.missing_field_policy())?;
            emit(args, &export, ontiko::OUTPUT_FILENAME).await
        }
        Command::Opengraph(opengraph) => {
            let cards = render::run_opengraph(opengraph).await?;
            info!(
                cards = cards.len(),
                images_dir = %opengraph.images_dir.display(),
                "Rendered OpenGraph cards"
            );
            Ok(())
        }
    }
}

async fn load(page_args: &PageArgs) -> Result<Page, ScrapeError> {
    load_page(&page_args.source(), page_args.base_url.clone()).await
}

async fn emit(args: &Cli, export: &Export, filename: &str) -> Result<(), ScrapeError> {
    if args.print {
        println!("{}", json::to_pretty_json(export)?);
    }
    let path = json::write_export(export, &args.output_dir, filename).await?;
    info!(talks = export.talk_count(), path = %path.display(), "Export written");
    Ok(())
}
