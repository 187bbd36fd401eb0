//! Command-line interface definitions for talk_scrape.
//!
//! Global options can also come from environment variables.

use crate::page::PageSource;
use crate::render::fonts::FontFamily;
use crate::scrapers::MissingFieldPolicy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

/// Command-line arguments for talk_scrape.
///
/// # Examples
///
/// ```sh
/// # Saved page, avatars resolved against the live site
/// talk_scrape jugru --file talks.html --base-url https://jpoint.ru/en/talks/
///
/// # Live page, logo inlined, results in ./out
/// talk_scrape -o ./out jugru --url https://jpoint.ru/en/talks/ --with-logo
///
/// # Ontiko, abort on the first incomplete card
/// talk_scrape --strict ontiko --url https://highload.ru/moscow/2025/abstracts
///
/// # One OpenGraph card per speaker in ./output
/// talk_scrape opengraph jugru_talks.json --font roboto
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory the JSON file is written to (scrapers only)
    #[arg(short, long, env = "TALK_SCRAPE_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// YAML file overriding the built-in CSS selectors
    #[arg(short, long, env = "TALK_SCRAPE_SELECTORS")]
    pub selectors: Option<PathBuf>,

    /// Fail on the first talk card missing a title, speaker or avatar instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Also print the JSON to stdout
    #[arg(long)]
    pub print: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn missing_field_policy(&self) -> MissingFieldPolicy {
        if self.strict {
            MissingFieldPolicy::Abort
        } else {
            MissingFieldPolicy::Skip
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape a JugRu talks page into jugru_talks.json
    Jugru {
        #[command(flatten)]
        page: PageArgs,

        /// Inline the site logo and leave out talk descriptions
        #[arg(long)]
        with_logo: bool,
    },
    /// Scrape an Ontiko talks page into ontiko_talks.json
    Ontiko {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Render one OpenGraph PNG per speaker from a JugRu export
    Opengraph(OpenGraphArgs),
}

#[derive(Args, Debug)]
pub struct OpenGraphArgs {
    /// JSON export to read (`{speakers, logo}` or a bare talk array)
    pub file: PathBuf,

    /// Font family for the card text
    #[arg(long, value_enum, default_value = "geist")]
    pub font: FontFamily,

    /// Directory holding `<family>/regular.ttf` and `<family>/bold.ttf`
    #[arg(long, default_value = "fonts")]
    pub fonts_dir: PathBuf,

    /// Background image the cards are drawn on
    #[arg(long, default_value = "templates/template.png")]
    pub template: PathBuf,

    /// Directory the PNG files are written to
    #[arg(long, default_value = "output")]
    pub images_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct PageArgs {
    #[command(flatten)]
    pub input: PageInput,

    /// Base URL for resolving relative links (defaults to --url)
    #[arg(long)]
    pub base_url: Option<Url>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct PageInput {
    /// Download the page from this URL
    #[arg(long)]
    pub url: Option<Url>,

    /// Read a saved copy of the page
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl PageArgs {
    pub fn source(&self) -> PageSource {
        match (&self.input.url, &self.input.file) {
            (Some(url), _) => PageSource::Url(url.clone()),
            (None, Some(file)) => PageSource::File(file.clone()),
            // clap's group makes exactly one of them present
            (None, None) => unreachable!("page input group is required"),
        }
    }
}
