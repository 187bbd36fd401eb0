//! Ontiko conference talk scraper.
//!
//! Ontiko sites (HighLoad++, TeamLead Conf, ...) list talks as `.thesis__item`
//! blocks. The speaker photo is not an `<img>` but a `background-image` on
//! `.thesis__author-img`, so the avatar comes out of the inline style.

use super::{AvatarSource, Dialect, MissingFieldPolicy, SelectorSet, extract_talks};
use crate::config::SelectorOverrides;
use crate::error::ScrapeError;
use crate::models::Export;
use crate::page::Page;
use scraper::Html;
use tracing::{Level, debug, info, instrument};

pub const OUTPUT_FILENAME: &str = "ontiko_talks.json";

pub fn default_selectors() -> SelectorSet {
    SelectorSet {
        card: ".thesis__item".to_string(),
        title: "h2".to_string(),
        speaker: ".thesis__author-name".to_string(),
        company: ".thesis__author-company".to_string(),
        description: ".thesis__text".to_string(),
        avatar: ".thesis__author-img".to_string(),
    }
}

pub fn dialect(selectors: &SelectorSet) -> Result<Dialect, ScrapeError> {
    Dialect::compile("ontiko", selectors, true, AvatarSource::BackgroundImage, None)
}

/// Scrape an Ontiko talks page into a bare talk list.
#[instrument(level = "info", skip_all)]
pub fn scrape(
    page: &Page,
    overrides: &SelectorOverrides,
    policy: MissingFieldPolicy,
) -> Result<Export, ScrapeError> {
    let selectors = default_selectors().with_overrides(overrides);
    let document = Html::parse_document(&page.html);
    let talks = extract_talks(&document, &dialect(&selectors)?, page.base.as_ref(), policy)?;

    info!(count = talks.len(), "Found Ontiko talks");
    if tracing::enabled!(Level::DEBUG) {
        let dump = serde_json::to_string_pretty(&talks)?;
        debug!(%dump, "Ontiko talks");
    }

    Ok(Export::Talks(talks))
}
