//! Talk card extractors for conference listing pages.
//!
//! Both supported sites render one container per talk. The containers differ
//! only in markup dialect, so extraction is a single routine driven by a
//! compiled [`Dialect`]: a set of CSS selectors plus the rule for where the
//! avatar URL lives.
//!
//! # Supported Sites
//!
//! | Site | Module | Card selector | Avatar |
//! |------|--------|---------------|--------|
//! | JugRu | [`jugru`] | `[data-sentry-component="TalkCard"]` | `img[src]`, resized on the JugRu image host |
//! | Ontiko | [`ontiko`] | `.thesis__item` | `background-image` of `.thesis__author-img` |
//!
//! # Common Patterns
//!
//! Each site module exports:
//! - `default_selectors()`: the built-in [`SelectorSet`]
//! - `OUTPUT_FILENAME`: the fixed name of the exported file
//! - `scrape(...)`: page HTML in, [`crate::models::Export`] out
//!
//! Extraction never touches the network; the page and the JugRu logo are
//! fetched by the callers.

pub mod jugru;
pub mod ontiko;

use crate::config::SelectorOverrides;
use crate::error::ScrapeError;
use crate::models::TalkRecord;
use crate::utils::{background_image_url, resolve_url};
use scraper::{ElementRef, Html, Selector};
use tracing::{info, instrument, warn};
use url::Url;

/// CSS selectors for one site's talk cards. All but `card` are evaluated
/// inside a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSet {
    pub card: String,
    pub title: String,
    pub speaker: String,
    pub company: String,
    pub description: String,
    pub avatar: String,
}

impl SelectorSet {
    /// Replace every selector the override file sets.
    pub fn with_overrides(mut self, overrides: &SelectorOverrides) -> Self {
        let fields = [
            (&mut self.card, &overrides.card),
            (&mut self.title, &overrides.title),
            (&mut self.speaker, &overrides.speaker),
            (&mut self.company, &overrides.company),
            (&mut self.description, &overrides.description),
            (&mut self.avatar, &overrides.avatar),
        ];
        for (slot, value) in fields {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
        self
    }
}

/// Where a card keeps its avatar URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarSource {
    /// `src` attribute of the avatar element.
    ImgSrc,
    /// `background-image` in the avatar element's inline style.
    BackgroundImage,
}

/// What to do with a card that lacks a title, speaker or avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFieldPolicy {
    /// Log the card and leave it out of the export.
    #[default]
    Skip,
    /// Fail the whole run.
    Abort,
}

/// A compiled [`SelectorSet`] plus the per-site extraction rules.
#[derive(Debug)]
pub struct Dialect {
    pub name: &'static str,
    card: Selector,
    title: Selector,
    speaker: Selector,
    company: Selector,
    description: Option<Selector>,
    avatar: Selector,
    avatar_source: AvatarSource,
    avatar_rewrite: Option<fn(&str) -> String>,
}

impl Dialect {
    /// Compile `selectors`. Descriptions are only read when
    /// `with_description` is set; `avatar_rewrite` runs on every resolved
    /// avatar URL.
    pub fn compile(
        name: &'static str,
        selectors: &SelectorSet,
        with_description: bool,
        avatar_source: AvatarSource,
        avatar_rewrite: Option<fn(&str) -> String>,
    ) -> Result<Self, ScrapeError> {
        Ok(Self {
            name,
            card: parse_selector(&selectors.card)?,
            title: parse_selector(&selectors.title)?,
            speaker: parse_selector(&selectors.speaker)?,
            company: parse_selector(&selectors.company)?,
            description: if with_description {
                Some(parse_selector(&selectors.description)?)
            } else {
                None
            },
            avatar: parse_selector(&selectors.avatar)?,
            avatar_source,
            avatar_rewrite,
        })
    }

    fn extract_card(
        &self,
        card: ElementRef<'_>,
        index: usize,
        base: Option<&Url>,
    ) -> Result<TalkRecord, ScrapeError> {
        let missing = |field| ScrapeError::MissingField { index, field };

        let talk_title = first_text(card, &self.title).ok_or_else(|| missing("title"))?;
        let name = first_text(card, &self.speaker).ok_or_else(|| missing("speaker"))?;
        let job_title = first_text(card, &self.company).unwrap_or_default();
        let talk_description = self
            .description
            .as_ref()
            .map(|selector| first_text(card, selector).unwrap_or_default());

        let raw_avatar = card
            .select(&self.avatar)
            .next()
            .and_then(|el| match self.avatar_source {
                AvatarSource::ImgSrc => el.value().attr("src").map(str::to_string),
                AvatarSource::BackgroundImage => {
                    el.value().attr("style").and_then(background_image_url)
                }
            })
            .filter(|src| !src.trim().is_empty())
            .ok_or_else(|| missing("avatar"))?;

        let resolved = resolve_url(&raw_avatar, base);
        let avatar_url = match self.avatar_rewrite {
            Some(rewrite) => rewrite(&resolved),
            None => resolved,
        };

        Ok(TalkRecord {
            name,
            job_title,
            talk_title,
            talk_description,
            avatar_url,
        })
    }
}

/// Compile a CSS selector, keeping the offending text in the error.
pub fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Trimmed text content of the first descendant matching `selector`.
pub fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

/// Extract one [`TalkRecord`] per card, in document order.
///
/// Cards missing a required field are handled according to `policy`.
#[instrument(level = "info", skip_all, fields(site = dialect.name, policy = ?policy))]
pub fn extract_talks(
    document: &Html,
    dialect: &Dialect,
    base: Option<&Url>,
    policy: MissingFieldPolicy,
) -> Result<Vec<TalkRecord>, ScrapeError> {
    let mut talks = Vec::new();
    let mut skipped = 0usize;

    for (index, card) in document.select(&dialect.card).enumerate() {
        match dialect.extract_card(card, index, base) {
            Ok(talk) => talks.push(talk),
            Err(e @ ScrapeError::MissingField { .. }) if policy == MissingFieldPolicy::Skip => {
                warn!(index, error = %e, "Skipping incomplete talk card");
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(count = talks.len(), skipped, "Extracted talk records");
    Ok(talks)
}
