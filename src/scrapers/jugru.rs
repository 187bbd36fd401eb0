//! JugRu conference talk scraper.
//!
//! JugRu sites (JPoint, Heisenbug, HolyJS and friends) render each talk as a
//! React component tagged with `data-sentry-component`, which is more stable
//! than their generated class names.
//!
//! # Avatars
//!
//! Speaker photos served from `*.jugru.team` are rewritten to request a
//! 350x350 `CropUpsize` rendition, see [`normalize_avatar_url`].
//!
//! # Logo variant
//!
//! With `with_logo` the export drops descriptions and becomes
//! `{ "speakers": [...], "logo": "data:image/svg+xml;base64,..." }`.

use super::{AvatarSource, Dialect, MissingFieldPolicy, SelectorSet, extract_talks};
use crate::config::SelectorOverrides;
use crate::error::ScrapeError;
use crate::logo::{fetch_logo_data_uri, logo_src};
use crate::models::{Export, SpeakersWithLogo};
use crate::page::Page;
use crate::utils::normalize_avatar_url;
use scraper::Html;
use tracing::{info, instrument};

pub const OUTPUT_FILENAME: &str = "jugru_talks.json";

pub const DEFAULT_LOGO_SELECTOR: &str = r#"[data-sentry-component="Logo"]"#;

pub fn default_selectors() -> SelectorSet {
    SelectorSet {
        card: r#"[data-sentry-component="TalkCard"]"#.to_string(),
        title: "h2, h3".to_string(),
        speaker: "h3".to_string(),
        company: r#"[data-sentry-component="PersonCompany"]"#.to_string(),
        description: "p".to_string(),
        avatar: "img".to_string(),
    }
}

pub fn dialect(selectors: &SelectorSet, with_description: bool) -> Result<Dialect, ScrapeError> {
    Dialect::compile(
        "jugru",
        selectors,
        with_description,
        AvatarSource::ImgSrc,
        Some(normalize_avatar_url),
    )
}

/// Scrape a JugRu talks page.
///
/// # Returns
///
/// [`Export::Talks`] with descriptions, or [`Export::WithLogo`] without
/// descriptions when `with_logo` is set.
///
/// # Errors
///
/// Invalid selectors, a missing field under [`MissingFieldPolicy::Abort`],
/// and any logo lookup or download failure.
#[instrument(level = "info", skip(page, overrides))]
pub async fn scrape(
    page: &Page,
    overrides: &SelectorOverrides,
    with_logo: bool,
    policy: MissingFieldPolicy,
) -> Result<Export, ScrapeError> {
    let selectors = default_selectors().with_overrides(overrides);
    let logo_selector = overrides.logo.as_deref().unwrap_or(DEFAULT_LOGO_SELECTOR);

    // Html is !Send, so it must be gone before the logo request
    let (speakers, logo_url) = {
        let document = Html::parse_document(&page.html);
        let dialect = dialect(&selectors, !with_logo)?;
        let speakers = extract_talks(&document, &dialect, page.base.as_ref(), policy)?;
        let logo_url = if with_logo {
            Some(logo_src(&document, logo_selector, page.base.as_ref())?)
        } else {
            None
        };
        (speakers, logo_url)
    };

    info!(count = speakers.len(), "Scraped JugRu talks");

    match logo_url {
        Some(url) => {
            let logo = fetch_logo_data_uri(&url).await?;
            Ok(Export::WithLogo(SpeakersWithLogo { speakers, logo }))
        }
        None => Ok(Export::Talks(speakers)),
    }
}
