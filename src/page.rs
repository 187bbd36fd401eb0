//! Page loading: a saved HTML file or a live URL.

use crate::error::ScrapeError;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Where the listing page comes from.
#[derive(Debug, Clone)]
pub enum PageSource {
    File(PathBuf),
    Url(Url),
}

/// Raw page HTML plus the URL relative links resolve against.
#[derive(Debug)]
pub struct Page {
    pub html: String,
    pub base: Option<Url>,
}

/// Read or download the page.
///
/// `base_override` wins over the download URL; for files it is the only way
/// to get absolute avatar URLs.
#[instrument(level = "info", skip(base_override))]
pub async fn load_page(source: &PageSource, base_override: Option<Url>) -> Result<Page, ScrapeError> {
    let (html, base) = match source {
        PageSource::File(path) => (fs::read_to_string(path).await?, base_override),
        PageSource::Url(url) => {
            let html = reqwest::get(url.as_str())
                .await?
                .error_for_status()?
                .text()
                .await?;
            (html, base_override.or_else(|| Some(url.clone())))
        }
    };
    info!(bytes = html.len(), base = ?base.as_ref().map(Url::as_str), "Loaded page");
    Ok(Page { html, base })
}
