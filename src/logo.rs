//! Logo inlining for the JugRu export.
//!
//! The conference logo is an SVG referenced by an `<img>` on the page. It is
//! downloaded once and embedded in the export as a base64 `data:` URI so the
//! JSON file is self-contained.

use crate::error::ScrapeError;
use crate::scrapers::parse_selector;
use crate::utils::truncate_for_log;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use quick_xml::Reader;
use quick_xml::events::Event;
use scraper::Html;
use tracing::{info, instrument, warn};
use url::Url;

pub const SVG_DATA_URI_PREFIX: &str = "data:image/svg+xml;base64,";

/// Locate the logo element and resolve its `src` to an absolute URL.
pub fn logo_src(document: &Html, selector: &str, base: Option<&Url>) -> Result<Url, ScrapeError> {
    let compiled = parse_selector(selector)?;
    let src = document
        .select(&compiled)
        .next()
        .and_then(|el| el.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .ok_or_else(|| ScrapeError::LogoNotFound(selector.to_string()))?;

    match base {
        Some(base) => Ok(base.join(src)?),
        None => Url::parse(src).map_err(|e| match e {
            url::ParseError::RelativeUrlWithoutBase => {
                ScrapeError::RelativeWithoutBase(src.to_string())
            }
            other => ScrapeError::Url(other),
        }),
    }
}

/// Download the logo and return it as an SVG `data:` URI.
///
/// Non-success statuses and bodies whose root element is not `<svg>` are
/// errors; there is no retry.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_logo_data_uri(url: &Url) -> Result<String, ScrapeError> {
    let svg = reqwest::get(url.as_str())
        .await?
        .error_for_status()?
        .text()
        .await?;

    if !is_svg_markup(&svg) {
        warn!(preview = %truncate_for_log(&svg, 200), "Logo response is not SVG markup");
        return Err(ScrapeError::NotSvg(url.to_string()));
    }

    info!(bytes = svg.len(), "Fetched logo");
    Ok(svg_data_uri(&svg))
}

/// Base64-encode SVG text into a `data:image/svg+xml` URI.
pub fn svg_data_uri(svg: &str) -> String {
    format!("{SVG_DATA_URI_PREFIX}{}", STANDARD.encode(svg))
}

/// True when the first element in `markup` is `<svg>`.
pub fn is_svg_markup(markup: &str) -> bool {
    let mut reader = Reader::from_str(markup);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return e.local_name().as_ref() == b"svg";
            }
            Ok(Event::Eof) | Err(_) => return false,
            Ok(_) => {}
        }
    }
}
