//! Helpers for URL rewriting, CSS value parsing, string handling and
//! file system checks.
//!
//! - Avatar URL normalization for the JugRu image host
//! - `background-image: url(...)` extraction from inline styles
//! - Relative URL resolution against the page URL
//! - String truncation for logging
//! - Output directory validation

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Host that serves JugRu speaker photos and understands the resize parameters.
pub const AVATAR_HOST: &str = "jugru.team";

/// Query parameters forced onto every avatar on [`AVATAR_HOST`], in order.
const AVATAR_PARAMS: [(&str, &str); 3] = [
    ("width", "350"),
    ("height", "350"),
    ("mode", "CropUpsize"),
];

// Quoted strings and parenthesised groups may hold `;` (data URIs)
static BACKGROUND_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(?:^|;)\s*background(?:-image)?\s*:((?:"[^"]*"|'[^']*'|\([^)]*\)|[^;])*)"#,
    )
    .unwrap()
});

static CSS_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)'"\s]*))\s*\)"#).unwrap()
});

/// Request a 350x350 cropped rendition of an avatar hosted on [`AVATAR_HOST`].
///
/// The three parameters are *set*, not appended: an existing value is
/// overwritten in place and any later duplicates of the same key are dropped,
/// so applying the function twice gives the same result as applying it once.
/// URLs that don't parse or live on another host come back byte for byte.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_avatar_url("https://img.jugru.team/photo.jpg?x=1"),
///     "https://img.jugru.team/photo.jpg?x=1&width=350&height=350&mode=CropUpsize"
/// );
/// ```
pub fn normalize_avatar_url(avatar: &str) -> String {
    let Ok(mut url) = Url::parse(avatar) else {
        return avatar.to_string();
    };
    if !is_avatar_host(&url) {
        return avatar.to_string();
    }

    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    for (key, value) in AVATAR_PARAMS {
        set_query_param(&mut pairs, key, value);
    }
    url.query_pairs_mut().clear().extend_pairs(&pairs);

    debug!(from = %avatar, to = %url, "Normalized avatar URL");
    url.to_string()
}

fn is_avatar_host(url: &Url) -> bool {
    url.host_str().is_some_and(|host| {
        host == AVATAR_HOST
            || host
                .strip_suffix(AVATAR_HOST)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

fn set_query_param(pairs: &mut Vec<(String, String)>, key: &str, value: &str) {
    let mut seen = false;
    pairs.retain_mut(|(k, v)| {
        if k != key {
            return true;
        }
        if seen {
            return false;
        }
        seen = true;
        *v = value.to_string();
        true
    });
    if !seen {
        pairs.push((key.to_string(), value.to_string()));
    }
}

/// Pull the image URL out of an inline `style` attribute.
///
/// Looks at `background-image` and `background` declarations and strips the
/// `url(...)` wrapper, quoted or not. When several declarations are present
/// the last one wins, as it would in the cascade, even when it carries no
/// image. `none` and empty values yield `None`.
pub fn background_image_url(style: &str) -> Option<String> {
    let value = BACKGROUND_DECL.captures_iter(style).last()?.get(1)?.as_str();
    CSS_URL
        .captures(value)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
}

/// Resolve an attribute value the way the browser resolves `img.src`.
///
/// Without a base URL the trimmed value is returned as found in the markup.
pub fn resolve_url(raw: &str, base: Option<&Url>) -> String {
    let raw = raw.trim();
    match base.map(|b| b.join(raw)) {
        Some(Ok(resolved)) => resolved.to_string(),
        _ => raw.to_string(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last character boundary before `max` bytes
/// and get `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

const WRITE_CHECK_FILENAME: &str = "..__probe_write__";

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a scratch file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path).await?;
    let check_path = path.join(WRITE_CHECK_FILENAME);
    drop(fs::File::create(&check_path).await?);
    if let Err(e) = fs::remove_file(&check_path).await {
        warn!(file = %check_path.display(), error = %e, "Failed to remove write check file");
    }
    info!("Output directory is writable");
    Ok(())
}
