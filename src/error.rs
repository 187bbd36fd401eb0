//! Error type shared by the extractors, the logo inliner, the JSON writer
//! and the OpenGraph renderer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("card #{index}: missing {field}")]
    MissingField { index: usize, field: &'static str },

    #[error("logo element `{0}` not found or has no src")]
    LogoNotFound(String),

    #[error("logo at {0} is not SVG markup")]
    NotSvg(String),

    #[error("relative URL `{0}` needs a base URL (pass --base-url)")]
    RelativeWithoutBase(String),

    #[error("URL parse failed: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("selector file is invalid: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("image decoding or encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("base64 payload is invalid: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("malformed data URI: {0}")]
    InvalidDataUri(String),

    #[error("SVG rendering failed: {0}")]
    Svg(String),

    #[error("font {path} could not be loaded: {reason}")]
    Font { path: String, reason: String },
}
