//! Selector override file.
//!
//! Site markup changes without notice, so every selector can be replaced
//! from a YAML file passed with `--selectors`:
//!
//! ```yaml
//! jugru:
//!   card: '[data-sentry-component="TalkCard"]'
//!   logo: '[data-sentry-component="Logo"]'
//! ontiko:
//!   avatar: '.thesis__author-photo'
//! ```
//!
//! Keys left out keep the built-in defaults.

use crate::error::ScrapeError;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Per-site selector replacements. `None` keeps the default.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorOverrides {
    pub card: Option<String>,
    pub title: Option<String>,
    pub speaker: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<String>,
    /// JugRu only.
    pub logo: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorsFile {
    pub jugru: SelectorOverrides,
    pub ontiko: SelectorOverrides,
}

impl SelectorsFile {
    pub fn from_yaml(yaml: &str) -> Result<Self, ScrapeError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Load the override file, or the empty override set when no path is given.
#[instrument(level = "info")]
pub async fn load_selectors(path: Option<&Path>) -> Result<SelectorsFile, ScrapeError> {
    let Some(path) = path else {
        return Ok(SelectorsFile::default());
    };
    let yaml = fs::read_to_string(path).await?;
    let file = SelectorsFile::from_yaml(&yaml)?;
    info!(path = %path.display(), "Loaded selector overrides");
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_file() {
        let file = SelectorsFile::from_yaml(
            r#"
jugru:
  logo: 'img.logo'
ontiko:
  avatar: '.thesis__author-photo'
  company: '.company'
"#,
        )
        .unwrap();

        assert_eq!(file.jugru.logo.as_deref(), Some("img.logo"));
        assert_eq!(file.jugru.card, None);
        assert_eq!(file.ontiko.avatar.as_deref(), Some(".thesis__author-photo"));
        assert_eq!(file.ontiko.company.as_deref(), Some(".company"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = SelectorsFile::from_yaml("jugru:\n  cards: '.x'\n").unwrap_err();
        assert!(matches!(err, ScrapeError::Yaml(_)));
    }

    #[tokio::test]
    async fn test_load_selectors_without_path() {
        let file = load_selectors(None).await.unwrap();
        assert!(file.jugru.card.is_none());
        assert!(file.ontiko.card.is_none());
    }

    #[tokio::test]
    async fn test_load_selectors_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selectors.yaml");
        std::fs::write(&path, "ontiko:\n  card: '.talk'\n").unwrap();

        let file = load_selectors(Some(&path)).await.unwrap();
        assert_eq!(file.ontiko.card.as_deref(), Some(".talk"));
    }
}
