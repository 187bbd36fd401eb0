//! JSON export.
//!
//! The export is pretty-printed with two-space indentation and written as
//! UTF-8 under a fixed, per-site filename. An existing file is overwritten.

use crate::error::ScrapeError;
use crate::utils::ensure_writable_dir;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `value` with two-space indentation.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, ScrapeError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write `value` to `{output_dir}/{filename}`.
///
/// Creates `output_dir` when missing.
///
/// # Returns
///
/// The path of the written file.
#[instrument(level = "info", skip(value), fields(output_dir = %output_dir.display()))]
pub async fn write_export<T: Serialize>(
    value: &T,
    output_dir: &Path,
    filename: &str,
) -> Result<PathBuf, ScrapeError> {
    let json = to_pretty_json(value)?;

    if let Err(e) = ensure_writable_dir(output_dir).await {
        error!(error = %e, "Output directory is not writable");
        return Err(e.into());
    }

    let path = output_dir.join(filename);
    info!(path = %path.display(), bytes = json.len(), "Writing JSON");
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON export");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Export, SpeakersWithLogo, TalkRecord};

    fn talk(name: &str) -> TalkRecord {
        TalkRecord {
            name: name.to_string(),
            job_title: "Acme".to_string(),
            talk_title: "Scaling Systems".to_string(),
            talk_description: Some("Intro".to_string()),
            avatar_url: "https://img.jugru.team/photo.jpg".to_string(),
        }
    }

    #[test]
    fn test_pretty_json_uses_two_spaces() {
        let json = to_pretty_json(&vec![talk("Jane Doe")]).unwrap();
        assert!(json.starts_with("[\n  {\n    \"name\": \"Jane Doe\""));
    }

    #[test]
    fn test_empty_export_is_empty_array() {
        assert_eq!(to_pretty_json(&Export::Talks(vec![])).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_write_export_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let export = Export::Talks(vec![talk("Jane Doe"), talk("Иван Иванов")]);

        let path = write_export(&export, &out, "ontiko_talks.json").await.unwrap();
        assert_eq!(path, out.join("ontiko_talks.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Иван Иванов"));
        let parsed: Vec<TalkRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), export.talk_count());
        assert_eq!(parsed[1].name, "Иван Иванов");
    }

    #[tokio::test]
    async fn test_write_export_with_logo() {
        let dir = tempfile::tempdir().unwrap();
        let export = Export::WithLogo(SpeakersWithLogo {
            speakers: vec![talk("Jane Doe")],
            logo: "data:image/svg+xml;base64,PHN2Zy8+".to_string(),
        });

        let path = write_export(&export, dir.path(), "jugru_talks.json").await.unwrap();
        let parsed: SpeakersWithLogo =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed.speakers.len(), 1);
        assert_eq!(parsed.logo, "data:image/svg+xml;base64,PHN2Zy8+");
    }
}
