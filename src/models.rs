//! Data models for extracted talks and the exported JSON documents.
//!
//! - [`TalkRecord`]: one speaker/talk entry scraped from a talk card
//! - [`SpeakersWithLogo`]: the JugRu export that also carries the inlined logo
//! - [`Export`]: whichever of the two shapes a run writes
//!
//! Field names and their order are the JSON schema consumed downstream, so
//! they are serialized as-is.

use serde::{Deserialize, Serialize};

/// One talk card, flattened.
///
/// All string fields are trimmed of surrounding whitespace at extraction
/// time. `talk_description` is `None` for exports that never carry a
/// description, and is then omitted from the JSON entirely.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TalkRecord {
    /// Speaker full name.
    pub name: String,
    /// Company or role; empty when the card has none.
    pub job_title: String,
    /// Talk title.
    pub talk_title: String,
    /// Talk abstract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub talk_description: Option<String>,
    /// Avatar image URL.
    pub avatar_url: String,
}

/// JugRu export with the page logo embedded as a `data:` URI.
#[derive(Debug, Deserialize, Serialize)]
pub struct SpeakersWithLogo {
    pub speakers: Vec<TalkRecord>,
    pub logo: String,
}

/// Everything a single run can write: a bare array of talks, or the JugRu
/// object with the logo attached. The OpenGraph renderer reads either shape.
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Export {
    Talks(Vec<TalkRecord>),
    WithLogo(SpeakersWithLogo),
}

impl Export {
    pub fn talk_count(&self) -> usize {
        match self {
            Export::Talks(talks) => talks.len(),
            Export::WithLogo(export) => export.speakers.len(),
        }
    }

    /// Split into the talks and the logo, if the export carries one.
    pub fn into_parts(self) -> (Vec<TalkRecord>, Option<String>) {
        match self {
            Export::Talks(talks) => (talks, None),
            Export::WithLogo(export) => (export.speakers, Some(export.logo)),
        }
    }
}
