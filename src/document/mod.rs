//! Retrievable content records.
//!
//! A [`Document`] serializes to a flat JSON object; metadata keys sit next to
//! the content keys (`post_date` and `created_at` are accepted as aliases).
//! Explicit `null`s read as the field's empty value.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::DocumentError;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Which document field an index encodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EncodeField {
    #[default]
    Title,
    Text,
    RawText,
    FirstQuestion,
}

impl EncodeField {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodeField::Title => "title",
            EncodeField::Text => "text",
            EncodeField::RawText => "raw_text",
            EncodeField::FirstQuestion => "first_question",
        }
    }
}

impl fmt::Display for EncodeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncodeField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(EncodeField::Title),
            "text" => Ok(EncodeField::Text),
            "raw_text" => Ok(EncodeField::RawText),
            "question" | "first_question" => Ok(EncodeField::FirstQuestion),
            other => Err(format!(
                "unknown encode field '{}' (expected title, text, raw_text or question)",
                other
            )),
        }
    }
}

/// Optional provenance attached to a [`Document`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Publish date as found in the source data.
    #[serde(default, alias = "post_date")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Accepts RFC 3339 as well as bare dates and years; anything else reads as `None`.
    #[serde(default, alias = "created_at", deserialize_with = "lenient_timestamp")]
    pub ingested_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default = "generate_document_id", deserialize_with = "id_or_generated")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Primary text content.
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    /// Unprocessed source text; preferred over `text` for reranking.
    #[serde(default, deserialize_with = "null_as_default")]
    pub raw_text: String,
    /// Paraphrases or questions this document answers.
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<String>,
    #[serde(flatten)]
    pub metadata: DocumentMetadata,
}

/// Generates a random document identifier (UUID v4).
pub fn generate_document_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn id_or_generated<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(generate_document_id))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let parsed = parse_timestamp(&raw);
    if parsed.is_none() {
        debug!(value = %raw, "Ignoring unparseable document timestamp");
    }
    Ok(parsed)
}

/// Parses RFC 3339, `YYYY-MM-DD[ T]HH:MM:SS`, `YYYY-MM-DD` or `YYYY` as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(t.and_utc());
        }
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        let year = raw.parse::<i32>().ok().filter(|_| raw.len() == 4)?;
        NaiveDate::from_ymd_opt(year, 1, 1)
    })?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

impl Document {
    /// Creates a document with a generated id.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_id(generate_document_id(), title, text)
    }

    pub fn with_id(id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
            raw_text: String::new(),
            questions: Vec::new(),
            metadata: DocumentMetadata::default(),
        }
    }

    pub fn with_questions<I, S>(mut self, questions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.questions = questions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_raw_text(mut self, raw_text: impl Into<String>) -> Self {
        self.raw_text = raw_text.into();
        self
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Stamps the ingestion time with the current UTC clock.
    pub fn ingested_now(mut self) -> Self {
        self.metadata.ingested_at = Some(Utc::now());
        self
    }

    /// Returns the text an index encodes for `field`, or `None` if it is blank.
    pub fn encoding_text(&self, field: EncodeField) -> Option<&str> {
        let text = match field {
            EncodeField::Title => self.title.as_str(),
            EncodeField::Text => self.text.as_str(),
            EncodeField::RawText => self.raw_text.as_str(),
            EncodeField::FirstQuestion => self.questions.first()?.as_str(),
        };

        (!text.trim().is_empty()).then_some(text)
    }

    /// Text a cross scorer compares against the query: `raw_text` when
    /// present, `text` otherwise.
    pub fn rerank_text(&self) -> &str {
        if self.raw_text.trim().is_empty() {
            &self.text
        } else {
            &self.raw_text
        }
    }

    /// First `length` characters of the text, with `...` appended when truncated.
    pub fn summary(&self, length: usize) -> String {
        match self.text.char_indices().nth(length) {
            Some((byte_idx, _)) => format!("{}...", &self.text[..byte_idx]),
            None => self.text.clone(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a single document from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DocumentError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| DocumentError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title: String = self.title.chars().take(20).collect();
        write!(f, "<Document id={}, title={}...>", self.id, title)
    }
}

/// Reads a corpus from a JSON array of documents.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<Document>, DocumentError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| DocumentError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| DocumentError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}
