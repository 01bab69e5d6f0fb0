use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Kind of creation being registered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Document,
    Code,
    Design,
    Music,
    Video,
    Other,
}

impl ContentType {
    /// All content types, in selection order.
    pub const ALL: [ContentType; 6] = [
        Self::Document,
        Self::Code,
        Self::Design,
        Self::Music,
        Self::Video,
        Self::Other,
    ];

    /// Query-parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Code => "code",
            Self::Design => "design",
            Self::Music => "music",
            Self::Video => "video",
            Self::Other => "other",
        }
    }

    /// Short description of the files this type covers.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Document => "PDF, Word, text files, contracts",
            Self::Code => "Source code, scripts, repositories",
            Self::Design => "Images, illustrations, mockups",
            Self::Music => "Audio tracks, compositions, stems",
            Self::Video => "Films, clips, animations",
            Self::Other => "Any other file",
        }
    }

    /// Parse a query-parameter value. Unknown or missing values fall back to
    /// [`ContentType::Document`].
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("code") => Self::Code,
            Some("design") => Self::Design,
            Some("music") => Self::Music,
            Some("video") => Self::Video,
            Some("other") => Self::Other,
            _ => Self::Document,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().to_ascii_uppercase())
    }
}

/// Descriptive metadata of a creation, hashed and bound to its proof.
///
/// Values are normalized on construction so that logically equal records
/// are also field-wise equal: text is trimmed, empty optional text becomes
/// absent, and tags are split on commas, trimmed, and re-joined with `,`.
/// Only the hash of this record ever leaves the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMetadata", into = "RawMetadata")]
pub struct CreationMetadata {
    title: String,
    description: Option<String>,
    tags: Option<String>,
    date: NaiveDate,
    filename: Option<String>,
    filesize: Option<u64>,
}

impl CreationMetadata {
    /// Create a record. The title must be non-empty after trimming.
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Result<Self, TypeError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(TypeError::MissingField("title"));
        }
        Ok(Self {
            title,
            description: None,
            tags: None,
            date,
            filename: None,
            filesize: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = normalize_text(&description.into());
        self
    }

    pub fn with_tags(mut self, tags: impl AsRef<str>) -> Self {
        self.tags = normalize_tags(tags.as_ref());
        self
    }

    /// Attach the name and size of the hashed file.
    pub fn with_file(mut self, filename: impl Into<String>, filesize: u64) -> Self {
        self.filename = normalize_text(&filename.into());
        self.filesize = Some(filesize);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Normalized comma-separated tags.
    pub fn tags(&self) -> Option<&str> {
        self.tags.as_deref()
    }

    /// Individual tags.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|t| t.split(',').collect())
            .unwrap_or_default()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn filesize(&self) -> Option<u64> {
        self.filesize
    }
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, TypeError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| TypeError::InvalidDate(value.to_string()))
}

fn normalize_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn normalize_tags(value: &str) -> Option<String> {
    let tags: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    (!tags.is_empty()).then(|| tags.join(","))
}

/// Unvalidated serde shape of [`CreationMetadata`].
#[derive(Serialize, Deserialize)]
struct RawMetadata {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Option<String>,
    date: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    filesize: Option<u64>,
}

impl TryFrom<RawMetadata> for CreationMetadata {
    type Error = TypeError;

    fn try_from(raw: RawMetadata) -> Result<Self, Self::Error> {
        let mut meta = CreationMetadata::new(raw.title, parse_date(&raw.date)?)?;
        if let Some(description) = raw.description {
            meta = meta.with_description(description);
        }
        if let Some(tags) = raw.tags {
            meta = meta.with_tags(tags);
        }
        meta.filename = raw.filename.as_deref().and_then(normalize_text);
        meta.filesize = raw.filesize;
        Ok(meta)
    }
}

impl From<CreationMetadata> for RawMetadata {
    fn from(meta: CreationMetadata) -> Self {
        Self {
            title: meta.title,
            description: meta.description,
            tags: meta.tags,
            date: meta.date.format("%Y-%m-%d").to_string(),
            filename: meta.filename,
            filesize: meta.filesize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn title_is_required() {
        assert_eq!(
            CreationMetadata::new("   ", day()).unwrap_err(),
            TypeError::MissingField("title")
        );
    }

    #[test]
    fn title_is_trimmed() {
        let meta = CreationMetadata::new("  Doc  ", day()).unwrap();
        assert_eq!(meta.title(), "Doc");
    }

    #[test]
    fn empty_optionals_become_absent() {
        let meta = CreationMetadata::new("Doc", day())
            .unwrap()
            .with_description("  ")
            .with_tags(" , ,");
        assert_eq!(meta.description(), None);
        assert_eq!(meta.tags(), None);
        assert_eq!(meta, CreationMetadata::new("Doc", day()).unwrap());
    }

    #[test]
    fn tags_are_normalized() {
        let meta = CreationMetadata::new("Doc", day())
            .unwrap()
            .with_tags(" rust, crypto ,,proofs ");
        assert_eq!(meta.tags(), Some("rust,crypto,proofs"));
        assert_eq!(meta.tag_list(), vec!["rust", "crypto", "proofs"]);
    }

    #[test]
    fn parse_date_accepts_iso() {
        assert_eq!(parse_date("2024-05-01").unwrap(), day());
        assert!(matches!(parse_date("05/01/2024"), Err(TypeError::InvalidDate(_))));
    }

    #[test]
    fn serde_roundtrip_normalizes() {
        let json = r#"{"title":" Doc ","description":"","tags":"a, b","date":"2024-05-01"}"#;
        let meta: CreationMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.title(), "Doc");
        assert_eq!(meta.description(), None);
        assert_eq!(meta.tags(), Some("a,b"));
        let back = serde_json::to_string(&meta).unwrap();
        let again: CreationMetadata = serde_json::from_str(&back).unwrap();
        assert_eq!(meta, again);
    }

    #[test]
    fn serde_rejects_missing_title() {
        let json = r#"{"title":"","date":"2024-05-01"}"#;
        assert!(serde_json::from_str::<CreationMetadata>(json).is_err());
    }

    #[test]
    fn content_type_param_fallback() {
        assert_eq!(ContentType::from_param(Some("music")), ContentType::Music);
        assert_eq!(ContentType::from_param(Some("VIDEO")), ContentType::Video);
        assert_eq!(ContentType::from_param(Some("podcast")), ContentType::Document);
        assert_eq!(ContentType::from_param(None), ContentType::Document);
    }

    #[test]
    fn content_type_display() {
        assert_eq!(format!("{}", ContentType::Design), "DESIGN");
        assert_eq!(ContentType::ALL.len(), 6);
    }
}
