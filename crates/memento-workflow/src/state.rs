use std::fmt;

use chrono::NaiveDate;
use memento_crypto::HashedFile;
use memento_registry::TxReference;
use memento_types::{parse_date, ContentHash, ContentType, CreationMetadata};
use memento_wallet::AuthorshipSignature;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::{WorkflowError, WorkflowResult};

/// Steps of the proof-creation flow, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    TypeSelected,
    DetailsEntered,
    FileHashed,
    AuthorshipSigned,
    ProofSubmitted,
    Confirmed,
}

impl WorkflowStep {
    pub const ALL: [WorkflowStep; 6] = [
        Self::TypeSelected,
        Self::DetailsEntered,
        Self::FileHashed,
        Self::AuthorshipSigned,
        Self::ProofSubmitted,
        Self::Confirmed,
    ];

    /// 1-based position in the flow.
    pub fn number(&self) -> usize {
        *self as usize + 1
    }

    /// The step before this one. The first step is its own predecessor.
    pub fn previous(&self) -> Self {
        match self {
            Self::TypeSelected | Self::DetailsEntered => Self::TypeSelected,
            Self::FileHashed => Self::DetailsEntered,
            Self::AuthorshipSigned => Self::FileHashed,
            Self::ProofSubmitted => Self::AuthorshipSigned,
            Self::Confirmed => Self::ProofSubmitted,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TypeSelected => "Choose type",
            Self::DetailsEntered => "Details",
            Self::FileHashed => "Upload",
            Self::AuthorshipSigned => "Sign",
            Self::ProofSubmitted => "Submit",
            Self::Confirmed => "Certificate",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.number(), Self::ALL.len(), self.label())
    }
}

/// Creation details as typed by the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DetailsInput {
    pub title: String,
    pub description: Option<String>,
    pub tags: Option<String>,
    /// `YYYY-MM-DD`; today when absent or blank.
    pub date: Option<String>,
}

impl DetailsInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

/// Everything the workflow knows so far.
///
/// The descriptive fields and file facts travel between steps as query
/// parameters. The signature and transaction stay in memory only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub content_type: ContentType,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub date: Option<NaiveDate>,
    pub file: Option<HashedFile>,
    #[serde(skip)]
    pub signature: Option<AuthorshipSignature>,
    #[serde(skip)]
    pub transaction: Option<TxReference>,
}

impl WorkflowState {
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            ..Self::default()
        }
    }

    pub fn file_hash(&self) -> Option<&ContentHash> {
        self.file.as_ref().map(|f| &f.hash)
    }

    pub fn has_details(&self) -> bool {
        self.title.is_some() && self.date.is_some()
    }

    /// The signature, if it covers the current file.
    pub fn current_signature(&self) -> Option<&AuthorshipSignature> {
        let hash = self.file_hash()?;
        self.signature.as_ref().filter(|s| s.covers(hash))
    }

    /// The furthest step this state supports.
    pub fn derived_step(&self) -> WorkflowStep {
        if self.transaction.is_some() {
            WorkflowStep::ProofSubmitted
        } else if !self.has_details() {
            WorkflowStep::TypeSelected
        } else if self.file.is_none() {
            WorkflowStep::DetailsEntered
        } else if self.current_signature().is_none() {
            WorkflowStep::FileHashed
        } else {
            WorkflowStep::AuthorshipSigned
        }
    }

    /// Build the metadata record bound to the proof.
    pub fn metadata(&self) -> WorkflowResult<CreationMetadata> {
        let (Some(title), Some(date)) = (self.title.as_deref(), self.date) else {
            return Err(WorkflowError::DetailsRequired);
        };
        let mut meta = CreationMetadata::new(title, date).map_err(|_| WorkflowError::MissingTitle)?;
        if let Some(description) = &self.description {
            meta = meta.with_description(description.as_str());
        }
        if let Some(tags) = &self.tags {
            meta = meta.with_tags(tags);
        }
        if let Some(file) = &self.file {
            meta = meta.with_file(file.filename.as_str(), file.size);
        }
        Ok(meta)
    }

    /// Certificate route for the hashed file, e.g. `/proof/ab12…`.
    pub fn certificate_path(&self) -> Option<String> {
        self.file_hash().map(certificate_path)
    }

    /// Encode the navigable fields as a query string (no leading `?`).
    pub fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("type", self.content_type.as_str());
        if let Some(title) = &self.title {
            query.append_pair("title", title);
        }
        if let Some(description) = &self.description {
            query.append_pair("description", description);
        }
        if let Some(tags) = &self.tags {
            query.append_pair("tags", tags);
        }
        if let Some(date) = &self.date {
            query.append_pair("date", &date.format("%Y-%m-%d").to_string());
        }
        if let Some(file) = &self.file {
            query.append_pair("hash", &file.hash.to_hex());
            query.append_pair("filename", &file.filename);
            query.append_pair("filesize", &file.size.to_string());
        }
        query.finish()
    }

    /// Rebuild state from a query string. Unknown keys are ignored, as is an
    /// unknown `type` (which falls back to document).
    pub fn from_query(query: &str) -> WorkflowResult<Self> {
        let mut content_type = None;
        let mut title = None;
        let mut description = None;
        let mut tags = None;
        let mut date = None;
        let mut hash = None;
        let mut filename = None;
        let mut filesize = None;

        let query = query.trim().trim_start_matches('?');
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim().to_string();
            match key.as_ref() {
                "type" => content_type = Some(value),
                "title" => title = non_empty(value),
                "description" => description = non_empty(value),
                "tags" => tags = non_empty(value),
                "date" => date = non_empty(value),
                "hash" => hash = non_empty(value),
                "filename" => filename = non_empty(value),
                "filesize" => filesize = non_empty(value),
                _ => {}
            }
        }

        let date = match date {
            Some(d) => Some(parse_date(&d)?),
            None => title.as_ref().map(|_| today()),
        };
        let file = match hash {
            Some(hex) => {
                let hash = ContentHash::from_hex(&hex).map_err(|e| WorkflowError::InvalidQuery {
                    key: "hash",
                    reason: e.to_string(),
                })?;
                let size = filesize
                    .ok_or_else(|| WorkflowError::InvalidQuery {
                        key: "filesize",
                        reason: "required with hash".into(),
                    })?
                    .parse::<u64>()
                    .map_err(|e| WorkflowError::InvalidQuery {
                        key: "filesize",
                        reason: e.to_string(),
                    })?;
                Some(HashedFile {
                    hash,
                    filename: filename.unwrap_or_default(),
                    size,
                })
            }
            None => None,
        };

        let mut state = Self::new(ContentType::from_param(content_type.as_deref()));
        if let (Some(title), Some(date)) = (title, date) {
            // Route through the metadata record so values are normalized the
            // same way as freshly entered details.
            let mut meta = CreationMetadata::new(title, date)?;
            if let Some(description) = description {
                meta = meta.with_description(description);
            }
            if let Some(tags) = tags {
                meta = meta.with_tags(tags);
            }
            state.title = Some(meta.title().to_string());
            state.description = meta.description().map(str::to_string);
            state.tags = meta.tags().map(str::to_string);
            state.date = Some(meta.date());
        }
        state.file = file;
        Ok(state)
    }
}

/// Certificate route for a file hash.
pub fn certificate_path(file_hash: &ContentHash) -> String {
    format!("/proof/{}", file_hash.to_hex())
}

pub(crate) fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
