//! Canonical serialization of creation metadata.
//!
//! The metadata hash bound to a proof must be reproducible by anyone holding
//! their own copy of the record, so the byte form is fixed:
//!
//! - compact JSON object, no insignificant whitespace
//! - keys always present, in the order `title, description, tags, date,
//!   filename, filesize`
//! - absent optional values encode as `null`
//! - `date` is `YYYY-MM-DD`, `filesize` a JSON number
//!
//! [`CreationMetadata`] normalizes its values on construction, so two
//! logically equal records always serialize to the same bytes.

use memento_types::{ContentHash, CreationMetadata};
use serde::Serialize;

use crate::hasher::ContentHasher;

#[derive(Serialize)]
struct CanonicalForm<'a> {
    title: &'a str,
    description: Option<&'a str>,
    tags: Option<&'a str>,
    date: String,
    filename: Option<&'a str>,
    filesize: Option<u64>,
}

impl<'a> From<&'a CreationMetadata> for CanonicalForm<'a> {
    fn from(meta: &'a CreationMetadata) -> Self {
        Self {
            title: meta.title(),
            description: meta.description(),
            tags: meta.tags(),
            date: meta.date().format("%Y-%m-%d").to_string(),
            filename: meta.filename(),
            filesize: meta.filesize(),
        }
    }
}

/// Canonical byte serialization of a metadata record.
pub fn canonical_bytes(meta: &CreationMetadata) -> Result<Vec<u8>, CanonicalError> {
    if meta.title().trim().is_empty() {
        return Err(CanonicalError::MissingField("title"));
    }
    serde_json::to_vec(&CanonicalForm::from(meta))
        .map_err(|e| CanonicalError::Serialization(e.to_string()))
}

/// Digest of the canonical serialization.
pub fn metadata_hash(
    meta: &CreationMetadata,
    hasher: &ContentHasher,
) -> Result<ContentHash, CanonicalError> {
    let bytes = canonical_bytes(meta)?;
    Ok(hasher.hash(&bytes))
}

/// Errors from canonicalization.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("serialization error: {0}")]
    Serialization(String),
}
