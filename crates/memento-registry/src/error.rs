use memento_types::ContentHash;
use thiserror::Error;

/// Errors raised by the registry contract boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("proof already exists")]
    ProofAlreadyExists,

    #[error("invalid file hash")]
    InvalidHash,

    #[error("proof does not exist")]
    ProofNotFound,

    #[error("transaction reverted: {0}")]
    Reverted(String),

    #[error("registry unreachable: {0}")]
    Connectivity(String),
}

pub type ContractResult<T> = Result<T, ContractError>;

/// Errors returned by [`ProofRegistryClient`](crate::ProofRegistryClient) submissions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid {field}: expected 32 bytes, got {length}")]
    InvalidHash { field: &'static str, length: usize },

    #[error("a proof for {0} already exists")]
    AlreadyExists(ContentHash),

    #[error("submission failed: {0}")]
    Submission(ContractError),
}

/// Errors from saving or loading registry state.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed registry snapshot: {0}")]
    Format(#[from] serde_json::Error),

    #[error("registry state unavailable: {0}")]
    State(String),
}
