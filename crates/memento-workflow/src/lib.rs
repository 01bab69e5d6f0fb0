//! Proof-creation workflow for Memento.
//!
//! Sequences hashing, metadata canonicalization, authorship signing, and
//! registry submission across the steps a creator walks through:
//! select type, enter details, hash the file, sign, submit, view the
//! certificate. In-progress state travels as query parameters; nothing is
//! stored server-side.
//!
//! # Key Types
//!
//! - [`WorkflowController`] — the step state machine
//! - [`WorkflowState`] — navigable state, encodable as a query string
//! - [`WorkflowError`] — typed step failures with a category and recoverability
//! - [`Certificate`] — view model of a confirmed proof
//! - [`WorkflowConfig`] — network, hash algorithm, and size limit

pub mod certificate;
pub mod config;
pub mod controller;
pub mod error;
pub mod links;
pub mod state;

pub use certificate::{format_file_size, Certificate};
pub use config::WorkflowConfig;
pub use controller::{WorkflowController, WorkflowRunId};
pub use error::{ErrorCategory, WorkflowError, WorkflowResult};
pub use links::ExplorerLinks;
pub use state::{certificate_path, DetailsInput, WorkflowState, WorkflowStep};

// Re-export the types callers need to wire a controller.
pub use memento_registry::{ProofRegistryClient, TxReference, TxStatus};
pub use memento_types::{ContentHash, ContentType, CreationMetadata, Proof};
pub use memento_wallet::{WalletSession, NetworkConfig};
