use memento_crypto::{CanonicalError, HashError};
use memento_registry::{ContractError, RegistryError, TxHash};
use memento_types::{AccountAddress, ContentHash, TypeError};
use memento_wallet::{SignatureError, WalletError};
use thiserror::Error;

/// Which party a workflow failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad or missing input the user can correct.
    UserInput,
    /// The wallet could not do what was asked.
    Capability,
    /// The registry refused or could not be reached.
    Registry,
    /// The step was attempted out of order.
    Transition,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("a title is required")]
    MissingTitle,

    #[error("invalid input: {0}")]
    InvalidInput(#[from] TypeError),

    #[error("invalid query parameter {key:?}: {reason}")]
    InvalidQuery { key: &'static str, reason: String },

    #[error("file could not be hashed: {0}")]
    Hash(#[from] HashError),

    #[error("metadata could not be canonicalized: {0}")]
    Canonical(#[from] CanonicalError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("wallet is on chain {actual}, but the registry is on chain {expected}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("authorship was signed by {signer}, but {connected} is connected")]
    SignerMismatch {
        signer: AccountAddress,
        connected: AccountAddress,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("transaction {tx} reverted: {reason}")]
    Reverted { tx: TxHash, reason: String },

    #[error("the proof for {0} belongs to a different creator or metadata")]
    ProofMismatch(ContentHash),

    #[error("enter the creation details first")]
    DetailsRequired,

    #[error("hash a file first")]
    FileRequired,

    #[error("sign the authorship statement for the current file first")]
    SignatureRequired,

    #[error("a proof has already been submitted for this workflow")]
    AlreadySubmitted,

    #[error("nothing has been submitted yet")]
    NotSubmitted,
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

impl WorkflowError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingTitle
            | Self::InvalidInput(_)
            | Self::InvalidQuery { .. }
            | Self::Hash(_)
            | Self::Canonical(_) => ErrorCategory::UserInput,
            Self::Signature(_)
            | Self::Wallet(_)
            | Self::WrongNetwork { .. }
            | Self::SignerMismatch { .. } => ErrorCategory::Capability,
            Self::Registry(_) | Self::Reverted { .. } | Self::ProofMismatch(_) => {
                ErrorCategory::Registry
            }
            Self::DetailsRequired
            | Self::FileRequired
            | Self::SignatureRequired
            | Self::AlreadySubmitted
            | Self::NotSubmitted => ErrorCategory::Transition,
        }
    }

    /// Whether the user can get past this failure without restarting the
    /// workflow or restoring a capability.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Signature(e) => e.is_recoverable(),
            Self::Wallet(e) => matches!(e, WalletError::Busy | WalletError::Rejected),
            Self::Registry(RegistryError::AlreadyExists(_)) => false,
            Self::Registry(RegistryError::InvalidHash { .. }) => false,
            Self::Registry(RegistryError::Submission(e)) => {
                matches!(e, ContractError::Connectivity(_) | ContractError::Reverted(_))
            }
            Self::ProofMismatch(_) | Self::AlreadySubmitted => false,
            _ => true,
        }
    }
}
