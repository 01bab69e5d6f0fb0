use thiserror::Error;

/// Errors reported by a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("no account connected")]
    NotConnected,

    #[error("request rejected by the user")]
    Rejected,

    #[error("wallet unavailable: {0}")]
    Unavailable(String),

    #[error("network with chain id {0} is not known to the wallet")]
    UnknownNetwork(u64),

    #[error("another wallet request is already outstanding")]
    Busy,

    #[error("wallet state lock poisoned")]
    LockPoisoned,
}

pub type WalletResult<T> = Result<T, WalletError>;

/// Failure to obtain an authorship signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The user declined to sign. Asking again is allowed.
    #[error("signature declined")]
    Declined,

    #[error("signing capability unavailable: {0}")]
    Unavailable(String),

    #[error("no account connected")]
    NotConnected,

    #[error("a signing or submission request is already outstanding")]
    Busy,
}

impl SignatureError {
    /// Whether the user can retry right away.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Declined | Self::Busy)
    }
}

impl From<WalletError> for SignatureError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Rejected => Self::Declined,
            WalletError::NotConnected => Self::NotConnected,
            WalletError::Busy => Self::Busy,
            WalletError::Unavailable(reason) => Self::Unavailable(reason),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_maps_to_declined() {
        let err = SignatureError::from(WalletError::Rejected);
        assert_eq!(err, SignatureError::Declined);
        assert!(err.is_recoverable());
    }

    #[test]
    fn unavailable_is_fatal() {
        let err = SignatureError::from(WalletError::Unavailable("extension missing".into()));
        assert!(!err.is_recoverable());
        assert!(!SignatureError::from(WalletError::NotConnected).is_recoverable());
    }

    #[test]
    fn other_errors_become_unavailable() {
        assert!(matches!(
            SignatureError::from(WalletError::LockPoisoned),
            SignatureError::Unavailable(_)
        ));
    }
}
