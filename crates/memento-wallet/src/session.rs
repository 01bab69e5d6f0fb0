use std::sync::Arc;

use memento_types::AccountAddress;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{WalletError, WalletResult};
use crate::wallet::Wallet;

/// Owned handle to a wallet connection.
///
/// At most one signing or submission request may be outstanding per session.
/// A second request while one is in flight fails with [`WalletError::Busy`]
/// rather than queueing.
#[derive(Clone)]
pub struct WalletSession {
    wallet: Arc<dyn Wallet>,
    in_flight: Arc<Mutex<()>>,
}

/// Held for the duration of a wallet request. Dropping it frees the session.
pub struct RequestGuard {
    _permit: OwnedMutexGuard<()>,
}

impl WalletSession {
    pub fn new(wallet: Arc<dyn Wallet>) -> Self {
        Self {
            wallet,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    pub fn wallet(&self) -> &dyn Wallet {
        self.wallet.as_ref()
    }

    /// Claim the session for one request.
    pub fn begin_request(&self) -> WalletResult<RequestGuard> {
        let permit = self
            .in_flight
            .clone()
            .try_lock_owned()
            .map_err(|_| WalletError::Busy)?;
        Ok(RequestGuard { _permit: permit })
    }

    /// Whether a request currently holds the session.
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// The connected account, or [`WalletError::NotConnected`].
    pub async fn account(&self) -> WalletResult<AccountAddress> {
        self.wallet
            .connected_account()
            .await?
            .ok_or(WalletError::NotConnected)
    }
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}
