use async_trait::async_trait;
use memento_types::AccountAddress;
use tracing::{debug, info};

use crate::authorship::SignatureBlob;
use crate::error::{WalletError, WalletResult};
use crate::network::NetworkConfig;

/// External signing and network-selection capability.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// The connected account, or `None` when no account is connected.
    async fn connected_account(&self) -> WalletResult<Option<AccountAddress>>;

    /// Chain id the wallet is currently on.
    async fn chain_id(&self) -> WalletResult<u64>;

    /// Sign a human-readable message with the connected account.
    ///
    /// Fails with [`WalletError::Rejected`] when the user declines.
    async fn sign_message(&self, message: &str) -> WalletResult<SignatureBlob>;

    /// Register a network with the wallet without selecting it.
    async fn add_network(&self, network: &NetworkConfig) -> WalletResult<()>;

    /// Select an already-known network. Fails with
    /// [`WalletError::UnknownNetwork`] if the wallet has never seen it.
    async fn select_network(&self, chain_id: u64) -> WalletResult<()>;

    /// Switch to `network`, adding it first if the wallet does not know it.
    ///
    /// Returns whether the wallet ended up on the requested chain.
    async fn switch_network(&self, network: &NetworkConfig) -> WalletResult<bool> {
        if self.chain_id().await? == network.chain_id {
            return Ok(true);
        }
        match self.select_network(network.chain_id).await {
            Ok(()) => {}
            Err(WalletError::UnknownNetwork(_)) => {
                debug!(chain_id = network.chain_id, name = %network.name, "adding network to wallet");
                self.add_network(network).await?;
                self.select_network(network.chain_id).await?;
            }
            Err(e) => return Err(e),
        }
        let on_network = self.chain_id().await? == network.chain_id;
        info!(chain_id = network.chain_id, on_network, "network switch");
        Ok(on_network)
    }
}
