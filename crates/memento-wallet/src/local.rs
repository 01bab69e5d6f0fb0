use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use memento_crypto::{SigningKey, VerifyingKey};
use memento_types::AccountAddress;
use tracing::debug;

use crate::authorship::SignatureBlob;
use crate::error::{WalletError, WalletResult};
use crate::network::NetworkConfig;
use crate::wallet::Wallet;

/// Development wallet holding a single Ed25519 key in memory.
///
/// Starts connected, approving every request, on [`NetworkConfig::localhost`].
/// The switches below let tests and local runs model a user who declines, a
/// disconnected account, or a missing wallet.
pub struct LocalWallet {
    key: SigningKey,
    inner: RwLock<LocalState>,
}

struct LocalState {
    connected: bool,
    approve: bool,
    available: bool,
    chain_id: u64,
    networks: BTreeMap<u64, NetworkConfig>,
}

impl LocalWallet {
    pub fn new(key: SigningKey) -> Self {
        let home = NetworkConfig::localhost();
        let mut networks = BTreeMap::new();
        let chain_id = home.chain_id;
        networks.insert(chain_id, home);
        Self {
            key,
            inner: RwLock::new(LocalState {
                connected: true,
                approve: true,
                available: true,
                chain_id,
                networks,
            }),
        }
    }

    /// Wallet with a freshly generated key.
    pub fn generate() -> Self {
        Self::new(SigningKey::generate())
    }

    /// Start on `network` instead of the local chain.
    pub fn on_network(self, network: NetworkConfig) -> Self {
        if let Ok(mut state) = self.inner.write() {
            state.chain_id = network.chain_id;
            state.networks.insert(network.chain_id, network);
        }
        self
    }

    pub fn address(&self) -> AccountAddress {
        self.key.address()
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    pub fn connect(&self) -> WalletResult<()> {
        self.write()?.connected = true;
        Ok(())
    }

    pub fn disconnect(&self) -> WalletResult<()> {
        self.write()?.connected = false;
        Ok(())
    }

    /// When `false`, every signing request is rejected as if by the user.
    pub fn set_approval(&self, approve: bool) -> WalletResult<()> {
        self.write()?.approve = approve;
        Ok(())
    }

    /// When `false`, every call fails with [`WalletError::Unavailable`].
    pub fn set_available(&self, available: bool) -> WalletResult<()> {
        self.write()?.available = available;
        Ok(())
    }

    /// Networks the wallet knows about, ordered by chain id.
    pub fn known_networks(&self) -> WalletResult<Vec<NetworkConfig>> {
        Ok(self.read()?.networks.values().cloned().collect())
    }

    fn read(&self) -> WalletResult<std::sync::RwLockReadGuard<'_, LocalState>> {
        let state = self.inner.read().map_err(|_| WalletError::LockPoisoned)?;
        if !state.available {
            return Err(WalletError::Unavailable("local wallet disabled".into()));
        }
        Ok(state)
    }

    fn write(&self) -> WalletResult<std::sync::RwLockWriteGuard<'_, LocalState>> {
        self.inner.write().map_err(|_| WalletError::LockPoisoned)
    }

    fn write_available(&self) -> WalletResult<std::sync::RwLockWriteGuard<'_, LocalState>> {
        let state = self.write()?;
        if !state.available {
            return Err(WalletError::Unavailable("local wallet disabled".into()));
        }
        Ok(state)
    }
}

#[async_trait]
impl Wallet for LocalWallet {
    async fn connected_account(&self) -> WalletResult<Option<AccountAddress>> {
        let state = self.read()?;
        Ok(state.connected.then(|| self.key.address()))
    }

    async fn chain_id(&self) -> WalletResult<u64> {
        Ok(self.read()?.chain_id)
    }

    async fn sign_message(&self, message: &str) -> WalletResult<SignatureBlob> {
        {
            let state = self.read()?;
            if !state.connected {
                return Err(WalletError::NotConnected);
            }
            if !state.approve {
                debug!("local wallet declined signature request");
                return Err(WalletError::Rejected);
            }
        }
        let signature = self.key.sign(message.as_bytes());
        Ok(SignatureBlob::from(signature))
    }

    async fn add_network(&self, network: &NetworkConfig) -> WalletResult<()> {
        self.write_available()?
            .networks
            .insert(network.chain_id, network.clone());
        Ok(())
    }

    async fn select_network(&self, chain_id: u64) -> WalletResult<()> {
        let mut state = self.write_available()?;
        if !state.networks.contains_key(&chain_id) {
            return Err(WalletError::UnknownNetwork(chain_id));
        }
        state.chain_id = chain_id;
        Ok(())
    }
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
