use memento_crypto::hasher::DEFAULT_MAX_SIZE;
use memento_crypto::{ContentHasher, HashAlgorithm};
use memento_types::AccountAddress;
use memento_wallet::NetworkConfig;
use serde::{Deserialize, Serialize};

use crate::links::ExplorerLinks;

/// Settings shared by every workflow run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Network the registry lives on; the wallet is switched to it before submitting.
    pub network: NetworkConfig,
    pub hash_algorithm: HashAlgorithm,
    /// Largest file accepted for hashing, in bytes.
    pub max_file_size: u64,
    /// Address of the deployed registry contract, shown on certificates.
    pub contract_address: Option<AccountAddress>,
}

impl WorkflowConfig {
    pub fn hasher(&self) -> ContentHasher {
        ContentHasher::new(self.hash_algorithm)
    }

    pub fn explorer(&self) -> ExplorerLinks {
        ExplorerLinks::for_network(&self.network)
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::sepolia(),
            hash_algorithm: HashAlgorithm::Sha256,
            max_file_size: DEFAULT_MAX_SIZE,
            contract_address: None,
        }
    }
}
