use async_trait::async_trait;
use memento_types::{AccountAddress, ContentHash, ContractProof};
use serde::{Deserialize, Serialize};

use crate::error::ContractResult;
use crate::tx::{TxHash, TxStatus};

/// Raw `getBasicProof` result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractBasicProof {
    pub creator: String,
    pub timestamp: u64,
}

/// Boundary to the deployed proof registry contract.
///
/// Reads return the contract's raw shapes; callers validate them. Writes
/// return as soon as the transaction is accepted and do not wait for it to
/// be mined.
#[async_trait]
pub trait RegistryContract: Send + Sync {
    /// `createProof(fileHash, metadataHash)` sent from `sender`.
    async fn create_proof(
        &self,
        sender: AccountAddress,
        file_hash: ContentHash,
        metadata_hash: ContentHash,
    ) -> ContractResult<TxHash>;

    async fn proof_exists(&self, file_hash: &ContentHash) -> ContractResult<bool>;

    /// Fails with `ProofNotFound` when no proof is recorded for `file_hash`.
    async fn get_proof(&self, file_hash: &ContentHash) -> ContractResult<ContractProof>;

    async fn get_basic_proof(&self, file_hash: &ContentHash) -> ContractResult<ContractBasicProof>;

    async fn creator_proof_count(&self, creator: &AccountAddress) -> ContractResult<u64>;

    async fn transaction_status(&self, tx: &TxHash) -> ContractResult<TxStatus>;
}
