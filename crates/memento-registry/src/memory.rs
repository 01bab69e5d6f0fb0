use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use memento_types::{AccountAddress, ContentHash, ContractProof, Proof, ProofTimestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ContractError, ContractResult, SnapshotError};
use crate::traits::{ContractBasicProof, RegistryContract};
use crate::tx::{TxHash, TxStatus};

/// When submitted transactions are mined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationMode {
    /// Every transaction is mined in its own block as soon as it is accepted.
    #[default]
    Instant,
    /// Transactions stay pending until [`InMemoryRegistry::mine_block`].
    Manual,
}

/// In-process simulation of the registry contract and the node in front of it.
///
/// Behaves like the deployed contract: one proof per file hash, the zero
/// hash is refused, proofs are only readable once their transaction is
/// mined, and the creator counter increments on every mined proof. A
/// submission whose file hash is already pending is refused up front, as a
/// node's pending-state preflight would.
pub struct InMemoryRegistry {
    mode: ConfirmationMode,
    inner: RwLock<RegistryState>,
}

/// Serializable registry state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub block_number: u64,
    pub nonce: u64,
    pub proofs: BTreeMap<ContentHash, Proof>,
    pub creator_counts: BTreeMap<AccountAddress, u64>,
    pub transactions: BTreeMap<TxHash, TxRecord>,
    /// Pending transactions in submission order.
    pub pending: Vec<TxHash>,
}

/// A transaction as the simulated node tracks it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRecord {
    pub sender: AccountAddress,
    pub file_hash: ContentHash,
    pub metadata_hash: ContentHash,
    pub status: TxStatus,
}

struct RegistryState {
    snapshot: RegistrySnapshot,
    reachable: bool,
}

impl InMemoryRegistry {
    pub fn new(mode: ConfirmationMode) -> Self {
        Self::from_snapshot(RegistrySnapshot::default(), mode)
    }

    pub fn from_snapshot(snapshot: RegistrySnapshot, mode: ConfirmationMode) -> Self {
        Self {
            mode,
            inner: RwLock::new(RegistryState {
                snapshot,
                reachable: true,
            }),
        }
    }

    pub fn mode(&self) -> ConfirmationMode {
        self.mode
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Result<RegistrySnapshot, SnapshotError> {
        let state = self
            .inner
            .read()
            .map_err(|_| SnapshotError::State("registry read lock poisoned".into()))?;
        Ok(state.snapshot.clone())
    }

    /// Write the current state to `path` as JSON.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let snapshot = self.snapshot()?;
        let json = serde_json::to_vec_pretty(&snapshot)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), proofs = snapshot.proofs.len(), "registry saved");
        Ok(())
    }

    /// Load state from `path`, or start empty when the file does not exist.
    pub fn load(path: &Path, mode: ConfirmationMode) -> Result<Self, SnapshotError> {
        if !path.exists() {
            return Ok(Self::new(mode));
        }
        let bytes = fs::read(path)?;
        let snapshot: RegistrySnapshot = serde_json::from_slice(&bytes)?;
        debug!(path = %path.display(), proofs = snapshot.proofs.len(), "registry loaded");
        Ok(Self::from_snapshot(snapshot, mode))
    }

    /// Simulate losing (or regaining) the connection to the node.
    pub fn set_reachable(&self, reachable: bool) -> ContractResult<()> {
        self.inner
            .write()
            .map_err(|_| poisoned())?
            .reachable = reachable;
        Ok(())
    }

    /// Mine every pending transaction into one new block.
    ///
    /// Returns the new block number, or the current one if nothing was pending.
    pub fn mine_block(&self) -> ContractResult<u64> {
        let mut state = self.write()?;
        Ok(mine_pending(&mut state.snapshot))
    }

    /// Revert a pending transaction without mining it.
    pub fn revert_pending(&self, tx: &TxHash, reason: &str) -> ContractResult<()> {
        let mut state = self.write()?;
        let snapshot = &mut state.snapshot;
        let Some(index) = snapshot.pending.iter().position(|p| p == tx) else {
            return Err(ContractError::Reverted(format!("{tx} is not pending")));
        };
        snapshot.pending.remove(index);
        if let Some(record) = snapshot.transactions.get_mut(tx) {
            record.status = TxStatus::Reverted {
                reason: reason.to_string(),
            };
        }
        info!(tx = %tx, reason, "transaction reverted");
        Ok(())
    }

    /// Number of transactions awaiting a block.
    pub fn pending_count(&self) -> ContractResult<usize> {
        Ok(self.read()?.snapshot.pending.len())
    }

    fn read(&self) -> ContractResult<std::sync::RwLockReadGuard<'_, RegistryState>> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        if !state.reachable {
            return Err(unreachable());
        }
        Ok(state)
    }

    fn write(&self) -> ContractResult<std::sync::RwLockWriteGuard<'_, RegistryState>> {
        let state = self.inner.write().map_err(|_| poisoned())?;
        if !state.reachable {
            return Err(unreachable());
        }
        Ok(state)
    }

    fn confirmed_proof(&self, file_hash: &ContentHash) -> ContractResult<Proof> {
        self.read()?
            .snapshot
            .proofs
            .get(file_hash)
            .cloned()
            .ok_or(ContractError::ProofNotFound)
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new(ConfirmationMode::default())
    }
}

fn poisoned() -> ContractError {
    ContractError::Connectivity("registry state lock poisoned".into())
}

fn unreachable() -> ContractError {
    ContractError::Connectivity("node unreachable".into())
}

fn derive_tx_hash(
    nonce: u64,
    sender: &AccountAddress,
    file_hash: &ContentHash,
    metadata_hash: &ContentHash,
) -> TxHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"memento-tx-v1:");
    hasher.update(&nonce.to_le_bytes());
    hasher.update(sender.as_bytes());
    hasher.update(file_hash.as_bytes());
    hasher.update(metadata_hash.as_bytes());
    TxHash::from_bytes(*hasher.finalize().as_bytes())
}

fn mine_pending(snapshot: &mut RegistrySnapshot) -> u64 {
    if snapshot.pending.is_empty() {
        return snapshot.block_number;
    }
    snapshot.block_number += 1;
    let block_number = snapshot.block_number;
    let timestamp = ProofTimestamp::now();

    for tx in std::mem::take(&mut snapshot.pending) {
        let Some(record) = snapshot.transactions.get_mut(&tx) else {
            continue;
        };
        if snapshot.proofs.contains_key(&record.file_hash) {
            record.status = TxStatus::Reverted {
                reason: ContractError::ProofAlreadyExists.to_string(),
            };
            continue;
        }
        snapshot.proofs.insert(
            record.file_hash,
            Proof {
                file_hash: record.file_hash,
                metadata_hash: record.metadata_hash,
                creator: record.sender,
                timestamp,
            },
        );
        *snapshot.creator_counts.entry(record.sender).or_insert(0) += 1;
        record.status = TxStatus::Confirmed { block_number };
        debug!(tx = %tx, block_number, file_hash = %record.file_hash, "proof mined");
    }
    block_number
}

#[async_trait]
impl RegistryContract for InMemoryRegistry {
    async fn create_proof(
        &self,
        sender: AccountAddress,
        file_hash: ContentHash,
        metadata_hash: ContentHash,
    ) -> ContractResult<TxHash> {
        let mut state = self.write()?;
        let snapshot = &mut state.snapshot;

        if file_hash.is_zero() {
            return Err(ContractError::InvalidHash);
        }
        let pending_duplicate = snapshot.pending.iter().any(|tx| {
            snapshot
                .transactions
                .get(tx)
                .is_some_and(|r| r.file_hash == file_hash)
        });
        if pending_duplicate || snapshot.proofs.contains_key(&file_hash) {
            return Err(ContractError::ProofAlreadyExists);
        }

        snapshot.nonce += 1;
        let tx = derive_tx_hash(snapshot.nonce, &sender, &file_hash, &metadata_hash);
        snapshot.transactions.insert(
            tx,
            TxRecord {
                sender,
                file_hash,
                metadata_hash,
                status: TxStatus::Pending,
            },
        );
        snapshot.pending.push(tx);
        info!(tx = %tx, file_hash = %file_hash, sender = %sender, "createProof accepted");

        if self.mode == ConfirmationMode::Instant {
            mine_pending(snapshot);
        }
        Ok(tx)
    }

    async fn proof_exists(&self, file_hash: &ContentHash) -> ContractResult<bool> {
        Ok(self.read()?.snapshot.proofs.contains_key(file_hash))
    }

    async fn get_proof(&self, file_hash: &ContentHash) -> ContractResult<ContractProof> {
        self.confirmed_proof(file_hash).map(|p| ContractProof::from(&p))
    }

    async fn get_basic_proof(&self, file_hash: &ContentHash) -> ContractResult<ContractBasicProof> {
        let proof = self.confirmed_proof(file_hash)?;
        Ok(ContractBasicProof {
            creator: proof.creator.to_hex(),
            timestamp: proof.timestamp.as_secs(),
        })
    }

    async fn creator_proof_count(&self, creator: &AccountAddress) -> ContractResult<u64> {
        Ok(self
            .read()?
            .snapshot
            .creator_counts
            .get(creator)
            .copied()
            .unwrap_or(0))
    }

    async fn transaction_status(&self, tx: &TxHash) -> ContractResult<TxStatus> {
        Ok(self
            .read()?
            .snapshot
            .transactions
            .get(tx)
            .map(|r| r.status.clone())
            .unwrap_or(TxStatus::Unknown))
    }
}
