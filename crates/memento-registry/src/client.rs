use std::sync::Arc;

use chrono::Utc;
use memento_types::{AccountAddress, BasicProof, ContentHash, Proof, ProofTimestamp};
use tracing::{debug, info, warn};

use crate::error::{ContractError, RegistryError};
use crate::traits::RegistryContract;
use crate::tx::{TxHash, TxReference, TxStatus};

/// Client for the proof registry.
///
/// Submissions validate their inputs and surface typed failures. Reads
/// never fail: a missing proof, an unreachable node, and a malformed record
/// all come back as a negative answer, with the cause logged.
#[derive(Clone)]
pub struct ProofRegistryClient {
    contract: Arc<dyn RegistryContract>,
}

impl ProofRegistryClient {
    pub fn new(contract: Arc<dyn RegistryContract>) -> Self {
        Self { contract }
    }

    /// Submit a new proof from `sender`.
    ///
    /// Both hashes must be exactly 32 bytes. A missing metadata hash is sent
    /// as [`ContentHash::ZERO`]. Returns once the transaction is accepted;
    /// use [`transaction_status`](Self::transaction_status) to follow it.
    pub async fn submit_proof(
        &self,
        sender: AccountAddress,
        file_hash: &[u8],
        metadata_hash: Option<&[u8]>,
    ) -> Result<TxReference, RegistryError> {
        let file_hash = parse_hash("file hash", file_hash)?;
        let metadata_hash = match metadata_hash {
            Some(bytes) => parse_hash("metadata hash", bytes)?,
            None => ContentHash::ZERO,
        };

        debug!(file_hash = %file_hash, metadata_hash = %metadata_hash, sender = %sender, "submitting proof");
        let hash = self
            .contract
            .create_proof(sender, file_hash, metadata_hash)
            .await
            .map_err(|e| match e {
                ContractError::ProofAlreadyExists => RegistryError::AlreadyExists(file_hash),
                other => RegistryError::Submission(other),
            })?;

        info!(tx = %hash, file_hash = %file_hash, "proof submitted");
        Ok(TxReference {
            hash,
            sender,
            file_hash,
            metadata_hash,
            submitted_at: Utc::now(),
        })
    }

    /// Whether a confirmed proof exists for `file_hash`.
    pub async fn proof_exists(&self, file_hash: &ContentHash) -> bool {
        match self.contract.proof_exists(file_hash).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(file_hash = %file_hash, error = %e, "proof existence check failed");
                false
            }
        }
    }

    /// The confirmed proof for `file_hash`, if there is one.
    pub async fn get_proof(&self, file_hash: &ContentHash) -> Option<Proof> {
        let raw = match self.contract.get_proof(file_hash).await {
            Ok(raw) => raw,
            Err(ContractError::ProofNotFound) => {
                debug!(file_hash = %file_hash, "no proof recorded");
                return None;
            }
            Err(e) => {
                warn!(file_hash = %file_hash, error = %e, "proof lookup failed");
                return None;
            }
        };
        match Proof::from_contract(*file_hash, &raw) {
            Ok(proof) => Some(proof),
            Err(e) => {
                warn!(file_hash = %file_hash, error = %e, "registry returned a malformed proof");
                None
            }
        }
    }

    /// Creator and timestamp of the proof for `file_hash`, if there is one.
    pub async fn get_basic_proof(&self, file_hash: &ContentHash) -> Option<BasicProof> {
        let raw = match self.contract.get_basic_proof(file_hash).await {
            Ok(raw) => raw,
            Err(ContractError::ProofNotFound) => return None,
            Err(e) => {
                warn!(file_hash = %file_hash, error = %e, "basic proof lookup failed");
                return None;
            }
        };
        let creator = match AccountAddress::from_hex(&raw.creator) {
            Ok(creator) if !creator.is_zero() && raw.timestamp != 0 => creator,
            Ok(_) => return None,
            Err(e) => {
                warn!(file_hash = %file_hash, error = %e, "registry returned a malformed creator");
                return None;
            }
        };
        Some(BasicProof {
            creator,
            timestamp: ProofTimestamp::from_secs(raw.timestamp),
        })
    }

    /// Number of proofs registered by `creator`; `0` if the count is unavailable.
    pub async fn creator_proof_count(&self, creator: &AccountAddress) -> u64 {
        self.contract
            .creator_proof_count(creator)
            .await
            .unwrap_or_else(|e| {
                warn!(creator = %creator, error = %e, "creator proof count failed");
                0
            })
    }

    pub async fn transaction_status(&self, tx: &TxHash) -> TxStatus {
        self.contract
            .transaction_status(tx)
            .await
            .unwrap_or_else(|e| {
                warn!(tx = %tx, error = %e, "transaction status lookup failed");
                TxStatus::Unknown
            })
    }
}

impl std::fmt::Debug for ProofRegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofRegistryClient").finish_non_exhaustive()
    }
}

fn parse_hash(field: &'static str, bytes: &[u8]) -> Result<ContentHash, RegistryError> {
    ContentHash::from_slice(bytes).map_err(|_| RegistryError::InvalidHash {
        field,
        length: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use memento_types::ContractProof;
    use proptest::prelude::*;

    use super::*;
    use crate::error::ContractResult;
    use crate::memory::{ConfirmationMode, InMemoryRegistry};
    use crate::traits::ContractBasicProof;

    fn alice() -> AccountAddress {
        AccountAddress::from_bytes([0xa1; 20])
    }

    fn client_with(mode: ConfirmationMode) -> (Arc<InMemoryRegistry>, ProofRegistryClient) {
        let registry = Arc::new(InMemoryRegistry::new(mode));
        let client = ProofRegistryClient::new(registry.clone());
        (registry, client)
    }

    /// Contract double returning a fixed, possibly malformed, record.
    struct FixedContract(ContractProof);

    #[async_trait]
    impl RegistryContract for FixedContract {
        async fn create_proof(
            &self,
            _sender: AccountAddress,
            _file_hash: ContentHash,
            _metadata_hash: ContentHash,
        ) -> ContractResult<TxHash> {
            Err(ContractError::Reverted("execution reverted".into()))
        }

        async fn proof_exists(&self, _file_hash: &ContentHash) -> ContractResult<bool> {
            Ok(true)
        }

        async fn get_proof(&self, _file_hash: &ContentHash) -> ContractResult<ContractProof> {
            Ok(self.0.clone())
        }

        async fn get_basic_proof(&self, _file_hash: &ContentHash) -> ContractResult<ContractBasicProof> {
            Ok(ContractBasicProof {
                creator: self.0.creator.clone(),
                timestamp: self.0.timestamp,
            })
        }

        async fn creator_proof_count(&self, _creator: &AccountAddress) -> ContractResult<u64> {
            Ok(1)
        }

        async fn transaction_status(&self, _tx: &TxHash) -> ContractResult<TxStatus> {
            Ok(TxStatus::Unknown)
        }
    }

    #[tokio::test]
    async fn submit_then_read_back() {
        let (_, client) = client_with(ConfirmationMode::Instant);
        let file_hash = [0xab; 32];
        let metadata_hash = [0xcd; 32];

        let tx = client
            .submit_proof(alice(), &file_hash, Some(&metadata_hash[..]))
            .await
            .unwrap();
        assert_eq!(tx.file_hash, ContentHash::from_digest(file_hash));

        let proof = client
            .get_proof(&ContentHash::from_digest(file_hash))
            .await
            .unwrap();
        assert_eq!(proof.creator, alice());
        assert_eq!(proof.metadata_hash, ContentHash::from_digest(metadata_hash));
        assert_eq!(client.creator_proof_count(&alice()).await, 1);
        assert!(matches!(
            client.transaction_status(&tx.hash).await,
            TxStatus::Confirmed { .. }
        ));
    }

    #[tokio::test]
    async fn second_submission_already_exists() {
        let (_, client) = client_with(ConfirmationMode::Instant);
        let file_hash = ContentHash::from_hex(&"ab".repeat(32)).unwrap();

        client
            .submit_proof(alice(), file_hash.as_bytes(), None)
            .await
            .unwrap();
        let first = client.get_proof(&file_hash).await.unwrap();

        let err = client
            .submit_proof(AccountAddress::from_bytes([2; 20]), file_hash.as_bytes(), Some(&[1u8; 32][..]))
            .await
            .unwrap_err();
        assert_eq!(err, RegistryError::AlreadyExists(file_hash));
        assert_eq!(client.get_proof(&file_hash).await.unwrap(), first);
    }

    #[tokio::test]
    async fn missing_metadata_defaults_to_zero() {
        let (_, client) = client_with(ConfirmationMode::Instant);
        let tx = client.submit_proof(alice(), &[1; 32], None).await.unwrap();
        assert_eq!(tx.metadata_hash, ContentHash::ZERO);
        let proof = client.get_proof(&tx.file_hash).await.unwrap();
        assert!(proof.metadata_hash.is_zero());
    }

    #[tokio::test]
    async fn short_file_hash_rejected() {
        let (registry, client) = client_with(ConfirmationMode::Instant);
        let err = client.submit_proof(alice(), &[0xab; 31], None).await.unwrap_err();
        assert_eq!(
            err,
            RegistryError::InvalidHash {
                field: "file hash",
                length: 31
            }
        );
        assert_eq!(registry.snapshot().unwrap().nonce, 0);
    }

    #[tokio::test]
    async fn long_metadata_hash_rejected() {
        let (_, client) = client_with(ConfirmationMode::Instant);
        let err = client
            .submit_proof(alice(), &[1; 32], Some(&[2u8; 33][..]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidHash {
                field: "metadata hash",
                length: 33
            }
        ));
    }

    #[tokio::test]
    async fn zero_file_hash_is_a_submission_failure() {
        let (_, client) = client_with(ConfirmationMode::Instant);
        let err = client.submit_proof(alice(), &[0; 32], None).await.unwrap_err();
        assert_eq!(err, RegistryError::Submission(ContractError::InvalidHash));
    }

    #[tokio::test]
    async fn exists_only_after_confirmation() {
        let (registry, client) = client_with(ConfirmationMode::Manual);
        let hash = ContentHash::from_digest([5; 32]);
        assert!(!client.proof_exists(&hash).await);

        let tx = client.submit_proof(alice(), hash.as_bytes(), None).await.unwrap();
        assert!(!client.proof_exists(&hash).await);
        assert!(client.get_proof(&hash).await.is_none());
        assert_eq!(client.transaction_status(&tx.hash).await, TxStatus::Pending);

        registry.mine_block().unwrap();
        assert!(client.proof_exists(&hash).await);
        assert!(client.get_proof(&hash).await.is_some());
    }

    #[tokio::test]
    async fn missing_proof_is_none() {
        let (_, client) = client_with(ConfirmationMode::Instant);
        let hash = ContentHash::from_digest([8; 32]);
        assert!(client.get_proof(&hash).await.is_none());
        assert!(client.get_basic_proof(&hash).await.is_none());
    }

    #[tokio::test]
    async fn unreachable_reads_degrade() {
        let (registry, client) = client_with(ConfirmationMode::Instant);
        client.submit_proof(alice(), &[3; 32], None).await.unwrap();
        registry.set_reachable(false).unwrap();

        let hash = ContentHash::from_digest([3; 32]);
        assert!(!client.proof_exists(&hash).await);
        assert!(client.get_proof(&hash).await.is_none());
        assert_eq!(client.creator_proof_count(&alice()).await, 0);
        assert_eq!(
            client.transaction_status(&TxHash::from_bytes([0; 32])).await,
            TxStatus::Unknown
        );

        let err = client.submit_proof(alice(), &[4; 32], None).await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Submission(ContractError::Connectivity(_))
        ));
    }

    #[tokio::test]
    async fn malformed_record_is_never_partial() {
        let client = ProofRegistryClient::new(Arc::new(FixedContract(ContractProof {
            creator: AccountAddress::from_bytes([1; 20]).to_hex(),
            timestamp: 1_700_000_000,
            metadata_hash: "0xdeadbeef".into(),
        })));
        assert!(client.get_proof(&ContentHash::from_digest([1; 32])).await.is_none());
    }

    #[tokio::test]
    async fn zero_creator_record_is_none() {
        let client = ProofRegistryClient::new(Arc::new(FixedContract(ContractProof {
            creator: AccountAddress::ZERO.to_hex(),
            timestamp: 0,
            metadata_hash: ContentHash::ZERO.to_prefixed_hex(),
        })));
        let hash = ContentHash::from_digest([1; 32]);
        assert!(client.get_proof(&hash).await.is_none());
        assert!(client.get_basic_proof(&hash).await.is_none());
    }

    #[tokio::test]
    async fn reverted_submission() {
        let client = ProofRegistryClient::new(Arc::new(FixedContract(ContractProof {
            creator: String::new(),
            timestamp: 0,
            metadata_hash: String::new(),
        })));
        assert!(matches!(
            client.submit_proof(alice(), &[1; 32], None).await,
            Err(RegistryError::Submission(ContractError::Reverted(_)))
        ));
    }

    proptest! {
        #[test]
        fn wrong_length_never_reaches_the_contract(len in (0usize..96).prop_filter("not 32", |l| *l != 32)) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let (registry, client) = client_with(ConfirmationMode::Instant);
            let bytes = vec![0xab; len];
            let err = runtime
                .block_on(client.submit_proof(alice(), &bytes, None))
                .unwrap_err();
            prop_assert_eq!(err, RegistryError::InvalidHash { field: "file hash", length: len });
            prop_assert_eq!(registry.snapshot().unwrap().nonce, 0);
        }
    }
}
