use serde::{Deserialize, Serialize};

use crate::address::AccountAddress;
use crate::error::TypeError;
use crate::hash::ContentHash;
use crate::temporal::ProofTimestamp;

/// A registered content proof.
///
/// Binds a file hash to the hash of its creation metadata, the account that
/// registered it, and the block timestamp of registration. Proofs are keyed
/// by `file_hash` and never change once written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub file_hash: ContentHash,
    pub metadata_hash: ContentHash,
    pub creator: AccountAddress,
    pub timestamp: ProofTimestamp,
}

impl Proof {
    /// Validate a raw registry read into a proof for `file_hash`.
    ///
    /// Rejects the whole record if any field is malformed; a registry that
    /// returns the zero creator or a zero timestamp has no proof for the hash.
    pub fn from_contract(file_hash: ContentHash, raw: &ContractProof) -> Result<Self, TypeError> {
        let creator = AccountAddress::from_hex(&raw.creator)
            .map_err(|e| TypeError::InvalidRecord(format!("creator: {e}")))?;
        if creator.is_zero() {
            return Err(TypeError::InvalidRecord("zero creator address".into()));
        }
        if raw.timestamp == 0 {
            return Err(TypeError::InvalidRecord("zero timestamp".into()));
        }
        let metadata_hash = ContentHash::from_hex(&raw.metadata_hash)
            .map_err(|e| TypeError::InvalidRecord(format!("metadataHash: {e}")))?;

        Ok(Self {
            file_hash,
            metadata_hash,
            creator,
            timestamp: ProofTimestamp::from_secs(raw.timestamp),
        })
    }

    /// The creator/timestamp subset of this proof.
    pub fn basic(&self) -> BasicProof {
        BasicProof {
            creator: self.creator,
            timestamp: self.timestamp,
        }
    }

    /// Returns `true` if this proof was registered by `creator` with `metadata_hash`.
    pub fn is_bound_to(&self, creator: &AccountAddress, metadata_hash: &ContentHash) -> bool {
        self.creator == *creator && self.metadata_hash == *metadata_hash
    }
}

/// Creator and timestamp of a proof, without its metadata hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicProof {
    pub creator: AccountAddress,
    pub timestamp: ProofTimestamp,
}

/// Raw proof record as returned by a registry read.
///
/// Field types mirror the contract ABI (`address`, `uint256`, `bytes32`), so
/// values arrive as hex strings and integers and must be validated with
/// [`Proof::from_contract`] before use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractProof {
    pub creator: String,
    pub timestamp: u64,
    pub metadata_hash: String,
}

impl From<&Proof> for ContractProof {
    fn from(proof: &Proof) -> Self {
        Self {
            creator: proof.creator.to_hex(),
            timestamp: proof.timestamp.as_secs(),
            metadata_hash: proof.metadata_hash.to_prefixed_hex(),
        }
    }
}
