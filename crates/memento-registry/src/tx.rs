use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use memento_types::{AccountAddress, ContentHash, TypeError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Hash of a submitted registry transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        ContentHash::from_hex(s).map(|h| Self(*h.as_bytes()))
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({}…)", &hex::encode(self.0)[..12])
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for TxHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Lifecycle of a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TxStatus {
    /// Accepted by the node, not yet in a block.
    Pending,
    Confirmed { block_number: u64 },
    Reverted { reason: String },
    /// Not known to the node, or the node could not be asked.
    Unknown,
}

impl TxStatus {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Confirmed { .. } | Self::Reverted { .. })
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed { block_number } => write!(f, "confirmed in block {block_number}"),
            Self::Reverted { reason } => write!(f, "reverted: {reason}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// What a successful submission hands back: the transaction to watch and
/// the values it carried.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReference {
    pub hash: TxHash,
    pub sender: AccountAddress,
    pub file_hash: ContentHash,
    pub metadata_hash: ContentHash,
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let tx = TxHash::from_bytes([0x3c; 32]);
        assert_eq!(tx.to_hex(), format!("0x{}", "3c".repeat(32)));
        assert_eq!(tx.to_hex().parse::<TxHash>().unwrap(), tx);
    }

    #[test]
    fn status_serde_is_tagged() {
        let json = serde_json::to_string(&TxStatus::Confirmed { block_number: 7 }).unwrap();
        assert_eq!(json, r#"{"status":"confirmed","block_number":7}"#);
        let back: TxStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TxStatus::Confirmed { block_number: 7 });
    }

    #[test]
    fn finality() {
        assert!(!TxStatus::Pending.is_final());
        assert!(!TxStatus::Unknown.is_final());
        assert!(TxStatus::Reverted { reason: "x".into() }.is_final());
    }
}
