//! Authorship statements and the signature request that produces them.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use memento_crypto::{Signature, VerifyingKey};
use memento_types::{AccountAddress, ContentHash};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, info};

use crate::error::SignatureError;
use crate::session::WalletSession;

/// The statement a creator signs before registering a proof.
///
/// Renders as `I created a file with hash {hex} using Memento at {time}`,
/// where `{hex}` is the unprefixed lowercase file hash and `{time}` is
/// RFC 3339 UTC with millisecond precision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorshipMessage {
    file_hash: ContentHash,
    created_at: DateTime<Utc>,
}

impl AuthorshipMessage {
    pub fn new(file_hash: ContentHash, created_at: DateTime<Utc>) -> Self {
        Self {
            file_hash,
            created_at,
        }
    }

    /// Message stamped with the current time.
    pub fn now(file_hash: ContentHash) -> Self {
        Self::new(file_hash, Utc::now())
    }

    pub fn file_hash(&self) -> &ContentHash {
        &self.file_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn text(&self) -> String {
        format!(
            "I created a file with hash {} using Memento at {}",
            self.file_hash.to_hex(),
            self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

impl fmt::Display for AuthorshipMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Opaque signature bytes as returned by a wallet.
#[derive(Clone, PartialEq, Eq)]
pub struct SignatureBlob(Vec<u8>);

impl SignatureBlob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }

    /// Interpret the blob as an Ed25519 signature.
    pub fn to_signature(&self) -> Option<Signature> {
        Signature::from_slice(&self.0).ok()
    }
}

impl From<Signature> for SignatureBlob {
    fn from(signature: Signature) -> Self {
        Self(signature.to_bytes().to_vec())
    }
}

impl fmt::Debug for SignatureBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = &self.0[..self.0.len().min(8)];
        write!(f, "SignatureBlob({}..., {} bytes)", hex::encode(head), self.0.len())
    }
}

impl Serialize for SignatureBlob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SignatureBlob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s).map(Self).map_err(serde::de::Error::custom)
    }
}

/// A signed authorship statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorshipSignature {
    pub file_hash: ContentHash,
    pub message: String,
    pub signed_at: DateTime<Utc>,
    pub signer: AccountAddress,
    pub signature: SignatureBlob,
}

impl AuthorshipSignature {
    /// Whether this signature was made over `file_hash`.
    pub fn covers(&self, file_hash: &ContentHash) -> bool {
        self.file_hash == *file_hash
    }
}

/// Check an authorship signature against the signer's verifying key.
///
/// The key must derive `signer`, and the blob must be a valid Ed25519
/// signature over `message`.
pub fn verify_authorship(key: &VerifyingKey, signed: &AuthorshipSignature) -> bool {
    if key.to_address() != signed.signer {
        return false;
    }
    signed
        .signature
        .to_signature()
        .is_some_and(|sig| key.verify(signed.message.as_bytes(), &sig).is_ok())
}

/// Asks the connected wallet to sign an authorship statement.
///
/// The returned signature is not verified here.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignatureRequestor;

impl SignatureRequestor {
    pub fn new() -> Self {
        Self
    }

    pub async fn request(
        &self,
        session: &WalletSession,
        file_hash: &ContentHash,
    ) -> Result<AuthorshipSignature, SignatureError> {
        let _guard = session.begin_request()?;

        let signer = session
            .wallet()
            .connected_account()
            .await?
            .ok_or(SignatureError::NotConnected)?;

        let message = AuthorshipMessage::now(*file_hash);
        let text = message.text();
        debug!(file_hash = %file_hash, signer = %signer, "requesting authorship signature");

        let signature = session.wallet().sign_message(&text).await?;
        if signature.is_empty() {
            return Err(SignatureError::Unavailable("wallet returned an empty signature".into()));
        }

        info!(file_hash = %file_hash, signer = %signer, "authorship signed");
        Ok(AuthorshipSignature {
            file_hash: *file_hash,
            message: text,
            signed_at: message.created_at(),
            signer,
            signature,
        })
    }
}
