//! Cryptographic primitives for Memento.
//!
//! Provides content hashing (SHA-256 by default, BLAKE3 optional) with
//! streaming file support, canonical serialization and hashing of creation
//! metadata, and Ed25519 signing keys for the local development wallet.
//!
//! Primitives come from `sha2`, `blake3`, and `ed25519-dalek`; this crate only
//! fixes how they are applied.

pub mod canonical;
pub mod hasher;
pub mod signer;

pub use canonical::{canonical_bytes, metadata_hash, CanonicalError};
pub use hasher::{ContentHasher, HashAlgorithm, HashError, HashedContent, HashedFile};
pub use signer::{Signature, SignatureError, SigningKey, VerifyingKey};
