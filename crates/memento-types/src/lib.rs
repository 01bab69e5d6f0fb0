//! Foundation types for Memento.
//!
//! This crate provides the identity, temporal, and record types shared by
//! every other Memento crate. Nothing here performs I/O.
//!
//! # Key Types
//!
//! - [`ContentHash`] — 32-byte content digest (file hash or metadata hash)
//! - [`AccountAddress`] — 20-byte account address of a proof creator
//! - [`ProofTimestamp`] — seconds since the Unix epoch, as stored on chain
//! - [`Proof`] — validated registry record binding a hash to a creator
//! - [`ContractProof`] — raw registry read shape, validated into a [`Proof`]
//! - [`CreationMetadata`] — title/description/tags/date/file facts of a creation
//! - [`ContentType`] — the kind of creation being registered

pub mod address;
pub mod error;
pub mod hash;
pub mod metadata;
pub mod proof;
pub mod temporal;

pub use address::AccountAddress;
pub use error::TypeError;
pub use hash::ContentHash;
pub use metadata::{parse_date, ContentType, CreationMetadata};
pub use proof::{BasicProof, ContractProof, Proof};
pub use temporal::ProofTimestamp;
