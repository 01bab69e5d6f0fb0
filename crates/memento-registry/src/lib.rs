//! Proof registry for Memento.
//!
//! A proof binds a file hash to a metadata hash, a creator account, and a
//! block timestamp. Proofs live in an external registry contract; this crate
//! defines the boundary to that contract, an in-process simulation of it,
//! and the client the rest of Memento talks to.
//!
//! # Key Types
//!
//! - [`RegistryContract`] — async boundary to the deployed contract
//! - [`InMemoryRegistry`] — contract simulation with manual or instant mining
//! - [`ProofRegistryClient`] — validated submissions and fault-tolerant reads
//! - [`TxReference`] / [`TxStatus`] — submitted transaction and its lifecycle

pub mod client;
pub mod error;
pub mod memory;
pub mod traits;
pub mod tx;

pub use client::ProofRegistryClient;
pub use error::{ContractError, ContractResult, RegistryError, SnapshotError};
pub use memory::{ConfirmationMode, InMemoryRegistry, RegistrySnapshot, TxRecord};
pub use traits::{ContractBasicProof, RegistryContract};
pub use tx::{TxHash, TxReference, TxStatus};
