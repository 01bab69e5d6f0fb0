//! Wallet capability boundary for Memento.
//!
//! The wallet is an external collaborator: it owns the account keys, signs
//! messages on the user's behalf, and selects the network transactions are
//! sent to. This crate defines that boundary and the authorship-signature
//! request built on it.
//!
//! # Key Types
//!
//! - [`Wallet`] — async capability trait (account, chain, signing, network switch)
//! - [`LocalWallet`] — Ed25519 development wallet with approval and disconnect switches
//! - [`NetworkConfig`] — chain id, name, RPC and explorer URLs of a network
//! - [`WalletSession`] — owned connection handle allowing one outstanding request
//! - [`AuthorshipMessage`] — the human-readable statement a creator signs
//! - [`SignatureRequestor`] — builds the message and asks the wallet to sign it

pub mod authorship;
pub mod error;
pub mod local;
pub mod network;
pub mod session;
pub mod wallet;

pub use authorship::{
    verify_authorship, AuthorshipMessage, AuthorshipSignature, SignatureBlob, SignatureRequestor,
};
pub use error::{SignatureError, WalletError, WalletResult};
pub use local::LocalWallet;
pub use network::NetworkConfig;
pub use session::{RequestGuard, WalletSession};
pub use wallet::Wallet;
