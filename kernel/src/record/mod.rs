//! Record shapes stored on the ledger.
//!
//! `Evidence` lives under its plain id; each `CustodyTransfer` lives under a
//! composite key in the custody namespace. Both are JSON on the wire, encoded
//! and decoded only through [`codec`].

pub mod codec;
pub mod evidence;
pub mod transfer;
pub mod validate;

pub use evidence::{Evidence, EvidenceStatus};
pub use transfer::CustodyTransfer;
