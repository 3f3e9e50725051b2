//! Custody Kernel: the deterministic core of the evidence custody ledger.
//!
//! # API Surface
//!
//! - [`record`] -- the `Evidence` and `CustodyTransfer` shapes, their codec,
//!   and input validation
//! - [`proof`] -- the integrity digest, canonical encodings, and case Merkle proofs
//! - [`store`] -- the `LedgerStore` collaborator contract, composite keys, and
//!   selector queries
//!
//! # Module Dependency Direction
//!
//! `store` ← `error` ← `record` ← `proof`
//!
//! One-way only. `proof` hashes `record` values; `record` validation reports
//! through [`error`], which wraps `store` failures. `store` depends on nothing
//! internal.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod proof;
pub mod record;
pub mod store;
