//! Custody Harness: the caller-facing evidence custody operations.
//!
//! [`CustodyService`] carries only immutable configuration (a
//! [`CustodyPolicyV1`] and a [`Clock`]). Every operation takes the ledger
//! transaction view explicitly, performs its reads and writes through it, and
//! returns. The caller owns the transaction: commit on `Ok`, abort on `Err`.
//!
//! | Component | Operations |
//! |-----------|------------|
//! | Evidence Record Manager ([`manager`]) | `create_evidence`, `read_evidence`, `update_status`, `exists` |
//! | Custody Transfer Recorder ([`transfer`]) | `transfer_custody` |
//! | Integrity Verifier ([`verify`]) | `verify_integrity`, `verify_custody_chain` |
//! | History & Query Engine ([`history`]) | `get_evidence_history`, `get_evidence_at`, `get_custody_chain`, `query_by_case`, `query_by_custodian` |
//! | Case commitments ([`commitment`]) | `case_merkle_root`, `prove_evidence_in_case` |
//!
//! The harness does NOT implement hashing or key encoding; it delegates to
//! the kernel.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod clock;
pub mod commitment;
pub mod history;
pub mod manager;
pub mod policy;
pub mod service;
pub mod transfer;
pub mod verify;

pub use clock::{Clock, ManualClock, SystemClock};
pub use commitment::{CaseCommitmentV1, CaseLeafV1};
pub use history::EvidenceVersionV1;
pub use manager::NewEvidence;
pub use policy::{CustodyPolicyV1, PolicyError};
pub use service::CustodyService;
pub use verify::{ChainVerificationV1, VerificationResultV1};

#[cfg(test)]
pub(crate) mod test_support;
