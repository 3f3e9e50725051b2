//! Custody Ledger: an in-memory reference implementation of the
//! [`LedgerStore`](custody_kernel::store::LedgerStore) collaborator.
//!
//! Provides what the kernel assumes of its store and nothing more:
//!
//! - optimistic MVCC transactions ([`MemoryLedger::begin`] → [`MemoryTxn`] →
//!   [`MemoryTxn::commit`]) that abort on read/write and range conflicts
//! - per-key version history with tombstones
//! - equality-AND selector queries over JSON values
//! - snapshot export/restore with a fail-closed digest check
//!
//! Production deployments substitute a real ledger; tests and benchmarks use
//! this one.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod memory;
pub mod snapshot;

pub use memory::{CommitReceipt, MemoryLedger, MemoryTxn};
pub use snapshot::SnapshotError;
