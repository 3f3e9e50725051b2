//! Ledger store boundary: the collaborator contract and the key/selector
//! vocabulary the core uses to talk to it.
//!
//! Nothing in this module performs I/O. Concrete stores (and their
//! transaction, ordering, and history guarantees) live outside the kernel.

pub mod key;
pub mod ledger;
pub mod selector;

pub use key::{CompositeKey, KeyError, KEY_SEPARATOR};
pub use ledger::{HistoryEntry, LedgerStore, StoreError};
pub use selector::Selector;
