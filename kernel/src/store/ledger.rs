//! The `LedgerStore` collaborator contract.
//!
//! A `LedgerStore` handle is a *transaction view*: reads observe the
//! transaction's own pending writes, and nothing becomes visible to other
//! transactions until the platform commits. Conflict detection, ordering, and
//! commit/abort are the store's job; the core never retries.

use super::key::CompositeKey;
use super::selector::Selector;

/// Failure reported by a ledger store.
///
/// The core surfaces these unchanged (wrapped with operation/key context);
/// it never interprets the cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A concurrent transaction changed something this transaction read.
    Conflict { key: String, detail: String },
    /// The store could not serve the call.
    Unavailable { detail: String },
    /// Underlying I/O failed.
    Io { detail: String },
    /// The store rejected a key.
    InvalidKey { detail: String },
    /// Internal store state was poisoned by a panic in another caller.
    Poisoned,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict { key, detail } => {
                write!(f, "write conflict on {key:?}: {detail}")
            }
            Self::Unavailable { detail } => write!(f, "store unavailable: {detail}"),
            Self::Io { detail } => write!(f, "store I/O error: {detail}"),
            Self::InvalidKey { detail } => write!(f, "invalid key: {detail}"),
            Self::Poisoned => write!(f, "store state poisoned"),
        }
    }
}

impl std::error::Error for StoreError {}

/// One historical version of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Identifier of the transaction that wrote this version.
    pub version_id: String,
    /// The written bytes, or `None` if this version is a deletion (tombstone).
    pub value: Option<Vec<u8>>,
}

impl HistoryEntry {
    /// Whether this version marks a deletion.
    ///
    /// An empty value is treated as a tombstone as well.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.value.as_ref().map_or(true, Vec::is_empty)
    }
}

/// Versioned key-value store with history and selector queries.
///
/// All calls are synchronous and bounded; results are materialized.
pub trait LedgerStore {
    /// Read the current value of `key` (as seen by this transaction).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on store failure. Absence is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stage a write of `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on store failure.
    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Whether `key` currently has a value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on store failure, never for absence.
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// All `(key, value)` pairs whose key extends `prefix`, in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on store failure.
    fn range_by_partial_key(
        &self,
        prefix: &CompositeKey,
    ) -> Result<Vec<(String, Vec<u8>)>, StoreError>;

    /// All current `(key, value)` pairs matching `selector`.
    ///
    /// Result order is store-defined and must not be relied on. Matches are
    /// not validated for phantoms at commit: a transaction does not conflict
    /// when another commit changes which records match.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on store failure.
    fn rich_query(&self, selector: &Selector) -> Result<Vec<(String, Vec<u8>)>, StoreError>;

    /// Every committed version of `key`, in the store's history order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on store failure.
    fn history_of(&self, key: &str) -> Result<Vec<HistoryEntry>, StoreError>;

    /// Identifier of the enclosing transaction.
    fn current_transaction_id(&self) -> &str;
}
