//! `MemoryLedger`: committed state, version counters, and history behind a mutex.
//!
//! # Transaction model
//!
//! A [`MemoryTxn`] buffers its writes and sees them on every read. It records
//! the version of each key it reads and the `(key, version)` list of each
//! range it scans. [`MemoryTxn::commit`] re-checks all of those against the
//! committed state; any difference aborts with
//! [`StoreError::Conflict`] and applies nothing. Rich queries are not
//! re-validated (phantoms under a selector are not detected).
//!
//! # History order
//!
//! Oldest first, one entry per committed write, in commit order.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use custody_kernel::proof::hash::{canonical_hash, HashDomain};
use custody_kernel::store::{CompositeKey, HistoryEntry, LedgerStore, Selector, StoreError};

/// A committed value and the commit sequence that wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Versioned {
    pub(crate) value: Vec<u8>,
    pub(crate) version: u64,
}

#[derive(Debug, Default)]
pub(crate) struct LedgerState {
    pub(crate) current: BTreeMap<String, Versioned>,
    pub(crate) history: BTreeMap<String, Vec<HistoryEntry>>,
    pub(crate) commit_seq: u64,
    /// Last generated transaction sequence (in memory only).
    pub(crate) tx_seq: u64,
    /// Highest generated sequence whose transaction committed writes. Ids at
    /// or below it may appear in history; a restored ledger resumes above it.
    pub(crate) committed_tx_seq: u64,
    /// Remaining successful puts before an injected failure (`None` = disabled).
    pub(crate) put_budget: Option<usize>,
}

impl LedgerState {
    fn version_of(&self, key: &str) -> Option<u64> {
        self.current.get(key).map(|v| v.version)
    }

    fn committed_range(&self, prefix: &CompositeKey) -> Vec<(String, u64)> {
        self.current
            .range(prefix.as_str().to_string()..)
            .take_while(|(k, _)| prefix.is_prefix_of(k))
            .map(|(k, v)| (k.clone(), v.version))
            .collect()
    }
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub transaction_id: String,
    /// Commit sequence number assigned to the writes (unchanged for read-only commits).
    pub commit_seq: u64,
    pub writes: usize,
}

/// In-memory versioned key-value ledger.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    /// An empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_state(state: LedgerState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, LedgerState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Open a transaction with a generated id (64 hex chars).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the ledger mutex is poisoned.
    pub fn begin(&self) -> Result<MemoryTxn<'_>, StoreError> {
        let seq = {
            let mut state = self.lock()?;
            state.tx_seq += 1;
            state.tx_seq
        };
        let id = canonical_hash(HashDomain::TransactionId, &seq.to_be_bytes());
        let mut tx = self.begin_with_tx_id(id.hex_digest());
        tx.seq = Some(seq);
        Ok(tx)
    }

    /// Open a transaction with a caller-supplied id.
    #[must_use]
    pub fn begin_with_tx_id(&self, tx_id: &str) -> MemoryTxn<'_> {
        MemoryTxn {
            ledger: self,
            tx_id: tx_id.to_string(),
            seq: None,
            writes: BTreeMap::new(),
            reads: std::cell::RefCell::new(BTreeMap::new()),
            ranges: std::cell::RefCell::new(Vec::new()),
        }
    }

    /// Committed bytes under `key`, outside any transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the ledger mutex is poisoned.
    pub fn read_committed(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.lock()?.current.get(key).map(|v| v.value.clone()))
    }

    /// Number of live committed keys.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the ledger mutex is poisoned.
    pub fn committed_len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.current.len())
    }

    /// Allow `successful_puts` more puts, then fail the next one with
    /// [`StoreError::Unavailable`] (once).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the ledger mutex is poisoned.
    pub fn inject_put_failure(&self, successful_puts: usize) -> Result<(), StoreError> {
        self.lock()?.put_budget = Some(successful_puts);
        Ok(())
    }
}

/// A transaction view over a [`MemoryLedger`].
///
/// Dropping a transaction without committing discards its writes.
#[derive(Debug)]
pub struct MemoryTxn<'a> {
    ledger: &'a MemoryLedger,
    tx_id: String,
    /// Generated sequence behind `tx_id` (`None` for caller-supplied ids).
    seq: Option<u64>,
    /// Pending writes; `None` is a deletion.
    writes: BTreeMap<String, Option<Vec<u8>>>,
    reads: std::cell::RefCell<BTreeMap<String, Option<u64>>>,
    ranges: std::cell::RefCell<Vec<(CompositeKey, Vec<(String, u64)>)>>,
}

impl MemoryTxn<'_> {
    /// Stage a deletion of `key`. It will appear as a tombstone in history.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] for an empty key.
    pub fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.writes.insert(key.to_string(), None);
        Ok(())
    }

    /// Number of staged writes.
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Validate reads and ranges, then apply every staged write atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if anything this transaction read was
    /// changed by another commit; nothing is applied in that case.
    pub fn commit(self) -> Result<CommitReceipt, StoreError> {
        let mut state = self.ledger.lock()?;

        for (key, observed) in self.reads.borrow().iter() {
            let now = state.version_of(key);
            if now != *observed {
                tracing::warn!(tx_id = %self.tx_id, key = %key.escape_debug(), "read conflict, aborting");
                return Err(StoreError::Conflict {
                    key: key.clone(),
                    detail: format!("read version {observed:?}, committed version {now:?}"),
                });
            }
        }
        for (prefix, observed) in self.ranges.borrow().iter() {
            if state.committed_range(prefix) != *observed {
                tracing::warn!(tx_id = %self.tx_id, prefix = %prefix, "range conflict, aborting");
                return Err(StoreError::Conflict {
                    key: prefix.as_str().to_string(),
                    detail: "range scan result changed".into(),
                });
            }
        }

        let writes = self.writes.len();
        if writes > 0 {
            state.commit_seq += 1;
            if let Some(seq) = self.seq {
                state.committed_tx_seq = state.committed_tx_seq.max(seq);
            }
        }
        let version = state.commit_seq;
        for (key, value) in self.writes {
            match &value {
                Some(bytes) => {
                    state.current.insert(
                        key.clone(),
                        Versioned {
                            value: bytes.clone(),
                            version,
                        },
                    );
                }
                None => {
                    state.current.remove(&key);
                }
            }
            state.history.entry(key).or_default().push(HistoryEntry {
                version_id: self.tx_id.clone(),
                value,
            });
        }
        tracing::debug!(tx_id = %self.tx_id, writes, commit_seq = version, "committed");
        Ok(CommitReceipt {
            transaction_id: self.tx_id,
            commit_seq: version,
            writes,
        })
    }

    /// Discard all staged writes.
    pub fn rollback(self) {
        tracing::debug!(tx_id = %self.tx_id, discarded = self.writes.len(), "rolled back");
    }

    /// Committed entries overlaid with this transaction's pending writes,
    /// restricted to keys accepted by `keep`.
    fn overlay(
        &self,
        committed: impl Iterator<Item = (String, Vec<u8>)>,
        keep: impl Fn(&str) -> bool,
    ) -> Vec<(String, Vec<u8>)> {
        let mut merged: BTreeMap<String, Vec<u8>> = committed.collect();
        for (key, value) in self.writes.iter().filter(|(k, _)| keep(k)) {
            match value {
                Some(bytes) => {
                    merged.insert(key.clone(), bytes.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        merged.into_iter().collect()
    }
}

fn check_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey {
            detail: "empty key".into(),
        });
    }
    Ok(())
}

impl LedgerStore for MemoryTxn<'_> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(pending) = self.writes.get(key) {
            return Ok(pending.clone());
        }
        let state = self.ledger.lock()?;
        let committed = state.current.get(key);
        self.reads
            .borrow_mut()
            .entry(key.to_string())
            .or_insert_with(|| committed.map(|v| v.version));
        Ok(committed.map(|v| v.value.clone()))
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        check_key(key)?;
        {
            let mut state = self.ledger.lock()?;
            match state.put_budget {
                Some(0) => {
                    state.put_budget = None;
                    return Err(StoreError::Unavailable {
                        detail: format!("injected put failure at {}", key.escape_debug()),
                    });
                }
                Some(n) => state.put_budget = Some(n - 1),
                None => {}
            }
        }
        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    fn range_by_partial_key(
        &self,
        prefix: &CompositeKey,
    ) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let committed: Vec<(String, Vec<u8>)> = {
            let state = self.ledger.lock()?;
            self.ranges
                .borrow_mut()
                .push((prefix.clone(), state.committed_range(prefix)));
            state
                .current
                .range(prefix.as_str().to_string()..)
                .take_while(|(k, _)| prefix.is_prefix_of(k))
                .map(|(k, v)| (k.clone(), v.value.clone()))
                .collect()
        };
        Ok(self.overlay(committed.into_iter(), |k| prefix.is_prefix_of(k)))
    }

    fn rich_query(&self, selector: &Selector) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let committed: Vec<(String, Vec<u8>)> = {
            let state = self.ledger.lock()?;
            state
                .current
                .iter()
                .filter(|(k, _)| !CompositeKey::is_composite(k))
                .map(|(k, v)| (k.clone(), v.value.clone()))
                .collect()
        };
        let mut rows = self.overlay(committed.into_iter(), |k| !CompositeKey::is_composite(k));
        rows.retain(|(_, value)| selector.matches_bytes(value));
        tracing::debug!(query = %selector.to_query_string(), matches = rows.len(), "rich query");
        Ok(rows)
    }

    fn history_of(&self, key: &str) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self
            .ledger
            .lock()?
            .history
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    fn current_transaction_id(&self) -> &str {
        &self.tx_id
    }
}
