//! History & Query Engine.
//!
//! History order is the store's: oldest first for [`custody_ledger::MemoryLedger`].
//! Custody chains come back in key order, which is time order by construction
//! of the transfer key. Rich-query results carry no order guarantee.

use custody_kernel::error::CustodyError;
use custody_kernel::record::{codec, CustodyTransfer, Evidence, EvidenceStatus};
use custody_kernel::store::{LedgerStore, Selector};

use crate::clock::Clock;
use crate::service::{decode_evidence_at, CustodyService};

const OP_HISTORY: &str = "get_evidence_history";
const OP_AT: &str = "get_evidence_at";
const OP_CHAIN: &str = "get_custody_chain";
const OP_BY_CASE: &str = "query_by_case";
const OP_BY_CUSTODIAN: &str = "query_by_custodian";

/// One historical version of an evidence record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceVersionV1 {
    /// Identifier of the transaction that wrote this version.
    pub version_id: String,
    /// The record as written, or `None` for a deletion.
    pub snapshot: Option<Evidence>,
}

impl EvidenceVersionV1 {
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.snapshot.is_none()
    }
}

impl<C: Clock> CustodyService<C> {
    /// Every stored version of `id`, oldest first. An id that was never
    /// written has an empty history.
    ///
    /// # Errors
    ///
    /// [`CustodyError::CorruptRecord`] if any version fails to decode (the
    /// whole call fails), [`CustodyError::Validation`] for a malformed id,
    /// [`CustodyError::Store`] on store failure.
    pub fn get_evidence_history<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        id: &str,
    ) -> Result<Vec<EvidenceVersionV1>, CustodyError> {
        self.evidence_history(OP_HISTORY, store, id)
    }

    /// The record as written by transaction `version_id`.
    ///
    /// # Errors
    ///
    /// [`CustodyError::NotFound`] if no version has that id or the version is
    /// a deletion; otherwise as [`CustodyService::get_evidence_history`].
    pub fn get_evidence_at<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        id: &str,
        version_id: &str,
    ) -> Result<Evidence, CustodyError> {
        self.required(OP_AT, "version_id", version_id)?;
        self.evidence_history(OP_AT, store, id)?
            .into_iter()
            .find(|v| v.version_id == version_id)
            .and_then(|v| v.snapshot)
            .ok_or_else(|| CustodyError::NotFound {
                op: OP_AT,
                id: format!("{id}@{version_id}"),
            })
    }

    fn evidence_history<S: LedgerStore + ?Sized>(
        &self,
        op: &'static str,
        store: &S,
        id: &str,
    ) -> Result<Vec<EvidenceVersionV1>, CustodyError> {
        self.required(op, "id", id)?;
        let entries = store.history_of(id).map_err(CustodyError::store(op, id))?;
        let versions = entries
            .into_iter()
            .map(|entry| {
                let snapshot = if entry.is_tombstone() {
                    None
                } else {
                    let bytes = entry.value.as_deref().unwrap_or_default();
                    Some(decode_evidence_at(op, id, bytes)?)
                };
                Ok(EvidenceVersionV1 {
                    version_id: entry.version_id,
                    snapshot,
                })
            })
            .collect::<Result<Vec<_>, CustodyError>>()?;
        tracing::debug!(evidence_id = %id, versions = versions.len(), "history read");
        Ok(versions)
    }

    /// All custody transfers of `evidence_id`, in time order.
    ///
    /// # Errors
    ///
    /// [`CustodyError::CorruptRecord`] (naming the offending key) if any
    /// transfer fails to decode, [`CustodyError::Validation`] for a malformed
    /// id, [`CustodyError::Store`] on store failure.
    pub fn get_custody_chain<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        evidence_id: &str,
    ) -> Result<Vec<CustodyTransfer>, CustodyError> {
        self.required(OP_CHAIN, "evidence_id", evidence_id)?;
        let prefix = self.custody_key(OP_CHAIN, &[evidence_id])?;
        let rows = store
            .range_by_partial_key(&prefix)
            .map_err(CustodyError::store(OP_CHAIN, prefix.as_str()))?;
        rows.into_iter()
            .map(|(key, bytes)| {
                codec::decode_transfer(&bytes).map_err(|e| CustodyError::CorruptRecord {
                    op: OP_CHAIN,
                    key,
                    detail: e.to_string(),
                })
            })
            .collect()
    }

    /// Current evidence records of `case_id`.
    ///
    /// # Errors
    ///
    /// [`CustodyError::Validation`] for an empty or malformed `case_id`,
    /// [`CustodyError::CorruptRecord`] if a match fails to decode,
    /// [`CustodyError::Store`] on store failure.
    pub fn query_by_case<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        case_id: &str,
    ) -> Result<Vec<Evidence>, CustodyError> {
        self.required(OP_BY_CASE, "case_id", case_id)?;
        let selector = Selector::new().field_eq("caseId", case_id);
        self.run_query(OP_BY_CASE, store, &selector)
    }

    /// Current `ACTIVE` evidence records held by `officer`.
    ///
    /// # Errors
    ///
    /// As [`CustodyService::query_by_case`].
    pub fn query_by_custodian<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        officer: &str,
    ) -> Result<Vec<Evidence>, CustodyError> {
        self.required(OP_BY_CUSTODIAN, "officer", officer)?;
        let selector = Selector::new()
            .field_eq("custodyOfficer", officer)
            .field_eq("status", EvidenceStatus::Active.as_str());
        self.run_query(OP_BY_CUSTODIAN, store, &selector)
    }

    fn run_query<S: LedgerStore + ?Sized>(
        &self,
        op: &'static str,
        store: &S,
        selector: &Selector,
    ) -> Result<Vec<Evidence>, CustodyError> {
        let query = selector.to_query_string();
        let rows = store
            .rich_query(selector)
            .map_err(CustodyError::store(op, &query))?;
        tracing::debug!(op, query = %query, matches = rows.len(), "rich query");
        rows.into_iter()
            .map(|(key, bytes)| decode_evidence_at(op, &key, &bytes))
            .collect()
    }
}
