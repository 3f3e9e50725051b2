//! Integrity Verifier: read-only reports. Nothing here writes to the store;
//! a mismatch or a broken chain is reported and logged, never corrected.

use chrono::{DateTime, Utc};
use custody_kernel::error::CustodyError;
use custody_kernel::store::LedgerStore;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::service::CustodyService;

const OP_VERIFY: &str = "verify_integrity";
const OP_VERIFY_CHAIN: &str = "verify_custody_chain";

/// Outcome of [`CustodyService::verify_integrity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResultV1 {
    pub evidence_id: String,
    /// The stored `file_hash`.
    pub original_hash: String,
    /// The hash the caller supplied.
    pub current_hash: String,
    /// Byte-exact, case-sensitive equality of the two hashes above.
    pub hash_match: bool,
    /// The stored integrity digest.
    pub integrity_hash: String,
    /// Whether `integrity_hash` matches a digest recomputed from the stored fields.
    pub integrity_hash_valid: bool,
    pub last_modified: DateTime<Utc>,
    pub custody_officer: String,
    pub verified_at: DateTime<Utc>,
}

/// Outcome of [`CustodyService::verify_custody_chain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainVerificationV1 {
    pub evidence_id: String,
    pub transfer_count: usize,
    /// Every transfer's `to_officer` is the next one's `from_officer`.
    pub linked: bool,
    /// Transfer timestamps never decrease.
    pub chronological: bool,
    /// The last transfer's `to_officer` is the record's current custodian.
    pub matches_current_custodian: bool,
    /// Index of the first transfer that breaks linkage or ordering, or
    /// `transfer_count` when only the final custodian check fails.
    pub first_break: Option<usize>,
    pub current_custodian: String,
}

impl ChainVerificationV1 {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.linked && self.chronological && self.matches_current_custodian
    }
}

impl<C: Clock> CustodyService<C> {
    /// Compare `current_file_hash` against the stored file hash and recheck
    /// the record's integrity digest.
    ///
    /// # Errors
    ///
    /// [`CustodyError::Validation`] for malformed arguments,
    /// [`CustodyError::NotFound`] if absent, [`CustodyError::CorruptRecord`]
    /// if unreadable, [`CustodyError::Store`] on store failure.
    pub fn verify_integrity<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        id: &str,
        current_file_hash: &str,
    ) -> Result<VerificationResultV1, CustodyError> {
        self.optional(OP_VERIFY, "current_file_hash", current_file_hash)?;
        let evidence = self.load_evidence(OP_VERIFY, store, id)?;

        let result = VerificationResultV1 {
            hash_match: evidence.file_hash == current_file_hash,
            integrity_hash_valid: self.is_sealed(&evidence),
            evidence_id: evidence.id,
            original_hash: evidence.file_hash,
            current_hash: current_file_hash.to_string(),
            integrity_hash: evidence.integrity_hash,
            last_modified: evidence.timestamp,
            custody_officer: evidence.custody_officer,
            verified_at: self.clock().now(),
        };
        if !result.hash_match || !result.integrity_hash_valid {
            tracing::warn!(
                evidence_id = %result.evidence_id,
                hash_match = result.hash_match,
                integrity_hash_valid = result.integrity_hash_valid,
                "integrity check failed"
            );
        }
        Ok(result)
    }

    /// Check that the custody chain of `evidence_id` is continuous, ordered,
    /// and ends at the current custodian. Zero transfers is a valid chain.
    ///
    /// # Errors
    ///
    /// As [`CustodyService::read_evidence`] and
    /// [`CustodyService::get_custody_chain`].
    pub fn verify_custody_chain<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        evidence_id: &str,
    ) -> Result<ChainVerificationV1, CustodyError> {
        let evidence = self.load_evidence(OP_VERIFY_CHAIN, store, evidence_id)?;
        let chain = self.get_custody_chain(store, evidence_id)?;

        let mut linked = true;
        let mut chronological = true;
        let mut first_break = None;
        for (i, pair) in chain.windows(2).enumerate() {
            let link_ok = pair[0].to_officer == pair[1].from_officer;
            let order_ok = pair[0].timestamp <= pair[1].timestamp;
            linked &= link_ok;
            chronological &= order_ok;
            if first_break.is_none() && !(link_ok && order_ok) {
                first_break = Some(i + 1);
            }
        }
        let matches_current_custodian = chain
            .last()
            .is_none_or(|last| last.to_officer == evidence.custody_officer);
        if first_break.is_none() && !matches_current_custodian {
            first_break = Some(chain.len());
        }

        let report = ChainVerificationV1 {
            evidence_id: evidence_id.to_string(),
            transfer_count: chain.len(),
            linked,
            chronological,
            matches_current_custodian,
            first_break,
            current_custodian: evidence.custody_officer,
        };
        if report.is_valid() {
            tracing::debug!(evidence_id = %evidence_id, transfers = report.transfer_count, "custody chain verified");
        } else {
            tracing::warn!(
                evidence_id = %evidence_id,
                linked,
                chronological,
                matches_current_custodian,
                first_break = ?report.first_break,
                "custody chain broken"
            );
        }
        Ok(report)
    }
}
