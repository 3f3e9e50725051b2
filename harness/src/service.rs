//! `CustodyService`: configuration plus the shared read/write helpers every
//! operation goes through.

use chrono::{DateTime, Utc};
use custody_kernel::error::CustodyError;
use custody_kernel::proof::integrity;
use custody_kernel::record::codec;
use custody_kernel::record::validate;
use custody_kernel::record::Evidence;
use custody_kernel::store::{CompositeKey, LedgerStore};

use crate::clock::{Clock, SystemClock};
use crate::policy::{CustodyPolicyV1, PolicyError};

/// Stateless custody operations over a caller-supplied ledger transaction.
#[derive(Debug)]
pub struct CustodyService<C = SystemClock> {
    policy: CustodyPolicyV1,
    clock: C,
}

impl CustodyService<SystemClock> {
    /// A service reading the wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if `policy` fails validation.
    pub fn new(policy: CustodyPolicyV1) -> Result<Self, PolicyError> {
        Self::with_clock(policy, SystemClock)
    }
}

impl<C: Clock> CustodyService<C> {
    /// A service reading `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if `policy` fails validation.
    pub fn with_clock(policy: CustodyPolicyV1, clock: C) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self { policy, clock })
    }

    /// The active policy.
    #[must_use]
    pub fn policy(&self) -> &CustodyPolicyV1 {
        &self.policy
    }

    /// The time source.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// `max(now, previous)`: record timestamps never go backwards.
    pub(crate) fn next_timestamp(&self, previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let now = self.clock.now();
        match previous {
            Some(prev) if prev > now => prev,
            _ => now,
        }
    }

    pub(crate) fn seal(&self, evidence: &mut Evidence) {
        integrity::seal(evidence, self.policy.digest_timestamp);
    }

    pub(crate) fn is_sealed(&self, evidence: &Evidence) -> bool {
        integrity::is_sealed(evidence, self.policy.digest_timestamp)
    }

    pub(crate) fn required(
        &self,
        op: &'static str,
        field: &'static str,
        value: &str,
    ) -> Result<(), CustodyError> {
        validate::required(op, field, value, self.policy.max_field_len)
    }

    pub(crate) fn optional(
        &self,
        op: &'static str,
        field: &'static str,
        value: &str,
    ) -> Result<(), CustodyError> {
        validate::optional(op, field, value, self.policy.max_field_len)
    }

    /// Custody-namespace key from `parts` (full key or range prefix).
    pub(crate) fn custody_key(
        &self,
        op: &'static str,
        parts: &[&str],
    ) -> Result<CompositeKey, CustodyError> {
        CompositeKey::new(&self.policy.custody_namespace, parts).map_err(|e| {
            CustodyError::Validation {
                op,
                field: "custody key",
                detail: e.to_string(),
            }
        })
    }

    /// Read and decode the evidence record under `id`.
    pub(crate) fn load_evidence<S: LedgerStore + ?Sized>(
        &self,
        op: &'static str,
        store: &S,
        id: &str,
    ) -> Result<Evidence, CustodyError> {
        self.required(op, "id", id)?;
        let bytes = store
            .get(id)
            .map_err(CustodyError::store(op, id))?
            .ok_or_else(|| CustodyError::NotFound {
                op,
                id: id.to_string(),
            })?;
        decode_evidence_at(op, id, &bytes)
    }

    /// Encode and stage `evidence` under its id.
    pub(crate) fn store_evidence<S: LedgerStore + ?Sized>(
        &self,
        op: &'static str,
        store: &mut S,
        evidence: &Evidence,
    ) -> Result<(), CustodyError> {
        let bytes = codec::encode_evidence(evidence).map_err(|e| CustodyError::CorruptRecord {
            op,
            key: evidence.id.clone(),
            detail: e.to_string(),
        })?;
        store
            .put(&evidence.id, bytes)
            .map_err(CustodyError::store(op, &evidence.id))
    }
}

/// Decode evidence bytes read from `key`.
pub(crate) fn decode_evidence_at(
    op: &'static str,
    key: &str,
    bytes: &[u8],
) -> Result<Evidence, CustodyError> {
    codec::decode_evidence(bytes).map_err(|e| CustodyError::CorruptRecord {
        op,
        key: key.to_string(),
        detail: e.to_string(),
    })
}
