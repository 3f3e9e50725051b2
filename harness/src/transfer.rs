//! Custody Transfer Recorder.
//!
//! A transfer is two writes in the caller's transaction: the append-only
//! [`CustodyTransfer`] under `(evidence_id, timestamp, seq)` in the custody
//! namespace, then the updated evidence record. Both land or neither does.
//!
//! The timestamp part of the key is always rendered at nanosecond precision
//! (fixed width, so byte order is time order). `seq` is an 8-digit counter of
//! transfers already stored under the same `(evidence_id, timestamp)`, which
//! keeps two transfers within one clock tick from overwriting each other.

use custody_kernel::error::CustodyError;
use custody_kernel::proof::canon::TimestampForm;
use custody_kernel::record::{codec, CustodyTransfer};
use custody_kernel::store::LedgerStore;

use crate::clock::Clock;
use crate::service::CustodyService;

const OP_TRANSFER: &str = "transfer_custody";

impl<C: Clock> CustodyService<C> {
    /// Move custody of `evidence_id` to `new_officer`.
    ///
    /// Stamps the transfer with `max(now, evidence.timestamp)` so the custody
    /// chain and the record's own timestamp never run backwards.
    ///
    /// # Errors
    ///
    /// - [`CustodyError::Validation`] for empty `evidence_id`/`new_officer`,
    ///   U+0000, oversize input, or (when the policy requires it) a transfer
    ///   to the current custodian
    /// - [`CustodyError::NotFound`] if the evidence is absent
    /// - [`CustodyError::CorruptRecord`] if the stored evidence is unreadable
    /// - [`CustodyError::Store`] if either write fails; the caller must not
    ///   commit in that case
    pub fn transfer_custody<S: LedgerStore + ?Sized>(
        &self,
        store: &mut S,
        evidence_id: &str,
        new_officer: &str,
        reason: &str,
    ) -> Result<CustodyTransfer, CustodyError> {
        self.required(OP_TRANSFER, "evidence_id", evidence_id)?;
        self.required(OP_TRANSFER, "new_officer", new_officer)?;
        self.optional(OP_TRANSFER, "reason", reason)?;

        let mut evidence = self.load_evidence(OP_TRANSFER, store, evidence_id)?;
        if self.policy().require_distinct_custodian && evidence.custody_officer == new_officer {
            return Err(CustodyError::Validation {
                op: OP_TRANSFER,
                field: "new_officer",
                detail: format!("{new_officer:?} already holds {evidence_id:?}"),
            });
        }

        let timestamp = self.next_timestamp(Some(evidence.timestamp));
        let ts_part = TimestampForm::Nanos.render(&timestamp);

        let same_tick = self.custody_key(OP_TRANSFER, &[evidence_id, &ts_part])?;
        let seq = store
            .range_by_partial_key(&same_tick)
            .map_err(CustodyError::store(OP_TRANSFER, same_tick.as_str()))?
            .len();
        let seq_part = format!("{seq:08}");
        let key = self.custody_key(OP_TRANSFER, &[evidence_id, &ts_part, &seq_part])?;

        let transfer = CustodyTransfer {
            evidence_id: evidence_id.to_string(),
            from_officer: evidence.custody_officer.clone(),
            to_officer: new_officer.to_string(),
            timestamp,
            reason: reason.to_string(),
            transaction_id: store.current_transaction_id().to_string(),
        };
        let bytes = codec::encode_transfer(&transfer).map_err(|e| CustodyError::CorruptRecord {
            op: OP_TRANSFER,
            key: key.as_str().to_string(),
            detail: e.to_string(),
        })?;
        store
            .put(key.as_str(), bytes)
            .map_err(CustodyError::store(OP_TRANSFER, key.as_str()))?;

        evidence.custody_officer = new_officer.to_string();
        evidence.timestamp = timestamp;
        self.seal(&mut evidence);
        self.store_evidence(OP_TRANSFER, store, &evidence)?;

        tracing::info!(
            evidence_id = %evidence_id,
            from = %transfer.from_officer,
            to = %transfer.to_officer,
            seq,
            tx_id = %transfer.transaction_id,
            "custody transferred"
        );
        Ok(transfer)
    }
}
