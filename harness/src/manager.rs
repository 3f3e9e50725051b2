//! Evidence Record Manager: create, read, status update, existence.

use custody_kernel::error::CustodyError;
use custody_kernel::record::{Evidence, EvidenceStatus};
use custody_kernel::store::LedgerStore;

use crate::clock::Clock;
use crate::service::CustodyService;

const OP_CREATE: &str = "create_evidence";
const OP_READ: &str = "read_evidence";
const OP_UPDATE_STATUS: &str = "update_status";
const OP_EXISTS: &str = "exists";

/// Caller-supplied fields of a new evidence record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvidence {
    pub id: String,
    pub case_id: String,
    pub filename: String,
    pub content_locator_cid: String,
    pub file_hash: String,
    pub custody_officer: String,
    pub access_level: String,
}

impl<C: Clock> CustodyService<C> {
    /// Create a new `ACTIVE` evidence record stamped `now`.
    ///
    /// Writes exactly one version under `new.id`.
    ///
    /// # Errors
    ///
    /// - [`CustodyError::Validation`] for empty identity fields, U+0000, or
    ///   oversize input
    /// - [`CustodyError::AlreadyExists`] if `new.id` is present (the existing
    ///   record is not touched)
    /// - [`CustodyError::Store`] if the store fails
    pub fn create_evidence<S: LedgerStore + ?Sized>(
        &self,
        store: &mut S,
        new: &NewEvidence,
    ) -> Result<Evidence, CustodyError> {
        self.required(OP_CREATE, "id", &new.id)?;
        self.required(OP_CREATE, "case_id", &new.case_id)?;
        self.required(OP_CREATE, "custody_officer", &new.custody_officer)?;
        self.optional(OP_CREATE, "filename", &new.filename)?;
        self.optional(OP_CREATE, "content_locator_cid", &new.content_locator_cid)?;
        self.optional(OP_CREATE, "file_hash", &new.file_hash)?;
        self.optional(OP_CREATE, "access_level", &new.access_level)?;

        if store
            .exists(&new.id)
            .map_err(CustodyError::store(OP_CREATE, &new.id))?
        {
            return Err(CustodyError::AlreadyExists {
                op: OP_CREATE,
                id: new.id.clone(),
            });
        }

        let mut evidence = Evidence {
            id: new.id.clone(),
            case_id: new.case_id.clone(),
            filename: new.filename.clone(),
            content_locator_cid: new.content_locator_cid.clone(),
            file_hash: new.file_hash.clone(),
            integrity_hash: String::new(),
            custody_officer: new.custody_officer.clone(),
            timestamp: self.next_timestamp(None),
            status: EvidenceStatus::Active,
            access_level: new.access_level.clone(),
        };
        self.seal(&mut evidence);
        self.store_evidence(OP_CREATE, store, &evidence)?;

        tracing::info!(
            evidence_id = %evidence.id,
            case_id = %evidence.case_id,
            custody_officer = %evidence.custody_officer,
            tx_id = %store.current_transaction_id(),
            "evidence created"
        );
        Ok(evidence)
    }

    /// Read the current evidence record.
    ///
    /// # Errors
    ///
    /// [`CustodyError::NotFound`] if absent, [`CustodyError::CorruptRecord`]
    /// if the stored bytes do not decode, [`CustodyError::Store`] on store failure.
    pub fn read_evidence<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        id: &str,
    ) -> Result<Evidence, CustodyError> {
        let evidence = self.load_evidence(OP_READ, store, id)?;
        tracing::debug!(evidence_id = %id, "evidence read");
        Ok(evidence)
    }

    /// Set the status (any value; no transition rules), refresh the timestamp,
    /// and reseal.
    ///
    /// # Errors
    ///
    /// [`CustodyError::Validation`] for an empty status, otherwise as
    /// [`CustodyService::read_evidence`] plus [`CustodyError::Store`] on write.
    pub fn update_status<S: LedgerStore + ?Sized>(
        &self,
        store: &mut S,
        id: &str,
        new_status: &str,
    ) -> Result<Evidence, CustodyError> {
        self.required(OP_UPDATE_STATUS, "status", new_status)?;
        let mut evidence = self.load_evidence(OP_UPDATE_STATUS, store, id)?;
        let previous = std::mem::replace(&mut evidence.status, EvidenceStatus::from(new_status));
        evidence.timestamp = self.next_timestamp(Some(evidence.timestamp));
        self.seal(&mut evidence);
        self.store_evidence(OP_UPDATE_STATUS, store, &evidence)?;

        tracing::info!(
            evidence_id = %id,
            from = %previous,
            to = %evidence.status,
            tx_id = %store.current_transaction_id(),
            "evidence status updated"
        );
        Ok(evidence)
    }

    /// Whether a record exists under `id`.
    ///
    /// # Errors
    ///
    /// [`CustodyError::Validation`] for a malformed id, [`CustodyError::Store`]
    /// on store failure. Absence is `Ok(false)`.
    pub fn exists<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        id: &str,
    ) -> Result<bool, CustodyError> {
        self.required(OP_EXISTS, "id", id)?;
        store.exists(id).map_err(CustodyError::store(OP_EXISTS, id))
    }
}
