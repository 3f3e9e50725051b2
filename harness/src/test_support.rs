//! Shared fixtures for unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use custody_kernel::error::CustodyError;
use custody_ledger::{MemoryLedger, MemoryTxn};

use crate::clock::ManualClock;
use crate::manager::NewEvidence;
use crate::policy::CustodyPolicyV1;
use crate::service::CustodyService;

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
}

/// Service whose clock advances one second per reading.
pub(crate) fn service() -> CustodyService<ManualClock> {
    CustodyService::with_clock(
        CustodyPolicyV1::default(),
        ManualClock::stepping(t0(), Duration::seconds(1)),
    )
    .unwrap()
}

pub(crate) fn new_evidence(id: &str, case_id: &str, officer: &str, file_hash: &str) -> NewEvidence {
    NewEvidence {
        id: id.into(),
        case_id: case_id.into(),
        filename: format!("{id}.bin"),
        content_locator_cid: format!("bafy-{id}"),
        file_hash: file_hash.into(),
        custody_officer: officer.into(),
        access_level: "RESTRICTED".into(),
    }
}

/// Run `f` in a fresh transaction; commit on `Ok`, discard on `Err`.
pub(crate) fn in_txn<T>(
    ledger: &MemoryLedger,
    f: impl FnOnce(&mut MemoryTxn<'_>) -> Result<T, CustodyError>,
) -> Result<T, CustodyError> {
    let mut tx = ledger.begin().unwrap();
    let out = f(&mut tx)?;
    tx.commit().unwrap();
    Ok(out)
}
