//! Shared helpers for custody benchmark suites.

use chrono::{DateTime, Duration, TimeZone, Utc};
use custody_harness::{CustodyPolicyV1, CustodyService, ManualClock, NewEvidence};
use custody_kernel::record::{Evidence, EvidenceStatus};
use custody_ledger::MemoryLedger;

/// Fixed start instant for benchmark clocks.
///
/// # Panics
///
/// Never; the date is a valid constant.
#[must_use]
pub fn bench_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
}

/// Service with a clock that advances one millisecond per reading.
///
/// # Panics
///
/// Panics if the default policy fails validation.
#[must_use]
pub fn bench_service() -> CustodyService<ManualClock> {
    CustodyService::with_clock(
        CustodyPolicyV1::default(),
        ManualClock::stepping(bench_epoch(), Duration::milliseconds(1)),
    )
    .expect("default policy")
}

/// A sealed-shape evidence record (integrity hash left empty).
#[must_use]
pub fn sample_evidence(n: usize) -> Evidence {
    Evidence {
        id: format!("E{n:06}"),
        case_id: format!("case-{}", n % 16),
        filename: format!("item-{n}.bin"),
        content_locator_cid: format!("bafybeig{n:032x}"),
        file_hash: format!("{n:064x}"),
        integrity_hash: String::new(),
        custody_officer: format!("officer-{}", n % 8),
        timestamp: bench_epoch(),
        status: EvidenceStatus::Active,
        access_level: "RESTRICTED".into(),
    }
}

/// A ledger holding `items` evidence records spread over 16 cases, each with
/// `transfers` custody transfers, one transaction per operation.
///
/// # Panics
///
/// Panics if any operation fails. Benchmark setup failures are fatal.
#[must_use]
pub fn populate_ledger(
    service: &CustodyService<ManualClock>,
    items: usize,
    transfers: usize,
) -> MemoryLedger {
    let ledger = MemoryLedger::new();
    for n in 0..items {
        let e = sample_evidence(n);
        let mut tx = ledger.begin().expect("begin");
        service
            .create_evidence(
                &mut tx,
                &NewEvidence {
                    id: e.id.clone(),
                    case_id: e.case_id,
                    filename: e.filename,
                    content_locator_cid: e.content_locator_cid,
                    file_hash: e.file_hash,
                    custody_officer: e.custody_officer,
                    access_level: e.access_level,
                },
            )
            .expect("create");
        tx.commit().expect("commit");

        for t in 0..transfers {
            let mut tx = ledger.begin().expect("begin");
            service
                .transfer_custody(&mut tx, &e.id, &format!("officer-{t}"), "bench")
                .expect("transfer");
            tx.commit().expect("commit");
        }
    }
    ledger
}
