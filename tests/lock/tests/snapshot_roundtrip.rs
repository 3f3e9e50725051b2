//! Ledger snapshot lock tests: a populated custody ledger survives
//! export/restore with identical query results, and tampering fails closed.

use custody_harness::{CustodyPolicyV1, CustodyService, ManualClock};
use custody_kernel::store::LedgerStore;
use custody_ledger::{MemoryLedger, SnapshotError};
use lock_tests::fixtures::{commit, new_evidence, stepping_service};

fn populated() -> (MemoryLedger, CustodyService<ManualClock>) {
    let ledger = MemoryLedger::new();
    let svc = stepping_service(CustodyPolicyV1::default());
    for (id, case) in [("E1", "case-1"), ("E2", "case-1"), ("E3", "case-2")] {
        commit(&ledger, |tx| {
            svc.create_evidence(tx, &new_evidence(id, case, "alice", "h"))
        })
        .unwrap();
    }
    commit(&ledger, |tx| svc.transfer_custody(tx, "E1", "bob", "lab")).unwrap();
    commit(&ledger, |tx| svc.transfer_custody(tx, "E1", "carol", "court")).unwrap();
    commit(&ledger, |tx| svc.update_status(tx, "E3", "ARCHIVED")).unwrap();
    (ledger, svc)
}

#[test]
fn restored_ledger_answers_identically() {
    let (ledger, svc) = populated();
    let dir = tempfile::tempdir().unwrap();
    let digest = ledger.export_snapshot(dir.path()).unwrap();
    let restored = MemoryLedger::restore_snapshot(dir.path()).unwrap();

    let a = ledger.begin().unwrap();
    let b = restored.begin().unwrap();
    for id in ["E1", "E2", "E3"] {
        assert_eq!(svc.read_evidence(&a, id).unwrap(), svc.read_evidence(&b, id).unwrap());
        assert_eq!(
            svc.get_evidence_history(&a, id).unwrap(),
            svc.get_evidence_history(&b, id).unwrap()
        );
        assert_eq!(
            svc.get_custody_chain(&a, id).unwrap(),
            svc.get_custody_chain(&b, id).unwrap()
        );
    }
    assert_eq!(
        svc.case_merkle_root(&a, "case-1").unwrap(),
        svc.case_merkle_root(&b, "case-1").unwrap()
    );
    drop((a, b));

    // Re-export is byte-identical.
    let again = tempfile::tempdir().unwrap();
    assert_eq!(restored.export_snapshot(again.path()).unwrap(), digest);
}

#[test]
fn restored_ledger_keeps_issuing_fresh_transaction_ids() {
    let (ledger, svc) = populated();
    // Read-only transactions before export do not reach the snapshot.
    for _ in 0..3 {
        let view = ledger.begin().unwrap();
        svc.read_evidence(&view, "E1").unwrap();
    }
    let dir = tempfile::tempdir().unwrap();
    ledger.export_snapshot(dir.path()).unwrap();
    let restored = MemoryLedger::restore_snapshot(dir.path()).unwrap();

    let mut tx = restored.begin().unwrap();
    svc.update_status(&mut tx, "E2", "SEALED").unwrap();
    let receipt = tx.commit().unwrap();
    let view = restored.begin().unwrap();
    for id in ["E1", "E3"] {
        let history = view.history_of(id).unwrap();
        assert!(history.iter().all(|h| h.version_id != receipt.transaction_id));
    }
    let e2 = view.history_of("E2").unwrap();
    assert_eq!(e2.len(), 2);
    assert_ne!(e2[0].version_id, e2[1].version_id);
}

#[test]
fn read_only_transactions_leave_snapshot_digest_unchanged() {
    let (ledger, svc) = populated();
    let first = tempfile::tempdir().unwrap();
    let digest = ledger.export_snapshot(first.path()).unwrap();

    let view = ledger.begin().unwrap();
    svc.query_by_case(&view, "case-1").unwrap();
    view.rollback();
    ledger.begin_with_tx_id("external").rollback();

    let second = tempfile::tempdir().unwrap();
    assert_eq!(ledger.export_snapshot(second.path()).unwrap(), digest);
}

#[test]
fn tampered_snapshot_fails_closed() {
    let (ledger, _svc) = populated();
    let dir = tempfile::tempdir().unwrap();
    ledger.export_snapshot(dir.path()).unwrap();

    let path = dir.path().join("ledger_snapshot.json");
    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, text.replacen("\"commit_seq\":", "\"commit_seq\": ", 1)).unwrap();
    assert!(matches!(
        MemoryLedger::restore_snapshot(dir.path()),
        Err(SnapshotError::DigestMismatch { .. })
    ));
}

#[test]
fn missing_digest_file_fails_closed() {
    let (ledger, _svc) = populated();
    let dir = tempfile::tempdir().unwrap();
    ledger.export_snapshot(dir.path()).unwrap();
    std::fs::remove_file(dir.path().join("ledger_digest.txt")).unwrap();
    assert!(matches!(
        MemoryLedger::restore_snapshot(dir.path()),
        Err(SnapshotError::MissingFile { .. })
    ));
}
