//! Version history lock tests: order, version ids, tombstones, point reads.

use custody_harness::CustodyPolicyV1;
use custody_kernel::error::ErrorKind;
use custody_kernel::record::EvidenceStatus;
use custody_kernel::store::LedgerStore;
use custody_ledger::MemoryLedger;
use lock_tests::fixtures::{commit, new_evidence, stepping_service};

#[test]
fn every_committed_mutation_is_one_version() {
    let ledger = MemoryLedger::new();
    let svc = stepping_service(CustodyPolicyV1::default());

    let mut tx = ledger.begin().unwrap();
    svc.create_evidence(&mut tx, &new_evidence("E1", "case-1", "alice", "h"))
        .unwrap();
    let v1 = tx.commit().unwrap().transaction_id;

    let mut tx = ledger.begin().unwrap();
    svc.transfer_custody(&mut tx, "E1", "bob", "").unwrap();
    let v2 = tx.commit().unwrap().transaction_id;

    let mut tx = ledger.begin().unwrap();
    svc.update_status(&mut tx, "E1", "ARCHIVED").unwrap();
    let v3 = tx.commit().unwrap().transaction_id;

    let tx = ledger.begin().unwrap();
    let history = svc.get_evidence_history(&tx, "E1").unwrap();
    let ids: Vec<&str> = history.iter().map(|v| v.version_id.as_str()).collect();
    assert_eq!(ids, [v1.as_str(), v2.as_str(), v3.as_str()]);
    assert!(history.iter().all(|v| !v.is_tombstone()));

    let at_v2 = svc.get_evidence_at(&tx, "E1", &v2).unwrap();
    assert_eq!(at_v2.custody_officer, "bob");
    assert_eq!(at_v2.status, EvidenceStatus::Active);
    assert_eq!(
        svc.get_evidence_at(&tx, "E1", &v3).unwrap(),
        svc.read_evidence(&tx, "E1").unwrap()
    );
}

#[test]
fn multiple_writes_in_one_transaction_are_one_version() {
    let ledger = MemoryLedger::new();
    let svc = stepping_service(CustodyPolicyV1::default());
    commit(&ledger, |tx| {
        svc.create_evidence(tx, &new_evidence("E1", "case-1", "alice", "h"))?;
        svc.transfer_custody(tx, "E1", "bob", "")?;
        svc.update_status(tx, "E1", "DISPUTED")
    })
    .unwrap();
    let tx = ledger.begin().unwrap();
    let history = svc.get_evidence_history(&tx, "E1").unwrap();
    assert_eq!(history.len(), 1);
    let snapshot = history[0].snapshot.as_ref().unwrap();
    assert_eq!(snapshot.custody_officer, "bob");
    assert_eq!(snapshot.status, EvidenceStatus::Disputed);
}

#[test]
fn deletion_is_a_tombstone_and_ids_can_be_recreated() {
    let ledger = MemoryLedger::new();
    let svc = stepping_service(CustodyPolicyV1::default());
    commit(&ledger, |tx| {
        svc.create_evidence(tx, &new_evidence("E1", "case-1", "alice", "h"))
    })
    .unwrap();
    let mut tx = ledger.begin().unwrap();
    tx.delete("E1").unwrap();
    let tomb = tx.commit().unwrap().transaction_id;

    let tx = ledger.begin().unwrap();
    assert!(!svc.exists(&tx, "E1").unwrap());
    assert_eq!(
        svc.get_evidence_at(&tx, "E1", &tomb).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    drop(tx);

    commit(&ledger, |tx| {
        svc.create_evidence(tx, &new_evidence("E1", "case-2", "carol", "h2"))
    })
    .unwrap();
    let tx = ledger.begin().unwrap();
    let history = svc.get_evidence_history(&tx, "E1").unwrap();
    let shape: Vec<bool> = history.iter().map(|v| v.is_tombstone()).collect();
    assert_eq!(shape, [false, true, false]);
    assert_eq!(history[2].snapshot.as_ref().unwrap().case_id, "case-2");
    assert!(tx.history_of("E1").unwrap()[1].is_tombstone());
}

#[test]
fn transaction_ids_are_distinct_hex() {
    let ledger = MemoryLedger::new();
    let a = ledger.begin().unwrap().current_transaction_id().to_string();
    let b = ledger.begin().unwrap().current_transaction_id().to_string();
    assert_ne!(a, b);
    for id in [&a, &b] {
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
