//! Digest lock tests: integrity hashes, Merkle leaves, and hash domains.
//!
//! Proves:
//! 1. The integrity digest matches the cross-implementation reference vector
//! 2. The digest is a pure function of the six bound fields
//! 3. Merkle leaf and root vectors are stable
//! 4. Hash domains are unique, null-terminated, and `CUSTODY::*::V1\0`
//! 5. No raw `CUSTODY::` domain literals in production source outside `hash.rs`

use std::collections::BTreeSet;

use custody_kernel::proof::hash::{sha256_hex, HashDomain};
use custody_kernel::proof::integrity::{integrity_hash, integrity_preimage, DigestTimestampV1};
use custody_kernel::proof::merkle::{evidence_leaf_hash, merkle_root};
use custody_kernel::record::{Evidence, EvidenceStatus};
use lock_tests::fixtures::legacy_reference_record;

// ---------------------------------------------------------------------------
// 1. Reference vectors
// ---------------------------------------------------------------------------

#[test]
fn integrity_digest_matches_reference_vector() {
    let e = legacy_reference_record();
    assert_eq!(
        integrity_preimage(&e, DigestTimestampV1::LegacySeconds),
        "evidence1case1QmTestCID123sha256_hash_placeholderofficer.doe@police.gov2024-03-15T10:30:00Z"
    );
    assert_eq!(
        integrity_hash(&e, DigestTimestampV1::LegacySeconds),
        "2f7eed65f9354bfd48cca578ba8ba04698dbfc0d95fc9b38bd542663814a4136"
    );
}

#[test]
fn digest_is_lowercase_hex_of_fixed_width() {
    let digest = integrity_hash(&legacy_reference_record(), DigestTimestampV1::Nanos);
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
}

// ---------------------------------------------------------------------------
// 2. Bound and unbound fields
// ---------------------------------------------------------------------------

#[test]
fn digest_ignores_unbound_fields() {
    let base = legacy_reference_record();
    let reference = integrity_hash(&base, DigestTimestampV1::LegacySeconds);

    let mut e = base.clone();
    e.filename = "renamed.pdf".into();
    e.status = EvidenceStatus::Archived;
    e.access_level = "PUBLIC".into();
    e.integrity_hash = "stale".into();
    assert_eq!(integrity_hash(&e, DigestTimestampV1::LegacySeconds), reference);
}

#[test]
fn digest_binds_every_identity_field() {
    let base = legacy_reference_record();
    let reference = integrity_hash(&base, DigestTimestampV1::LegacySeconds);

    let mutations: [fn(&mut Evidence); 6] = [
        |e: &mut Evidence| e.id.push('x'),
        |e: &mut Evidence| e.case_id.push('x'),
        |e: &mut Evidence| e.content_locator_cid.push('x'),
        |e: &mut Evidence| e.file_hash.push('x'),
        |e: &mut Evidence| e.custody_officer.push('x'),
        |e: &mut Evidence| e.timestamp += chrono::Duration::seconds(1),
    ];
    for (i, mutate) in mutations.iter().enumerate() {
        let mut e = base.clone();
        mutate(&mut e);
        assert_ne!(
            integrity_hash(&e, DigestTimestampV1::LegacySeconds),
            reference,
            "mutation {i} did not change the digest"
        );
    }
}

#[test]
fn sub_second_timestamp_changes_depend_on_digest_form() {
    let base = legacy_reference_record();

    let mut later = base.clone();
    later.timestamp += chrono::Duration::milliseconds(500);
    assert_eq!(
        integrity_hash(&later, DigestTimestampV1::LegacySeconds),
        integrity_hash(&base, DigestTimestampV1::LegacySeconds)
    );

    let mut next_tick = base.clone();
    next_tick.timestamp += chrono::Duration::nanoseconds(1);
    assert_ne!(
        integrity_hash(&next_tick, DigestTimestampV1::Nanos),
        integrity_hash(&base, DigestTimestampV1::Nanos)
    );
}

// ---------------------------------------------------------------------------
// 3. Merkle vectors
// ---------------------------------------------------------------------------

#[test]
fn merkle_leaf_matches_reference_vector() {
    assert_eq!(
        evidence_leaf_hash(&legacy_reference_record()).unwrap(),
        "ed5e7de32d601f673a7a5b99fdcab9a1088b80ee3a91c65db06b880a3a78a60b"
    );
}

#[test]
fn merkle_roots_match_reference_vectors() {
    let leaves: Vec<String> = ["a", "b", "c"].iter().map(|s| sha256_hex(s.as_bytes())).collect();
    assert_eq!(
        merkle_root(&leaves[..2]).unwrap(),
        "e5a01fee14e0ed5c48714f22180f25ad8365b53f9779f79dc4a3d7e93963f94a"
    );
    assert_eq!(
        merkle_root(&leaves).unwrap(),
        "d31a37ef6ac14a2db1470c4316beb5592e6afd4465022339adafda76a18ffabe"
    );
}

// ---------------------------------------------------------------------------
// 4. Hash domains
// ---------------------------------------------------------------------------

#[test]
fn hash_domain_canonical_set_count() {
    assert_eq!(
        HashDomain::ALL.len(),
        2,
        "expected 2 domain variants; if you added a new domain, update this count"
    );
}

#[test]
fn hash_domains_are_unique_and_well_formed() {
    let mut seen = BTreeSet::new();
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        assert!(seen.insert(bytes), "duplicate domain bytes: {domain:?}");
        assert_eq!(bytes.last(), Some(&0), "{domain:?} is not null-terminated");
        let text = std::str::from_utf8(&bytes[..bytes.len() - 1]).unwrap();
        assert!(text.starts_with("CUSTODY::"), "{text}");
        assert!(text.ends_with("::V1"), "{text}");
    }
}

// ---------------------------------------------------------------------------
// 5. Source scan
// ---------------------------------------------------------------------------

fn rust_sources(dir: &std::path::Path, out: &mut Vec<std::path::PathBuf>) {
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            rust_sources(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

#[test]
fn no_raw_domain_literals_outside_hash_module() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let mut files = Vec::new();
    for krate in ["kernel", "ledger", "harness"] {
        rust_sources(&root.join(krate).join("src"), &mut files);
    }
    assert!(!files.is_empty());

    let offenders: Vec<String> = files
        .iter()
        .filter(|p| !p.ends_with("proof/hash.rs"))
        .filter(|p| {
            std::fs::read_to_string(p)
                .unwrap()
                .contains("b\"CUSTODY::")
        })
        .map(|p| p.display().to_string())
        .collect();
    assert!(offenders.is_empty(), "raw domain literals in {offenders:?}");
}
