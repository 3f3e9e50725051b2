//! The integrity digest: SHA-256 over a fixed projection of an evidence record.
//!
//! # Preimage
//!
//! The UTF-8 concatenation, with no separators, of:
//!
//! 1. `id`
//! 2. `case_id`
//! 3. `content_locator_cid`
//! 4. `file_hash`
//! 5. `custody_officer`
//! 6. `timestamp`, rendered per [`DigestTimestampV1`]
//!
//! The digest is the lower-case hex of SHA-256 over those bytes (64 chars).
//! `filename`, `status`, `access_level`, and `integrity_hash` itself are not
//! part of the preimage. The field order and the `LegacySeconds` timestamp
//! form are frozen: they reproduce digests already written by earlier
//! deployments byte-for-byte.

use serde::{Deserialize, Serialize};

use super::canon::TimestampForm;
use super::hash::sha256_hex;
use crate::record::Evidence;

/// How the timestamp is rendered inside the digest preimage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestTimestampV1 {
    /// `YYYY-MM-DDTHH:MM:SSZ`. Compatible with existing digests; changes
    /// finer than one second do not change the digest.
    #[default]
    LegacySeconds,
    /// `YYYY-MM-DDTHH:MM:SS.nnnnnnnnnZ`. Every timestamp change changes the digest.
    Nanos,
}

impl DigestTimestampV1 {
    fn form(self) -> TimestampForm {
        match self {
            Self::LegacySeconds => TimestampForm::Seconds,
            Self::Nanos => TimestampForm::Nanos,
        }
    }
}

/// The exact preimage string hashed for `evidence`.
#[must_use]
pub fn integrity_preimage(evidence: &Evidence, mode: DigestTimestampV1) -> String {
    let ts = mode.form().render(&evidence.timestamp);
    let mut s = String::with_capacity(
        evidence.id.len()
            + evidence.case_id.len()
            + evidence.content_locator_cid.len()
            + evidence.file_hash.len()
            + evidence.custody_officer.len()
            + ts.len(),
    );
    s.push_str(&evidence.id);
    s.push_str(&evidence.case_id);
    s.push_str(&evidence.content_locator_cid);
    s.push_str(&evidence.file_hash);
    s.push_str(&evidence.custody_officer);
    s.push_str(&ts);
    s
}

/// Compute the integrity digest of `evidence` (ignores its current `integrity_hash`).
#[must_use]
pub fn integrity_hash(evidence: &Evidence, mode: DigestTimestampV1) -> String {
    sha256_hex(integrity_preimage(evidence, mode).as_bytes())
}

/// Recompute and store the digest on `evidence`.
pub fn seal(evidence: &mut Evidence, mode: DigestTimestampV1) {
    evidence.integrity_hash = integrity_hash(evidence, mode);
}

/// Whether the stored digest equals the recomputed one.
#[must_use]
pub fn is_sealed(evidence: &Evidence, mode: DigestTimestampV1) -> bool {
    evidence.integrity_hash == integrity_hash(evidence, mode)
}
