//! Snapshot persistence: export/restore a `MemoryLedger` to/from a directory.
//!
//! # Directory layout
//!
//! ```text
//! <dir>/
//!   ledger_snapshot.json  : canonical JSON: state, versions, history
//!   ledger_digest.txt     : "sha256:<hex>" over the snapshot bytes
//! ```
//!
//! # Fail-closed restore
//!
//! - Missing file → error
//! - Digest mismatch → error
//! - Snapshot bytes not in canonical form → error
//! - Unknown `schema_version` → error

use std::collections::BTreeMap;
use std::path::Path;

use custody_kernel::proof::canon::canonical_json_bytes;
use custody_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use custody_kernel::store::{HistoryEntry, StoreError};
use serde_json::{json, Value};

use crate::memory::{LedgerState, MemoryLedger, Versioned};

const SNAPSHOT_FILENAME: &str = "ledger_snapshot.json";
const DIGEST_FILENAME: &str = "ledger_digest.txt";
const SCHEMA_VERSION: &str = "ledger_snapshot.v1";

/// Error exporting or restoring a snapshot.
#[derive(Debug)]
pub enum SnapshotError {
    /// I/O error.
    Io { detail: String },
    /// A required file is missing.
    MissingFile { filename: String },
    /// The snapshot is not valid JSON of the expected shape.
    Parse { detail: String },
    /// `schema_version` is not recognized.
    VersionMismatch { found: String },
    /// The snapshot bytes are not canonical JSON.
    NonCanonical,
    /// `ledger_digest.txt` does not match the recomputed digest.
    DigestMismatch { stored: String, recomputed: String },
    /// Canonical JSON encoding failed.
    Canon { detail: String },
    /// The ledger itself failed.
    Store(StoreError),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::MissingFile { filename } => write!(f, "missing snapshot file: {filename}"),
            Self::Parse { detail } => write!(f, "snapshot parse error: {detail}"),
            Self::VersionMismatch { found } => {
                write!(f, "snapshot schema version mismatch: {found}")
            }
            Self::NonCanonical => write!(f, "snapshot is not canonical JSON"),
            Self::DigestMismatch { stored, recomputed } => {
                write!(f, "digest mismatch: stored={stored}, recomputed={recomputed}")
            }
            Self::Canon { detail } => write!(f, "canonical JSON error: {detail}"),
            Self::Store(e) => write!(f, "ledger error: {e}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<StoreError> for SnapshotError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

fn io(e: &std::io::Error) -> SnapshotError {
    SnapshotError::Io {
        detail: e.to_string(),
    }
}

fn parse_err(detail: impl Into<String>) -> SnapshotError {
    SnapshotError::Parse {
        detail: detail.into(),
    }
}

fn snapshot_value(state: &LedgerState) -> Value {
    let entries: Vec<Value> = state
        .current
        .iter()
        .map(|(key, v)| {
            json!({
                "key": key,
                "value_hex": hex::encode(&v.value),
                "version": v.version,
            })
        })
        .collect();
    let history: Vec<Value> = state
        .history
        .iter()
        .map(|(key, versions)| {
            let versions: Vec<Value> = versions
                .iter()
                .map(|h| {
                    json!({
                        "value_hex": h.value.as_ref().map(hex::encode),
                        "version_id": h.version_id,
                    })
                })
                .collect();
            json!({ "key": key, "versions": versions })
        })
        .collect();
    json!({
        "commit_seq": state.commit_seq,
        "entries": entries,
        "history": history,
        "schema_version": SCHEMA_VERSION,
        "tx_seq": state.committed_tx_seq,
    })
}

impl MemoryLedger {
    /// Write the committed state and history to `dir` (created if missing).
    ///
    /// Returns the snapshot digest written to `ledger_digest.txt`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] on I/O or encoding failure.
    pub fn export_snapshot(&self, dir: &Path) -> Result<ContentHash, SnapshotError> {
        let bytes = {
            let state = self.lock()?;
            canonical_json_bytes(&snapshot_value(&state)).map_err(|e| SnapshotError::Canon {
                detail: e.to_string(),
            })?
        };
        let digest = canonical_hash(HashDomain::LedgerSnapshot, &bytes);

        std::fs::create_dir_all(dir).map_err(|e| io(&e))?;
        std::fs::write(dir.join(SNAPSHOT_FILENAME), &bytes).map_err(|e| io(&e))?;
        std::fs::write(dir.join(DIGEST_FILENAME), digest.as_str()).map_err(|e| io(&e))?;
        tracing::info!(dir = %dir.display(), digest = %digest, "exported ledger snapshot");
        Ok(digest)
    }

    /// Rebuild a ledger from a directory written by [`MemoryLedger::export_snapshot`].
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if a file is missing, the digest does not
    /// match, or the snapshot is malformed.
    pub fn restore_snapshot(dir: &Path) -> Result<Self, SnapshotError> {
        let bytes = read_required(dir, SNAPSHOT_FILENAME)?;
        let stored = String::from_utf8(read_required(dir, DIGEST_FILENAME)?)
            .map_err(|e| parse_err(e.to_string()))?;

        let recomputed = canonical_hash(HashDomain::LedgerSnapshot, &bytes);
        if stored.trim() != recomputed.as_str() {
            return Err(SnapshotError::DigestMismatch {
                stored: stored.trim().to_string(),
                recomputed: recomputed.as_str().to_string(),
            });
        }

        let value: Value = serde_json::from_slice(&bytes).map_err(|e| parse_err(e.to_string()))?;
        let canonical = canonical_json_bytes(&value).map_err(|e| SnapshotError::Canon {
            detail: e.to_string(),
        })?;
        if canonical != bytes {
            return Err(SnapshotError::NonCanonical);
        }

        let state = state_from_value(&value)?;
        tracing::info!(
            dir = %dir.display(),
            keys = state.current.len(),
            commit_seq = state.commit_seq,
            "restored ledger snapshot"
        );
        Ok(Self::from_state(state))
    }
}

fn read_required(dir: &Path, filename: &str) -> Result<Vec<u8>, SnapshotError> {
    let path = dir.join(filename);
    if !path.is_file() {
        return Err(SnapshotError::MissingFile {
            filename: filename.to_string(),
        });
    }
    std::fs::read(&path).map_err(|e| io(&e))
}

fn field<'a>(obj: &'a Value, name: &str) -> Result<&'a Value, SnapshotError> {
    obj.get(name)
        .ok_or_else(|| parse_err(format!("missing field {name}")))
}

fn str_field<'a>(obj: &'a Value, name: &str) -> Result<&'a str, SnapshotError> {
    field(obj, name)?
        .as_str()
        .ok_or_else(|| parse_err(format!("{name} is not a string")))
}

fn u64_field(obj: &Value, name: &str) -> Result<u64, SnapshotError> {
    field(obj, name)?
        .as_u64()
        .ok_or_else(|| parse_err(format!("{name} is not an unsigned integer")))
}

fn array_field<'a>(obj: &'a Value, name: &str) -> Result<&'a Vec<Value>, SnapshotError> {
    field(obj, name)?
        .as_array()
        .ok_or_else(|| parse_err(format!("{name} is not an array")))
}

fn decode_hex(s: &str) -> Result<Vec<u8>, SnapshotError> {
    hex::decode(s).map_err(|e| parse_err(format!("bad value_hex: {e}")))
}

fn state_from_value(value: &Value) -> Result<LedgerState, SnapshotError> {
    let version = str_field(value, "schema_version")?;
    if version != SCHEMA_VERSION {
        return Err(SnapshotError::VersionMismatch {
            found: version.to_string(),
        });
    }

    let mut current = BTreeMap::new();
    for entry in array_field(value, "entries")? {
        current.insert(
            str_field(entry, "key")?.to_string(),
            Versioned {
                value: decode_hex(str_field(entry, "value_hex")?)?,
                version: u64_field(entry, "version")?,
            },
        );
    }

    let mut history = BTreeMap::new();
    for item in array_field(value, "history")? {
        let versions = array_field(item, "versions")?
            .iter()
            .map(|v| -> Result<HistoryEntry, SnapshotError> {
                let value = match field(v, "value_hex")? {
                    Value::Null => None,
                    Value::String(s) => Some(decode_hex(s)?),
                    _ => return Err(parse_err("value_hex is neither string nor null")),
                };
                Ok(HistoryEntry {
                    version_id: str_field(v, "version_id")?.to_string(),
                    value,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        history.insert(str_field(item, "key")?.to_string(), versions);
    }

    let committed_tx_seq = u64_field(value, "tx_seq")?;
    Ok(LedgerState {
        current,
        history,
        commit_seq: u64_field(value, "commit_seq")?,
        tx_seq: committed_tx_seq,
        committed_tx_seq,
        put_budget: None,
    })
}
