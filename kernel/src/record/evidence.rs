//! The `Evidence` record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an evidence item.
///
/// The set is open: any string is a valid status and no transition table is
/// enforced. The three named variants are the values the system itself
/// writes or queries for; everything else round-trips through `Other`.
/// Matching is case-sensitive (`"active"` is `Other`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EvidenceStatus {
    /// `"ACTIVE"`: in use; the only status custodian queries return.
    Active,
    /// `"ARCHIVED"`: retired.
    Archived,
    /// `"DISPUTED"`: under challenge.
    Disputed,
    /// Any other status string.
    ///
    /// Construct through `From<&str>`/`From<String>` so that named values are
    /// never wrapped here.
    Other(String),
}

impl EvidenceStatus {
    /// The wire string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::Archived => "ARCHIVED",
            Self::Disputed => "DISPUTED",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for EvidenceStatus {
    fn from(s: &str) -> Self {
        match s {
            "ACTIVE" => Self::Active,
            "ARCHIVED" => Self::Archived,
            "DISPUTED" => Self::Disputed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for EvidenceStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ACTIVE" | "ARCHIVED" | "DISPUTED" => Self::from(s.as_str()),
            _ => Self::Other(s),
        }
    }
}

impl From<EvidenceStatus> for String {
    fn from(status: EvidenceStatus) -> Self {
        match status {
            EvidenceStatus::Other(s) => s,
            named => named.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for EvidenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One evidence item as stored on the ledger.
///
/// `id` never changes after creation. `integrity_hash` is derived from six of
/// the other fields (see [`crate::proof::integrity`]) and is rewritten on
/// every mutation; it is never set from caller input. `timestamp` never
/// decreases across the record's versions.
///
/// The legacy field names `ipfsCid` and `blockchainHash` are accepted on
/// decode so records written by earlier deployments still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub id: String,
    pub case_id: String,
    pub filename: String,
    /// Content-addressed storage pointer for the underlying file.
    #[serde(alias = "ipfsCid")]
    pub content_locator_cid: String,
    /// Hash of the file content as supplied by the caller (never recomputed here).
    pub file_hash: String,
    #[serde(alias = "blockchainHash")]
    pub integrity_hash: String,
    /// Current holder.
    pub custody_officer: String,
    pub timestamp: DateTime<Utc>,
    pub status: EvidenceStatus,
    /// Classification tag.
    pub access_level: String,
}
