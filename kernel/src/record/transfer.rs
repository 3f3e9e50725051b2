//! The `CustodyTransfer` record: one custody-change event, written once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A custody change for one evidence item.
///
/// Ordered by `timestamp` (and by storage key, which embeds it), the transfers
/// for an item form its custody chain: each transfer's `to_officer` is the
/// next one's `from_officer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodyTransfer {
    pub evidence_id: String,
    pub from_officer: String,
    pub to_officer: String,
    pub timestamp: DateTime<Utc>,
    /// Free text.
    pub reason: String,
    /// Identifier of the write that recorded this transfer, for audit correlation.
    pub transaction_id: String,
}
