//! Record codec: the single place evidence and transfer bytes are produced
//! and parsed.
//!
//! Encoding is compact `serde_json`. Decoding is tolerant of the legacy field
//! aliases declared on [`Evidence`] and of any RFC 3339 offset in timestamps
//! (normalized to UTC), and strict about everything else: a missing or
//! mistyped field is a decode failure.

use super::{CustodyTransfer, Evidence};

/// Failure to encode or decode a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The value could not be serialized.
    Encode { detail: String },
    /// The bytes are not a valid record of the expected shape.
    Decode { detail: String },
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode { detail } => write!(f, "encode failed: {detail}"),
            Self::Decode { detail } => write!(f, "decode failed: {detail}"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Encode an evidence record.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode_evidence(evidence: &Evidence) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(evidence).map_err(|e| CodecError::Encode {
        detail: e.to_string(),
    })
}

/// Decode an evidence record.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if `bytes` is not a complete evidence record.
pub fn decode_evidence(bytes: &[u8]) -> Result<Evidence, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
        detail: e.to_string(),
    })
}

/// Encode a custody transfer.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode_transfer(transfer: &CustodyTransfer) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(transfer).map_err(|e| CodecError::Encode {
        detail: e.to_string(),
    })
}

/// Decode a custody transfer.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if `bytes` is not a complete transfer record.
pub fn decode_transfer(bytes: &[u8]) -> Result<CustodyTransfer, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
        detail: e.to_string(),
    })
}
