//! Typed failures for custody operations.
//!
//! Every failure a caller can observe is one of five kinds (see [`ErrorKind`]).
//! Each variant carries the operation name and the key it was working on so
//! the caller can log or surface it without re-deriving context. No variant
//! implies that any partial write became visible: atomicity is owned by the
//! ledger transaction, not by this crate.

use crate::store::StoreError;

/// The coarse kind of a [`CustodyError`], for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The requested evidence id is absent.
    NotFound,
    /// The evidence id already exists on create.
    AlreadyExists,
    /// Stored bytes do not parse into the expected shape.
    CorruptRecord,
    /// The ledger store failed.
    Store,
    /// Caller input is malformed.
    Validation,
}

/// Failure of a custody operation.
#[derive(Debug)]
pub enum CustodyError {
    /// No record exists under `id`.
    NotFound { op: &'static str, id: String },
    /// A record already exists under `id`.
    AlreadyExists { op: &'static str, id: String },
    /// Bytes stored under `key` failed to decode (or a record failed to encode).
    CorruptRecord {
        op: &'static str,
        key: String,
        detail: String,
    },
    /// The ledger store returned an error for `key`.
    Store {
        op: &'static str,
        key: String,
        source: StoreError,
    },
    /// An input field was rejected before any store access.
    Validation {
        op: &'static str,
        field: &'static str,
        detail: String,
    },
}

impl CustodyError {
    /// The coarse kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::CorruptRecord { .. } => ErrorKind::CorruptRecord,
            Self::Store { .. } => ErrorKind::Store,
            Self::Validation { .. } => ErrorKind::Validation,
        }
    }

    /// The operation that failed (e.g. `"transfer_custody"`).
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::NotFound { op, .. }
            | Self::AlreadyExists { op, .. }
            | Self::CorruptRecord { op, .. }
            | Self::Store { op, .. }
            | Self::Validation { op, .. } => op,
        }
    }

    /// Wrap a store failure with operation and key context.
    pub fn store<'a>(op: &'static str, key: &'a str) -> impl FnOnce(StoreError) -> Self + 'a {
        move |source| Self::Store {
            op,
            key: key.to_string(),
            source,
        }
    }
}

impl std::fmt::Display for CustodyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { op, id } => write!(f, "{op}: evidence {id:?} does not exist"),
            Self::AlreadyExists { op, id } => {
                write!(f, "{op}: evidence {id:?} already exists")
            }
            Self::CorruptRecord { op, key, detail } => {
                write!(f, "{op}: corrupt record at {key:?}: {detail}")
            }
            Self::Store { op, key, source } => {
                write!(f, "{op}: ledger store failure at {key:?}: {source}")
            }
            Self::Validation { op, field, detail } => {
                write!(f, "{op}: invalid {field}: {detail}")
            }
        }
    }
}

impl std::error::Error for CustodyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store { source, .. } => Some(source),
            _ => None,
        }
    }
}
