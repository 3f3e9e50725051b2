//! Input validation applied before any store access.
//!
//! Two rules hold for every string argument: no U+0000 (it is the composite
//! key separator) and at most `max_len` bytes. Identity-bearing fields must
//! also be non-empty.

use crate::error::CustodyError;
use crate::store::KEY_SEPARATOR;

/// Check a field that must be present.
///
/// # Errors
///
/// Returns [`CustodyError::Validation`] if `value` is empty, contains U+0000,
/// or exceeds `max_len` bytes.
pub fn required(
    op: &'static str,
    field: &'static str,
    value: &str,
    max_len: usize,
) -> Result<(), CustodyError> {
    if value.is_empty() {
        return Err(CustodyError::Validation {
            op,
            field,
            detail: "must not be empty".into(),
        });
    }
    optional(op, field, value, max_len)
}

/// Check a field that may be empty.
///
/// # Errors
///
/// Returns [`CustodyError::Validation`] if `value` contains U+0000 or exceeds
/// `max_len` bytes.
pub fn optional(
    op: &'static str,
    field: &'static str,
    value: &str,
    max_len: usize,
) -> Result<(), CustodyError> {
    if value.contains(KEY_SEPARATOR) {
        return Err(CustodyError::Validation {
            op,
            field,
            detail: "must not contain U+0000".into(),
        });
    }
    if value.len() > max_len {
        return Err(CustodyError::Validation {
            op,
            field,
            detail: format!("length {} exceeds limit {max_len}", value.len()),
        });
    }
    Ok(())
}
