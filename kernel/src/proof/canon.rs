//! Canonical encodings: fixed-width timestamps and canonical JSON bytes.
//!
//! Every byte string that feeds a digest or a sortable key is produced here.
//!
//! # Timestamp forms
//!
//! All forms are UTC with a literal `Z` and fixed width for years 0000-9999,
//! so lexicographic order equals chronological order within one form.
//!
//! | Form | Example | Used by |
//! |------|---------|---------|
//! | `Seconds` | `2024-01-02T03:04:05Z` | legacy integrity digest |
//! | `Millis` | `2024-01-02T03:04:05.123Z` | case Merkle leaves |
//! | `Nanos` | `2024-01-02T03:04:05.123456789Z` | custody keys, strict digest |
//!
//! # Canonical JSON
//!
//! Sorted object keys (byte order), no whitespace, integer numbers only,
//! RFC 8259 string escaping with control characters as `\u00XX`.

use std::io::Write;

use chrono::{DateTime, Utc};

/// Fixed-width UTC timestamp renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampForm {
    /// Whole seconds.
    Seconds,
    /// Three fractional digits.
    Millis,
    /// Nine fractional digits.
    Nanos,
}

impl TimestampForm {
    /// Render `ts` in this form.
    #[must_use]
    pub fn render(self, ts: &DateTime<Utc>) -> String {
        let pattern = match self {
            Self::Seconds => "%Y-%m-%dT%H:%M:%SZ",
            Self::Millis => "%Y-%m-%dT%H:%M:%S%.3fZ",
            Self::Nanos => "%Y-%m-%dT%H:%M:%S%.9fZ",
        };
        ts.format(pattern).to_string()
    }
}

/// Failure to produce canonical JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonError {
    /// A number was not an `i64`/`u64`.
    NonIntegerNumber { raw: String },
}

impl std::fmt::Display for CanonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonIntegerNumber { raw } => {
                write!(f, "non-integer number in canonical JSON: {raw}")
            }
        }
    }
}

impl std::error::Error for CanonError {}

/// Canonical JSON bytes of `value`.
///
/// # Errors
///
/// Returns [`CanonError::NonIntegerNumber`] for floats.
pub fn canonical_json_bytes(value: &serde_json::Value) -> Result<Vec<u8>, CanonError> {
    let mut out = Vec::new();
    emit(&mut out, value)?;
    Ok(out)
}

fn emit(out: &mut Vec<u8>, value: &serde_json::Value) -> Result<(), CanonError> {
    use serde_json::Value;
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                let _ = write!(out, "{i}");
            } else if let Some(u) = n.as_u64() {
                let _ = write!(out, "{u}");
            } else {
                return Err(CanonError::NonIntegerNumber { raw: n.to_string() });
            }
        }
        Value::String(s) => emit_str(out, s),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                emit(out, item)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            out.push(b'{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                emit_str(out, k);
                out.push(b':');
                emit(out, v)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

fn emit_str(out: &mut Vec<u8>, s: &str) {
    out.push(b'"');
    for ch in s.chars() {
        match ch {
            '"' => out.extend_from_slice(b"\\\""),
            '\\' => out.extend_from_slice(b"\\\\"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\r' => out.extend_from_slice(b"\\r"),
            '\t' => out.extend_from_slice(b"\\t"),
            '\u{8}' => out.extend_from_slice(b"\\b"),
            '\u{c}' => out.extend_from_slice(b"\\f"),
            c if c < '\u{20}' => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    out.push(b'"');
}
