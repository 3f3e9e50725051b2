//! Custody policy: the service's configuration surface.

use custody_kernel::proof::integrity::DigestTimestampV1;
use custody_kernel::store::KEY_SEPARATOR;
use serde::{Deserialize, Serialize};

/// Service configuration.
///
/// Deserializes from JSON with every field optional (missing fields take the
/// [`Default`] value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustodyPolicyV1 {
    /// Timestamp rendering inside the integrity digest.
    pub digest_timestamp: DigestTimestampV1,
    /// Upper bound, in bytes, on any string argument.
    pub max_field_len: usize,
    /// Composite-key namespace for custody transfers.
    pub custody_namespace: String,
    /// Reject transfers to the officer who already holds the item.
    pub require_distinct_custodian: bool,
}

impl Default for CustodyPolicyV1 {
    fn default() -> Self {
        Self {
            digest_timestamp: DigestTimestampV1::LegacySeconds,
            max_field_len: 4096,
            custody_namespace: "custody_transfer".into(),
            require_distinct_custodian: false,
        }
    }
}

/// Invalid or unreadable policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// A field holds an unusable value.
    Invalid { detail: String },
    /// The policy document could not be parsed.
    Parse { detail: String },
}

impl std::fmt::Display for PolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { detail } => write!(f, "invalid custody policy: {detail}"),
            Self::Parse { detail } => write!(f, "custody policy parse error: {detail}"),
        }
    }
}

impl std::error::Error for PolicyError {}

impl CustodyPolicyV1 {
    /// Check that the policy is usable.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Invalid`] if `max_field_len` is zero or the
    /// custody namespace is empty or contains U+0000.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.max_field_len == 0 {
            return Err(PolicyError::Invalid {
                detail: "max_field_len must be positive".into(),
            });
        }
        if self.custody_namespace.is_empty() || self.custody_namespace.contains(KEY_SEPARATOR) {
            return Err(PolicyError::Invalid {
                detail: format!(
                    "custody_namespace {:?} must be non-empty and free of U+0000",
                    self.custody_namespace
                ),
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON policy document.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Parse`] for malformed JSON or unknown enum
    /// values, and [`PolicyError::Invalid`] if validation fails.
    pub fn from_json(bytes: &[u8]) -> Result<Self, PolicyError> {
        let policy: Self = serde_json::from_slice(bytes).map_err(|e| PolicyError::Parse {
            detail: e.to_string(),
        })?;
        policy.validate()?;
        Ok(policy)
    }
}
