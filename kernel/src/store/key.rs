//! Composite keys: namespaced, ordered, range-scannable store keys.
//!
//! # Encoding
//!
//! ```text
//! U+0000 namespace U+0000 part_1 U+0000 ... part_n U+0000
//! ```
//!
//! # Sort-order contract
//!
//! U+0000 is the smallest code point and may not appear inside the namespace
//! or any part, so byte-wise ordering of encoded keys equals lexicographic
//! ordering of the `(namespace, part_1, ..., part_n)` tuple. A key built from
//! a prefix of parts is a string prefix of every key extending those parts,
//! and of no other key (each part is terminated, so `"E1"` never matches
//! `"E10"`).
//!
//! Plain (non-composite) keys must not start with U+0000; that leading byte is
//! what separates the two key spaces.

/// Separator between composite key components.
pub const KEY_SEPARATOR: char = '\u{0}';

/// Failure to build or split a composite key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The namespace was empty.
    EmptyNamespace,
    /// A namespace or part contained the separator character.
    ContainsSeparator { component: String },
    /// The key is not in composite form.
    NotComposite { key: String },
}

impl std::fmt::Display for KeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNamespace => write!(f, "composite key namespace is empty"),
            Self::ContainsSeparator { component } => {
                write!(f, "key component {component:?} contains U+0000")
            }
            Self::NotComposite { key } => write!(f, "{key:?} is not a composite key"),
        }
    }
}

impl std::error::Error for KeyError {}

/// A composite store key (or a partial key used as a range prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey {
    encoded: String,
}

impl CompositeKey {
    /// Build a composite key from a namespace and ordered parts.
    ///
    /// With fewer parts than a full key, the result is a partial key suitable
    /// for [`super::LedgerStore::range_by_partial_key`].
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::EmptyNamespace`] for an empty namespace and
    /// [`KeyError::ContainsSeparator`] if any component contains U+0000.
    pub fn new(namespace: &str, parts: &[&str]) -> Result<Self, KeyError> {
        if namespace.is_empty() {
            return Err(KeyError::EmptyNamespace);
        }
        let mut encoded = String::with_capacity(
            2 + namespace.len() + parts.iter().map(|p| p.len() + 1).sum::<usize>(),
        );
        encoded.push(KEY_SEPARATOR);
        for component in std::iter::once(&namespace).chain(parts) {
            if component.contains(KEY_SEPARATOR) {
                return Err(KeyError::ContainsSeparator {
                    component: (*component).to_string(),
                });
            }
            encoded.push_str(component);
            encoded.push(KEY_SEPARATOR);
        }
        Ok(Self { encoded })
    }

    /// Split an encoded key back into namespace and parts.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::NotComposite`] if `key` does not use the composite
    /// encoding.
    pub fn split(key: &str) -> Result<(String, Vec<String>), KeyError> {
        let not_composite = || KeyError::NotComposite {
            key: key.to_string(),
        };
        let body = key
            .strip_prefix(KEY_SEPARATOR)
            .and_then(|rest| rest.strip_suffix(KEY_SEPARATOR))
            .ok_or_else(not_composite)?;
        let mut components = body.split(KEY_SEPARATOR).map(str::to_string);
        let namespace = components.next().filter(|ns| !ns.is_empty()).ok_or_else(not_composite)?;
        Ok((namespace, components.collect()))
    }

    /// Whether `key` is in the composite key space.
    #[must_use]
    pub fn is_composite(key: &str) -> bool {
        key.starts_with(KEY_SEPARATOR)
    }

    /// Whether `key` extends this (partial) key.
    #[must_use]
    pub fn is_prefix_of(&self, key: &str) -> bool {
        key.starts_with(&self.encoded)
    }

    /// The encoded key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.encoded
    }
}

impl std::fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encoded.escape_debug())
    }
}
