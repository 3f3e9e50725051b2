//! Domain-separated SHA-256 for ledger-internal artifacts.
//!
//! Used for artifacts this system defines itself (snapshot digests,
//! generated transaction ids). The evidence integrity digest and case Merkle
//! hashes are *not* domain-separated: their preimages are fixed for
//! compatibility with digests already written (see [`super::integrity`] and
//! [`super::merkle`]).

use sha2::{Digest, Sha256};

/// A content-addressed hash with algorithm identifier.
///
/// Format: `"algorithm:hex_digest"` (e.g., `"sha256:abcdef..."`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash {
    full: String,
    colon: usize,
}

impl ContentHash {
    /// Parse from `"algorithm:hex"` format.
    ///
    /// Returns `None` if the colon is missing or either side is empty.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let colon = s.find(':')?;
        if colon == 0 || colon == s.len() - 1 {
            return None;
        }
        Some(Self {
            full: s.to_string(),
            colon,
        })
    }

    /// The algorithm portion (e.g., `"sha256"`).
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.full[..self.colon]
    }

    /// The hex digest portion.
    #[must_use]
    pub fn hex_digest(&self) -> &str {
        &self.full[self.colon + 1..]
    }

    /// The full `"algorithm:hex_digest"` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full)
    }
}

/// Domain separators. Each is null-terminated and unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashDomain {
    /// Ledger snapshot file digest.
    LedgerSnapshot,
    /// Generated transaction identifiers.
    TransactionId,
}

impl HashDomain {
    /// Every domain, in declaration order.
    pub const ALL: &'static [HashDomain] = &[Self::LedgerSnapshot, Self::TransactionId];

    /// The raw separator bytes.
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::LedgerSnapshot => b"CUSTODY::LEDGER_SNAPSHOT::V1\0",
            Self::TransactionId => b"CUSTODY::TRANSACTION_ID::V1\0",
        }
    }
}

/// Lower-case hex SHA-256 of `data`, without domain separation.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// `sha256(domain || data)` as a [`ContentHash`].
#[must_use]
pub fn canonical_hash(domain: HashDomain, data: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update(data);
    let full = format!("sha256:{}", hex::encode(hasher.finalize()));
    ContentHash { full, colon: 6 }
}
