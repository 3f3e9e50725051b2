//! Case Merkle commitments over evidence records.
//!
//! # Leaf
//!
//! `sha256_hex` of the compact JSON array
//! `[case_id, evidence_id, content_locator_cid, file_hash, timestamp]`,
//! with `timestamp` in millisecond form (`2024-03-15T10:30:00.000Z`).
//!
//! # Tree
//!
//! Layers are built bottom-up from lower-cased leaves. A parent is
//! `sha256(decode(left) || decode(right))` over the raw 32-byte digests; an
//! odd trailing node is paired with itself. The root of an empty tree is
//! [`EMPTY_MERKLE_ROOT`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::canon::{canonical_json_bytes, TimestampForm};
use super::hash::sha256_hex;
use crate::record::Evidence;

/// Root reported for a case with no evidence.
pub const EMPTY_MERKLE_ROOT: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Failure building or checking a Merkle structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// A proof was requested from an empty leaf set.
    EmptyTree,
    /// The requested leaf index is outside the leaf set.
    IndexOutOfBounds { index: usize, len: usize },
    /// A node was not a 32-byte hex digest.
    InvalidHash { hash: String },
    /// Leaf payload encoding failed.
    Encode { detail: String },
}

impl std::fmt::Display for MerkleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTree => write!(f, "cannot prove membership in an empty tree"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "leaf index {index} out of bounds for {len} leaves")
            }
            Self::InvalidHash { hash } => write!(f, "not a sha256 hex digest: {hash:?}"),
            Self::Encode { detail } => write!(f, "leaf encoding failed: {detail}"),
        }
    }
}

impl std::error::Error for MerkleError {}

/// Which side a sibling sits on when recombining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiblingPosition {
    Left,
    Right,
}

/// One step of a membership proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProofNode {
    pub position: SiblingPosition,
    pub hash: String,
}

/// Membership proof for one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub leaf: String,
    pub siblings: Vec<MerkleProofNode>,
    pub root: String,
}

/// Leaf hash for an evidence record.
///
/// # Errors
///
/// Returns [`MerkleError::Encode`] if the leaf payload cannot be encoded.
pub fn evidence_leaf_hash(evidence: &Evidence) -> Result<String, MerkleError> {
    let payload = serde_json::json!([
        evidence.case_id,
        evidence.id,
        evidence.content_locator_cid,
        evidence.file_hash,
        TimestampForm::Millis.render(&evidence.timestamp),
    ]);
    let bytes = canonical_json_bytes(&payload).map_err(|e| MerkleError::Encode {
        detail: e.to_string(),
    })?;
    Ok(sha256_hex(&bytes))
}

fn decode_node(hash: &str) -> Result<[u8; 32], MerkleError> {
    let mut out = [0u8; 32];
    hex::decode_to_slice(hash, &mut out).map_err(|_| MerkleError::InvalidHash {
        hash: hash.to_string(),
    })?;
    Ok(out)
}

fn hash_pair(left: &str, right: &str) -> Result<String, MerkleError> {
    let mut hasher = Sha256::new();
    hasher.update(decode_node(left)?);
    hasher.update(decode_node(right)?);
    Ok(hex::encode(hasher.finalize()))
}

/// All layers from the (normalized) leaves up to the single root.
///
/// # Errors
///
/// Returns [`MerkleError::InvalidHash`] if any leaf is not a 32-byte hex digest.
pub fn build_layers(leaves: &[String]) -> Result<Vec<Vec<String>>, MerkleError> {
    if leaves.is_empty() {
        return Ok(Vec::new());
    }
    let mut layers = vec![leaves.iter().map(|l| l.to_lowercase()).collect::<Vec<_>>()];
    while let Some(current) = layers.last().filter(|layer| layer.len() > 1) {
        let next = current
            .chunks(2)
            .map(|pair| hash_pair(&pair[0], pair.get(1).unwrap_or(&pair[0])))
            .collect::<Result<Vec<_>, _>>()?;
        layers.push(next);
    }
    // A lone leaf is still validated as a digest.
    if let [single] = layers[0].as_slice() {
        decode_node(single)?;
    }
    Ok(layers)
}

/// Root over `leaves`, or [`EMPTY_MERKLE_ROOT`] when empty.
///
/// # Errors
///
/// Returns [`MerkleError::InvalidHash`] if any leaf is not a 32-byte hex digest.
pub fn merkle_root(leaves: &[String]) -> Result<String, MerkleError> {
    let layers = build_layers(leaves)?;
    Ok(layers
        .last()
        .and_then(|top| top.first().cloned())
        .unwrap_or_else(|| EMPTY_MERKLE_ROOT.to_string()))
}

/// Membership proof for `leaves[index]`.
///
/// # Errors
///
/// Returns [`MerkleError::EmptyTree`], [`MerkleError::IndexOutOfBounds`], or
/// [`MerkleError::InvalidHash`].
pub fn generate_proof(leaves: &[String], index: usize) -> Result<MerkleProof, MerkleError> {
    if leaves.is_empty() {
        return Err(MerkleError::EmptyTree);
    }
    if index >= leaves.len() {
        return Err(MerkleError::IndexOutOfBounds {
            index,
            len: leaves.len(),
        });
    }
    let layers = build_layers(leaves)?;
    let mut siblings = Vec::with_capacity(layers.len() - 1);
    let mut i = index;
    for layer in &layers[..layers.len() - 1] {
        let is_right = i % 2 == 1;
        let sibling = if is_right { i - 1 } else { i + 1 };
        siblings.push(MerkleProofNode {
            position: if is_right {
                SiblingPosition::Left
            } else {
                SiblingPosition::Right
            },
            hash: layer.get(sibling).unwrap_or(&layer[i]).clone(),
        });
        i /= 2;
    }
    let root = layers[layers.len() - 1][0].clone();
    Ok(MerkleProof {
        leaf: leaves[index].clone(),
        siblings,
        root,
    })
}

/// Recompute the root from `leaf` and `proof`; true iff it equals both
/// `expected_root` and `proof.root` (case-insensitive hex).
///
/// Malformed hashes anywhere in the proof yield `false`.
#[must_use]
pub fn verify_proof(leaf: &str, proof: &MerkleProof, expected_root: &str) -> bool {
    let mut acc = leaf.to_lowercase();
    for node in &proof.siblings {
        let step = match node.position {
            SiblingPosition::Left => hash_pair(&node.hash, &acc),
            SiblingPosition::Right => hash_pair(&acc, &node.hash),
        };
        match step {
            Ok(h) => acc = h,
            Err(_) => return false,
        }
    }
    if decode_node(&acc).is_err() {
        return false;
    }
    acc == expected_root.to_lowercase() && acc == proof.root.to_lowercase()
}
