//! Proof module: canonical encodings, the integrity digest, and case Merkle
//! commitments.
//!
//! Depends on `record`. Nothing in the kernel depends on `proof`.

pub mod canon;
pub mod hash;
pub mod integrity;
pub mod merkle;
