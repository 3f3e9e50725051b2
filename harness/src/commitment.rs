//! Case commitments: a Merkle root over every current evidence record of a
//! case, and membership proofs against it.
//!
//! Leaves are ordered by evidence id, so the root is independent of the order
//! the rich query happens to return.

use custody_kernel::error::CustodyError;
use custody_kernel::proof::merkle::{self, MerkleError, MerkleProof};
use custody_kernel::record::Evidence;
use custody_kernel::store::LedgerStore;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::service::CustodyService;

const OP_ROOT: &str = "case_merkle_root";
const OP_PROVE: &str = "prove_evidence_in_case";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseLeafV1 {
    pub evidence_id: String,
    pub leaf_hash: String,
}

/// Root and ordered leaves committing to one case's current evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseCommitmentV1 {
    pub case_id: String,
    /// [`merkle::EMPTY_MERKLE_ROOT`] for a case with no evidence.
    pub root: String,
    pub leaves: Vec<CaseLeafV1>,
}

impl CaseCommitmentV1 {
    fn leaf_hashes(&self) -> Vec<String> {
        self.leaves.iter().map(|l| l.leaf_hash.clone()).collect()
    }
}

fn merkle_err<'a>(
    op: &'static str,
    key: &'a str,
) -> impl FnOnce(MerkleError) -> CustodyError + 'a {
    move |e| CustodyError::CorruptRecord {
        op,
        key: key.to_string(),
        detail: e.to_string(),
    }
}

impl<C: Clock> CustodyService<C> {
    /// Commit to the current evidence of `case_id`.
    ///
    /// # Errors
    ///
    /// As [`CustodyService::query_by_case`]; [`CustodyError::CorruptRecord`]
    /// if a leaf cannot be hashed.
    pub fn case_merkle_root<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        case_id: &str,
    ) -> Result<CaseCommitmentV1, CustodyError> {
        self.case_commitment(OP_ROOT, store, case_id)
    }

    /// Membership proof of `evidence_id` in the commitment of `case_id`.
    ///
    /// # Errors
    ///
    /// [`CustodyError::NotFound`] if the evidence is not a current member of
    /// the case; otherwise as [`CustodyService::case_merkle_root`].
    pub fn prove_evidence_in_case<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        case_id: &str,
        evidence_id: &str,
    ) -> Result<MerkleProof, CustodyError> {
        self.required(OP_PROVE, "evidence_id", evidence_id)?;
        let commitment = self.case_commitment(OP_PROVE, store, case_id)?;
        let index = commitment
            .leaves
            .iter()
            .position(|l| l.evidence_id == evidence_id)
            .ok_or_else(|| CustodyError::NotFound {
                op: OP_PROVE,
                id: evidence_id.to_string(),
            })?;
        merkle::generate_proof(&commitment.leaf_hashes(), index)
            .map_err(merkle_err(OP_PROVE, evidence_id))
    }

    fn case_commitment<S: LedgerStore + ?Sized>(
        &self,
        op: &'static str,
        store: &S,
        case_id: &str,
    ) -> Result<CaseCommitmentV1, CustodyError> {
        let mut records: Vec<Evidence> = self.query_by_case(store, case_id)?;
        records.sort_by(|a, b| a.id.cmp(&b.id));

        let leaves = records
            .iter()
            .map(|e| {
                Ok(CaseLeafV1 {
                    evidence_id: e.id.clone(),
                    leaf_hash: merkle::evidence_leaf_hash(e).map_err(merkle_err(op, &e.id))?,
                })
            })
            .collect::<Result<Vec<_>, CustodyError>>()?;
        let mut commitment = CaseCommitmentV1 {
            case_id: case_id.to_string(),
            root: String::new(),
            leaves,
        };
        commitment.root =
            merkle::merkle_root(&commitment.leaf_hashes()).map_err(merkle_err(op, case_id))?;
        tracing::debug!(case_id = %case_id, leaves = commitment.leaves.len(), root = %commitment.root, "case commitment");
        Ok(commitment)
    }
}
