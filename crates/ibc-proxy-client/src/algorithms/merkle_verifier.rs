//! # Merkle Commitment Proofs
//!
//! Binary SHA-256 Merkle tree over the sorted `(key, value)` entries of a
//! chain store, with membership and non-membership proofs.
//!
//! # Commitment
//!
//! - leaf = `SHA256(0x00 || u64_be(len(key)) || key || SHA256(value))`
//! - inner node = `SHA256(left || right)`, duplicating the last node of an
//!   odd level
//! - root = `SHA256(u64_be(leaf_count) || tree_root)`; the empty tree has a
//!   zero tree root

use sha2::{Digest, Sha256};

use crate::domain::{
    ClientError, CommitmentProof, ExistenceProof, Hash, NonExistenceProof, Position, ProofNode,
};

const LEAF_TAG: u8 = 0x00;

/// Verify a Merkle path from `leaf` up to `expected_root`.
///
/// # Algorithm
///
/// 1. Start with the leaf hash as current hash
/// 2. For each node in the proof path:
///    - If sibling is on left: hash = SHA256(sibling || current)
///    - If sibling is on right: hash = SHA256(current || sibling)
/// 3. Final hash should equal expected_root
///
/// # Time Complexity: O(log n)
pub fn verify_merkle_proof(leaf: &Hash, proof_path: &[ProofNode], expected_root: &Hash) -> bool {
    fold_path(leaf, proof_path) == *expected_root
}

fn fold_path(leaf: &Hash, proof_path: &[ProofNode]) -> Hash {
    proof_path.iter().fold(*leaf, |current, node| match node.position {
        Position::Left => hash_concat(&node.hash, &current),
        Position::Right => hash_concat(&current, &node.hash),
    })
}

/// Hash two nodes together.
pub fn hash_concat(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Hash of a `(key, value)` leaf.
pub fn leaf_hash(key: &[u8], value_hash: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_TAG]);
    hasher.update((key.len() as u64).to_be_bytes());
    hasher.update(key);
    hasher.update(value_hash);
    hasher.finalize().into()
}

/// SHA-256 of a value.
pub fn value_hash(value: &[u8]) -> Hash {
    Sha256::digest(value).into()
}

/// Root committed for a tree of `leaf_count` leaves.
pub fn commitment_root(leaf_count: u64, tree_root: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(leaf_count.to_be_bytes());
    hasher.update(tree_root);
    hasher.finalize().into()
}

/// Root committed for an empty store.
pub fn empty_root() -> Hash {
    commitment_root(0, &[0u8; 32])
}

/// Number of proof nodes for a leaf of a tree with `leaf_count` leaves.
pub fn tree_depth(leaf_count: u64) -> usize {
    let mut n = leaf_count;
    let mut depth = 0;
    while n > 1 {
        n = n.div_ceil(2);
        depth += 1;
    }
    depth
}

/// Leaf index encoded by the sibling positions of a path.
pub fn leaf_index(proof_path: &[ProofNode]) -> u64 {
    proof_path
        .iter()
        .enumerate()
        .filter(|(_, node)| node.position == Position::Left)
        .fold(0u64, |index, (level, _)| index | (1u64 << level))
}

/// Build a Merkle tree from leaf hashes.
///
/// Returns the tree root hash.
pub fn compute_merkle_root(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return [0u8; 32];
    }

    let mut level: Vec<Hash> = leaves.to_vec();
    while level.len() > 1 {
        level = next_level(&level);
    }
    level[0]
}

fn next_level(level: &[Hash]) -> Vec<Hash> {
    level
        .chunks(2)
        .map(|chunk| {
            let left = &chunk[0];
            let right = chunk.get(1).unwrap_or(left); // Duplicate last if odd
            hash_concat(left, right)
        })
        .collect()
}

/// Build the Merkle path for the leaf at `index`.
pub fn build_merkle_proof(leaves: &[Hash], index: usize) -> Result<Vec<ProofNode>, ClientError> {
    if index >= leaves.len() {
        return Err(ClientError::InvalidProof(format!(
            "leaf index {index} out of range for {} leaves",
            leaves.len()
        )));
    }

    let mut proof = Vec::new();
    let mut level: Vec<Hash> = leaves.to_vec();
    let mut index = index;

    while level.len() > 1 {
        let node = if index % 2 == 1 {
            ProofNode {
                hash: level[index - 1],
                position: Position::Left,
            }
        } else {
            // Last element with no pair pairs with itself
            ProofNode {
                hash: *level.get(index + 1).unwrap_or(&level[index]),
                position: Position::Right,
            }
        };
        proof.push(node);
        level = next_level(&level);
        index /= 2;
    }

    Ok(proof)
}

/// Merkle tree over the sorted entries of a store snapshot.
#[derive(Clone, Debug, Default)]
pub struct CommitmentTree {
    keys: Vec<Vec<u8>>,
    value_hashes: Vec<Hash>,
    leaves: Vec<Hash>,
}

impl CommitmentTree {
    /// Build from `(key, value)` entries. Entries are sorted by key; a
    /// repeated key keeps its last value.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Vec<u8>, Vec<u8>)>,
    {
        let sorted: std::collections::BTreeMap<Vec<u8>, Vec<u8>> = entries.into_iter().collect();
        let mut tree = Self::default();
        for (key, value) in sorted {
            let vh = value_hash(&value);
            tree.leaves.push(leaf_hash(&key, &vh));
            tree.value_hashes.push(vh);
            tree.keys.push(key);
        }
        tree
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Whether the tree has no leaves.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Committed root.
    pub fn root(&self) -> Hash {
        commitment_root(self.leaves.len() as u64, &compute_merkle_root(&self.leaves))
    }

    fn existence_at(&self, index: usize) -> Result<ExistenceProof, ClientError> {
        Ok(ExistenceProof {
            key: self.keys[index].clone(),
            value_hash: self.value_hashes[index],
            path: build_merkle_proof(&self.leaves, index)?,
            leaf_count: self.leaves.len() as u64,
        })
    }

    /// Membership or non-membership proof for `key`.
    pub fn prove(&self, key: &[u8]) -> Result<CommitmentProof, ClientError> {
        match self.keys.binary_search_by(|k| k.as_slice().cmp(key)) {
            Ok(index) => Ok(CommitmentProof::Exist(self.existence_at(index)?)),
            Err(insert_at) => {
                let left = match insert_at {
                    0 => None,
                    i => Some(self.existence_at(i - 1)?),
                };
                let right = if insert_at < self.keys.len() {
                    Some(self.existence_at(insert_at)?)
                } else {
                    None
                };
                Ok(CommitmentProof::NonExist(NonExistenceProof {
                    key: key.to_vec(),
                    left,
                    right,
                }))
            }
        }
    }
}

/// Root committed by an existence proof, after structural checks.
fn existence_root(proof: &ExistenceProof) -> Result<(Hash, u64), ClientError> {
    if proof.leaf_count == 0 {
        return Err(ClientError::InvalidProof("existence proof of an empty tree".into()));
    }
    if proof.path.len() != tree_depth(proof.leaf_count) {
        return Err(ClientError::InvalidProof(format!(
            "path length {} does not match tree of {} leaves",
            proof.path.len(),
            proof.leaf_count
        )));
    }
    let index = leaf_index(&proof.path);
    if index >= proof.leaf_count {
        return Err(ClientError::InvalidProof(format!(
            "leaf index {index} out of range for {} leaves",
            proof.leaf_count
        )));
    }
    let tree_root = fold_path(&leaf_hash(&proof.key, &proof.value_hash), &proof.path);
    Ok((commitment_root(proof.leaf_count, &tree_root), index))
}

/// Verify that `key` maps to `value` under `root`.
pub fn verify_membership(
    root: &Hash,
    proof: &CommitmentProof,
    key: &[u8],
    value: &[u8],
) -> Result<(), ClientError> {
    let proof = match proof {
        CommitmentProof::Exist(p) => p,
        CommitmentProof::NonExist(_) => {
            return Err(ClientError::InvalidProof(
                "expected an existence proof".into(),
            ))
        }
    };
    if proof.key != key {
        return Err(ClientError::InvalidProof(format!(
            "proof is for key {}, expected {}",
            String::from_utf8_lossy(&proof.key),
            String::from_utf8_lossy(key)
        )));
    }
    if proof.value_hash != value_hash(value) {
        return Err(ClientError::InvalidProof(format!(
            "value mismatch for key {}",
            String::from_utf8_lossy(key)
        )));
    }
    let (computed, _) = existence_root(proof)?;
    if computed != *root {
        return Err(ClientError::InvalidProof(format!(
            "root mismatch for key {}: computed {}, expected {}",
            String::from_utf8_lossy(key),
            hex::encode(computed),
            hex::encode(root)
        )));
    }
    Ok(())
}

/// Verify that `key` is absent under `root`.
pub fn verify_non_membership(
    root: &Hash,
    proof: &CommitmentProof,
    key: &[u8],
) -> Result<(), ClientError> {
    let proof = match proof {
        CommitmentProof::NonExist(p) => p,
        CommitmentProof::Exist(_) => {
            return Err(ClientError::InvalidProof(
                "expected a non-existence proof".into(),
            ))
        }
    };
    if proof.key != key {
        return Err(ClientError::InvalidProof(
            "non-existence proof is for another key".into(),
        ));
    }

    let check_neighbour = |neighbour: &ExistenceProof| -> Result<u64, ClientError> {
        let (computed, index) = existence_root(neighbour)?;
        if computed != *root {
            return Err(ClientError::InvalidProof("neighbour root mismatch".into()));
        }
        Ok(index)
    };

    match (&proof.left, &proof.right) {
        (None, None) => {
            if *root != empty_root() {
                return Err(ClientError::InvalidProof(
                    "no neighbours given for a non-empty tree".into(),
                ));
            }
        }
        (Some(left), None) => {
            let index = check_neighbour(left)?;
            if left.key.as_slice() >= key {
                return Err(ClientError::InvalidProof("left neighbour not below key".into()));
            }
            if index + 1 != left.leaf_count {
                return Err(ClientError::InvalidProof("left neighbour is not the last leaf".into()));
            }
        }
        (None, Some(right)) => {
            let index = check_neighbour(right)?;
            if right.key.as_slice() <= key {
                return Err(ClientError::InvalidProof("right neighbour not above key".into()));
            }
            if index != 0 {
                return Err(ClientError::InvalidProof("right neighbour is not the first leaf".into()));
            }
        }
        (Some(left), Some(right)) => {
            let left_index = check_neighbour(left)?;
            let right_index = check_neighbour(right)?;
            if left.key.as_slice() >= key || right.key.as_slice() <= key {
                return Err(ClientError::InvalidProof("neighbours do not bracket key".into()));
            }
            if left_index + 1 != right_index {
                return Err(ClientError::InvalidProof("neighbours are not adjacent".into()));
            }
        }
    }
    Ok(())
}
