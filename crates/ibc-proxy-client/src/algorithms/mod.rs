//! # Algorithms Module
//!
//! Commitment proofs over a chain store and the hop-by-hop multi-hop walk.

pub mod chain_walker;
pub mod merkle_verifier;

pub use chain_walker::{ChainWalker, TrustedHop};
pub use merkle_verifier::{
    build_merkle_proof, compute_merkle_root, empty_root, verify_membership, verify_merkle_proof,
    verify_non_membership, CommitmentTree,
};

#[cfg(test)]
pub(crate) use chain_walker::fixtures;
