//! # Domain Invariants
//!
//! Rules checked before any cryptography runs.

use ibc_proxy_types::Height;

use super::errors::ClientError;
use super::proof::MultiHopProof;

/// Invariant: a multi-hop proof carries exactly `depth` branches.
pub fn invariant_branch_count(proof: &MultiHopProof, depth: u32) -> Result<(), ClientError> {
    if proof.branches.len() != depth as usize {
        return Err(ClientError::BranchCountMismatch {
            expected: depth,
            got: proof.branches.len(),
        });
    }
    Ok(())
}

/// Invariant: the head segment is rooted at the requested height.
pub fn invariant_head_height(proof: &MultiHopProof, height: Height) -> Result<(), ClientError> {
    if proof.head.proof_height != height {
        return Err(ClientError::HeadHeightMismatch {
            expected: height,
            got: proof.head.proof_height,
        });
    }
    Ok(())
}

/// Invariant: upstream height and timestamp never move backwards.
///
/// Returns whether the pair should advance to `(new_height, new_timestamp)`.
pub fn invariant_upstream_monotonic(
    current_height: Height,
    current_timestamp: u64,
    new_height: Height,
    new_timestamp: u64,
) -> Result<bool, ClientError> {
    if new_height <= current_height {
        return Ok(false);
    }
    if new_timestamp < current_timestamp {
        return Err(ClientError::InvalidHeader(format!(
            "upstream timestamp decreased from {current_timestamp} to {new_timestamp}"
        )));
    }
    Ok(true)
}
