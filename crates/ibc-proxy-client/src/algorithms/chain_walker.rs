//! # Multi-Hop Chain Walker
//!
//! Re-verifies an N-hop trust chain one hop at a time.
//!
//! # Algorithm
//!
//! 1. Head (hop 1): the local base client verifies that the tracked chain
//!    stores proxy client `P_1` and its consensus state `C_1` for the
//!    counterparty client id, at the requested height.
//! 2. Branch `i` (hop `i + 2`): `P_i`, seeded with `C_i` at the branch proof
//!    height, verifies that its proxy chain stores `P_{i+1}` and `C_{i+1}`
//!    under its own IBC prefix for its upstream client id.
//! 3. Leaf (hop `depth + 2`): `P_N`, seeded with `C_N`, verifies the
//!    requested fact.
//!
//! The branch count and head height are checked before any proof is.

use ibc_proxy_types::{Any, CommitmentPrefix, Height, KvRead};
use tracing::{debug, warn};

use crate::clients::{AnyClientState, AnyConsensusState, ProxyClientState, ProxyConsensusState};
use crate::domain::{
    invariant_branch_count, invariant_head_height, ClientError, LeafSegment, MultiHopProof,
    ProofContext, ProofSegment, PROXY_CLIENT_TYPE,
};
use crate::ports::LightClient;

/// The last authenticated hop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrustedHop {
    /// Authenticated proxy client.
    pub client_state: ProxyClientState,
    /// Authenticated proxy consensus state.
    pub consensus_state: ProxyConsensusState,
}

impl TrustedHop {
    fn consensus(&self) -> AnyConsensusState {
        AnyConsensusState::Proxy(self.consensus_state.clone())
    }
}

/// Walks multi-hop proofs on behalf of a multi-hop client.
pub struct ChainWalker<'a> {
    base: &'a AnyClientState,
    depth: u32,
    store: &'a dyn KvRead,
}

fn unpack_proxy_client_state(any: &Any) -> Result<ProxyClientState, ClientError> {
    match AnyClientState::from_any(any)? {
        AnyClientState::Proxy(cs) => Ok(cs),
        other => Err(ClientError::ClientTypeMismatch {
            expected: PROXY_CLIENT_TYPE,
            got: other.client_type().to_string(),
        }),
    }
}

fn unpack_proxy_consensus_state(any: &Any) -> Result<ProxyConsensusState, ClientError> {
    match AnyConsensusState::from_any(any)? {
        AnyConsensusState::Proxy(cs) => Ok(cs),
        other => Err(ClientError::ClientTypeMismatch {
            expected: PROXY_CLIENT_TYPE,
            got: other.client_type().to_string(),
        }),
    }
}

impl<'a> ChainWalker<'a> {
    /// Walker over `base`'s client store.
    pub fn new(base: &'a AnyClientState, depth: u32, store: &'a dyn KvRead) -> Self {
        Self { base, depth, store }
    }

    /// Verify the head and every branch, returning the last authenticated hop.
    pub fn walk(
        &self,
        height: Height,
        prefix: &CommitmentPrefix,
        counterparty_client_id: &str,
        proof: &MultiHopProof,
    ) -> Result<TrustedHop, ClientError> {
        invariant_branch_count(proof, self.depth)?;
        invariant_head_height(proof, height)?;

        let mut trusted = self
            .verify_head(&proof.head, prefix, counterparty_client_id)
            .map_err(|e| e.at_hop(1, counterparty_client_id))?;
        debug!(hop = 1, client_id = counterparty_client_id, %height, "[multihop] head verified");

        for (i, branch) in proof.branches.iter().enumerate() {
            let hop = i + 2;
            let client_id = trusted.client_state.upstream_client_id.clone();
            trusted = Self::verify_branch(&trusted, branch).map_err(|e| e.at_hop(hop, &client_id))?;
            debug!(hop, client_id = %client_id, height = %branch.proof_height, "[multihop] branch verified");
        }
        Ok(trusted)
    }

    fn verify_head(
        &self,
        head: &ProofSegment,
        prefix: &CommitmentPrefix,
        counterparty_client_id: &str,
    ) -> Result<TrustedHop, ClientError> {
        let client_state = unpack_proxy_client_state(&head.client_state)?;
        let consensus_state = unpack_proxy_consensus_state(&head.consensus_state)?;
        self.base.verify_client_state(
            self.store,
            ProofContext::new(head.proof_height, prefix, &head.client_proof),
            counterparty_client_id,
            &AnyClientState::Proxy(client_state.clone()),
        )?;
        self.base.verify_client_consensus_state(
            self.store,
            ProofContext::new(head.proof_height, prefix, &head.consensus_proof),
            counterparty_client_id,
            head.consensus_height,
            &AnyConsensusState::Proxy(consensus_state.clone()),
        )?;
        Ok(TrustedHop {
            client_state,
            consensus_state,
        })
    }

    fn verify_branch(trusted: &TrustedHop, branch: &ProofSegment) -> Result<TrustedHop, ClientError> {
        let verifier = &trusted.client_state;
        let ibc_prefix = verifier.ibc_prefix()?;
        let seed = trusted.consensus();

        let client_state = unpack_proxy_client_state(&branch.client_state)?;
        let consensus_state = unpack_proxy_consensus_state(&branch.consensus_state)?;
        verifier.ibc_verify_client_state(
            &seed,
            ProofContext::new(branch.proof_height, ibc_prefix, &branch.client_proof),
            &verifier.upstream_client_id,
            &AnyClientState::Proxy(client_state.clone()),
        )?;
        verifier.ibc_verify_client_consensus_state(
            &seed,
            ProofContext::new(branch.proof_height, ibc_prefix, &branch.consensus_proof),
            &verifier.upstream_client_id,
            branch.consensus_height,
            &AnyConsensusState::Proxy(consensus_state.clone()),
        )?;
        Ok(TrustedHop {
            client_state,
            consensus_state,
        })
    }

    fn leaf_hop(&self) -> usize {
        self.depth as usize + 2
    }

    /// Verify that the end of the chain stores `client_state`.
    pub fn verify_client_state(
        &self,
        height: Height,
        prefix: &CommitmentPrefix,
        counterparty_client_id: &str,
        proof: &[u8],
        client_state: &AnyClientState,
    ) -> Result<(), ClientError> {
        let proof = MultiHopProof::from_bytes(proof)?;
        let (leaf_proof, leaf_height) = match &proof.leaf {
            LeafSegment::Client {
                proof,
                proof_height,
            } => (proof, *proof_height),
            other => {
                return Err(ClientError::UnexpectedLeaf {
                    expected: "client",
                    got: other.kind(),
                })
            }
        };
        let result = self
            .walk(height, prefix, counterparty_client_id, &proof)
            .and_then(|trusted| {
                let verifier = &trusted.client_state;
                let verify_leaf = || -> Result<(), ClientError> {
                    verifier.ibc_verify_client_state(
                        &trusted.consensus(),
                        ProofContext::new(leaf_height, verifier.ibc_prefix()?, leaf_proof),
                        &verifier.upstream_client_id,
                        client_state,
                    )
                };
                verify_leaf().map_err(|e| e.at_hop(self.leaf_hop(), &verifier.upstream_client_id))
            });
        self.report(result, counterparty_client_id)
    }

    /// Verify that the end of the chain stores `consensus_state` at
    /// `consensus_height`.
    #[allow(clippy::too_many_arguments)]
    pub fn verify_consensus_state(
        &self,
        height: Height,
        prefix: &CommitmentPrefix,
        counterparty_client_id: &str,
        consensus_height: Height,
        proof: &[u8],
        consensus_state: &AnyConsensusState,
    ) -> Result<(), ClientError> {
        let proof = MultiHopProof::from_bytes(proof)?;
        let (leaf_proof, leaf_height, leaf_consensus_height) = match &proof.leaf {
            LeafSegment::Consensus {
                proof,
                proof_height,
                consensus_height,
            } => (proof, *proof_height, *consensus_height),
            other => {
                return Err(ClientError::UnexpectedLeaf {
                    expected: "consensus",
                    got: other.kind(),
                })
            }
        };
        if leaf_consensus_height != consensus_height {
            return Err(ClientError::ConsensusHeightMismatch {
                expected: consensus_height,
                got: leaf_consensus_height,
            });
        }
        let result = self
            .walk(height, prefix, counterparty_client_id, &proof)
            .and_then(|trusted| {
                let verifier = &trusted.client_state;
                let verify_leaf = || -> Result<(), ClientError> {
                    verifier.ibc_verify_client_consensus_state(
                        &trusted.consensus(),
                        ProofContext::new(leaf_height, verifier.ibc_prefix()?, leaf_proof),
                        &verifier.upstream_client_id,
                        consensus_height,
                        consensus_state,
                    )
                };
                verify_leaf().map_err(|e| e.at_hop(self.leaf_hop(), &verifier.upstream_client_id))
            });
        self.report(result, counterparty_client_id)
    }

    fn report(&self, result: Result<(), ClientError>, counterparty_client_id: &str) -> Result<(), ClientError> {
        match &result {
            Ok(()) => debug!(
                client_id = counterparty_client_id,
                depth = self.depth,
                "[multihop] proof verified"
            ),
            Err(e) => warn!(
                client_id = counterparty_client_id,
                depth = self.depth,
                hop = ?e.failing_hop(),
                error = %e,
                "[multihop] proof rejected"
            ),
        }
        result
    }
}
