//! # Multi-Hop Verification
//!
//! A local chain verifies a client stored at the far end of a proxy chain:
//!
//! ```text
//! depth 0:  A ─base─► X1[P1] ─► X2[target]
//! depth 1:  A ─base─► X1[P1] ─► X2[P2] ─► X3[target]
//! ```
//!
//! `P_k` on `X_k` wraps `X_k`'s client of `X_{k+1}` and proxies the client
//! one chain further down.

use anyhow::Result;
use ibc_proxy_client::{AnyClientState, AnyConsensusState, LeafSegment, LightClient, MultiHopProof};
use ibc_proxy_types::Height;

use crate::harness::{Coordinator, TestChain};

/// A local chain with a multi-hop client over a line of proxy chains.
pub struct Topology {
    /// Verifying chain.
    pub local: TestChain,
    /// Local client of `X_1`.
    pub base_client_id: String,
    /// Local multi-hop client.
    pub multihop_client_id: String,
    /// `X_1 ..= X_{depth+2}`.
    pub chains: Vec<TestChain>,
    /// `P_1 ..= P_{depth+1}`, `P_k` stored on `X_k`.
    pub proxy_client_ids: Vec<String>,
    /// Client stored on the last chain.
    pub target_client_id: String,
}

impl Topology {
    /// Build a line of `depth + 1` proxy chains ending at a chain that
    /// stores a client of a target chain.
    pub fn build(coordinator: &Coordinator, depth: u32) -> Result<Self> {
        let target = coordinator.create_chain("chain-t");
        let mut leaf = coordinator.create_chain(&format!("chain-{}", depth + 2));
        let target_client_id = coordinator.create_client(&leaf, &target)?;
        leaf.commit();

        let mut chains = vec![leaf];
        let mut proxy_client_ids = Vec::new();
        let mut upstream_client_id = target_client_id.clone();
        for k in (1..=depth + 1).rev() {
            let below = &chains[0];
            let mut chain = coordinator.create_chain(&format!("chain-{k}"));
            let wrapped_client_id = coordinator.create_client(&chain, below)?;
            let proxy_client_id = coordinator.create_proxy_client(
                &chain,
                &wrapped_client_id,
                below,
                &upstream_client_id,
            )?;
            chain.commit();
            upstream_client_id = proxy_client_id.clone();
            proxy_client_ids.insert(0, proxy_client_id);
            chains.insert(0, chain);
        }

        let local = coordinator.create_chain("chain-a");
        let base_client_id = coordinator.create_client(&local, &chains[0])?;
        let multihop_client_id =
            coordinator.create_multihop_client(&local, &base_client_id, depth)?;
        Ok(Self {
            local,
            base_client_id,
            multihop_client_id,
            chains,
            proxy_client_ids,
            target_client_id,
        })
    }

    /// Height of `X_1` the base client tracks.
    pub fn height(&self) -> Result<Height> {
        self.chains[0].height()
    }

    /// Chain storing the target client.
    pub fn leaf_chain(&self) -> &TestChain {
        &self.chains[self.chains.len() - 1]
    }

    /// Head and branch segments for `P_1 ..= P_{depth+1}`.
    fn proof(&self, leaf: LeafSegment) -> Result<MultiHopProof> {
        let mut segments = self
            .proxy_client_ids
            .iter()
            .zip(&self.chains)
            .map(|(client_id, chain)| chain.proof_segment(client_id))
            .collect::<Result<Vec<_>>>()?;
        let head = segments.remove(0);
        Ok(MultiHopProof {
            head,
            branches: segments,
            leaf,
        })
    }

    /// Proof of the target client state.
    pub fn client_proof(&self) -> Result<MultiHopProof> {
        self.proof(self.leaf_chain().client_leaf(&self.target_client_id)?)
    }

    /// Proof of the target's latest consensus state.
    pub fn consensus_proof(&self) -> Result<MultiHopProof> {
        let height = self.target_client()?.latest_height();
        self.proof(
            self.leaf_chain()
                .consensus_leaf(&self.target_client_id, &height)?,
        )
    }

    /// Target client state as the leaf chain stores it.
    pub fn target_client(&self) -> Result<AnyClientState> {
        self.leaf_chain().client_state(&self.target_client_id)
    }

    /// Target's latest consensus state.
    pub fn target_consensus(&self) -> Result<(Height, AnyConsensusState)> {
        self.leaf_chain()
            .latest_consensus_state(&self.target_client_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibc_proxy_client::{
        ClientError, LightClient, MerkleClientState, ProofContext, ProofSegment,
    };
    use ibc_proxy_keeper::{ClientKeeper, ProxyError};

    fn verify_client(topology: &Topology, proof: &MultiHopProof) -> Result<(), ClientError> {
        let client = topology.local.client_state(&topology.multihop_client_id).unwrap();
        let store = topology
            .local
            .host()
            .client_store(&topology.multihop_client_id);
        let bytes = proof.to_bytes()?;
        client.verify_client_state(
            &store,
            ProofContext::new(topology.height().unwrap(), topology.chains[0].prefix(), &bytes),
            &topology.proxy_client_ids[0],
            &topology.target_client().unwrap(),
        )
    }

    fn tamper_consensus(segment: &mut ProofSegment, with: &ProofSegment) {
        segment.consensus_state = with.consensus_state.clone();
    }

    #[test]
    fn test_depth_zero_client_state_through_keeper() -> Result<()> {
        let coordinator = Coordinator::new();
        let topology = Topology::build(&coordinator, 0)?;
        let bytes = topology.client_proof()?.to_bytes()?;

        topology.local.keeper().verify_client_state(
            &topology.multihop_client_id,
            ProofContext::new(topology.height()?, topology.chains[0].prefix(), &bytes),
            &topology.proxy_client_ids[0],
            &topology.target_client()?,
        )?;
        Ok(())
    }

    #[test]
    fn test_depth_zero_consensus_state() -> Result<()> {
        let coordinator = Coordinator::new();
        let topology = Topology::build(&coordinator, 0)?;
        let (height, consensus) = topology.target_consensus()?;
        let bytes = topology.consensus_proof()?.to_bytes()?;

        topology.local.keeper().verify_client_consensus_state(
            &topology.multihop_client_id,
            ProofContext::new(topology.height()?, topology.chains[0].prefix(), &bytes),
            &topology.proxy_client_ids[0],
            height,
            &consensus,
        )?;

        let other_height = Height::new(height.revision_number, height.revision_height + 1);
        let err = topology
            .local
            .keeper()
            .verify_client_consensus_state(
                &topology.multihop_client_id,
                ProofContext::new(topology.height()?, topology.chains[0].prefix(), &bytes),
                &topology.proxy_client_ids[0],
                other_height,
                &consensus,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ProxyError::Verification {
                source: ClientError::ConsensusHeightMismatch { .. },
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn test_deeper_chains_verify() -> Result<()> {
        let coordinator = Coordinator::new();
        for depth in 1..=3 {
            let topology = Topology::build(&coordinator, depth)?;
            let proof = topology.client_proof()?;
            assert_eq!(proof.branches.len(), depth as usize);
            verify_client(&topology, &proof)?;
        }
        Ok(())
    }

    #[test]
    fn test_tampered_branch_reports_its_hop() -> Result<()> {
        let coordinator = Coordinator::new();
        let topology = Topology::build(&coordinator, 1)?;
        let mut proof = topology.client_proof()?;
        let head = proof.head.clone();
        tamper_consensus(&mut proof.branches[0], &head);

        let err = verify_client(&topology, &proof).unwrap_err();
        assert_eq!(err.failing_hop(), Some(2));
        Ok(())
    }

    #[test]
    fn test_tampered_head_and_leaf_report_their_hops() -> Result<()> {
        let coordinator = Coordinator::new();
        let topology = Topology::build(&coordinator, 2)?;

        let mut proof = topology.client_proof()?;
        let branch = proof.branches[0].clone();
        tamper_consensus(&mut proof.head, &branch);
        assert_eq!(verify_client(&topology, &proof).unwrap_err().failing_hop(), Some(1));

        let mut proof = topology.client_proof()?;
        let last = proof.branches.len() - 1;
        let head = proof.head.clone();
        tamper_consensus(&mut proof.branches[last], &head);
        assert_eq!(verify_client(&topology, &proof).unwrap_err().failing_hop(), Some(3));

        let proof = topology.client_proof()?;
        let client = topology.local.client_state(&topology.multihop_client_id)?;
        let bytes = proof.to_bytes()?;
        let err = client
            .verify_client_state(
                &topology.local.host().client_store(&topology.multihop_client_id),
                ProofContext::new(topology.height()?, topology.chains[0].prefix(), &bytes),
                &topology.proxy_client_ids[0],
                &AnyClientState::Merkle(MerkleClientState::new("chain-x", Height::new(0, 2))),
            )
            .unwrap_err();
        assert_eq!(err.failing_hop(), Some(4));
        Ok(())
    }

    #[test]
    fn test_branch_count_must_match_depth() -> Result<()> {
        let coordinator = Coordinator::new();
        let topology = Topology::build(&coordinator, 1)?;
        let shallow_id =
            coordinator.create_multihop_client(&topology.local, &topology.base_client_id, 0)?;
        let client = topology.local.client_state(&shallow_id)?;
        let bytes = topology.client_proof()?.to_bytes()?;

        let err = client
            .verify_client_state(
                &topology.local.host().client_store(&shallow_id),
                ProofContext::new(topology.height()?, topology.chains[0].prefix(), &bytes),
                &topology.proxy_client_ids[0],
                &topology.target_client()?,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::BranchCountMismatch {
                expected: 0,
                got: 1
            }
        ));
        Ok(())
    }

    #[test]
    fn test_head_height_must_match_request() -> Result<()> {
        let coordinator = Coordinator::new();
        let topology = Topology::build(&coordinator, 0)?;
        let client = topology.local.client_state(&topology.multihop_client_id)?;
        let bytes = topology.client_proof()?.to_bytes()?;
        let height = topology.height()?;
        let earlier = Height::new(height.revision_number, height.revision_height - 1);

        let err = client
            .verify_client_state(
                &topology.local.host().client_store(&topology.multihop_client_id),
                ProofContext::new(earlier, topology.chains[0].prefix(), &bytes),
                &topology.proxy_client_ids[0],
                &topology.target_client()?,
            )
            .unwrap_err();
        assert!(matches!(err, ClientError::HeadHeightMismatch { .. }));
        assert_eq!(err.failing_hop(), None);
        Ok(())
    }

    #[test]
    fn test_malformed_proof_bytes() -> Result<()> {
        let coordinator = Coordinator::new();
        let topology = Topology::build(&coordinator, 0)?;
        let client = topology.local.client_state(&topology.multihop_client_id)?;

        let err = client
            .verify_client_state(
                &topology.local.host().client_store(&topology.multihop_client_id),
                ProofContext::new(topology.height()?, topology.chains[0].prefix(), &[0xde, 0xad]),
                &topology.proxy_client_ids[0],
                &topology.target_client()?,
            )
            .unwrap_err();
        assert!(matches!(err, ClientError::MalformedProof(_)));
        Ok(())
    }
}
