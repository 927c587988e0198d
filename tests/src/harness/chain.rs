//! # Test Chain
//!
//! One in-memory chain: its host, a proxy keeper over it and the last
//! committed block. Proofs are always taken from the last committed block.

use anyhow::{anyhow, Result};
use ibc_proxy_client::{AnyClientState, AnyConsensusState, LeafSegment, LightClient, ProofSegment};
use ibc_proxy_keeper::{ClientKeeper, CommittedBlock, InMemoryHost, ProxyConfig, ProxyKeeper};
use ibc_proxy_types::path::{client_state_path, consensus_state_path};
use ibc_proxy_types::{CommitmentPrefix, Height};

/// Nanoseconds between two blocks of a test chain.
pub const BLOCK_TIME: u64 = 5_000_000_000;

/// In-memory chain driven by a test.
pub struct TestChain {
    keeper: ProxyKeeper<InMemoryHost>,
    last_block: Option<CommittedBlock>,
}

impl TestChain {
    /// Empty chain with no committed block.
    pub fn new(chain_id: &str, config: ProxyConfig) -> Self {
        let host = InMemoryHost::new(chain_id, &config);
        Self {
            keeper: ProxyKeeper::new(config, host),
            last_block: None,
        }
    }

    /// Chain id.
    pub fn chain_id(&self) -> &str {
        self.host().chain_id()
    }

    /// The host chain.
    pub fn host(&self) -> &InMemoryHost {
        self.keeper.host()
    }

    /// Proxy keeper running on this chain.
    pub fn keeper(&self) -> &ProxyKeeper<InMemoryHost> {
        &self.keeper
    }

    /// Prefix of the IBC store.
    pub fn prefix(&self) -> &CommitmentPrefix {
        self.host().ibc_prefix()
    }

    /// Commit the store at the next height.
    pub fn commit(&mut self) -> Height {
        let block = self.host().commit_block(BLOCK_TIME);
        let height = block.height();
        self.last_block = Some(block);
        height
    }

    /// Move to the next height without committing.
    pub fn advance(&self) {
        self.host().advance_block(BLOCK_TIME);
    }

    /// Last committed block.
    pub fn last_block(&self) -> Result<&CommittedBlock> {
        self.last_block
            .as_ref()
            .ok_or_else(|| anyhow!("{} has not committed a block", self.chain_id()))
    }

    /// Height of the last committed block.
    pub fn height(&self) -> Result<Height> {
        Ok(self.last_block()?.height())
    }

    /// Proof of `path` under the IBC prefix.
    pub fn proof(&self, path: &str) -> Result<Vec<u8>> {
        Ok(self.last_block()?.prove_path(self.prefix(), path)?)
    }

    /// Proof of a raw store key.
    pub fn proof_key(&self, key: &[u8]) -> Result<Vec<u8>> {
        Ok(self.last_block()?.prove(key)?)
    }

    /// Stored client state of `client_id`.
    pub fn client_state(&self, client_id: &str) -> Result<AnyClientState> {
        self.host()
            .client_state(client_id)
            .ok_or_else(|| anyhow!("client {client_id} not found on {}", self.chain_id()))
    }

    /// Stored consensus state of `client_id` at `height`.
    pub fn consensus_state(&self, client_id: &str, height: &Height) -> Result<AnyConsensusState> {
        self.host().consensus_state(client_id, height).ok_or_else(|| {
            anyhow!(
                "consensus state {client_id}@{height} not found on {}",
                self.chain_id()
            )
        })
    }

    /// Consensus state of `client_id` at its latest height.
    pub fn latest_consensus_state(&self, client_id: &str) -> Result<(Height, AnyConsensusState)> {
        let height = self.client_state(client_id)?.latest_height();
        Ok((height, self.consensus_state(client_id, &height)?))
    }

    /// Head or branch segment: this chain stores `client_id` and its
    /// latest consensus state.
    pub fn proof_segment(&self, client_id: &str) -> Result<ProofSegment> {
        let client_state = self.client_state(client_id)?;
        let (consensus_height, consensus_state) = self.latest_consensus_state(client_id)?;
        Ok(ProofSegment {
            client_state: client_state.to_any()?,
            client_proof: self.proof(&client_state_path(client_id))?,
            consensus_state: consensus_state.to_any()?,
            consensus_proof: self.proof(&consensus_state_path(client_id, &consensus_height))?,
            consensus_height,
            proof_height: self.height()?,
        })
    }

    /// Leaf proving the client state of `client_id`.
    pub fn client_leaf(&self, client_id: &str) -> Result<LeafSegment> {
        Ok(LeafSegment::Client {
            proof: self.proof(&client_state_path(client_id))?,
            proof_height: self.height()?,
        })
    }

    /// Leaf proving the consensus state of `client_id` at `height`.
    pub fn consensus_leaf(&self, client_id: &str, height: &Height) -> Result<LeafSegment> {
        Ok(LeafSegment::Consensus {
            proof: self.proof(&consensus_state_path(client_id, height))?,
            proof_height: self.height()?,
            consensus_height: *height,
        })
    }
}
