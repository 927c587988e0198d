//! # Coordinator
//!
//! Creates chains and wires light clients between them the way a relayer
//! would: clients are created from and updated to committed blocks.

use anyhow::{anyhow, Result};
use ibc_proxy_client::{
    AnyClientState, AnyConsensusState, AnyHeader, MultiHopClientState, ProxyClientState,
    ProxyConsensusState, ProxyHeader, UpstreamBlockProof,
};
use ibc_proxy_keeper::ProxyConfig;

use crate::harness::chain::TestChain;

/// Drives a set of [`TestChain`]s.
pub struct Coordinator {
    config: ProxyConfig,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator {
    /// Coordinator with the test configuration.
    pub fn new() -> Self {
        Self::with_config(ProxyConfig::for_testing())
    }

    /// Coordinator with a custom configuration.
    pub fn with_config(config: ProxyConfig) -> Self {
        ibc_proxy_telemetry::init_test_logging();
        Self { config }
    }

    /// Configuration every chain is created with.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// New chain with its genesis block committed.
    pub fn create_chain(&self, chain_id: &str) -> TestChain {
        let mut chain = TestChain::new(chain_id, self.config.clone());
        chain.commit();
        chain
    }

    /// Create on `host` a client of `counterparty` at its last block.
    pub fn create_client(&self, host: &TestChain, counterparty: &TestChain) -> Result<String> {
        let block = counterparty.last_block()?;
        Ok(host.host().create_client_with_consensus(
            &counterparty.host().client_state_at(block),
            &block.consensus_state(),
        )?)
    }

    /// Move `client_id` on `host` to `counterparty`'s last block.
    pub fn update_client(
        &self,
        host: &TestChain,
        client_id: &str,
        counterparty: &TestChain,
    ) -> Result<()> {
        let header = AnyHeader::Merkle(counterparty.last_block()?.header.clone());
        Ok(host.host().update_client(client_id, &header)?)
    }

    /// Move proxy client `client_id` on `host` to `proxy`'s last block,
    /// optionally carrying an upstream block time proof.
    pub fn update_proxy_client(
        &self,
        host: &TestChain,
        client_id: &str,
        proxy: &TestChain,
        upstream_block_proof: Option<UpstreamBlockProof>,
    ) -> Result<()> {
        let header = AnyHeader::Proxy(ProxyHeader {
            header: Box::new(AnyHeader::Merkle(proxy.last_block()?.header.clone())),
            upstream_block_proof,
        });
        Ok(host.host().update_client(client_id, &header)?)
    }

    /// Create on `host` a proxy client of `upstream_client_id`, a client
    /// on `proxy`, wrapping `host`'s client `wrapped_client_id` of `proxy`.
    pub fn create_proxy_client(
        &self,
        host: &TestChain,
        wrapped_client_id: &str,
        proxy: &TestChain,
        upstream_client_id: &str,
    ) -> Result<String> {
        let (_, wrapped_consensus) = host.latest_consensus_state(wrapped_client_id)?;
        let (upstream_height, upstream_consensus) =
            proxy.latest_consensus_state(upstream_client_id)?;
        let client_state = AnyClientState::Proxy(ProxyClientState::initialized(
            host.client_state(wrapped_client_id)?,
            upstream_client_id,
            proxy.keeper().config().proxy_prefix.clone(),
            proxy.prefix().clone(),
            upstream_height,
            upstream_consensus.timestamp(),
        ));
        let consensus_state = AnyConsensusState::Proxy(ProxyConsensusState::new(
            merkle_consensus(wrapped_consensus)?,
        ));
        Ok(host
            .host()
            .create_client_with_consensus(&client_state, &consensus_state)?)
    }

    /// Create on `host` a multi-hop client over `base_client_id` expecting
    /// `depth` intermediate branches.
    pub fn create_multihop_client(
        &self,
        host: &TestChain,
        base_client_id: &str,
        depth: u32,
    ) -> Result<String> {
        let (_, consensus_state) = host.latest_consensus_state(base_client_id)?;
        let client_state = AnyClientState::MultiHop(MultiHopClientState::new(
            host.client_state(base_client_id)?,
            depth,
        ));
        Ok(host
            .host()
            .create_client_with_consensus(&client_state, &consensus_state)?)
    }
}

/// Wrapped clients of the harness are always Merkle clients.
fn merkle_consensus(consensus_state: AnyConsensusState) -> Result<AnyConsensusState> {
    match consensus_state {
        AnyConsensusState::Merkle(_) => Ok(consensus_state),
        other => Err(anyhow!("expected a Merkle consensus state, got {other:?}")),
    }
}
