//! # Proxied Handshakes
//!
//! The proxy chain relays an upstream connection handshake, then the
//! downstream chain reads the re-committed facts back through its proxy
//! client:
//!
//! ```text
//! chain-u ◄── client ── chain-p ◄── client ── chain-d
//!    └──────────── client of chain-d ───────────┘
//! chain-d: proxy client of chain-u, wrapping its client of chain-p
//! ```

use anyhow::Result;
use ibc_proxy_client::{AnyClientState, LightClient, ProofContext};
use ibc_proxy_keeper::{
    ClientKeeper, MsgProxyConnectionOpen, MsgProxyConnectionOpenConfirm, ProxyKeys,
};
use ibc_proxy_types::path::{client_state_path, connection_path, consensus_state_path};
use ibc_proxy_types::{ConnectionCounterparty, ConnectionEnd, ConnectionState, Version};

use crate::harness::{Coordinator, TestChain};

/// Connection id used on the upstream.
pub const CONNECTION_ID: &str = "connection-0";

/// Upstream, proxy and downstream chains with their clients.
pub struct ProxyNetwork {
    /// Coordinator that built the network.
    pub coordinator: Coordinator,
    /// Upstream chain.
    pub upstream: TestChain,
    /// Proxy chain running the keeper.
    pub proxy: TestChain,
    /// Downstream chain.
    pub downstream: TestChain,
    /// Client of the upstream on the proxy.
    pub upstream_client_id: String,
    /// Client of the proxy on the downstream.
    pub wrapped_client_id: String,
    /// Proxy client of the upstream on the downstream.
    pub proxy_client_id: String,
    /// Client of the downstream on the upstream.
    pub downstream_client_id: String,
}

impl ProxyNetwork {
    /// Create the three chains and their clients.
    pub fn build() -> Result<Self> {
        let coordinator = Coordinator::new();
        let upstream = coordinator.create_chain("chain-u");
        let mut proxy = coordinator.create_chain("chain-p");
        let mut downstream = coordinator.create_chain("chain-d");

        let upstream_client_id = coordinator.create_client(&proxy, &upstream)?;
        proxy.commit();
        let wrapped_client_id = coordinator.create_client(&downstream, &proxy)?;
        let proxy_client_id = coordinator.create_proxy_client(
            &downstream,
            &wrapped_client_id,
            &proxy,
            &upstream_client_id,
        )?;
        downstream.commit();
        let downstream_client_id = coordinator.create_client(&upstream, &downstream)?;

        Ok(Self {
            coordinator,
            upstream,
            proxy,
            downstream,
            upstream_client_id,
            wrapped_client_id,
            proxy_client_id,
            downstream_client_id,
        })
    }

    /// Key layout of the proxy's namespace.
    pub fn keys(&self) -> ProxyKeys {
        ProxyKeys::new(self.proxy.keeper().config().proxy_prefix.clone())
    }

    /// Commit the upstream and move the proxy's client of it forward.
    pub fn commit_upstream(&mut self) -> Result<()> {
        self.upstream.commit();
        self.coordinator
            .update_client(&self.proxy, &self.upstream_client_id, &self.upstream)?;
        self.proxy.advance();
        Ok(())
    }

    /// Commit the proxy and move the downstream's proxy client forward.
    pub fn commit_proxy(&mut self) -> Result<()> {
        self.proxy.commit();
        self.coordinator.update_proxy_client(
            &self.downstream,
            &self.proxy_client_id,
            &self.proxy,
            None,
        )
    }

    /// The upstream's connection to the downstream.
    pub fn upstream_connection(&self, state: ConnectionState) -> ConnectionEnd {
        ConnectionEnd {
            state,
            client_id: self.downstream_client_id.clone(),
            counterparty: ConnectionCounterparty {
                client_id: self.proxy_client_id.clone(),
                connection_id: String::new(),
                prefix: self.downstream.prefix().clone(),
            },
            versions: vec![Version::default_ibc()],
            delay_period: 0,
        }
    }

    /// Store `connection` on the upstream, commit it and build the open
    /// message the relayer submits to the proxy.
    pub fn connection_open_msg(
        &mut self,
        connection: ConnectionEnd,
    ) -> Result<MsgProxyConnectionOpen> {
        self.upstream
            .host()
            .set_connection(CONNECTION_ID, &connection)?;
        self.commit_upstream()?;

        let upstream = &self.upstream;
        let downstream = &self.downstream;
        let consensus_height = downstream.height()?;
        let proxy_consensus_height = downstream
            .client_state(&self.proxy_client_id)?
            .latest_height();
        Ok(MsgProxyConnectionOpen {
            connection_id: CONNECTION_ID.into(),
            upstream_prefix: upstream.prefix().clone(),
            downstream_client_state: upstream.client_state(&self.downstream_client_id)?,
            downstream_consensus_state: upstream
                .consensus_state(&self.downstream_client_id, &consensus_height)?,
            proxy_client_state: downstream.client_state(&self.proxy_client_id)?,
            proxy_consensus_state: downstream
                .consensus_state(&self.proxy_client_id, &proxy_consensus_height)?,
            proof_connection: upstream.proof(&connection_path(CONNECTION_ID))?,
            proof_client: upstream.proof(&client_state_path(&self.downstream_client_id))?,
            proof_consensus: upstream.proof(&consensus_state_path(
                &self.downstream_client_id,
                &consensus_height,
            ))?,
            proof_height: upstream.height()?,
            consensus_height,
            proof_proxy_client: downstream.proof(&client_state_path(&self.proxy_client_id))?,
            proof_proxy_consensus: downstream.proof(&consensus_state_path(
                &self.proxy_client_id,
                &proxy_consensus_height,
            ))?,
            proof_proxy_height: downstream.height()?,
            proxy_consensus_height,
            connection,
        })
    }

    /// Verify on the downstream, through its proxy client, that the proxy
    /// committed `connection` at its last block.
    pub fn verify_downstream_connection(&self, connection: &ConnectionEnd) -> Result<()> {
        let key = self.keys().connection(
            &self.upstream_client_id,
            self.upstream.prefix(),
            CONNECTION_ID,
        );
        let proof = self.proxy.proof_key(&key)?;
        let client = self.downstream.client_state(&self.proxy_client_id)?;
        client.verify_connection_state(
            &self.downstream.host().client_store(&self.proxy_client_id),
            ProofContext::new(self.proxy.height()?, self.upstream.prefix(), &proof),
            CONNECTION_ID,
            connection,
        )?;
        Ok(())
    }

    /// Verify on the downstream, through its proxy client, that the proxy
    /// committed the upstream's client state of the downstream.
    pub fn verify_downstream_client(&self, client_state: &AnyClientState) -> Result<()> {
        let key = self.keys().client_state(
            &self.upstream_client_id,
            self.upstream.prefix(),
            &self.downstream_client_id,
        );
        let proof = self.proxy.proof_key(&key)?;
        let client = self.downstream.client_state(&self.proxy_client_id)?;
        client.verify_client_state(
            &self.downstream.host().client_store(&self.proxy_client_id),
            ProofContext::new(self.proxy.height()?, self.upstream.prefix(), &proof),
            &self.downstream_client_id,
            client_state,
        )?;
        Ok(())
    }

    /// Confirm message for the upstream's now open connection.
    pub fn connection_confirm_msg(
        &mut self,
        counterparty_connection_id: &str,
    ) -> Result<MsgProxyConnectionOpenConfirm> {
        let mut connection = self.upstream_connection(ConnectionState::Open);
        connection.counterparty.connection_id = counterparty_connection_id.into();
        self.upstream
            .host()
            .set_connection(CONNECTION_ID, &connection)?;
        self.commit_upstream()?;
        Ok(MsgProxyConnectionOpenConfirm {
            connection_id: CONNECTION_ID.into(),
            upstream_client_id: self.upstream_client_id.clone(),
            upstream_prefix: self.upstream.prefix().clone(),
            counterparty_connection_id: counterparty_connection_id.into(),
            proof: self.upstream.proof(&connection_path(CONNECTION_ID))?,
            proof_height: self.upstream.height()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibc_proxy_client::UpstreamBlockProof;
    use ibc_proxy_keeper::{ProxyError, ProxyMsg, ProxyMsgHandler};

    #[test]
    fn test_proxied_connection_is_provable_downstream() -> Result<()> {
        let mut net = ProxyNetwork::build()?;
        let connection = net.upstream_connection(ConnectionState::Init);
        let msg = net.connection_open_msg(connection.clone())?;
        net.proxy
            .keeper()
            .handle(ProxyMsg::ConnectionOpenTry(msg.clone()))?;
        net.commit_proxy()?;

        net.verify_downstream_connection(&connection)?;
        net.verify_downstream_client(&msg.downstream_client_state)?;
        assert!(net
            .verify_downstream_connection(&net.upstream_connection(ConnectionState::Open))
            .is_err());
        Ok(())
    }

    #[test]
    fn test_connection_handshake_reaches_open_downstream() -> Result<()> {
        let mut net = ProxyNetwork::build()?;
        let msg = net.connection_open_msg(net.upstream_connection(ConnectionState::Init))?;
        net.proxy.keeper().handle(ProxyMsg::ConnectionOpenTry(msg))?;

        let confirm = net.connection_confirm_msg("connection-3")?;
        net.proxy
            .keeper()
            .handle(ProxyMsg::ConnectionOpenConfirm(confirm))?;
        net.commit_proxy()?;

        let mut open = net.upstream_connection(ConnectionState::Open);
        open.counterparty.connection_id = "connection-3".into();
        net.verify_downstream_connection(&open)?;
        assert!(net
            .verify_downstream_connection(&net.upstream_connection(ConnectionState::Init))
            .is_err());
        Ok(())
    }

    #[test]
    fn test_failed_open_try_keeps_earlier_commitments() -> Result<()> {
        let mut net = ProxyNetwork::build()?;
        let mut msg = net.connection_open_msg(net.upstream_connection(ConnectionState::Init))?;
        msg.proof_connection = msg.proof_client.clone();

        match net.proxy.keeper().conn_open_try(&msg) {
            Err(ProxyError::Verification { client_id, .. }) => {
                assert_eq!(client_id, net.upstream_client_id)
            }
            other => panic!("expected a verification error, got {other:?}"),
        }
        net.commit_proxy()?;

        net.verify_downstream_client(&msg.downstream_client_state)?;
        assert!(net.verify_downstream_connection(&msg.connection).is_err());
        Ok(())
    }

    #[test]
    fn test_reproxying_a_fact_is_idempotent() -> Result<()> {
        let mut net = ProxyNetwork::build()?;
        net.commit_upstream()?;
        let upstream = &net.upstream;
        let client_state = upstream.client_state(&net.downstream_client_id)?;
        let proof = upstream.proof(&client_state_path(&net.downstream_client_id))?;
        let keeper = net.proxy.keeper();
        let commitment = || {
            keeper.proxy_store().client_state_commitment(
                &net.upstream_client_id,
                upstream.prefix(),
                &net.downstream_client_id,
            )
        };

        keeper.verify_and_proxy_client_state(
            &net.upstream_client_id,
            ProofContext::new(upstream.height()?, upstream.prefix(), &proof),
            &net.downstream_client_id,
            &client_state,
        )?;
        let first = commitment()?;
        keeper.verify_and_proxy_client_state(
            &net.upstream_client_id,
            ProofContext::new(upstream.height()?, upstream.prefix(), &proof),
            &net.downstream_client_id,
            &client_state,
        )?;
        assert_eq!(first.as_ref(), Some(&client_state));
        assert_eq!(commitment()?, first);
        Ok(())
    }

    #[test]
    fn test_upstream_block_time_reaches_downstream() -> Result<()> {
        let mut net = ProxyNetwork::build()?;
        net.commit_upstream()?;
        let upstream_height = net.upstream.height()?;
        let timestamp = net
            .proxy
            .keeper()
            .proxy_upstream_block_time(&net.upstream_client_id, &upstream_height)?;

        net.commit_proxy()?;
        let proof_height = net.proxy.height()?;
        let proof = net
            .proxy
            .proof_key(&net.keys().block_time(&net.upstream_client_id, &upstream_height))?;
        net.proxy.commit();

        let forged = UpstreamBlockProof {
            proof_height,
            upstream_height,
            upstream_timestamp: timestamp + 1,
            proof: proof.clone(),
        };
        assert!(net
            .coordinator
            .update_proxy_client(&net.downstream, &net.proxy_client_id, &net.proxy, Some(forged))
            .is_err());

        let block_proof = UpstreamBlockProof {
            proof_height,
            upstream_height,
            upstream_timestamp: timestamp,
            proof,
        };
        net.coordinator.update_proxy_client(
            &net.downstream,
            &net.proxy_client_id,
            &net.proxy,
            Some(block_proof),
        )?;

        let client_state = net.downstream.client_state(&net.proxy_client_id)?;
        let proxy = client_state
            .as_proxy()
            .ok_or_else(|| anyhow::anyhow!("not a proxy client"))?;
        assert_eq!(proxy.upstream_height, upstream_height);
        assert_eq!(proxy.upstream_timestamp, timestamp);
        assert_eq!(proxy.latest_height(), net.proxy.height()?);
        Ok(())
    }
}
