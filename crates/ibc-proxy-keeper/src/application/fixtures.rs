//! Three-chain setup shared by the keeper tests.
//!
//! ```text
//! chain-u (upstream) ◄── merkle-0 ── chain-p (proxy, keeper)
//! chain-p ◄── merkle-0 ── chain-d (downstream) ── proxy-1 ──► chain-u via chain-p
//! chain-d ◄── merkle-0 ── chain-u
//! ```

use ibc_proxy_client::{
    AnyClientState, AnyConsensusState, AnyHeader, ProxyClientState, ProxyConsensusState,
};
use ibc_proxy_types::path::{client_state_path, connection_path, consensus_state_path};
use ibc_proxy_types::{
    ChannelCounterparty, ChannelEnd, ChannelState, CommitmentPrefix, ConnectionCounterparty,
    ConnectionEnd, ConnectionState, Order, Version,
};

use crate::adapters::{CommittedBlock, InMemoryHost};
use crate::application::ProxyKeeper;
use crate::config::ProxyConfig;
use crate::domain::{MsgProxyConnectionOpen, PROXY_PORT_ID, PROXY_VERSION};
use crate::ports::ClientKeeper;

pub(crate) const BLOCK_TIME: u64 = 10;
pub(crate) const CONNECTION_ID: &str = "connection-0";
pub(crate) const BOOTSTRAP_CHANNEL: &str = "channel-0";

pub(crate) struct Network {
    pub upstream: InMemoryHost,
    pub downstream: InMemoryHost,
    pub keeper: ProxyKeeper<InMemoryHost>,
    pub prefix: CommitmentPrefix,
    /// Client of chain-u on chain-p.
    pub upstream_client_id: String,
    /// Client of chain-d on chain-u.
    pub downstream_client_id: String,
    /// Proxy client of chain-u on chain-d.
    pub proxy_client_id: String,
    /// Client of chain-p on chain-d.
    pub wrapped_client_id: String,
    proxy_block: CommittedBlock,
    downstream_block: CommittedBlock,
}

pub(crate) fn network() -> Network {
    let config = ProxyConfig::for_testing();
    let upstream = InMemoryHost::new("chain-u", &config);
    let proxy = InMemoryHost::new("chain-p", &config);
    let downstream = InMemoryHost::new("chain-d", &config);

    let upstream_block = upstream.commit_block(BLOCK_TIME);
    let upstream_client_id = proxy
        .create_client_with_consensus(
            &upstream.client_state_at(&upstream_block),
            &upstream_block.consensus_state(),
        )
        .unwrap();

    let proxy_block = proxy.commit_block(BLOCK_TIME);
    let wrapped_id = downstream
        .create_client_with_consensus(
            &proxy.client_state_at(&proxy_block),
            &proxy_block.consensus_state(),
        )
        .unwrap();
    let proxy_client = AnyClientState::Proxy(ProxyClientState::initialized(
        downstream.client_state(&wrapped_id).unwrap(),
        upstream_client_id.clone(),
        config.proxy_prefix.clone(),
        config.ibc_prefix.clone(),
        upstream_block.height(),
        upstream_block.header.timestamp,
    ));
    let proxy_consensus =
        AnyConsensusState::Proxy(ProxyConsensusState::new(proxy_block.consensus_state()));
    let proxy_client_id = downstream
        .create_client_with_consensus(&proxy_client, &proxy_consensus)
        .unwrap();

    let downstream_block = downstream.commit_block(BLOCK_TIME);
    let downstream_client_id = upstream
        .create_client_with_consensus(
            &downstream.client_state_at(&downstream_block),
            &downstream_block.consensus_state(),
        )
        .unwrap();

    Network {
        upstream,
        downstream,
        keeper: ProxyKeeper::new(config.clone(), proxy),
        prefix: config.ibc_prefix,
        upstream_client_id,
        downstream_client_id,
        proxy_client_id,
        wrapped_client_id: wrapped_id,
        proxy_block,
        downstream_block,
    }
}

impl Network {
    pub fn proxy(&self) -> &InMemoryHost {
        self.keeper.host()
    }

    /// Commit chain-u and move chain-p's client of it to the new block.
    pub fn commit_upstream(&self) -> CommittedBlock {
        let block = self.upstream.commit_block(BLOCK_TIME);
        self.proxy().advance_block(BLOCK_TIME);
        self.proxy()
            .update_client(
                &self.upstream_client_id,
                &AnyHeader::Merkle(block.header.clone()),
            )
            .unwrap();
        block
    }

    pub fn proof(&self, block: &CommittedBlock, path: &str) -> Vec<u8> {
        block.prove_path(&self.prefix, path).unwrap()
    }

    /// chain-u's connection to chain-d, as chain-u stores it.
    pub fn upstream_connection(&self, state: ConnectionState) -> ConnectionEnd {
        ConnectionEnd {
            state,
            client_id: self.downstream_client_id.clone(),
            counterparty: ConnectionCounterparty {
                client_id: self.proxy_client_id.clone(),
                connection_id: String::new(),
                prefix: self.prefix.clone(),
            },
            versions: vec![Version::default_ibc()],
            delay_period: 0,
        }
    }

    /// Store `connection` on chain-u, commit, and build the matching
    /// open-try/ack message.
    pub fn connection_open_msg(&self, connection: ConnectionEnd) -> MsgProxyConnectionOpen {
        self.upstream.set_connection(CONNECTION_ID, &connection).unwrap();
        let block = self.commit_upstream();
        let consensus_height = self.downstream_block.height();
        let proxy_consensus_height = self.proxy_block.height();
        MsgProxyConnectionOpen {
            connection_id: CONNECTION_ID.into(),
            upstream_prefix: self.prefix.clone(),
            downstream_client_state: self.upstream.client_state(&self.downstream_client_id).unwrap(),
            downstream_consensus_state: self
                .upstream
                .consensus_state(&self.downstream_client_id, &consensus_height)
                .unwrap(),
            proxy_client_state: self.downstream.client_state(&self.proxy_client_id).unwrap(),
            proxy_consensus_state: self
                .downstream
                .consensus_state(&self.proxy_client_id, &proxy_consensus_height)
                .unwrap(),
            proof_connection: self.proof(&block, &connection_path(CONNECTION_ID)),
            proof_client: self.proof(&block, &client_state_path(&self.downstream_client_id)),
            proof_consensus: self.proof(
                &block,
                &consensus_state_path(&self.downstream_client_id, &consensus_height),
            ),
            proof_height: block.height(),
            consensus_height,
            proof_proxy_client: self
                .downstream_block
                .prove_path(&self.prefix, &client_state_path(&self.proxy_client_id))
                .unwrap(),
            proof_proxy_consensus: self
                .downstream_block
                .prove_path(
                    &self.prefix,
                    &consensus_state_path(&self.proxy_client_id, &proxy_consensus_height),
                )
                .unwrap(),
            proof_proxy_height: self.downstream_block.height(),
            proxy_consensus_height,
            connection,
        }
    }

    /// Keeper of chain-d with an open `proxy` channel to chain-p over
    /// chain-d's client of chain-p.
    pub fn downstream_keeper(&self) -> ProxyKeeper<InMemoryHost> {
        let host = self.downstream.clone();
        let connection = ConnectionEnd {
            state: ConnectionState::Open,
            client_id: self.wrapped_client_id.clone(),
            counterparty: ConnectionCounterparty {
                client_id: "merkle-1".into(),
                connection_id: CONNECTION_ID.into(),
                prefix: self.prefix.clone(),
            },
            versions: vec![Version::default_ibc()],
            delay_period: 0,
        };
        host.set_connection(CONNECTION_ID, &connection).unwrap();
        let channel = ChannelEnd {
            state: ChannelState::Open,
            ordering: Order::Unordered,
            counterparty: ChannelCounterparty::new(PROXY_PORT_ID, BOOTSTRAP_CHANNEL),
            connection_hops: vec![CONNECTION_ID.into()],
            version: PROXY_VERSION.into(),
        };
        host.set_channel(PROXY_PORT_ID, BOOTSTRAP_CHANNEL, &channel).unwrap();
        ProxyKeeper::new(ProxyConfig::for_testing(), host)
    }
}
