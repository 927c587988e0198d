//! # In-Memory Host
//!
//! A host chain over one shared [`MemoryStore`]: the IBC client, connection
//! and channel state lives under the configured IBC prefix, the proxy
//! namespace under the proxy prefix. Clones share the store and the current
//! block, so a test harness can drive the chain while a keeper reads it.

use std::sync::Arc;

use ibc_proxy_client::{
    AnyClientState, AnyConsensusState, AnyHeader, CommitmentTree, HostInfo, LightClient,
    MerkleClientState, MerkleHeader, ProxyClientRegistry, UpdateContext,
};
use ibc_proxy_types::path::{
    channel_path, client_state_path, client_store_prefix, connection_path, consensus_state_key,
    next_sequence_recv_path, next_sequence_send_path, packet_acknowledgement_path,
    packet_commitment_path, packet_receipt_path,
};
use ibc_proxy_types::{
    commit_acknowledgement, commit_packet, decode, encode, ChannelEnd, CommitmentPrefix,
    ConnectionEnd, Height, KvRead, KvStore, MemoryStore, Packet, PrefixStore,
};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::ProxyConfig;
use crate::domain::ProxyError;
use crate::ports::{ChannelKeeper, ClientKeeper, ConnectionKeeper, HostContext, ProxyHost};

const NEXT_CLIENT_SEQUENCE_KEY: &[u8] = b"nextClientSequence";

fn be_u64(bytes: &[u8]) -> Option<u64> {
    let raw: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(raw))
}

/// A block committed by an [`InMemoryHost`]: its header and the commitment
/// tree over the whole chain store at that height.
#[derive(Clone, Debug)]
pub struct CommittedBlock {
    /// Header other chains update their client of this chain with.
    pub header: MerkleHeader,
    tree: CommitmentTree,
}

impl CommittedBlock {
    /// Block height.
    pub fn height(&self) -> Height {
        self.header.height
    }

    /// Consensus state committed by the block.
    pub fn consensus_state(&self) -> AnyConsensusState {
        AnyConsensusState::Merkle(self.header.consensus_state())
    }

    /// Encoded membership or non-membership proof of a raw store key.
    pub fn prove(&self, key: &[u8]) -> Result<Vec<u8>, ProxyError> {
        Ok(encode(&self.tree.prove(key)?)?)
    }

    /// Encoded proof of `path` under `prefix`.
    pub fn prove_path(&self, prefix: &CommitmentPrefix, path: &str) -> Result<Vec<u8>, ProxyError> {
        self.prove(&prefix.apply_path(path))
    }
}

/// In-memory host chain.
#[derive(Clone, Debug)]
pub struct InMemoryHost {
    chain_id: String,
    store: MemoryStore,
    ibc_prefix: CommitmentPrefix,
    max_expected_time_per_block: u64,
    host: Arc<RwLock<HostInfo>>,
    registry: Arc<ProxyClientRegistry>,
}

impl InMemoryHost {
    /// Empty chain at height `0-1`, time 1ns.
    pub fn new(chain_id: impl Into<String>, config: &ProxyConfig) -> Self {
        Self {
            chain_id: chain_id.into(),
            store: MemoryStore::new(),
            ibc_prefix: config.ibc_prefix.clone(),
            max_expected_time_per_block: config.max_expected_time_per_block,
            host: Arc::new(RwLock::new(HostInfo::new(Height::new(0, 1), 1))),
            registry: Arc::new(ProxyClientRegistry::with_defaults()),
        }
    }

    /// Replace the proxy client registry used for header updates.
    pub fn with_registry(mut self, registry: ProxyClientRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Chain id.
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Prefix of the IBC store.
    pub fn ibc_prefix(&self) -> &CommitmentPrefix {
        &self.ibc_prefix
    }

    /// Shared handle to the chain store.
    pub fn memory_store(&self) -> &MemoryStore {
        &self.store
    }

    /// Set the current block.
    pub fn set_host_info(&self, info: HostInfo) {
        *self.host.write() = info;
    }

    /// Move to the next block, `time_step` nanoseconds later.
    pub fn advance_block(&self, time_step: u64) -> HostInfo {
        let mut host = self.host.write();
        host.height = Height::new(host.height.revision_number, host.height.revision_height + 1);
        host.timestamp = host.timestamp.saturating_add(time_step);
        *host
    }

    /// Move to the next block and commit the chain store at its height.
    pub fn commit_block(&self, time_step: u64) -> CommittedBlock {
        let host = self.advance_block(time_step);
        let tree = CommitmentTree::from_entries(self.store.snapshot());
        let header = MerkleHeader {
            chain_id: self.chain_id.clone(),
            height: host.height,
            timestamp: host.timestamp,
            root: tree.root(),
        };
        debug!(
            chain_id = %self.chain_id,
            height = %host.height,
            leaves = tree.len(),
            "[host] block committed"
        );
        CommittedBlock { header, tree }
    }

    /// Client state another chain creates to track this chain from `block`.
    pub fn client_state_at(&self, block: &CommittedBlock) -> AnyClientState {
        AnyClientState::Merkle(MerkleClientState::new(self.chain_id.clone(), block.height()))
    }

    fn ibc_key(&self, path: &str) -> Vec<u8> {
        self.ibc_prefix.apply_path(path)
    }

    fn get_u64(&self, path: &str) -> Option<u64> {
        be_u64(&self.store.get(&self.ibc_key(path))?)
    }

    fn set_u64(&self, path: &str, value: u64) {
        self.store.set(&self.ibc_key(path), value.to_be_bytes().to_vec());
    }

    // =========================================================================
    // Clients
    // =========================================================================

    /// Create, initialize and store a client with its first consensus state.
    pub fn create_client_with_consensus(
        &self,
        client_state: &AnyClientState,
        consensus_state: &AnyConsensusState,
    ) -> Result<String, ProxyError> {
        client_state.validate()?;
        let client_id = self.create_client(client_state)?;
        client_state.initialize(
            self.host_info(),
            &self.client_store(&client_id),
            consensus_state,
        )?;
        self.set_consensus_state(&client_id, &client_state.latest_height(), consensus_state)?;
        info!(
            chain_id = %self.chain_id,
            client_id = %client_id,
            height = %client_state.latest_height(),
            "[host] client created"
        );
        Ok(client_id)
    }

    /// Apply `header` to `client_id` and store the resulting states.
    pub fn update_client(&self, client_id: &str, header: &AnyHeader) -> Result<(), ProxyError> {
        let client_state = self
            .client_state(client_id)
            .ok_or_else(|| ProxyError::ClientNotFound(client_id.to_string()))?;
        let ctx = UpdateContext::new(self.host_info(), &self.registry);
        let (updated, consensus) = client_state.check_header_and_update_state(
            &ctx,
            &self.client_store(client_id),
            header,
        )?;
        self.set_client_state(client_id, &updated)?;
        self.set_consensus_state(client_id, &header.height(), &consensus)?;
        debug!(
            chain_id = %self.chain_id,
            client_id,
            height = %header.height(),
            "[host] client updated"
        );
        Ok(())
    }

    // =========================================================================
    // Connections, channels and packets
    // =========================================================================

    /// Store a connection end.
    pub fn set_connection(
        &self,
        connection_id: &str,
        connection: &ConnectionEnd,
    ) -> Result<(), ProxyError> {
        self.store
            .set(&self.ibc_key(&connection_path(connection_id)), encode(connection)?);
        Ok(())
    }

    /// Store a channel end, initializing its sequences to 1 on first write.
    pub fn set_channel(
        &self,
        port_id: &str,
        channel_id: &str,
        channel: &ChannelEnd,
    ) -> Result<(), ProxyError> {
        self.store
            .set(&self.ibc_key(&channel_path(port_id, channel_id)), encode(channel)?);
        for path in [
            next_sequence_send_path(port_id, channel_id),
            next_sequence_recv_path(port_id, channel_id),
        ] {
            if self.get_u64(&path).is_none() {
                self.set_u64(&path, 1);
            }
        }
        Ok(())
    }

    /// Next sequence the channel expects to receive.
    pub fn next_sequence_recv(&self, port_id: &str, channel_id: &str) -> Option<u64> {
        self.get_u64(&next_sequence_recv_path(port_id, channel_id))
    }

    /// Record receipt of `packet`, advancing the receive sequence.
    pub fn receive_packet(&self, packet: &Packet) {
        let (port, channel) = (&packet.destination_port, &packet.destination_channel);
        self.store.set(
            &self.ibc_key(&packet_receipt_path(port, channel, packet.sequence)),
            vec![1],
        );
        let next = self.next_sequence_recv(port, channel).unwrap_or(1);
        self.set_u64(
            &next_sequence_recv_path(port, channel),
            next.max(packet.sequence + 1),
        );
    }

    /// Store the acknowledgement commitment of a received packet.
    pub fn write_acknowledgement(&self, packet: &Packet, acknowledgement: &[u8]) {
        self.store.set(
            &self.ibc_key(&packet_acknowledgement_path(
                &packet.destination_port,
                &packet.destination_channel,
                packet.sequence,
            )),
            commit_acknowledgement(acknowledgement),
        );
    }

    /// Packet commitment stored by the sender.
    pub fn packet_commitment(&self, port_id: &str, channel_id: &str, sequence: u64) -> Option<Vec<u8>> {
        self.store
            .get(&self.ibc_key(&packet_commitment_path(port_id, channel_id, sequence)))
    }
}

impl ClientKeeper for InMemoryHost {
    type ClientStore = PrefixStore<MemoryStore>;

    fn client_state(&self, client_id: &str) -> Option<AnyClientState> {
        let bz = self.store.get(&self.ibc_key(&client_state_path(client_id)))?;
        AnyClientState::from_bytes(&bz).ok()
    }

    fn set_client_state(
        &self,
        client_id: &str,
        client_state: &AnyClientState,
    ) -> Result<(), ProxyError> {
        self.store.set(
            &self.ibc_key(&client_state_path(client_id)),
            client_state.to_bytes()?,
        );
        Ok(())
    }

    fn consensus_state(&self, client_id: &str, height: &Height) -> Option<AnyConsensusState> {
        let bz = self
            .client_store(client_id)
            .get(consensus_state_key(height).as_bytes())?;
        AnyConsensusState::from_bytes(&bz).ok()
    }

    fn set_consensus_state(
        &self,
        client_id: &str,
        height: &Height,
        consensus_state: &AnyConsensusState,
    ) -> Result<(), ProxyError> {
        self.client_store(client_id).set(
            consensus_state_key(height).as_bytes(),
            consensus_state.to_bytes()?,
        );
        Ok(())
    }

    fn client_store(&self, client_id: &str) -> Self::ClientStore {
        self.store
            .prefixed(self.ibc_key(&client_store_prefix(client_id)))
    }

    fn create_client(&self, client_state: &AnyClientState) -> Result<String, ProxyError> {
        let sequence = self
            .store
            .get(NEXT_CLIENT_SEQUENCE_KEY)
            .and_then(|bz| be_u64(&bz))
            .unwrap_or(0);
        self.store
            .set(NEXT_CLIENT_SEQUENCE_KEY, (sequence + 1).to_be_bytes().to_vec());
        let client_id = format!("{}-{sequence}", client_state.client_type());
        self.set_client_state(&client_id, client_state)?;
        Ok(client_id)
    }

    fn validate_self_client(&self, client_state: &AnyClientState) -> Result<(), ProxyError> {
        let client_state = match client_state {
            AnyClientState::MultiHop(multihop) => multihop.base.as_ref(),
            other => other,
        };
        let merkle = match client_state {
            AnyClientState::Merkle(cs) => cs,
            other => {
                return Err(ProxyError::InvalidClient(format!(
                    "{} is not a client type of this chain",
                    other.client_type()
                )))
            }
        };
        if merkle.chain_id != self.chain_id {
            return Err(ProxyError::InvalidClient(format!(
                "client tracks chain {}, this chain is {}",
                merkle.chain_id, self.chain_id
            )));
        }
        if let Some(frozen) = merkle.frozen_height {
            return Err(ProxyError::InvalidClient(format!("client frozen at {frozen}")));
        }
        let current = self.host_info().height;
        if merkle.latest_height >= current {
            return Err(ProxyError::InvalidClient(format!(
                "client latest height {} is not below chain height {current}",
                merkle.latest_height
            )));
        }
        Ok(())
    }
}

impl ConnectionKeeper for InMemoryHost {
    fn connection(&self, connection_id: &str) -> Option<ConnectionEnd> {
        let bz = self.store.get(&self.ibc_key(&connection_path(connection_id)))?;
        decode(&bz).ok()
    }

    fn max_expected_time_per_block(&self) -> u64 {
        self.max_expected_time_per_block
    }
}

impl ChannelKeeper for InMemoryHost {
    fn channel(&self, port_id: &str, channel_id: &str) -> Option<ChannelEnd> {
        let bz = self
            .store
            .get(&self.ibc_key(&channel_path(port_id, channel_id)))?;
        decode(&bz).ok()
    }

    fn next_sequence_send(&self, port_id: &str, channel_id: &str) -> Option<u64> {
        self.get_u64(&next_sequence_send_path(port_id, channel_id))
    }

    fn send_packet(&self, packet: &Packet) -> Result<(), ProxyError> {
        let (port, channel) = (&packet.source_port, &packet.source_channel);
        let expected = self
            .next_sequence_send(port, channel)
            .ok_or_else(|| ProxyError::SequenceNotFound {
                port_id: port.clone(),
                channel_id: channel.clone(),
            })?;
        if packet.sequence != expected {
            return Err(ProxyError::InvalidPacket(format!(
                "packet sequence {} does not match next send sequence {expected}",
                packet.sequence
            )));
        }
        self.store.set(
            &self.ibc_key(&packet_commitment_path(port, channel, packet.sequence)),
            commit_packet(packet),
        );
        self.set_u64(&next_sequence_send_path(port, channel), expected + 1);
        debug!(
            chain_id = %self.chain_id,
            port_id = %port,
            channel_id = %channel,
            sequence = packet.sequence,
            "[host] packet sent"
        );
        Ok(())
    }
}

impl HostContext for InMemoryHost {
    fn host_info(&self) -> HostInfo {
        *self.host.read()
    }
}

impl ProxyHost for InMemoryHost {
    type Store = MemoryStore;

    fn store(&self) -> Self::Store {
        self.store.clone()
    }
}
