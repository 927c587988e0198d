//! # Proxy Store
//!
//! Typed access to the proxy module's state in a chain store: the proxied
//! commitments of every upstream, the proxy-enabled flags and the bootstrap
//! request records. Writes are unconditional overwrites.

use ibc_proxy_client::{AnyClientState, AnyConsensusState};
use ibc_proxy_types::{
    decode, encode, path, ChannelEnd, CommitmentPrefix, ConnectionEnd, Height, KvRead, KvStore,
};
use tracing::debug;

use crate::algorithms::{
    bootstrap_request_key, packet_receipt_absence_path, proxy_enabled_key, ProxyKeys,
    RECEIPT_ABSENCE_VALUE,
};
use crate::domain::{BootstrapState, CommitmentKind, ProxyError};

fn be_u64(bytes: &[u8]) -> Option<u64> {
    let raw: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(raw))
}

/// Proxy module state over a chain store.
#[derive(Clone, Debug)]
pub struct ProxyStore<S> {
    store: S,
    keys: ProxyKeys,
}

impl<S: KvStore> ProxyStore<S> {
    /// Proxy state in `store`, with commitments rooted at `proxy_prefix`.
    pub fn new(store: S, proxy_prefix: CommitmentPrefix) -> Self {
        Self {
            store,
            keys: ProxyKeys::new(proxy_prefix),
        }
    }

    fn commit(&self, kind: CommitmentKind, upstream_client_id: &str, key: Vec<u8>, value: Vec<u8>) {
        debug!(
            kind = kind.as_str(),
            upstream_client_id,
            key = %String::from_utf8_lossy(&key),
            "[proxy-store] commitment written"
        );
        self.store.set(&key, value);
        ibc_proxy_telemetry::record_commitment(kind.as_str());
    }

    // =========================================================================
    // Client facts
    // =========================================================================

    /// Commit the upstream's client state of `counterparty_client_id`.
    pub fn set_client_state(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        counterparty_client_id: &str,
        client_state: &AnyClientState,
    ) -> Result<(), ProxyError> {
        let key = self
            .keys
            .client_state(upstream_client_id, upstream_prefix, counterparty_client_id);
        self.commit(
            CommitmentKind::ClientState,
            upstream_client_id,
            key,
            client_state.to_bytes()?,
        );
        Ok(())
    }

    /// Committed client state of `counterparty_client_id`.
    pub fn client_state_commitment(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        counterparty_client_id: &str,
    ) -> Result<Option<AnyClientState>, ProxyError> {
        let key = self
            .keys
            .client_state(upstream_client_id, upstream_prefix, counterparty_client_id);
        self.store
            .get(&key)
            .map(|bz| AnyClientState::from_bytes(&bz))
            .transpose()
            .map_err(ProxyError::from)
    }

    /// Commit the upstream's consensus state of `counterparty_client_id`.
    pub fn set_consensus_state(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        counterparty_client_id: &str,
        height: &Height,
        consensus_state: &AnyConsensusState,
    ) -> Result<(), ProxyError> {
        let key = self.keys.consensus_state(
            upstream_client_id,
            upstream_prefix,
            counterparty_client_id,
            height,
        );
        self.commit(
            CommitmentKind::ConsensusState,
            upstream_client_id,
            key,
            consensus_state.to_bytes()?,
        );
        Ok(())
    }

    /// Committed consensus state of `counterparty_client_id` at `height`.
    pub fn consensus_state_commitment(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        counterparty_client_id: &str,
        height: &Height,
    ) -> Result<Option<AnyConsensusState>, ProxyError> {
        let key = self.keys.consensus_state(
            upstream_client_id,
            upstream_prefix,
            counterparty_client_id,
            height,
        );
        self.store
            .get(&key)
            .map(|bz| AnyConsensusState::from_bytes(&bz))
            .transpose()
            .map_err(ProxyError::from)
    }

    // =========================================================================
    // Connections and channels
    // =========================================================================

    /// Commit an upstream connection end.
    pub fn set_connection(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        connection_id: &str,
        connection: &ConnectionEnd,
    ) -> Result<(), ProxyError> {
        let key = self
            .keys
            .connection(upstream_client_id, upstream_prefix, connection_id);
        self.commit(
            CommitmentKind::Connection,
            upstream_client_id,
            key,
            encode(connection)?,
        );
        Ok(())
    }

    /// Committed upstream connection end.
    pub fn connection_commitment(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        connection_id: &str,
    ) -> Result<Option<ConnectionEnd>, ProxyError> {
        let key = self
            .keys
            .connection(upstream_client_id, upstream_prefix, connection_id);
        Ok(self.store.get(&key).map(|bz| decode(&bz)).transpose()?)
    }

    /// Commit an upstream channel end.
    pub fn set_channel(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        port_id: &str,
        channel_id: &str,
        channel: &ChannelEnd,
    ) -> Result<(), ProxyError> {
        let key = self
            .keys
            .channel(upstream_client_id, upstream_prefix, port_id, channel_id);
        self.commit(
            CommitmentKind::Channel,
            upstream_client_id,
            key,
            encode(channel)?,
        );
        Ok(())
    }

    /// Committed upstream channel end.
    pub fn channel_commitment(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        port_id: &str,
        channel_id: &str,
    ) -> Result<Option<ChannelEnd>, ProxyError> {
        let key = self
            .keys
            .channel(upstream_client_id, upstream_prefix, port_id, channel_id);
        Ok(self.store.get(&key).map(|bz| decode(&bz)).transpose()?)
    }

    // =========================================================================
    // Packets
    // =========================================================================

    /// Commit an upstream packet commitment.
    pub fn set_packet_commitment(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        commitment: &[u8],
    ) {
        let key = self.keys.upstream_key(
            upstream_client_id,
            upstream_prefix,
            &path::packet_commitment_path(port_id, channel_id, sequence),
        );
        self.commit(
            CommitmentKind::PacketCommitment,
            upstream_client_id,
            key,
            commitment.to_vec(),
        );
    }

    /// Committed upstream packet commitment.
    pub fn packet_commitment(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
    ) -> Option<Vec<u8>> {
        self.store.get(&self.keys.upstream_key(
            upstream_client_id,
            upstream_prefix,
            &path::packet_commitment_path(port_id, channel_id, sequence),
        ))
    }

    /// Commit an upstream acknowledgement commitment.
    pub fn set_packet_acknowledgement(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        ack_commitment: &[u8],
    ) {
        let key = self.keys.upstream_key(
            upstream_client_id,
            upstream_prefix,
            &path::packet_acknowledgement_path(port_id, channel_id, sequence),
        );
        self.commit(
            CommitmentKind::PacketAcknowledgement,
            upstream_client_id,
            key,
            ack_commitment.to_vec(),
        );
    }

    /// Committed upstream acknowledgement commitment.
    pub fn acknowledgement_commitment(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
    ) -> Option<Vec<u8>> {
        self.store.get(&self.keys.upstream_key(
            upstream_client_id,
            upstream_prefix,
            &path::packet_acknowledgement_path(port_id, channel_id, sequence),
        ))
    }

    /// Record that the upstream holds no receipt for a packet.
    pub fn set_packet_receipt_absence(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
    ) {
        let key = self.keys.upstream_key(
            upstream_client_id,
            upstream_prefix,
            &packet_receipt_absence_path(port_id, channel_id, sequence),
        );
        self.commit(
            CommitmentKind::PacketReceiptAbsence,
            upstream_client_id,
            key,
            RECEIPT_ABSENCE_VALUE.to_vec(),
        );
    }

    /// Whether a receipt absence was recorded.
    pub fn has_packet_receipt_absence(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
    ) -> bool {
        self.store.has(&self.keys.upstream_key(
            upstream_client_id,
            upstream_prefix,
            &packet_receipt_absence_path(port_id, channel_id, sequence),
        ))
    }

    /// Commit an upstream next receive sequence.
    pub fn set_next_sequence_recv(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        port_id: &str,
        channel_id: &str,
        next_sequence_recv: u64,
    ) {
        let key = self.keys.upstream_key(
            upstream_client_id,
            upstream_prefix,
            &path::next_sequence_recv_path(port_id, channel_id),
        );
        self.commit(
            CommitmentKind::NextSequenceRecv,
            upstream_client_id,
            key,
            next_sequence_recv.to_be_bytes().to_vec(),
        );
    }

    /// Committed upstream next receive sequence.
    pub fn next_sequence_recv_commitment(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        port_id: &str,
        channel_id: &str,
    ) -> Option<u64> {
        let bz = self.store.get(&self.keys.upstream_key(
            upstream_client_id,
            upstream_prefix,
            &path::next_sequence_recv_path(port_id, channel_id),
        ))?;
        be_u64(&bz)
    }

    // =========================================================================
    // Upstream block times
    // =========================================================================

    /// Commit the block time of the upstream at `height`.
    pub fn set_block_time(&self, upstream_client_id: &str, height: &Height, timestamp: u64) {
        let key = self.keys.block_time(upstream_client_id, height);
        self.commit(
            CommitmentKind::BlockTime,
            upstream_client_id,
            key,
            timestamp.to_be_bytes().to_vec(),
        );
    }

    /// Committed block time of the upstream at `height`.
    pub fn block_time(&self, upstream_client_id: &str, height: &Height) -> Option<u64> {
        let bz = self.store.get(&self.keys.block_time(upstream_client_id, height))?;
        be_u64(&bz)
    }

    // =========================================================================
    // Module records
    // =========================================================================

    /// Mark `client_id` as proxy-enabled.
    pub fn set_enabled(&self, client_id: &str) {
        self.store.set(&proxy_enabled_key(client_id), vec![1]);
    }

    /// Whether `client_id` is proxy-enabled.
    pub fn is_enabled(&self, client_id: &str) -> bool {
        self.store.has(&proxy_enabled_key(client_id))
    }

    /// Record the bootstrap state of `proxy_client_id`.
    pub fn set_bootstrap_state(
        &self,
        proxy_client_id: &str,
        state: BootstrapState,
    ) -> Result<(), ProxyError> {
        self.store
            .set(&bootstrap_request_key(proxy_client_id), encode(&state)?);
        Ok(())
    }

    /// Bootstrap state of `proxy_client_id`.
    pub fn bootstrap_state(
        &self,
        proxy_client_id: &str,
    ) -> Result<Option<BootstrapState>, ProxyError> {
        Ok(self
            .store
            .get(&bootstrap_request_key(proxy_client_id))
            .map(|bz| decode(&bz))
            .transpose()?)
    }
}
