//! # Proxied Handshakes
//!
//! Connection and channel open handshakes and packet relays of an upstream
//! chain, observed through its client on this chain. Every step verifies the
//! upstream record it expects and commits it into the proxy namespace, where
//! the downstream chain's proxy client reads it.
//!
//! Writes within one step are not atomic: a step that fails partway keeps
//! the commitments written before the failure.

use ibc_proxy_client::{AnyClientState, LightClient, ProofContext, SingleFactStore};
use ibc_proxy_types::{
    commit_acknowledgement, commit_packet, ChannelCounterparty, ChannelEnd, ChannelState,
    CommitmentPrefix, ConnectionEnd, ConnectionState, Order, Packet,
};
use tracing::{debug, info, warn};

use crate::application::keeper::ProxyKeeper;
use crate::domain::{
    invariant_connection_supports_order, CommitmentKind, MsgProxyAcknowledgePacket,
    MsgProxyChannelOpen, MsgProxyChannelOpenConfirm, MsgProxyConnectionOpen,
    MsgProxyConnectionOpenConfirm, MsgProxyRecvPacket, MsgProxyTimeoutPacket, ProxyError,
};
use crate::ports::ProxyHost;

fn step_committed(step: &'static str, upstream_client_id: &str) {
    ibc_proxy_telemetry::record_handshake_step(step);
    info!(step, upstream_client_id, "[proxy-keeper] handshake step committed");
}

impl<H: ProxyHost> ProxyKeeper<H> {
    fn committed_connection(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        connection_id: &str,
    ) -> Result<ConnectionEnd, ProxyError> {
        self.proxy_store()
            .connection_commitment(upstream_client_id, upstream_prefix, connection_id)?
            .ok_or_else(|| ProxyError::ConnectionNotFound(format!("{upstream_client_id}:{connection_id}")))
    }

    fn committed_channel(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        port_id: &str,
        channel_id: &str,
    ) -> Result<ChannelEnd, ProxyError> {
        self.proxy_store()
            .channel_commitment(upstream_client_id, upstream_prefix, port_id, channel_id)?
            .ok_or_else(|| ProxyError::ChannelNotFound {
                port_id: port_id.to_string(),
                channel_id: channel_id.to_string(),
            })
    }

    fn channel_connection(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        channel: &ChannelEnd,
    ) -> Result<ConnectionEnd, ProxyError> {
        let hop = channel
            .first_hop()
            .ok_or_else(|| ProxyError::ConnectionNotFound("channel has no connection hops".into()))?;
        self.committed_connection(upstream_client_id, upstream_prefix, hop)
    }

    // =========================================================================
    // Connection handshake
    // =========================================================================

    /// `ConnOpenTry` relay: the upstream initiated a connection to the
    /// downstream chain, which tracks the upstream through this chain.
    pub fn conn_open_try(&self, msg: &MsgProxyConnectionOpen) -> Result<(), ProxyError> {
        self.proxy_connection_open(msg, ConnectionState::Init, "conn_open_try")
    }

    /// `ConnOpenAck` relay: the upstream answered the downstream's
    /// `ConnOpenInit` with `ConnOpenTry`.
    pub fn conn_open_ack(&self, msg: &MsgProxyConnectionOpen) -> Result<(), ProxyError> {
        self.proxy_connection_open(msg, ConnectionState::TryOpen, "conn_open_ack")
    }

    fn proxy_connection_open(
        &self,
        msg: &MsgProxyConnectionOpen,
        expected_state: ConnectionState,
        step: &'static str,
    ) -> Result<(), ProxyError> {
        let proxy_client = msg.proxy_client_state.as_proxy().ok_or_else(|| {
            ProxyError::InvalidClient(format!(
                "expected a proxy client state, got {}",
                msg.proxy_client_state.client_type()
            ))
        })?;
        self.validate_self_client(proxy_client)?;
        let upstream_client_id = proxy_client.upstream_client_id.as_str();
        let connection = &msg.connection;

        if self
            .proxy_store()
            .connection_commitment(upstream_client_id, &msg.upstream_prefix, &msg.connection_id)?
            .is_some()
        {
            return Err(ProxyError::AlreadyExists(format!(
                "connection {upstream_client_id}:{}",
                msg.connection_id
            )));
        }
        if connection.state != expected_state {
            return Err(ProxyError::state_mismatch(
                "connection",
                expected_state,
                connection.state,
            ));
        }

        // The upstream's client of the downstream chain.
        self.verify_and_proxy_client_state(
            upstream_client_id,
            ProofContext::new(msg.proof_height, &msg.upstream_prefix, &msg.proof_client),
            &connection.client_id,
            &msg.downstream_client_state,
        )?;
        self.verify_and_proxy_client_consensus_state(
            upstream_client_id,
            ProofContext::new(msg.proof_height, &msg.upstream_prefix, &msg.proof_consensus),
            &connection.client_id,
            msg.consensus_height,
            &msg.downstream_consensus_state,
        )?;

        // The downstream's proxy client of the upstream, checked with the
        // now verified downstream client.
        let downstream_client = match &msg.downstream_client_state {
            AnyClientState::MultiHop(mh) => mh.base.as_ref(),
            other => other,
        };
        let store = SingleFactStore::consensus(&msg.proof_proxy_height, &msg.downstream_consensus_state)?;
        let counterparty = &connection.counterparty;
        let verified = downstream_client
            .verify_client_state(
                &store,
                ProofContext::new(msg.proof_proxy_height, &counterparty.prefix, &msg.proof_proxy_client),
                &counterparty.client_id,
                &msg.proxy_client_state,
            )
            .and_then(|()| {
                downstream_client.verify_client_consensus_state(
                    &store,
                    ProofContext::new(
                        msg.proof_proxy_height,
                        &counterparty.prefix,
                        &msg.proof_proxy_consensus,
                    ),
                    &counterparty.client_id,
                    msg.proxy_consensus_height,
                    &msg.proxy_consensus_state,
                )
            });
        ibc_proxy_telemetry::record_verification(CommitmentKind::ClientState.as_str(), verified.is_ok());
        if let Err(e) = verified {
            warn!(
                step,
                client_id = %connection.client_id,
                error = %e,
                "[proxy-keeper] downstream proxy client rejected"
            );
            return Err(ProxyError::verification(&connection.client_id, e));
        }

        self.verify_and_proxy_connection_state(
            upstream_client_id,
            ProofContext::new(msg.proof_height, &msg.upstream_prefix, &msg.proof_connection),
            &msg.connection_id,
            connection,
        )?;
        step_committed(step, upstream_client_id);
        Ok(())
    }

    /// `ConnOpenConfirm` relay: the committed INIT connection is now OPEN
    /// on the upstream with the downstream's connection id.
    pub fn conn_open_confirm(&self, msg: &MsgProxyConnectionOpenConfirm) -> Result<(), ProxyError> {
        self.open_committed_connection(msg, ConnectionState::Init, "conn_open_confirm", |conn| {
            conn.counterparty.connection_id = msg.counterparty_connection_id.clone();
        })
    }

    /// `ConnOpenConfirm` of the upstream, relayed after the downstream's
    /// `ConnOpenAck`: the committed TRYOPEN connection is now OPEN.
    pub fn conn_open_finalize(&self, msg: &MsgProxyConnectionOpenConfirm) -> Result<(), ProxyError> {
        self.open_committed_connection(msg, ConnectionState::TryOpen, "conn_open_finalize", |_| {})
    }

    fn open_committed_connection<F>(
        &self,
        msg: &MsgProxyConnectionOpenConfirm,
        expected_state: ConnectionState,
        step: &'static str,
        amend: F,
    ) -> Result<(), ProxyError>
    where
        F: FnOnce(&mut ConnectionEnd),
    {
        let mut connection =
            self.committed_connection(&msg.upstream_client_id, &msg.upstream_prefix, &msg.connection_id)?;
        if connection.state != expected_state {
            return Err(ProxyError::state_mismatch(
                "connection",
                expected_state,
                connection.state,
            ));
        }
        connection.state = ConnectionState::Open;
        amend(&mut connection);

        self.verify_and_proxy_connection_state(
            &msg.upstream_client_id,
            ProofContext::new(msg.proof_height, &msg.upstream_prefix, &msg.proof),
            &msg.connection_id,
            &connection,
        )?;
        step_committed(step, &msg.upstream_client_id);
        Ok(())
    }

    // =========================================================================
    // Channel handshake
    // =========================================================================

    /// `ChanOpenTry` relay: the upstream initiated a channel over a
    /// proxied connection.
    pub fn chan_open_try(&self, msg: &MsgProxyChannelOpen) -> Result<(), ProxyError> {
        let hop = msg
            .connection_hops
            .first()
            .ok_or_else(|| ProxyError::InvalidMessage("connection hops cannot be empty".into()))?;
        let connection = self.committed_connection(&msg.upstream_client_id, &msg.upstream_prefix, hop)?;
        invariant_connection_supports_order(&connection, msg.order)?;

        let expected = ChannelEnd {
            state: ChannelState::Init,
            ordering: msg.order,
            counterparty: ChannelCounterparty::new(msg.downstream_port_id.clone(), ""),
            connection_hops: msg.connection_hops.clone(),
            version: msg.version.clone(),
        };
        self.verify_and_proxy_channel_state(
            &msg.upstream_client_id,
            ProofContext::new(msg.proof_height, &msg.upstream_prefix, &msg.proof),
            &msg.port_id,
            &msg.channel_id,
            &expected,
        )?;
        step_committed("chan_open_try", &msg.upstream_client_id);
        Ok(())
    }

    /// `ChanOpenAck` relay: the upstream answered the downstream's
    /// `ChanOpenInit` with `ChanOpenTry`.
    pub fn chan_open_ack(&self, msg: &MsgProxyChannelOpen) -> Result<(), ProxyError> {
        let hop = msg
            .connection_hops
            .first()
            .ok_or_else(|| ProxyError::InvalidMessage("connection hops cannot be empty".into()))?;
        self.committed_connection(&msg.upstream_client_id, &msg.upstream_prefix, hop)?;

        let expected = ChannelEnd {
            state: ChannelState::TryOpen,
            ordering: msg.order,
            counterparty: ChannelCounterparty::new(
                msg.downstream_port_id.clone(),
                msg.downstream_channel_id.clone(),
            ),
            connection_hops: msg.connection_hops.clone(),
            version: msg.version.clone(),
        };
        self.verify_and_proxy_channel_state(
            &msg.upstream_client_id,
            ProofContext::new(msg.proof_height, &msg.upstream_prefix, &msg.proof),
            &msg.port_id,
            &msg.channel_id,
            &expected,
        )?;
        step_committed("chan_open_ack", &msg.upstream_client_id);
        Ok(())
    }

    /// `ChanOpenConfirm` relay: the committed INIT channel is now OPEN on
    /// the upstream with the downstream's channel id.
    pub fn chan_open_confirm(&self, msg: &MsgProxyChannelOpenConfirm) -> Result<(), ProxyError> {
        let mut channel = self.committed_channel(
            &msg.upstream_client_id,
            &msg.upstream_prefix,
            &msg.port_id,
            &msg.channel_id,
        )?;
        if !channel.counterparty.channel_id.is_empty() {
            return Err(ProxyError::InvalidChannelOperation(format!(
                "channel {}/{} already has counterparty channel {}",
                msg.port_id, msg.channel_id, channel.counterparty.channel_id
            )));
        }
        if channel.state != ChannelState::Init {
            return Err(ProxyError::state_mismatch("channel", ChannelState::Init, channel.state));
        }
        self.channel_connection(&msg.upstream_client_id, &msg.upstream_prefix, &channel)?;

        channel.counterparty.channel_id = msg.downstream_channel_id.clone();
        channel.state = ChannelState::Open;
        self.verify_and_proxy_channel_state(
            &msg.upstream_client_id,
            ProofContext::new(msg.proof_height, &msg.upstream_prefix, &msg.proof),
            &msg.port_id,
            &msg.channel_id,
            &channel,
        )?;
        step_committed("chan_open_confirm", &msg.upstream_client_id);
        Ok(())
    }

    /// `ChanOpenConfirm` of the upstream, relayed after the downstream's
    /// `ChanOpenAck`: the committed TRYOPEN channel is now OPEN.
    pub fn chan_open_finalize(&self, msg: &MsgProxyChannelOpenConfirm) -> Result<(), ProxyError> {
        let mut channel = self.committed_channel(
            &msg.upstream_client_id,
            &msg.upstream_prefix,
            &msg.port_id,
            &msg.channel_id,
        )?;
        if channel.state != ChannelState::TryOpen {
            return Err(ProxyError::state_mismatch("channel", ChannelState::TryOpen, channel.state));
        }
        self.channel_connection(&msg.upstream_client_id, &msg.upstream_prefix, &channel)?;

        channel.state = ChannelState::Open;
        self.verify_and_proxy_channel_state(
            &msg.upstream_client_id,
            ProofContext::new(msg.proof_height, &msg.upstream_prefix, &msg.proof),
            &msg.port_id,
            &msg.channel_id,
            &channel,
        )?;
        step_committed("chan_open_finalize", &msg.upstream_client_id);
        Ok(())
    }

    // =========================================================================
    // Packets
    // =========================================================================

    /// Relay a packet sent by the upstream: commits its packet commitment.
    pub fn recv_packet(&self, msg: &MsgProxyRecvPacket) -> Result<(), ProxyError> {
        let packet = &msg.packet;
        let channel = self.committed_channel(
            &msg.upstream_client_id,
            &msg.upstream_prefix,
            &packet.source_port,
            &packet.source_channel,
        )?;
        if packet.destination_port != channel.counterparty.port_id
            || packet.destination_channel != channel.counterparty.channel_id
        {
            return Err(ProxyError::InvalidPacket(format!(
                "packet destination {}/{} does not match channel counterparty {}/{}",
                packet.destination_port,
                packet.destination_channel,
                channel.counterparty.port_id,
                channel.counterparty.channel_id
            )));
        }
        let connection = self.channel_connection(&msg.upstream_client_id, &msg.upstream_prefix, &channel)?;

        let now = self.host().host_info().timestamp;
        if packet.timeout_timestamp != 0 && now >= packet.timeout_timestamp {
            return Err(ProxyError::PacketTimeout(format!(
                "block time {now} >= packet timeout timestamp {}",
                packet.timeout_timestamp
            )));
        }

        let commitment = commit_packet(packet);
        debug!(
            sequence = packet.sequence,
            commitment = %hex::encode(&commitment),
            "[proxy-keeper] relaying packet commitment"
        );
        self.verify_and_proxy_packet_commitment(
            &msg.upstream_client_id,
            ProofContext::new(msg.proof_height, &msg.upstream_prefix, &msg.proof),
            connection.delay_period,
            &packet.source_port,
            &packet.source_channel,
            packet.sequence,
            &commitment,
        )?;
        step_committed("recv_packet", &msg.upstream_client_id);
        Ok(())
    }

    fn destination_channel(
        &self,
        upstream_client_id: &str,
        upstream_prefix: &CommitmentPrefix,
        packet: &Packet,
    ) -> Result<(ChannelEnd, ConnectionEnd), ProxyError> {
        let channel = self.committed_channel(
            upstream_client_id,
            upstream_prefix,
            &packet.destination_port,
            &packet.destination_channel,
        )?;
        if packet.source_port != channel.counterparty.port_id
            || packet.source_channel != channel.counterparty.channel_id
        {
            return Err(ProxyError::InvalidPacket(format!(
                "packet source {}/{} does not match channel counterparty {}/{}",
                packet.source_port,
                packet.source_channel,
                channel.counterparty.port_id,
                channel.counterparty.channel_id
            )));
        }
        let connection = self.channel_connection(upstream_client_id, upstream_prefix, &channel)?;
        Ok((channel, connection))
    }

    /// Relay the upstream's acknowledgement of a downstream packet: commits
    /// the acknowledgement commitment.
    pub fn acknowledge_packet(&self, msg: &MsgProxyAcknowledgePacket) -> Result<(), ProxyError> {
        let packet = &msg.packet;
        let (_, connection) =
            self.destination_channel(&msg.upstream_client_id, &msg.upstream_prefix, packet)?;

        self.verify_and_proxy_packet_acknowledgement(
            &msg.upstream_client_id,
            ProofContext::new(msg.proof_height, &msg.upstream_prefix, &msg.proof),
            connection.delay_period,
            &packet.destination_port,
            &packet.destination_channel,
            packet.sequence,
            &commit_acknowledgement(&msg.acknowledgement),
        )?;
        step_committed("acknowledge_packet", &msg.upstream_client_id);
        Ok(())
    }

    /// Relay proof that a downstream packet was never received by the
    /// upstream before its timeout.
    pub fn timeout_packet(&self, msg: &MsgProxyTimeoutPacket) -> Result<(), ProxyError> {
        let packet = &msg.packet;
        let (channel, connection) =
            self.destination_channel(&msg.upstream_client_id, &msg.upstream_prefix, packet)?;

        let upstream_time = self
            .local_consensus(&msg.upstream_client_id, &msg.proof_height)?
            .timestamp();
        if !packet.timed_out_at(msg.proof_height, upstream_time) {
            return Err(ProxyError::InvalidPacket(format!(
                "packet {} has not timed out on the upstream at {} (time {upstream_time})",
                packet.sequence, msg.proof_height
            )));
        }

        let proof = ProofContext::new(msg.proof_height, &msg.upstream_prefix, &msg.proof);
        match channel.ordering {
            Order::Ordered => {
                if msg.next_sequence_recv > packet.sequence {
                    return Err(ProxyError::InvalidPacket(format!(
                        "packet {} already received, next sequence receive is {}",
                        packet.sequence, msg.next_sequence_recv
                    )));
                }
                self.verify_and_proxy_next_sequence_recv(
                    &msg.upstream_client_id,
                    proof,
                    connection.delay_period,
                    &packet.destination_port,
                    &packet.destination_channel,
                    msg.next_sequence_recv,
                )?;
            }
            Order::Unordered => {
                self.verify_and_proxy_packet_receipt_absence(
                    &msg.upstream_client_id,
                    proof,
                    connection.delay_period,
                    &packet.destination_port,
                    &packet.destination_channel,
                    packet.sequence,
                )?;
            }
        }
        step_committed("timeout_packet", &msg.upstream_client_id);
        Ok(())
    }
}
