//! # Proxy Bootstrap
//!
//! Two-message exchange over an open `proxy` channel. The downstream chain
//! creates a placeholder proxy client and sends a request naming the
//! upstream client it wants served; the proxy chain answers with a snapshot
//! of that client and its own prefixes; the downstream fills in and
//! initializes the placeholder.
//!
//! ```text
//! Requested ──ack OK──► Fulfilled
//!     │
//!     └──ack error / ERROR status / timeout──► Failed
//! ```
//!
//! Both end states are terminal. A failed request is never retried.

use ibc_proxy_client::{
    AnyClientState, AnyConsensusState, LightClient, ProxyClientState, ProxyConsensusState,
};
use ibc_proxy_types::{validate_identifier, Acknowledgement, Height, Packet};
use tracing::{info, warn};

use crate::application::keeper::ProxyKeeper;
use crate::domain::{
    invariant_bootstrap_transition, AckStatus, BootstrapState, ProxyError,
    ProxyRequestAcknowledgement, ProxyRequestPacketData, UpstreamState,
};
use crate::ports::ProxyHost;

impl<H: ProxyHost> ProxyKeeper<H> {
    /// Recorded bootstrap state of `proxy_client_id`.
    pub fn bootstrap_state(&self, proxy_client_id: &str) -> Result<BootstrapState, ProxyError> {
        self.proxy_store()
            .bootstrap_state(proxy_client_id)?
            .ok_or_else(|| ProxyError::BootstrapNotFound(proxy_client_id.to_string()))
    }

    fn transition(&self, proxy_client_id: &str, next: BootstrapState) -> Result<(), ProxyError> {
        let current = self.bootstrap_state(proxy_client_id)?;
        invariant_bootstrap_transition(proxy_client_id, current, next)?;
        self.proxy_store().set_bootstrap_state(proxy_client_id, next)?;
        ibc_proxy_telemetry::record_bootstrap(next.as_str());
        info!(
            proxy_client_id,
            from = current.as_str(),
            to = next.as_str(),
            "[proxy-bootstrap] request state changed"
        );
        Ok(())
    }

    fn fail_request(&self, proxy_client_id: &str, reason: &str) -> Result<BootstrapState, ProxyError> {
        warn!(proxy_client_id, reason, "[proxy-bootstrap] request failed");
        self.transition(proxy_client_id, BootstrapState::Failed)?;
        Ok(BootstrapState::Failed)
    }

    // =========================================================================
    // Downstream side
    // =========================================================================

    /// Create a placeholder proxy client for `upstream_client_id` and ask
    /// the proxy chain at the other end of the channel to serve it.
    ///
    /// Returns the sent packet and the placeholder's client id.
    pub fn send_proxy_request(
        &self,
        source_port: &str,
        source_channel: &str,
        upstream_client_id: &str,
        timeout_height: Height,
        timeout_timestamp: u64,
    ) -> Result<(Packet, String), ProxyError> {
        validate_identifier(upstream_client_id)?;
        let host = self.host();
        let channel = host
            .channel(source_port, source_channel)
            .ok_or_else(|| ProxyError::ChannelNotFound {
                port_id: source_port.to_string(),
                channel_id: source_channel.to_string(),
            })?;
        let sequence = host
            .next_sequence_send(source_port, source_channel)
            .ok_or_else(|| ProxyError::SequenceNotFound {
                port_id: source_port.to_string(),
                channel_id: source_channel.to_string(),
            })?;

        let placeholder = AnyClientState::Proxy(ProxyClientState::new(upstream_client_id));
        let proxy_client_id = host.create_client(&placeholder)?;
        let data = ProxyRequestPacketData {
            upstream_client_id: upstream_client_id.to_string(),
            proxy_client_id: proxy_client_id.clone(),
        };
        let packet = Packet {
            sequence,
            source_port: source_port.to_string(),
            source_channel: source_channel.to_string(),
            destination_port: channel.counterparty.port_id,
            destination_channel: channel.counterparty.channel_id,
            data: data.to_bytes()?,
            timeout_height,
            timeout_timestamp,
        };
        host.send_packet(&packet)?;
        self.proxy_store()
            .set_bootstrap_state(&proxy_client_id, BootstrapState::Requested)?;

        ibc_proxy_telemetry::record_bootstrap(BootstrapState::Requested.as_str());
        info!(
            upstream_client_id,
            proxy_client_id = %proxy_client_id,
            sequence,
            "[proxy-bootstrap] request sent"
        );
        Ok((packet, proxy_client_id))
    }

    /// Handle the proxy chain's answer to a request.
    ///
    /// Once the request is found in `Requested`, every failure (error
    /// acknowledgement, ERROR status, unreadable reply, reply that does not
    /// initialize a client) records `Failed` and returns `Ok(Failed)`, so a
    /// host that reverts on error keeps the terminal state.
    pub fn on_proxy_request_acknowledgement(
        &self,
        packet: &Packet,
        acknowledgement: &Acknowledgement,
    ) -> Result<BootstrapState, ProxyError> {
        let data = ProxyRequestPacketData::from_bytes(&packet.data)?;
        let proxy_client_id = data.proxy_client_id.as_str();
        let current = self.bootstrap_state(proxy_client_id)?;
        invariant_bootstrap_transition(proxy_client_id, current, BootstrapState::Fulfilled)?;

        let reply = match acknowledgement {
            Acknowledgement::Error(reason) => return self.fail_request(proxy_client_id, reason),
            Acknowledgement::Result(bytes) => match ProxyRequestAcknowledgement::from_bytes(bytes) {
                Ok(reply) => reply,
                Err(e) => return self.fail_request(proxy_client_id, &e.to_string()),
            },
        };
        if reply.status != AckStatus::Ok {
            return self.fail_request(proxy_client_id, "proxy answered with an error status");
        }
        if let Err(e) = self.fulfill_request(packet, &data, &reply) {
            return self.fail_request(proxy_client_id, &e.to_string());
        }
        self.transition(proxy_client_id, BootstrapState::Fulfilled)?;
        Ok(BootstrapState::Fulfilled)
    }

    /// Build the proxy client from this chain's client of the proxy chain
    /// (the one behind the request's channel) and the acknowledged upstream
    /// snapshot, then initialize and store it.
    ///
    /// The client state is written last: until it lands, the placeholder
    /// stays uninitialized.
    fn fulfill_request(
        &self,
        packet: &Packet,
        data: &ProxyRequestPacketData,
        reply: &ProxyRequestAcknowledgement,
    ) -> Result<(), ProxyError> {
        let host = self.host();
        let proxy_client_id = data.proxy_client_id.as_str();
        let placeholder = self.local_client(proxy_client_id)?;
        match placeholder.as_proxy() {
            Some(p) if p.upstream_client_id == data.upstream_client_id => {}
            _ => {
                return Err(ProxyError::InvalidClient(format!(
                    "{proxy_client_id} is not a proxy client of {}",
                    data.upstream_client_id
                )))
            }
        }

        let channel = host
            .channel(&packet.source_port, &packet.source_channel)
            .ok_or_else(|| ProxyError::ChannelNotFound {
                port_id: packet.source_port.clone(),
                channel_id: packet.source_channel.clone(),
            })?;
        let hop = channel
            .first_hop()
            .ok_or_else(|| ProxyError::ConnectionNotFound("channel has no connection hops".into()))?;
        let connection = host
            .connection(hop)
            .ok_or_else(|| ProxyError::ConnectionNotFound(hop.to_string()))?;

        let wrapped = self.local_client(&connection.client_id)?;
        let wrapped_height = wrapped.latest_height();
        let wrapped_consensus = self.local_consensus(&connection.client_id, &wrapped_height)?;
        let upstream_timestamp = reply.upstream_state.consensus()?.timestamp();

        let client_state = AnyClientState::Proxy(ProxyClientState::initialized(
            wrapped,
            data.upstream_client_id.clone(),
            reply.proxy_prefix.clone(),
            reply.ibc_prefix.clone(),
            reply.upstream_state.height,
            upstream_timestamp,
        ));
        client_state.validate()?;
        let consensus_state = AnyConsensusState::Proxy(ProxyConsensusState::new(wrapped_consensus));
        client_state.initialize(
            host.host_info(),
            &host.client_store(proxy_client_id),
            &consensus_state,
        )?;
        host.set_consensus_state(proxy_client_id, &wrapped_height, &consensus_state)?;
        host.set_client_state(proxy_client_id, &client_state)?;
        Ok(())
    }

    /// A request packet timed out: the request fails.
    pub fn on_proxy_request_timeout(&self, packet: &Packet) -> Result<(), ProxyError> {
        let data = ProxyRequestPacketData::from_bytes(&packet.data)?;
        self.fail_request(&data.proxy_client_id, "request timed out")?;
        Ok(())
    }

    // =========================================================================
    // Proxy side
    // =========================================================================

    /// Serve a request: acknowledge with a snapshot of the requested
    /// upstream client. Every failure becomes an error acknowledgement.
    pub fn on_recv_proxy_request(&self, packet: &Packet) -> Acknowledgement {
        match self.serve_proxy_request(packet) {
            Ok(reply) => {
                ibc_proxy_telemetry::record_bootstrap("served");
                Acknowledgement::Result(reply)
            }
            Err(e) => {
                ibc_proxy_telemetry::record_bootstrap("refused");
                warn!(
                    sequence = packet.sequence,
                    error = %e,
                    "[proxy-bootstrap] request refused"
                );
                Acknowledgement::Error(format!("proxy request refused: {e}"))
            }
        }
    }

    fn serve_proxy_request(&self, packet: &Packet) -> Result<Vec<u8>, ProxyError> {
        let data = ProxyRequestPacketData::from_bytes(&packet.data)?;
        let upstream_client_id = data.upstream_client_id.as_str();
        let client_state = self.local_client(upstream_client_id)?;
        if !self.is_proxy_enabled(upstream_client_id) {
            return Err(ProxyError::ProxyNotEnabled(upstream_client_id.to_string()));
        }
        let height = client_state.latest_height();
        let consensus_state = self.local_consensus(upstream_client_id, &height)?;

        let reply = ProxyRequestAcknowledgement {
            status: AckStatus::Ok,
            proxy_prefix: self.config().proxy_prefix.clone(),
            ibc_prefix: self.config().ibc_prefix.clone(),
            upstream_state: UpstreamState::new(height, &client_state, &consensus_state)?,
        };
        info!(
            upstream_client_id,
            proxy_client_id = %data.proxy_client_id,
            height = %height,
            "[proxy-bootstrap] request served"
        );
        Ok(reply.to_bytes()?)
    }
}
