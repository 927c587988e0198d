//! # Proxy Keeper
//!
//! Single-hop verification against the local client of an upstream chain,
//! and the verify-then-commit operations that re-expose verified upstream
//! facts in the proxy namespace.
//!
//! `verify_*` has no side effect. `verify_and_proxy_*` checks the upstream
//! prefix, verifies, and only then overwrites the commitment.

use ibc_proxy_client::{
    AnyClientState, AnyConsensusState, ClientError, DelayContext, LightClient, ProofContext,
    ProxyClientState,
};
use ibc_proxy_types::{ChannelEnd, CommitmentPrefix, ConnectionEnd, Height, KvRead};
use tracing::{debug, info, warn};

use crate::adapters::ProxyStore;
use crate::algorithms::block_delay;
use crate::config::ProxyConfig;
use crate::domain::{
    invariant_prefix_matches, CommitmentKind, MsgProxyClientState, MsgProxyUpstreamBlockTime,
    ProxyError,
};
use crate::ports::ProxyHost;

/// Proxy keeper over a host chain.
#[derive(Clone, Debug)]
pub struct ProxyKeeper<H> {
    config: ProxyConfig,
    host: H,
}

impl<H: ProxyHost> ProxyKeeper<H> {
    /// Create a keeper.
    pub fn new(config: ProxyConfig, host: H) -> Self {
        Self { config, host }
    }

    /// Keeper configuration.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Host chain.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Proxy module state of the host chain.
    pub fn proxy_store(&self) -> ProxyStore<H::Store> {
        ProxyStore::new(self.host.store(), self.config.proxy_prefix.clone())
    }

    pub(crate) fn local_client(&self, client_id: &str) -> Result<AnyClientState, ProxyError> {
        self.host
            .client_state(client_id)
            .ok_or_else(|| ProxyError::ClientNotFound(client_id.to_string()))
    }

    pub(crate) fn local_consensus(
        &self,
        client_id: &str,
        height: &Height,
    ) -> Result<AnyConsensusState, ProxyError> {
        self.host
            .consensus_state(client_id, height)
            .ok_or_else(|| ProxyError::ConsensusStateNotFound {
                client_id: client_id.to_string(),
                height: *height,
            })
    }

    fn delay_context(&self, delay_period: u64) -> DelayContext {
        DelayContext {
            host: self.host.host_info(),
            delay_time: delay_period,
            delay_blocks: block_delay(delay_period, self.host.max_expected_time_per_block()),
        }
    }

    fn validate_params(&self, upstream_prefix: &CommitmentPrefix) -> Result<(), ProxyError> {
        invariant_prefix_matches(&self.config.ibc_prefix, upstream_prefix)
    }

    fn verify<F>(
        &self,
        kind: CommitmentKind,
        upstream_client_id: &str,
        verify: F,
    ) -> Result<(), ProxyError>
    where
        F: FnOnce(&AnyClientState, &dyn KvRead) -> Result<(), ClientError>,
    {
        let client = self.local_client(upstream_client_id)?;
        let store = self.host.client_store(upstream_client_id);
        let result = verify(&client, &store);
        ibc_proxy_telemetry::record_verification(kind.as_str(), result.is_ok());
        if let AnyClientState::MultiHop(_) = client {
            ibc_proxy_telemetry::record_multihop_verification(result.is_ok());
        }
        match result {
            Ok(()) => {
                debug!(
                    kind = kind.as_str(),
                    client_id = upstream_client_id,
                    "[proxy-keeper] verification succeeded"
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    kind = kind.as_str(),
                    client_id = upstream_client_id,
                    error = %e,
                    "[proxy-keeper] verification rejected"
                );
                Err(ProxyError::verification(upstream_client_id, e))
            }
        }
    }

    // =========================================================================
    // Client and consensus states
    // =========================================================================

    /// Verify the client state the upstream stores for
    /// `counterparty_client_id`.
    pub fn verify_client_state(
        &self,
        upstream_client_id: &str,
        proof: ProofContext<'_>,
        counterparty_client_id: &str,
        client_state: &AnyClientState,
    ) -> Result<(), ProxyError> {
        self.verify(CommitmentKind::ClientState, upstream_client_id, |client, store| {
            client.verify_client_state(store, proof, counterparty_client_id, client_state)
        })
    }

    /// Verify, then commit, the client state the upstream stores for
    /// `counterparty_client_id`.
    pub fn verify_and_proxy_client_state(
        &self,
        upstream_client_id: &str,
        proof: ProofContext<'_>,
        counterparty_client_id: &str,
        client_state: &AnyClientState,
    ) -> Result<(), ProxyError> {
        self.validate_params(proof.prefix)?;
        self.verify_client_state(upstream_client_id, proof, counterparty_client_id, client_state)?;
        self.proxy_store().set_client_state(
            upstream_client_id,
            proof.prefix,
            counterparty_client_id,
            client_state,
        )
    }

    /// Verify a consensus state the upstream stores for
    /// `counterparty_client_id`.
    pub fn verify_client_consensus_state(
        &self,
        upstream_client_id: &str,
        proof: ProofContext<'_>,
        counterparty_client_id: &str,
        consensus_height: Height,
        consensus_state: &AnyConsensusState,
    ) -> Result<(), ProxyError> {
        self.verify(CommitmentKind::ConsensusState, upstream_client_id, |client, store| {
            client.verify_client_consensus_state(
                store,
                proof,
                counterparty_client_id,
                consensus_height,
                consensus_state,
            )
        })
    }

    /// Verify, then commit, a consensus state the upstream stores for
    /// `counterparty_client_id`.
    pub fn verify_and_proxy_client_consensus_state(
        &self,
        upstream_client_id: &str,
        proof: ProofContext<'_>,
        counterparty_client_id: &str,
        consensus_height: Height,
        consensus_state: &AnyConsensusState,
    ) -> Result<(), ProxyError> {
        self.validate_params(proof.prefix)?;
        self.verify_client_consensus_state(
            upstream_client_id,
            proof,
            counterparty_client_id,
            consensus_height,
            consensus_state,
        )?;
        self.proxy_store().set_consensus_state(
            upstream_client_id,
            proof.prefix,
            counterparty_client_id,
            &consensus_height,
            consensus_state,
        )
    }

    /// Proxy a client state together with one of its consensus states.
    pub fn proxy_client_state(&self, msg: &MsgProxyClientState) -> Result<(), ProxyError> {
        self.verify_and_proxy_client_state(
            &msg.upstream_client_id,
            ProofContext::new(msg.proof_height, &msg.upstream_prefix, &msg.proof_client),
            &msg.counterparty_client_id,
            &msg.client_state,
        )?;
        self.verify_and_proxy_client_consensus_state(
            &msg.upstream_client_id,
            ProofContext::new(msg.proof_height, &msg.upstream_prefix, &msg.proof_consensus),
            &msg.counterparty_client_id,
            msg.consensus_height,
            &msg.consensus_state,
        )
    }

    // =========================================================================
    // Connections and channels
    // =========================================================================

    /// Verify an upstream connection end.
    pub fn verify_connection_state(
        &self,
        upstream_client_id: &str,
        proof: ProofContext<'_>,
        connection_id: &str,
        connection: &ConnectionEnd,
    ) -> Result<(), ProxyError> {
        self.verify(CommitmentKind::Connection, upstream_client_id, |client, store| {
            client.verify_connection_state(store, proof, connection_id, connection)
        })
    }

    /// Verify, then commit, an upstream connection end.
    pub fn verify_and_proxy_connection_state(
        &self,
        upstream_client_id: &str,
        proof: ProofContext<'_>,
        connection_id: &str,
        connection: &ConnectionEnd,
    ) -> Result<(), ProxyError> {
        self.validate_params(proof.prefix)?;
        self.verify_connection_state(upstream_client_id, proof, connection_id, connection)?;
        self.proxy_store()
            .set_connection(upstream_client_id, proof.prefix, connection_id, connection)
    }

    /// Verify an upstream channel end.
    pub fn verify_channel_state(
        &self,
        upstream_client_id: &str,
        proof: ProofContext<'_>,
        port_id: &str,
        channel_id: &str,
        channel: &ChannelEnd,
    ) -> Result<(), ProxyError> {
        self.verify(CommitmentKind::Channel, upstream_client_id, |client, store| {
            client.verify_channel_state(store, proof, port_id, channel_id, channel)
        })
    }

    /// Verify, then commit, an upstream channel end.
    pub fn verify_and_proxy_channel_state(
        &self,
        upstream_client_id: &str,
        proof: ProofContext<'_>,
        port_id: &str,
        channel_id: &str,
        channel: &ChannelEnd,
    ) -> Result<(), ProxyError> {
        self.validate_params(proof.prefix)?;
        self.verify_channel_state(upstream_client_id, proof, port_id, channel_id, channel)?;
        self.proxy_store().set_channel(
            upstream_client_id,
            proof.prefix,
            port_id,
            channel_id,
            channel,
        )
    }

    // =========================================================================
    // Packets
    // =========================================================================

    /// Verify an upstream packet commitment, honouring the connection delay.
    #[allow(clippy::too_many_arguments)]
    pub fn verify_packet_commitment(
        &self,
        upstream_client_id: &str,
        proof: ProofContext<'_>,
        delay_period: u64,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        commitment: &[u8],
    ) -> Result<(), ProxyError> {
        let delay = self.delay_context(delay_period);
        self.verify(CommitmentKind::PacketCommitment, upstream_client_id, |client, store| {
            client.verify_packet_commitment(
                store, proof, &delay, port_id, channel_id, sequence, commitment,
            )
        })
    }

    /// Verify, then commit, an upstream packet commitment.
    #[allow(clippy::too_many_arguments)]
    pub fn verify_and_proxy_packet_commitment(
        &self,
        upstream_client_id: &str,
        proof: ProofContext<'_>,
        delay_period: u64,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        commitment: &[u8],
    ) -> Result<(), ProxyError> {
        self.validate_params(proof.prefix)?;
        self.verify_packet_commitment(
            upstream_client_id,
            proof,
            delay_period,
            port_id,
            channel_id,
            sequence,
            commitment,
        )?;
        self.proxy_store().set_packet_commitment(
            upstream_client_id,
            proof.prefix,
            port_id,
            channel_id,
            sequence,
            commitment,
        );
        Ok(())
    }

    /// Verify an upstream acknowledgement commitment.
    #[allow(clippy::too_many_arguments)]
    pub fn verify_packet_acknowledgement(
        &self,
        upstream_client_id: &str,
        proof: ProofContext<'_>,
        delay_period: u64,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        ack_commitment: &[u8],
    ) -> Result<(), ProxyError> {
        let delay = self.delay_context(delay_period);
        self.verify(
            CommitmentKind::PacketAcknowledgement,
            upstream_client_id,
            |client, store| {
                client.verify_packet_acknowledgement(
                    store,
                    proof,
                    &delay,
                    port_id,
                    channel_id,
                    sequence,
                    ack_commitment,
                )
            },
        )
    }

    /// Verify, then commit, an upstream acknowledgement commitment.
    #[allow(clippy::too_many_arguments)]
    pub fn verify_and_proxy_packet_acknowledgement(
        &self,
        upstream_client_id: &str,
        proof: ProofContext<'_>,
        delay_period: u64,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        ack_commitment: &[u8],
    ) -> Result<(), ProxyError> {
        self.validate_params(proof.prefix)?;
        self.verify_packet_acknowledgement(
            upstream_client_id,
            proof,
            delay_period,
            port_id,
            channel_id,
            sequence,
            ack_commitment,
        )?;
        self.proxy_store().set_packet_acknowledgement(
            upstream_client_id,
            proof.prefix,
            port_id,
            channel_id,
            sequence,
            ack_commitment,
        );
        Ok(())
    }

    /// Verify that the upstream holds no receipt for a packet.
    pub fn verify_packet_receipt_absence(
        &self,
        upstream_client_id: &str,
        proof: ProofContext<'_>,
        delay_period: u64,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
    ) -> Result<(), ProxyError> {
        let delay = self.delay_context(delay_period);
        self.verify(
            CommitmentKind::PacketReceiptAbsence,
            upstream_client_id,
            |client, store| {
                client.verify_packet_receipt_absence(
                    store, proof, &delay, port_id, channel_id, sequence,
                )
            },
        )
    }

    /// Verify, then record, that the upstream holds no receipt for a packet.
    pub fn verify_and_proxy_packet_receipt_absence(
        &self,
        upstream_client_id: &str,
        proof: ProofContext<'_>,
        delay_period: u64,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
    ) -> Result<(), ProxyError> {
        self.validate_params(proof.prefix)?;
        self.verify_packet_receipt_absence(
            upstream_client_id,
            proof,
            delay_period,
            port_id,
            channel_id,
            sequence,
        )?;
        self.proxy_store().set_packet_receipt_absence(
            upstream_client_id,
            proof.prefix,
            port_id,
            channel_id,
            sequence,
        );
        Ok(())
    }

    /// Verify the upstream's next receive sequence.
    pub fn verify_next_sequence_recv(
        &self,
        upstream_client_id: &str,
        proof: ProofContext<'_>,
        delay_period: u64,
        port_id: &str,
        channel_id: &str,
        next_sequence_recv: u64,
    ) -> Result<(), ProxyError> {
        let delay = self.delay_context(delay_period);
        self.verify(CommitmentKind::NextSequenceRecv, upstream_client_id, |client, store| {
            client.verify_next_sequence_recv(
                store,
                proof,
                &delay,
                port_id,
                channel_id,
                next_sequence_recv,
            )
        })
    }

    /// Verify, then commit, the upstream's next receive sequence.
    pub fn verify_and_proxy_next_sequence_recv(
        &self,
        upstream_client_id: &str,
        proof: ProofContext<'_>,
        delay_period: u64,
        port_id: &str,
        channel_id: &str,
        next_sequence_recv: u64,
    ) -> Result<(), ProxyError> {
        self.validate_params(proof.prefix)?;
        self.verify_next_sequence_recv(
            upstream_client_id,
            proof,
            delay_period,
            port_id,
            channel_id,
            next_sequence_recv,
        )?;
        self.proxy_store().set_next_sequence_recv(
            upstream_client_id,
            proof.prefix,
            port_id,
            channel_id,
            next_sequence_recv,
        );
        Ok(())
    }

    // =========================================================================
    // Proxy registration and upstream block times
    // =========================================================================

    /// Allow `client_id` to be served to downstream chains.
    pub fn enable_proxy(&self, client_id: &str) -> Result<(), ProxyError> {
        self.local_client(client_id)?;
        let store = self.proxy_store();
        if store.is_enabled(client_id) {
            return Err(ProxyError::AlreadyExists(format!(
                "proxy already enabled for client {client_id}"
            )));
        }
        store.set_enabled(client_id);
        info!(client_id, "[proxy-keeper] proxy enabled");
        Ok(())
    }

    /// Whether `client_id` is served to downstream chains.
    pub fn is_proxy_enabled(&self, client_id: &str) -> bool {
        self.proxy_store().is_enabled(client_id)
    }

    /// Commit the block time of the upstream at `height`, taken from the
    /// local consensus state of its client.
    pub fn proxy_upstream_block_time(
        &self,
        upstream_client_id: &str,
        height: &Height,
    ) -> Result<u64, ProxyError> {
        let timestamp = self.local_consensus(upstream_client_id, height)?.timestamp();
        self.proxy_store()
            .set_block_time(upstream_client_id, height, timestamp);
        Ok(timestamp)
    }

    /// Message form of [`Self::proxy_upstream_block_time`].
    pub fn proxy_upstream_block_time_msg(
        &self,
        msg: &MsgProxyUpstreamBlockTime,
    ) -> Result<u64, ProxyError> {
        self.proxy_upstream_block_time(&msg.upstream_client_id, &msg.height)
    }

    /// Check that a downstream's proxy client really tracks this chain:
    /// both prefixes match this keeper's, and the host accepts the
    /// wrapped client as a client of itself.
    pub fn validate_self_client(&self, client_state: &ProxyClientState) -> Result<(), ProxyError> {
        invariant_prefix_matches(&self.config.ibc_prefix, client_state.ibc_prefix()?)?;
        invariant_prefix_matches(&self.config.proxy_prefix, client_state.proxy_prefix()?)?;
        self.host.validate_self_client(client_state.wrapped()?)
    }
}
