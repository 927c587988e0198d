//! # Proxy Messages
//!
//! Relayer-submitted messages handled by the proxy keeper. In every message
//! the upstream chain is the one whose state is proven, the downstream chain
//! is the one that will later read the proxied commitments.

use ibc_proxy_client::{AnyClientState, AnyConsensusState};
use ibc_proxy_types::{
    validate_identifier, CommitmentPrefix, ConnectionEnd, Height, Order, Packet,
};
use serde::{Deserialize, Serialize};

use crate::domain::errors::ProxyError;

fn check_id(field: &str, id: &str) -> Result<(), ProxyError> {
    validate_identifier(id).map_err(|e| ProxyError::InvalidMessage(format!("{field}: {e}")))
}

fn check_proof(field: &str, proof: &[u8]) -> Result<(), ProxyError> {
    if proof.is_empty() {
        return Err(ProxyError::InvalidMessage(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn check_height(field: &str, height: &Height) -> Result<(), ProxyError> {
    if height.is_zero() {
        return Err(ProxyError::InvalidMessage(format!("{field} cannot be zero")));
    }
    Ok(())
}

fn check_prefix(prefix: &CommitmentPrefix) -> Result<(), ProxyError> {
    if prefix.is_empty() {
        return Err(ProxyError::InvalidMessage("upstream prefix cannot be empty".into()));
    }
    Ok(())
}

fn check_packet(packet: &Packet) -> Result<(), ProxyError> {
    check_id("source port", &packet.source_port)?;
    check_id("source channel", &packet.source_channel)?;
    check_id("destination port", &packet.destination_port)?;
    check_id("destination channel", &packet.destination_channel)?;
    if packet.sequence == 0 {
        return Err(ProxyError::InvalidMessage("packet sequence cannot be zero".into()));
    }
    Ok(())
}

/// Proxy an upstream client state and its consensus state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgProxyClientState {
    /// Local client of the upstream.
    pub upstream_client_id: String,
    /// IBC prefix of the upstream.
    pub upstream_prefix: CommitmentPrefix,
    /// Client on the upstream the states belong to.
    pub counterparty_client_id: String,
    /// Claimed client state.
    pub client_state: AnyClientState,
    /// Claimed consensus state at `consensus_height`.
    pub consensus_state: AnyConsensusState,
    /// Proof of the client state.
    pub proof_client: Vec<u8>,
    /// Proof of the consensus state.
    pub proof_consensus: Vec<u8>,
    /// Upstream height the proofs were generated at.
    pub proof_height: Height,
    /// Height of the claimed consensus state.
    pub consensus_height: Height,
}

impl MsgProxyClientState {
    /// Stateless checks.
    pub fn validate_basic(&self) -> Result<(), ProxyError> {
        check_id("upstream client id", &self.upstream_client_id)?;
        check_id("counterparty client id", &self.counterparty_client_id)?;
        check_prefix(&self.upstream_prefix)?;
        check_proof("client proof", &self.proof_client)?;
        check_proof("consensus proof", &self.proof_consensus)?;
        check_height("proof height", &self.proof_height)?;
        check_height("consensus height", &self.consensus_height)
    }
}

/// Connection open step carrying client proofs (`OpenTry` and `OpenAck`).
///
/// The upstream stores `connection` under `connection_id`; its client of
/// the downstream is `connection.client_id` and the downstream's proxy
/// client of this chain is `connection.counterparty.client_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgProxyConnectionOpen {
    /// Connection id on the upstream.
    pub connection_id: String,
    /// IBC prefix of the upstream.
    pub upstream_prefix: CommitmentPrefix,
    /// Connection end as the upstream stores it.
    pub connection: ConnectionEnd,
    /// The upstream's client state of the downstream.
    pub downstream_client_state: AnyClientState,
    /// The upstream's consensus state of the downstream at `consensus_height`.
    pub downstream_consensus_state: AnyConsensusState,
    /// The downstream's proxy client of this chain.
    pub proxy_client_state: AnyClientState,
    /// The downstream's proxy consensus state at `proxy_consensus_height`.
    pub proxy_consensus_state: AnyConsensusState,
    /// Proof of the connection end.
    pub proof_connection: Vec<u8>,
    /// Proof of the downstream client state.
    pub proof_client: Vec<u8>,
    /// Proof of the downstream consensus state.
    pub proof_consensus: Vec<u8>,
    /// Upstream height of the three proofs above.
    pub proof_height: Height,
    /// Height of `downstream_consensus_state`.
    pub consensus_height: Height,
    /// Proof that the downstream stores `proxy_client_state`.
    pub proof_proxy_client: Vec<u8>,
    /// Proof that the downstream stores `proxy_consensus_state`.
    pub proof_proxy_consensus: Vec<u8>,
    /// Downstream height of the two proxy proofs.
    pub proof_proxy_height: Height,
    /// Height of `proxy_consensus_state`.
    pub proxy_consensus_height: Height,
}

impl MsgProxyConnectionOpen {
    /// Stateless checks.
    pub fn validate_basic(&self) -> Result<(), ProxyError> {
        check_id("connection id", &self.connection_id)?;
        check_id("connection client id", &self.connection.client_id)?;
        check_id(
            "counterparty client id",
            &self.connection.counterparty.client_id,
        )?;
        check_prefix(&self.upstream_prefix)?;
        for (field, proof) in [
            ("connection proof", &self.proof_connection),
            ("client proof", &self.proof_client),
            ("consensus proof", &self.proof_consensus),
            ("proxy client proof", &self.proof_proxy_client),
            ("proxy consensus proof", &self.proof_proxy_consensus),
        ] {
            check_proof(field, proof)?;
        }
        for (field, height) in [
            ("proof height", &self.proof_height),
            ("consensus height", &self.consensus_height),
            ("proxy proof height", &self.proof_proxy_height),
            ("proxy consensus height", &self.proxy_consensus_height),
        ] {
            check_height(field, height)?;
        }
        Ok(())
    }
}

/// Connection open step on an already proxied connection (`OpenConfirm`
/// and `OpenFinalize`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgProxyConnectionOpenConfirm {
    /// Connection id on the upstream.
    pub connection_id: String,
    /// Local client of the upstream.
    pub upstream_client_id: String,
    /// IBC prefix of the upstream.
    pub upstream_prefix: CommitmentPrefix,
    /// Connection id on the downstream. Only used by `OpenConfirm`.
    pub counterparty_connection_id: String,
    /// Proof of the open connection end.
    pub proof: Vec<u8>,
    /// Upstream height the proof was generated at.
    pub proof_height: Height,
}

impl MsgProxyConnectionOpenConfirm {
    /// Stateless checks.
    pub fn validate_basic(&self) -> Result<(), ProxyError> {
        check_id("connection id", &self.connection_id)?;
        check_id("upstream client id", &self.upstream_client_id)?;
        check_prefix(&self.upstream_prefix)?;
        check_proof("proof", &self.proof)?;
        check_height("proof height", &self.proof_height)
    }
}

/// Channel open step carrying the full expected channel (`OpenTry` and
/// `OpenAck`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgProxyChannelOpen {
    /// Local client of the upstream.
    pub upstream_client_id: String,
    /// IBC prefix of the upstream.
    pub upstream_prefix: CommitmentPrefix,
    /// Port on the upstream.
    pub port_id: String,
    /// Channel on the upstream.
    pub channel_id: String,
    /// Channel ordering.
    pub order: Order,
    /// Connection hops of the upstream channel end.
    pub connection_hops: Vec<String>,
    /// Port on the downstream.
    pub downstream_port_id: String,
    /// Channel on the downstream; empty for `OpenTry`.
    pub downstream_channel_id: String,
    /// Version of the upstream channel end.
    pub version: String,
    /// Proof of the upstream channel end.
    pub proof: Vec<u8>,
    /// Upstream height the proof was generated at.
    pub proof_height: Height,
}

impl MsgProxyChannelOpen {
    /// Stateless checks.
    pub fn validate_basic(&self) -> Result<(), ProxyError> {
        check_id("upstream client id", &self.upstream_client_id)?;
        check_id("port id", &self.port_id)?;
        check_id("channel id", &self.channel_id)?;
        check_id("downstream port id", &self.downstream_port_id)?;
        check_prefix(&self.upstream_prefix)?;
        if self.connection_hops.len() != 1 {
            return Err(ProxyError::InvalidMessage(format!(
                "expected exactly one connection hop, got {}",
                self.connection_hops.len()
            )));
        }
        check_id("connection hop", &self.connection_hops[0])?;
        check_proof("proof", &self.proof)?;
        check_height("proof height", &self.proof_height)
    }
}

/// Channel open step on an already proxied channel (`OpenConfirm` and
/// `OpenFinalize`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgProxyChannelOpenConfirm {
    /// Local client of the upstream.
    pub upstream_client_id: String,
    /// IBC prefix of the upstream.
    pub upstream_prefix: CommitmentPrefix,
    /// Port on the upstream.
    pub port_id: String,
    /// Channel on the upstream.
    pub channel_id: String,
    /// Channel on the downstream. Only used by `OpenConfirm`.
    pub downstream_channel_id: String,
    /// Proof of the open channel end.
    pub proof: Vec<u8>,
    /// Upstream height the proof was generated at.
    pub proof_height: Height,
}

impl MsgProxyChannelOpenConfirm {
    /// Stateless checks.
    pub fn validate_basic(&self) -> Result<(), ProxyError> {
        check_id("upstream client id", &self.upstream_client_id)?;
        check_id("port id", &self.port_id)?;
        check_id("channel id", &self.channel_id)?;
        check_prefix(&self.upstream_prefix)?;
        check_proof("proof", &self.proof)?;
        check_height("proof height", &self.proof_height)
    }
}

/// Proxy a packet commitment sent by the upstream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgProxyRecvPacket {
    /// Local client of the upstream.
    pub upstream_client_id: String,
    /// IBC prefix of the upstream.
    pub upstream_prefix: CommitmentPrefix,
    /// Packet sent by the upstream.
    pub packet: Packet,
    /// Proof of the packet commitment.
    pub proof: Vec<u8>,
    /// Upstream height the proof was generated at.
    pub proof_height: Height,
}

impl MsgProxyRecvPacket {
    /// Stateless checks.
    pub fn validate_basic(&self) -> Result<(), ProxyError> {
        check_id("upstream client id", &self.upstream_client_id)?;
        check_prefix(&self.upstream_prefix)?;
        check_packet(&self.packet)?;
        check_proof("proof", &self.proof)?;
        check_height("proof height", &self.proof_height)
    }
}

/// Proxy an acknowledgement written by the upstream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgProxyAcknowledgePacket {
    /// Local client of the upstream.
    pub upstream_client_id: String,
    /// IBC prefix of the upstream.
    pub upstream_prefix: CommitmentPrefix,
    /// Packet received by the upstream.
    pub packet: Packet,
    /// Acknowledgement bytes written by the upstream.
    pub acknowledgement: Vec<u8>,
    /// Proof of the acknowledgement commitment.
    pub proof: Vec<u8>,
    /// Upstream height the proof was generated at.
    pub proof_height: Height,
}

impl MsgProxyAcknowledgePacket {
    /// Stateless checks.
    pub fn validate_basic(&self) -> Result<(), ProxyError> {
        check_id("upstream client id", &self.upstream_client_id)?;
        check_prefix(&self.upstream_prefix)?;
        check_packet(&self.packet)?;
        if self.acknowledgement.is_empty() {
            return Err(ProxyError::InvalidMessage("acknowledgement cannot be empty".into()));
        }
        check_proof("proof", &self.proof)?;
        check_height("proof height", &self.proof_height)
    }
}

/// Proxy the proof that the upstream never received a packet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgProxyTimeoutPacket {
    /// Local client of the upstream.
    pub upstream_client_id: String,
    /// IBC prefix of the upstream.
    pub upstream_prefix: CommitmentPrefix,
    /// Packet the upstream failed to receive.
    pub packet: Packet,
    /// Next receive sequence of an ordered channel; ignored otherwise.
    pub next_sequence_recv: u64,
    /// Proof of absence (unordered) or of the next receive sequence (ordered).
    pub proof: Vec<u8>,
    /// Upstream height the proof was generated at.
    pub proof_height: Height,
}

impl MsgProxyTimeoutPacket {
    /// Stateless checks.
    pub fn validate_basic(&self) -> Result<(), ProxyError> {
        check_id("upstream client id", &self.upstream_client_id)?;
        check_prefix(&self.upstream_prefix)?;
        check_packet(&self.packet)?;
        check_proof("proof", &self.proof)?;
        check_height("proof height", &self.proof_height)
    }
}

/// Commit an upstream block time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgProxyUpstreamBlockTime {
    /// Local client of the upstream.
    pub upstream_client_id: String,
    /// Upstream height whose time is committed.
    pub height: Height,
}

impl MsgProxyUpstreamBlockTime {
    /// Stateless checks.
    pub fn validate_basic(&self) -> Result<(), ProxyError> {
        check_id("upstream client id", &self.upstream_client_id)?;
        check_height("height", &self.height)
    }
}

/// Every message the proxy router dispatches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProxyMsg {
    /// Proxy a client state and consensus state.
    ClientState(MsgProxyClientState),
    /// Proxy an `INIT` connection.
    ConnectionOpenTry(MsgProxyConnectionOpen),
    /// Proxy a `TRYOPEN` connection.
    ConnectionOpenAck(MsgProxyConnectionOpen),
    /// Open a proxied `INIT` connection.
    ConnectionOpenConfirm(MsgProxyConnectionOpenConfirm),
    /// Open a proxied `TRYOPEN` connection.
    ConnectionOpenFinalize(MsgProxyConnectionOpenConfirm),
    /// Proxy an `INIT` channel.
    ChannelOpenTry(MsgProxyChannelOpen),
    /// Proxy a `TRYOPEN` channel.
    ChannelOpenAck(MsgProxyChannelOpen),
    /// Open a proxied `INIT` channel.
    ChannelOpenConfirm(MsgProxyChannelOpenConfirm),
    /// Open a proxied `TRYOPEN` channel.
    ChannelOpenFinalize(MsgProxyChannelOpenConfirm),
    /// Proxy a packet commitment.
    RecvPacket(MsgProxyRecvPacket),
    /// Proxy an acknowledgement commitment.
    AcknowledgePacket(MsgProxyAcknowledgePacket),
    /// Proxy a receive timeout.
    TimeoutPacket(MsgProxyTimeoutPacket),
    /// Commit an upstream block time.
    UpstreamBlockTime(MsgProxyUpstreamBlockTime),
}

impl ProxyMsg {
    /// Stateless checks of the wrapped message.
    pub fn validate_basic(&self) -> Result<(), ProxyError> {
        match self {
            ProxyMsg::ClientState(msg) => msg.validate_basic(),
            ProxyMsg::ConnectionOpenTry(msg) | ProxyMsg::ConnectionOpenAck(msg) => {
                msg.validate_basic()
            }
            ProxyMsg::ConnectionOpenConfirm(msg) => {
                msg.validate_basic()?;
                check_id("counterparty connection id", &msg.counterparty_connection_id)
            }
            ProxyMsg::ConnectionOpenFinalize(msg) => msg.validate_basic(),
            ProxyMsg::ChannelOpenTry(msg) => msg.validate_basic(),
            ProxyMsg::ChannelOpenAck(msg) => {
                msg.validate_basic()?;
                check_id("downstream channel id", &msg.downstream_channel_id)
            }
            ProxyMsg::ChannelOpenConfirm(msg) => {
                msg.validate_basic()?;
                check_id("downstream channel id", &msg.downstream_channel_id)
            }
            ProxyMsg::ChannelOpenFinalize(msg) => msg.validate_basic(),
            ProxyMsg::RecvPacket(msg) => msg.validate_basic(),
            ProxyMsg::AcknowledgePacket(msg) => msg.validate_basic(),
            ProxyMsg::TimeoutPacket(msg) => msg.validate_basic(),
            ProxyMsg::UpstreamBlockTime(msg) => msg.validate_basic(),
        }
    }

    /// Message name used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            ProxyMsg::ClientState(_) => "client_state",
            ProxyMsg::ConnectionOpenTry(_) => "conn_open_try",
            ProxyMsg::ConnectionOpenAck(_) => "conn_open_ack",
            ProxyMsg::ConnectionOpenConfirm(_) => "conn_open_confirm",
            ProxyMsg::ConnectionOpenFinalize(_) => "conn_open_finalize",
            ProxyMsg::ChannelOpenTry(_) => "chan_open_try",
            ProxyMsg::ChannelOpenAck(_) => "chan_open_ack",
            ProxyMsg::ChannelOpenConfirm(_) => "chan_open_confirm",
            ProxyMsg::ChannelOpenFinalize(_) => "chan_open_finalize",
            ProxyMsg::RecvPacket(_) => "recv_packet",
            ProxyMsg::AcknowledgePacket(_) => "acknowledge_packet",
            ProxyMsg::TimeoutPacket(_) => "timeout_packet",
            ProxyMsg::UpstreamBlockTime(_) => "upstream_block_time",
        }
    }
}
