//! # Value Objects
//!
//! Bootstrap packet payloads, the bootstrap request lifecycle and the kinds
//! of facts the proxy commits on behalf of an upstream chain.

use ibc_proxy_client::{AnyClientState, AnyConsensusState};
use ibc_proxy_types::{decode, encode, Any, CommitmentPrefix, Height, TypesError};
use serde::{Deserialize, Serialize};

use crate::domain::errors::ProxyError;

/// Port bound by the bootstrap module.
pub const PROXY_PORT_ID: &str = "proxy";

/// Channel version of the bootstrap module.
pub const PROXY_VERSION: &str = "proxy-1";

/// Lifecycle of a bootstrap request, tracked per proxy client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BootstrapState {
    /// Request packet sent, placeholder client created.
    Requested,
    /// Acknowledged with upstream state; proxy client usable.
    Fulfilled,
    /// Rejected, errored or timed out; placeholder stays unusable.
    Failed,
}

impl BootstrapState {
    /// Whether the lifecycle allows moving to `next`.
    pub fn can_transition_to(&self, next: BootstrapState) -> bool {
        matches!(
            (self, next),
            (BootstrapState::Requested, BootstrapState::Fulfilled)
                | (BootstrapState::Requested, BootstrapState::Failed)
        )
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BootstrapState::Requested)
    }

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            BootstrapState::Requested => "requested",
            BootstrapState::Fulfilled => "fulfilled",
            BootstrapState::Failed => "failed",
        }
    }
}

/// Bootstrap request packet payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRequestPacketData {
    /// Client on the proxy chain tracking the upstream.
    pub upstream_client_id: String,
    /// Placeholder client on the downstream chain.
    pub proxy_client_id: String,
}

impl ProxyRequestPacketData {
    /// Packet data bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TypesError> {
        encode(self)
    }

    /// Parse packet data bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        decode(bytes)
    }
}

/// Outcome reported in a bootstrap acknowledgement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    /// The proxy serves the upstream.
    Ok,
    /// The proxy refused the request.
    Error,
}

/// Upstream client snapshot carried by a bootstrap acknowledgement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamState {
    /// Latest height of the proxy's upstream client.
    pub height: Height,
    /// The proxy's client state of the upstream.
    pub client_state: Any,
    /// The proxy's consensus state of the upstream at `height`.
    pub consensus_state: Any,
}

impl UpstreamState {
    /// Snapshot of an upstream client.
    pub fn new(
        height: Height,
        client_state: &AnyClientState,
        consensus_state: &AnyConsensusState,
    ) -> Result<Self, ProxyError> {
        Ok(Self {
            height,
            client_state: client_state.to_any()?,
            consensus_state: consensus_state.to_any()?,
        })
    }

    /// Decoded consensus state.
    pub fn consensus(&self) -> Result<AnyConsensusState, ProxyError> {
        Ok(AnyConsensusState::from_any(&self.consensus_state)?)
    }
}

/// Bootstrap acknowledgement payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRequestAcknowledgement {
    /// Whether the request was served.
    pub status: AckStatus,
    /// Prefix of the proxy's commitment namespace.
    pub proxy_prefix: CommitmentPrefix,
    /// Prefix of the proxy's IBC store.
    pub ibc_prefix: CommitmentPrefix,
    /// Upstream snapshot.
    pub upstream_state: UpstreamState,
}

impl ProxyRequestAcknowledgement {
    /// Acknowledgement payload bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TypesError> {
        encode(self)
    }

    /// Parse acknowledgement payload bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        decode(bytes)
    }
}

/// Kind of fact the proxy commits, used in logs and metric labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommitmentKind {
    /// Client state of a counterparty client.
    ClientState,
    /// Consensus state of a counterparty client.
    ConsensusState,
    /// Connection end.
    Connection,
    /// Channel end.
    Channel,
    /// Packet commitment.
    PacketCommitment,
    /// Acknowledgement commitment.
    PacketAcknowledgement,
    /// Receipt absence.
    PacketReceiptAbsence,
    /// Next receive sequence.
    NextSequenceRecv,
    /// Upstream block time.
    BlockTime,
}

impl CommitmentKind {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitmentKind::ClientState => "client_state",
            CommitmentKind::ConsensusState => "consensus_state",
            CommitmentKind::Connection => "connection",
            CommitmentKind::Channel => "channel",
            CommitmentKind::PacketCommitment => "packet_commitment",
            CommitmentKind::PacketAcknowledgement => "packet_acknowledgement",
            CommitmentKind::PacketReceiptAbsence => "packet_receipt_absence",
            CommitmentKind::NextSequenceRecv => "next_sequence_recv",
            CommitmentKind::BlockTime => "block_time",
        }
    }
}
