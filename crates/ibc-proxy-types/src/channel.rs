//! # Channel Records
//!
//! ICS-04 channel ends, packets, acknowledgements and the commitment hashes
//! hosts store for them.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::TypesError;
use crate::height::Height;

/// Channel handshake state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelState {
    /// Not yet created.
    Uninitialized,
    /// `ChanOpenInit` executed.
    Init,
    /// `ChanOpenTry` executed.
    TryOpen,
    /// Handshake complete.
    Open,
    /// Closed.
    Closed,
}

/// Packet delivery ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Order {
    /// Packets may be delivered in any order.
    Unordered,
    /// Packets are delivered in send order.
    Ordered,
}

impl Order {
    /// Connection-version feature naming this ordering.
    pub fn as_feature(&self) -> &'static str {
        match self {
            Order::Unordered => "ORDER_UNORDERED",
            Order::Ordered => "ORDER_ORDERED",
        }
    }
}

/// The other end of a channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelCounterparty {
    /// Counterparty port.
    pub port_id: String,
    /// Counterparty channel; empty until known.
    pub channel_id: String,
}

impl ChannelCounterparty {
    /// Create a counterparty.
    pub fn new(port_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            port_id: port_id.into(),
            channel_id: channel_id.into(),
        }
    }
}

/// A channel end.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelEnd {
    /// Handshake state.
    pub state: ChannelState,
    /// Delivery ordering.
    pub ordering: Order,
    /// Counterparty end.
    pub counterparty: ChannelCounterparty,
    /// Connection hops; the first hop is the local connection.
    pub connection_hops: Vec<String>,
    /// Application version.
    pub version: String,
}

impl ChannelEnd {
    /// First connection hop, if any.
    pub fn first_hop(&self) -> Option<&str> {
        self.connection_hops.first().map(String::as_str)
    }
}

/// An IBC packet.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Packet {
    /// Sequence number on the sending end.
    pub sequence: u64,
    /// Sending port.
    pub source_port: String,
    /// Sending channel.
    pub source_channel: String,
    /// Receiving port.
    pub destination_port: String,
    /// Receiving channel.
    pub destination_channel: String,
    /// Opaque application payload.
    pub data: Vec<u8>,
    /// Timeout height on the receiving chain; zero disables.
    pub timeout_height: Height,
    /// Timeout timestamp (ns) on the receiving chain; zero disables.
    pub timeout_timestamp: u64,
}

impl Packet {
    /// Whether the packet can no longer be received at `(height, timestamp)`
    /// of the receiving chain.
    pub fn timed_out_at(&self, height: Height, timestamp: u64) -> bool {
        let by_height = !self.timeout_height.is_zero() && height >= self.timeout_height;
        let by_time = self.timeout_timestamp != 0 && timestamp >= self.timeout_timestamp;
        by_height || by_time
    }
}

/// Packet commitment stored by the sender:
/// `SHA256(timeout_ts || timeout_revision || timeout_height || SHA256(data))`.
pub fn commit_packet(packet: &Packet) -> Vec<u8> {
    let mut buf = Vec::with_capacity(24 + 32);
    buf.extend_from_slice(&packet.timeout_timestamp.to_be_bytes());
    buf.extend_from_slice(&packet.timeout_height.revision_number.to_be_bytes());
    buf.extend_from_slice(&packet.timeout_height.revision_height.to_be_bytes());
    buf.extend_from_slice(&Sha256::digest(&packet.data));
    Sha256::digest(&buf).to_vec()
}

/// Acknowledgement commitment stored by the receiver.
pub fn commit_acknowledgement(ack: &[u8]) -> Vec<u8> {
    Sha256::digest(ack).to_vec()
}

/// Channel-level acknowledgement envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Acknowledgement {
    /// Successful processing with an application result.
    Result(Vec<u8>),
    /// Protocol-level failure.
    Error(String),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum AcknowledgementJson {
    Result(String),
    Error(String),
}

impl Acknowledgement {
    /// Whether the acknowledgement signals success.
    pub fn is_success(&self) -> bool {
        matches!(self, Acknowledgement::Result(_))
    }

    /// JSON wire form: `{"result":"<base64>"}` or `{"error":"..."}`.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, TypesError> {
        let json = match self {
            Acknowledgement::Result(bz) => AcknowledgementJson::Result(STANDARD.encode(bz)),
            Acknowledgement::Error(msg) => AcknowledgementJson::Error(msg.clone()),
        };
        serde_json::to_vec(&json).map_err(|e| TypesError::Encode(e.to_string()))
    }

    /// Parse the JSON wire form.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        let json: AcknowledgementJson = serde_json::from_slice(bytes)
            .map_err(|e| TypesError::InvalidAcknowledgement(e.to_string()))?;
        match json {
            AcknowledgementJson::Result(b64) => STANDARD
                .decode(b64)
                .map(Acknowledgement::Result)
                .map_err(|e| TypesError::InvalidAcknowledgement(e.to_string())),
            AcknowledgementJson::Error(msg) => Ok(Acknowledgement::Error(msg)),
        }
    }
}
