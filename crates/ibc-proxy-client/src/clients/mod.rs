//! # Client Variants
//!
//! Closed unions of the client, consensus and header variants, their `Any`
//! envelopes, and dispatch of the light-client capability to the concrete
//! variant.

pub mod merkle;
pub mod multihop;
pub mod proxy;

use ibc_proxy_types::{Any, ChannelEnd, ConnectionEnd, Height, KvRead, KvStore, TypesError};
use serde::{Deserialize, Serialize};

pub use merkle::{
    MerkleBlockTimeVerifier, MerkleClientState, MerkleConsensusState, MerkleHeader,
    MerkleProxyClientBuilder,
};
pub use multihop::MultiHopClientState;
pub use proxy::{ProxyClientState, ProxyConsensusState, ProxyHeader, UpstreamBlockProof};

use crate::domain::{
    ClientError, DelayContext, GenesisMetadata, HostInfo, ProofContext, Status,
    MERKLE_CLIENT_TYPE, MULTIHOP_CLIENT_TYPE, PROXY_CLIENT_TYPE,
};
use crate::ports::{LightClient, UpdateContext};

/// Type URL of a merkle client state.
pub const MERKLE_CLIENT_STATE_TYPE_URL: &str = "/ibc.lightclients.merkle.v1.ClientState";
/// Type URL of a merkle consensus state.
pub const MERKLE_CONSENSUS_STATE_TYPE_URL: &str = "/ibc.lightclients.merkle.v1.ConsensusState";
/// Type URL of a merkle header.
pub const MERKLE_HEADER_TYPE_URL: &str = "/ibc.lightclients.merkle.v1.Header";
/// Type URL of a proxy client state.
pub const PROXY_CLIENT_STATE_TYPE_URL: &str = "/ibc.lightclients.proxy.v1.ClientState";
/// Type URL of a proxy consensus state.
pub const PROXY_CONSENSUS_STATE_TYPE_URL: &str = "/ibc.lightclients.proxy.v1.ConsensusState";
/// Type URL of a proxy header.
pub const PROXY_HEADER_TYPE_URL: &str = "/ibc.lightclients.proxy.v1.Header";
/// Type URL of a multi-hop client state.
pub const MULTIHOP_CLIENT_STATE_TYPE_URL: &str = "/ibc.lightclients.multihop.v1.ClientState";

/// Any client state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnyClientState {
    /// Merkle reference client.
    Merkle(MerkleClientState),
    /// Proxy client.
    Proxy(ProxyClientState),
    /// Multi-hop client.
    MultiHop(MultiHopClientState),
}

/// Any consensus state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnyConsensusState {
    /// Merkle consensus state.
    Merkle(MerkleConsensusState),
    /// Proxy consensus state wrapping the upstream client's.
    Proxy(ProxyConsensusState),
}

/// Any header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnyHeader {
    /// Merkle header.
    Merkle(MerkleHeader),
    /// Proxy header wrapping the upstream client's.
    Proxy(ProxyHeader),
}

impl AnyClientState {
    fn inner(&self) -> &dyn LightClient {
        match self {
            AnyClientState::Merkle(cs) => cs,
            AnyClientState::Proxy(cs) => cs,
            AnyClientState::MultiHop(cs) => cs,
        }
    }

    /// Pack into an `Any` envelope.
    pub fn to_any(&self) -> Result<Any, ClientError> {
        let any = match self {
            AnyClientState::Merkle(cs) => Any::pack(MERKLE_CLIENT_STATE_TYPE_URL, cs)?,
            AnyClientState::Proxy(cs) => Any::pack(PROXY_CLIENT_STATE_TYPE_URL, cs)?,
            AnyClientState::MultiHop(cs) => Any::pack(MULTIHOP_CLIENT_STATE_TYPE_URL, cs)?,
        };
        Ok(any)
    }

    /// Unpack from an `Any` envelope. Unknown type URLs are rejected.
    pub fn from_any(any: &Any) -> Result<Self, ClientError> {
        let cs = match any.type_url.as_str() {
            MERKLE_CLIENT_STATE_TYPE_URL => AnyClientState::Merkle(any.unpack(&any.type_url)?),
            PROXY_CLIENT_STATE_TYPE_URL => AnyClientState::Proxy(any.unpack(&any.type_url)?),
            MULTIHOP_CLIENT_STATE_TYPE_URL => AnyClientState::MultiHop(any.unpack(&any.type_url)?),
            other => return Err(TypesError::UnknownType(other.to_string()).into()),
        };
        Ok(cs)
    }

    /// Bytes committed to a store.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ClientError> {
        Ok(self.to_any()?.to_bytes()?)
    }

    /// Parse committed bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ClientError> {
        Self::from_any(&Any::from_bytes(bytes)?)
    }

    /// The proxy variant, if this is one.
    pub fn as_proxy(&self) -> Option<&ProxyClientState> {
        match self {
            AnyClientState::Proxy(cs) => Some(cs),
            _ => None,
        }
    }
}

impl AnyConsensusState {
    /// Client type the consensus state belongs to.
    pub fn client_type(&self) -> &'static str {
        match self {
            AnyConsensusState::Merkle(_) => MERKLE_CLIENT_TYPE,
            AnyConsensusState::Proxy(_) => PROXY_CLIENT_TYPE,
        }
    }

    /// Block time in nanoseconds.
    pub fn timestamp(&self) -> u64 {
        match self {
            AnyConsensusState::Merkle(cs) => cs.timestamp,
            AnyConsensusState::Proxy(cs) => cs.inner.timestamp(),
        }
    }

    /// Pack into an `Any` envelope.
    pub fn to_any(&self) -> Result<Any, ClientError> {
        let any = match self {
            AnyConsensusState::Merkle(cs) => Any::pack(MERKLE_CONSENSUS_STATE_TYPE_URL, cs)?,
            AnyConsensusState::Proxy(cs) => Any::pack(PROXY_CONSENSUS_STATE_TYPE_URL, cs)?,
        };
        Ok(any)
    }

    /// Unpack from an `Any` envelope. Unknown type URLs are rejected.
    pub fn from_any(any: &Any) -> Result<Self, ClientError> {
        let cs = match any.type_url.as_str() {
            MERKLE_CONSENSUS_STATE_TYPE_URL => AnyConsensusState::Merkle(any.unpack(&any.type_url)?),
            PROXY_CONSENSUS_STATE_TYPE_URL => AnyConsensusState::Proxy(any.unpack(&any.type_url)?),
            other => return Err(TypesError::UnknownType(other.to_string()).into()),
        };
        Ok(cs)
    }

    /// Bytes committed to a store.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ClientError> {
        Ok(self.to_any()?.to_bytes()?)
    }

    /// Parse committed bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ClientError> {
        Self::from_any(&Any::from_bytes(bytes)?)
    }

    /// The proxy variant, if this is one.
    pub fn as_proxy(&self) -> Option<&ProxyConsensusState> {
        match self {
            AnyConsensusState::Proxy(cs) => Some(cs),
            _ => None,
        }
    }
}

impl AnyHeader {
    /// Client type the header belongs to.
    pub fn client_type(&self) -> &'static str {
        match self {
            AnyHeader::Merkle(_) => MERKLE_CLIENT_TYPE,
            AnyHeader::Proxy(_) => PROXY_CLIENT_TYPE,
        }
    }

    /// Height the header commits.
    pub fn height(&self) -> Height {
        match self {
            AnyHeader::Merkle(h) => h.height,
            AnyHeader::Proxy(h) => h.header.height(),
        }
    }

    /// Pack into an `Any` envelope.
    pub fn to_any(&self) -> Result<Any, ClientError> {
        let any = match self {
            AnyHeader::Merkle(h) => Any::pack(MERKLE_HEADER_TYPE_URL, h)?,
            AnyHeader::Proxy(h) => Any::pack(PROXY_HEADER_TYPE_URL, h)?,
        };
        Ok(any)
    }

    /// Unpack from an `Any` envelope. Unknown type URLs are rejected.
    pub fn from_any(any: &Any) -> Result<Self, ClientError> {
        let header = match any.type_url.as_str() {
            MERKLE_HEADER_TYPE_URL => AnyHeader::Merkle(any.unpack(&any.type_url)?),
            PROXY_HEADER_TYPE_URL => AnyHeader::Proxy(any.unpack(&any.type_url)?),
            other => return Err(TypesError::UnknownType(other.to_string()).into()),
        };
        Ok(header)
    }
}

impl LightClient for AnyClientState {
    fn client_type(&self) -> &'static str {
        match self {
            AnyClientState::Merkle(_) => MERKLE_CLIENT_TYPE,
            AnyClientState::Proxy(_) => PROXY_CLIENT_TYPE,
            AnyClientState::MultiHop(_) => MULTIHOP_CLIENT_TYPE,
        }
    }

    fn latest_height(&self) -> Height {
        self.inner().latest_height()
    }

    fn validate(&self) -> Result<(), ClientError> {
        self.inner().validate()
    }

    fn status(&self, store: &dyn KvRead) -> Status {
        self.inner().status(store)
    }

    fn initialize(
        &self,
        host: HostInfo,
        store: &dyn KvStore,
        consensus_state: &AnyConsensusState,
    ) -> Result<(), ClientError> {
        self.inner().initialize(host, store, consensus_state)
    }

    fn verify_client_state(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        counterparty_client_id: &str,
        client_state: &AnyClientState,
    ) -> Result<(), ClientError> {
        self.inner()
            .verify_client_state(store, proof, counterparty_client_id, client_state)
    }

    fn verify_client_consensus_state(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        counterparty_client_id: &str,
        consensus_height: Height,
        consensus_state: &AnyConsensusState,
    ) -> Result<(), ClientError> {
        self.inner().verify_client_consensus_state(
            store,
            proof,
            counterparty_client_id,
            consensus_height,
            consensus_state,
        )
    }

    fn verify_connection_state(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        connection_id: &str,
        connection: &ConnectionEnd,
    ) -> Result<(), ClientError> {
        self.inner()
            .verify_connection_state(store, proof, connection_id, connection)
    }

    fn verify_channel_state(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        port_id: &str,
        channel_id: &str,
        channel: &ChannelEnd,
    ) -> Result<(), ClientError> {
        self.inner()
            .verify_channel_state(store, proof, port_id, channel_id, channel)
    }

    fn verify_packet_commitment(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        delay: &DelayContext,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        commitment: &[u8],
    ) -> Result<(), ClientError> {
        self.inner().verify_packet_commitment(
            store, proof, delay, port_id, channel_id, sequence, commitment,
        )
    }

    fn verify_packet_acknowledgement(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        delay: &DelayContext,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        ack_commitment: &[u8],
    ) -> Result<(), ClientError> {
        self.inner().verify_packet_acknowledgement(
            store,
            proof,
            delay,
            port_id,
            channel_id,
            sequence,
            ack_commitment,
        )
    }

    fn verify_packet_receipt_absence(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        delay: &DelayContext,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
    ) -> Result<(), ClientError> {
        self.inner()
            .verify_packet_receipt_absence(store, proof, delay, port_id, channel_id, sequence)
    }

    fn verify_next_sequence_recv(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        delay: &DelayContext,
        port_id: &str,
        channel_id: &str,
        next_sequence_recv: u64,
    ) -> Result<(), ClientError> {
        self.inner().verify_next_sequence_recv(
            store,
            proof,
            delay,
            port_id,
            channel_id,
            next_sequence_recv,
        )
    }

    fn check_header_and_update_state(
        &self,
        ctx: &UpdateContext<'_>,
        store: &dyn KvStore,
        header: &AnyHeader,
    ) -> Result<(AnyClientState, AnyConsensusState), ClientError> {
        self.inner().check_header_and_update_state(ctx, store, header)
    }

    fn check_misbehaviour_and_update_state(
        &self,
        store: &dyn KvStore,
        misbehaviour: &Any,
    ) -> Result<AnyClientState, ClientError> {
        self.inner()
            .check_misbehaviour_and_update_state(store, misbehaviour)
    }

    fn zero_custom_fields(&self) -> AnyClientState {
        self.inner().zero_custom_fields()
    }

    fn export_metadata(&self, store: &dyn KvRead) -> Vec<GenesisMetadata> {
        self.inner().export_metadata(store)
    }
}
