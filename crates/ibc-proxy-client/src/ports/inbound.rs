//! # Inbound Ports
//!
//! The light-client capability every client variant implements: state
//! verification against a client store, header/misbehaviour updates and
//! genesis metadata.

use ibc_proxy_types::{Any, ChannelEnd, ConnectionEnd, Height, KvRead, KvStore};

use crate::application::registry::ProxyClientRegistry;
use crate::clients::{AnyClientState, AnyConsensusState, AnyHeader};
use crate::domain::{ClientError, DelayContext, GenesisMetadata, HostInfo, ProofContext, Status};

/// Inputs of a header update besides the header itself.
#[derive(Clone, Copy)]
pub struct UpdateContext<'a> {
    /// Host state when the header is processed.
    pub host: HostInfo,
    /// Proxy client builders, for upstream block-time proofs.
    pub registry: &'a ProxyClientRegistry,
}

impl<'a> UpdateContext<'a> {
    /// Create an update context.
    pub fn new(host: HostInfo, registry: &'a ProxyClientRegistry) -> Self {
        Self { host, registry }
    }
}

/// Light client - inbound port.
///
/// Verification takes the client's own store (read-only), the proof context
/// and the claimed value, and succeeds only if the proof shows the value
/// committed by the counterparty.
pub trait LightClient {
    /// Client type string.
    fn client_type(&self) -> &'static str;

    /// Latest height the client has verified.
    fn latest_height(&self) -> Height;

    /// Structural validation.
    fn validate(&self) -> Result<(), ClientError>;

    /// Client status given its store.
    fn status(&self, store: &dyn KvRead) -> Status;

    /// Validate the initial consensus state and store client metadata.
    fn initialize(
        &self,
        host: HostInfo,
        store: &dyn KvStore,
        consensus_state: &AnyConsensusState,
    ) -> Result<(), ClientError>;

    /// Verify the client state the counterparty stores for
    /// `counterparty_client_id`.
    fn verify_client_state(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        counterparty_client_id: &str,
        client_state: &AnyClientState,
    ) -> Result<(), ClientError>;

    /// Verify a consensus state the counterparty stores for
    /// `counterparty_client_id` at `consensus_height`.
    fn verify_client_consensus_state(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        counterparty_client_id: &str,
        consensus_height: Height,
        consensus_state: &AnyConsensusState,
    ) -> Result<(), ClientError>;

    /// Verify a connection end.
    fn verify_connection_state(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        connection_id: &str,
        connection: &ConnectionEnd,
    ) -> Result<(), ClientError>;

    /// Verify a channel end.
    fn verify_channel_state(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        port_id: &str,
        channel_id: &str,
        channel: &ChannelEnd,
    ) -> Result<(), ClientError>;

    /// Verify a packet commitment.
    #[allow(clippy::too_many_arguments)]
    fn verify_packet_commitment(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        delay: &DelayContext,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        commitment: &[u8],
    ) -> Result<(), ClientError>;

    /// Verify a packet acknowledgement commitment.
    #[allow(clippy::too_many_arguments)]
    fn verify_packet_acknowledgement(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        delay: &DelayContext,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        ack_commitment: &[u8],
    ) -> Result<(), ClientError>;

    /// Verify that no receipt exists for a packet.
    fn verify_packet_receipt_absence(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        delay: &DelayContext,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
    ) -> Result<(), ClientError>;

    /// Verify the next receive sequence of an ordered channel.
    fn verify_next_sequence_recv(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        delay: &DelayContext,
        port_id: &str,
        channel_id: &str,
        next_sequence_recv: u64,
    ) -> Result<(), ClientError>;

    /// Apply a header, returning the new client state and the consensus
    /// state to store at the header height.
    fn check_header_and_update_state(
        &self,
        ctx: &UpdateContext<'_>,
        store: &dyn KvStore,
        header: &AnyHeader,
    ) -> Result<(AnyClientState, AnyConsensusState), ClientError>;

    /// Apply misbehaviour evidence.
    fn check_misbehaviour_and_update_state(
        &self,
        store: &dyn KvStore,
        misbehaviour: &Any,
    ) -> Result<AnyClientState, ClientError>;

    /// Copy with every chain-customizable field zeroed.
    fn zero_custom_fields(&self) -> AnyClientState;

    /// Client-store entries to export at genesis.
    fn export_metadata(&self, store: &dyn KvRead) -> Vec<GenesisMetadata>;
}
