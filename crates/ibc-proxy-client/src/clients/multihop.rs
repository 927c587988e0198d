//! # Multi-Hop Light Client
//!
//! Wraps a base client that tracks the directly connected chain. Client and
//! consensus state verification walk a [`MultiHopProof`] through `depth`
//! intermediate proxy chains; everything else is answered by the base.
//!
//! [`MultiHopProof`]: crate::domain::MultiHopProof

use ibc_proxy_types::{Any, ChannelEnd, ConnectionEnd, Height, KvRead, KvStore};
use serde::{Deserialize, Serialize};

use crate::algorithms::ChainWalker;
use crate::clients::{AnyClientState, AnyConsensusState, AnyHeader};
use crate::domain::{
    ClientError, DelayContext, GenesisMetadata, HostInfo, ProofContext, Status,
    MULTIHOP_CLIENT_TYPE,
};
use crate::ports::{LightClient, UpdateContext};

/// State of a multi-hop client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiHopClientState {
    /// Client of the directly connected chain.
    pub base: Box<AnyClientState>,
    /// Number of intermediate branch hops a proof must carry.
    pub depth: u32,
}

impl MultiHopClientState {
    /// Multi-hop client over `base`.
    pub fn new(base: AnyClientState, depth: u32) -> Self {
        Self {
            base: Box::new(base),
            depth,
        }
    }

    fn walker<'a>(&'a self, store: &'a dyn KvRead) -> ChainWalker<'a> {
        ChainWalker::new(&self.base, self.depth, store)
    }

    fn rewrap(&self, base: AnyClientState) -> AnyClientState {
        AnyClientState::MultiHop(Self::new(base, self.depth))
    }
}

impl LightClient for MultiHopClientState {
    fn client_type(&self) -> &'static str {
        MULTIHOP_CLIENT_TYPE
    }

    fn latest_height(&self) -> Height {
        self.base.latest_height()
    }

    fn validate(&self) -> Result<(), ClientError> {
        if matches!(*self.base, AnyClientState::MultiHop(_)) {
            return Err(ClientError::InvalidClientState(
                "multi-hop base client cannot itself be multi-hop".into(),
            ));
        }
        self.base.validate()
    }

    fn status(&self, store: &dyn KvRead) -> Status {
        self.base.status(store)
    }

    fn initialize(
        &self,
        host: HostInfo,
        store: &dyn KvStore,
        consensus_state: &AnyConsensusState,
    ) -> Result<(), ClientError> {
        self.base.initialize(host, store, consensus_state)
    }

    fn verify_client_state(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        counterparty_client_id: &str,
        client_state: &AnyClientState,
    ) -> Result<(), ClientError> {
        self.walker(store).verify_client_state(
            proof.height,
            proof.prefix,
            counterparty_client_id,
            proof.proof,
            client_state,
        )
    }

    fn verify_client_consensus_state(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        counterparty_client_id: &str,
        consensus_height: Height,
        consensus_state: &AnyConsensusState,
    ) -> Result<(), ClientError> {
        self.walker(store).verify_consensus_state(
            proof.height,
            proof.prefix,
            counterparty_client_id,
            consensus_height,
            proof.proof,
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
        self.base
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
        self.base
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
        self.base.verify_packet_commitment(
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
        self.base.verify_packet_acknowledgement(
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
        self.base
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
        self.base.verify_next_sequence_recv(
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
        let (base, consensus) = self.base.check_header_and_update_state(ctx, store, header)?;
        Ok((self.rewrap(base), consensus))
    }

    fn check_misbehaviour_and_update_state(
        &self,
        _store: &dyn KvStore,
        _misbehaviour: &Any,
    ) -> Result<AnyClientState, ClientError> {
        Err(ClientError::Unsupported {
            client_type: MULTIHOP_CLIENT_TYPE,
            operation: "check_misbehaviour_and_update_state",
        })
    }

    fn zero_custom_fields(&self) -> AnyClientState {
        self.rewrap(self.base.zero_custom_fields())
    }

    fn export_metadata(&self, store: &dyn KvRead) -> Vec<GenesisMetadata> {
        self.base.export_metadata(store)
    }
}
