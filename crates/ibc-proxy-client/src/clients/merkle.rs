//! # Merkle Light Client
//!
//! Reference single-hop client. A chain's state at a height is committed as
//! the root of a [`CommitmentTree`] over its whole store; proofs are
//! bincode-encoded [`CommitmentProof`]s checked against the consensus root.
//!
//! Header updates are accepted on structural checks only.
//!
//! [`CommitmentTree`]: crate::algorithms::CommitmentTree

use ibc_proxy_types::path::{
    channel_path, client_state_path, connection_path, consensus_state_key, consensus_state_path,
    next_sequence_recv_path, packet_acknowledgement_path, packet_commitment_path,
    packet_receipt_path, upstream_block_path,
};
use ibc_proxy_types::{
    decode, encode, Any, ChannelEnd, ConnectionEnd, Height, KvRead, KvStore,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithms::merkle_verifier::{verify_membership, verify_non_membership};
use crate::clients::{AnyClientState, AnyConsensusState, AnyHeader};
use crate::domain::{
    ClientError, CommitmentProof, DelayContext, GenesisMetadata, Hash, HostInfo, ProofContext,
    Status, MERKLE_CLIENT_TYPE,
};
use crate::ports::{BlockTimeVerifier, LightClient, ProxyClientBuilder, UpdateContext};

/// Client-store key of the host time a consensus state was processed at.
pub fn processed_time_key(height: &Height) -> String {
    format!("processedTimes/{height}")
}

/// Client-store key of the host height a consensus state was processed at.
pub fn processed_height_key(height: &Height) -> String {
    format!("processedHeights/{height}")
}

/// State of a merkle client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleClientState {
    /// Chain id of the tracked chain.
    pub chain_id: String,
    /// Latest verified height.
    pub latest_height: Height,
    /// Height the client was frozen at, if any.
    pub frozen_height: Option<Height>,
}

/// Snapshot of the tracked chain at one height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleConsensusState {
    /// Commitment root of the chain store.
    pub root: Hash,
    /// Block time in nanoseconds.
    pub timestamp: u64,
}

/// Header advancing a merkle client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleHeader {
    /// Chain id of the tracked chain.
    pub chain_id: String,
    /// Header height.
    pub height: Height,
    /// Block time in nanoseconds.
    pub timestamp: u64,
    /// Commitment root at `height`.
    pub root: Hash,
}

impl MerkleHeader {
    /// Consensus state committed by this header.
    pub fn consensus_state(&self) -> MerkleConsensusState {
        MerkleConsensusState {
            root: self.root,
            timestamp: self.timestamp,
        }
    }
}

impl MerkleClientState {
    /// Create an active client at `latest_height`.
    pub fn new(chain_id: impl Into<String>, latest_height: Height) -> Self {
        Self {
            chain_id: chain_id.into(),
            latest_height,
            frozen_height: None,
        }
    }

    /// Basic checks shared by every verification: proof height reached,
    /// prefix and proof present, proof decodable, client not frozen, and the
    /// consensus state at the proof height.
    fn produce_verification_args(
        &self,
        store: &dyn KvRead,
        proof: &ProofContext<'_>,
    ) -> Result<(CommitmentProof, MerkleConsensusState), ClientError> {
        if self.latest_height < proof.height {
            return Err(ClientError::ProofHeightTooHigh {
                proof_height: proof.height,
                latest_height: self.latest_height,
            });
        }
        if proof.prefix.is_empty() {
            return Err(ClientError::EmptyPrefix);
        }
        if proof.proof.is_empty() {
            return Err(ClientError::EmptyProof);
        }
        let commitment_proof: CommitmentProof = decode(proof.proof)
            .map_err(|e| ClientError::MalformedProof(format!("commitment proof: {e}")))?;
        if let Some(frozen) = self.frozen_height {
            return Err(ClientError::Frozen(frozen));
        }
        let consensus = get_consensus_state(store, &proof.height)?;
        Ok((commitment_proof, consensus))
    }

    fn verify_value(
        &self,
        store: &dyn KvRead,
        proof: &ProofContext<'_>,
        path: &str,
        value: &[u8],
    ) -> Result<(), ClientError> {
        let (commitment_proof, consensus) = self.produce_verification_args(store, proof)?;
        verify_membership(
            &consensus.root,
            &commitment_proof,
            &proof.prefix.apply_path(path),
            value,
        )
    }

    fn verify_absence(
        &self,
        store: &dyn KvRead,
        proof: &ProofContext<'_>,
        path: &str,
    ) -> Result<(), ClientError> {
        let (commitment_proof, consensus) = self.produce_verification_args(store, proof)?;
        verify_non_membership(&consensus.root, &commitment_proof, &proof.prefix.apply_path(path))
    }
}

/// Merkle consensus state stored at `height` in a client store.
pub fn get_consensus_state(
    store: &dyn KvRead,
    height: &Height,
) -> Result<MerkleConsensusState, ClientError> {
    let bz = store
        .get(consensus_state_key(height).as_bytes())
        .ok_or(ClientError::ConsensusStateNotFound(*height))?;
    match AnyConsensusState::from_bytes(&bz)? {
        AnyConsensusState::Merkle(cs) => Ok(cs),
        other => Err(ClientError::ClientTypeMismatch {
            expected: MERKLE_CLIENT_TYPE,
            got: other.client_type().to_string(),
        }),
    }
}

fn set_processed_metadata(store: &dyn KvStore, height: &Height, host: &HostInfo) -> Result<(), ClientError> {
    store.set(
        processed_time_key(height).as_bytes(),
        host.timestamp.to_be_bytes().to_vec(),
    );
    store.set(processed_height_key(height).as_bytes(), encode(&host.height)?);
    Ok(())
}

fn get_processed_time(store: &dyn KvRead, height: &Height) -> Result<u64, ClientError> {
    let bz = store
        .get(processed_time_key(height).as_bytes())
        .ok_or(ClientError::ProcessedMetadataNotFound(*height))?;
    let raw: [u8; 8] = bz
        .as_slice()
        .try_into()
        .map_err(|_| ClientError::ProcessedMetadataNotFound(*height))?;
    Ok(u64::from_be_bytes(raw))
}

fn get_processed_height(store: &dyn KvRead, height: &Height) -> Result<Height, ClientError> {
    let bz = store
        .get(processed_height_key(height).as_bytes())
        .ok_or(ClientError::ProcessedMetadataNotFound(*height))?;
    Ok(decode(&bz)?)
}

/// Require the delay period to have passed since the consensus state at
/// `proof_height` was processed. No delay means no check.
fn verify_delay_period_passed(
    store: &dyn KvRead,
    proof_height: &Height,
    delay: &DelayContext,
) -> Result<(), ClientError> {
    if !delay.is_enforced() {
        return Ok(());
    }
    let processed_time = get_processed_time(store, proof_height)?;
    let valid_after_time = processed_time.saturating_add(delay.delay_time);
    if delay.host.timestamp < valid_after_time {
        return Err(ClientError::DelayPeriodNotPassed(format!(
            "cannot verify packet until time: {valid_after_time}, current time: {}",
            delay.host.timestamp
        )));
    }
    let processed_height = get_processed_height(store, proof_height)?;
    let valid_after_height = Height::new(
        processed_height.revision_number,
        processed_height
            .revision_height
            .saturating_add(delay.delay_blocks),
    );
    if delay.host.height < valid_after_height {
        return Err(ClientError::DelayPeriodNotPassed(format!(
            "cannot verify packet until height: {valid_after_height}, current height: {}",
            delay.host.height
        )));
    }
    Ok(())
}

impl LightClient for MerkleClientState {
    fn client_type(&self) -> &'static str {
        MERKLE_CLIENT_TYPE
    }

    fn latest_height(&self) -> Height {
        self.latest_height
    }

    fn validate(&self) -> Result<(), ClientError> {
        if self.chain_id.trim().is_empty() {
            return Err(ClientError::InvalidClientState("chain id cannot be blank".into()));
        }
        if self.latest_height.is_zero() {
            return Err(ClientError::InvalidClientState("latest height cannot be zero".into()));
        }
        if matches!(self.frozen_height, Some(h) if h.is_zero()) {
            return Err(ClientError::InvalidClientState("frozen height cannot be zero".into()));
        }
        Ok(())
    }

    fn status(&self, store: &dyn KvRead) -> Status {
        if self.frozen_height.is_some() {
            return Status::Frozen;
        }
        if !store.has(consensus_state_key(&self.latest_height).as_bytes()) {
            return Status::Unknown;
        }
        Status::Active
    }

    fn initialize(
        &self,
        host: HostInfo,
        store: &dyn KvStore,
        consensus_state: &AnyConsensusState,
    ) -> Result<(), ClientError> {
        match consensus_state {
            AnyConsensusState::Merkle(cs) if cs.timestamp > 0 => {}
            AnyConsensusState::Merkle(_) => {
                return Err(ClientError::InvalidConsensusState("timestamp cannot be zero".into()))
            }
            other => {
                return Err(ClientError::ClientTypeMismatch {
                    expected: MERKLE_CLIENT_TYPE,
                    got: other.client_type().to_string(),
                })
            }
        }
        set_processed_metadata(store, &self.latest_height, &host)
    }

    fn verify_client_state(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        counterparty_client_id: &str,
        client_state: &AnyClientState,
    ) -> Result<(), ClientError> {
        self.verify_value(
            store,
            &proof,
            &client_state_path(counterparty_client_id),
            &client_state.to_bytes()?,
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
        self.verify_value(
            store,
            &proof,
            &consensus_state_path(counterparty_client_id, &consensus_height),
            &consensus_state.to_bytes()?,
        )
    }

    fn verify_connection_state(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        connection_id: &str,
        connection: &ConnectionEnd,
    ) -> Result<(), ClientError> {
        self.verify_value(store, &proof, &connection_path(connection_id), &encode(connection)?)
    }

    fn verify_channel_state(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        port_id: &str,
        channel_id: &str,
        channel: &ChannelEnd,
    ) -> Result<(), ClientError> {
        self.verify_value(store, &proof, &channel_path(port_id, channel_id), &encode(channel)?)
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
        verify_delay_period_passed(store, &proof.height, delay)?;
        self.verify_value(
            store,
            &proof,
            &packet_commitment_path(port_id, channel_id, sequence),
            commitment,
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
        verify_delay_period_passed(store, &proof.height, delay)?;
        self.verify_value(
            store,
            &proof,
            &packet_acknowledgement_path(port_id, channel_id, sequence),
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
        verify_delay_period_passed(store, &proof.height, delay)?;
        self.verify_absence(store, &proof, &packet_receipt_path(port_id, channel_id, sequence))
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
        verify_delay_period_passed(store, &proof.height, delay)?;
        self.verify_value(
            store,
            &proof,
            &next_sequence_recv_path(port_id, channel_id),
            &next_sequence_recv.to_be_bytes(),
        )
    }

    fn check_header_and_update_state(
        &self,
        ctx: &UpdateContext<'_>,
        store: &dyn KvStore,
        header: &AnyHeader,
    ) -> Result<(AnyClientState, AnyConsensusState), ClientError> {
        let header = match header {
            AnyHeader::Merkle(h) => h,
            other => {
                return Err(ClientError::ClientTypeMismatch {
                    expected: MERKLE_CLIENT_TYPE,
                    got: other.client_type().to_string(),
                })
            }
        };
        if let Some(frozen) = self.frozen_height {
            return Err(ClientError::Frozen(frozen));
        }
        if header.chain_id != self.chain_id {
            return Err(ClientError::InvalidHeader(format!(
                "header chain id {} does not match client chain id {}",
                header.chain_id, self.chain_id
            )));
        }
        if header.height.is_zero() {
            return Err(ClientError::InvalidHeader("height cannot be zero".into()));
        }
        if header.timestamp == 0 {
            return Err(ClientError::InvalidHeader("timestamp cannot be zero".into()));
        }

        let consensus = AnyConsensusState::Merkle(header.consensus_state());
        if let Some(existing) = store.get(consensus_state_key(&header.height).as_bytes()) {
            if AnyConsensusState::from_bytes(&existing)? != consensus {
                return Err(ClientError::InvalidHeader(format!(
                    "conflicting consensus state already stored at {}",
                    header.height
                )));
            }
        }
        set_processed_metadata(store, &header.height, &ctx.host)?;

        let mut updated = self.clone();
        if header.height > updated.latest_height {
            updated.latest_height = header.height;
        }
        debug!(
            chain_id = %self.chain_id,
            height = %header.height,
            latest_height = %updated.latest_height,
            "[merkle] header applied"
        );
        Ok((AnyClientState::Merkle(updated), consensus))
    }

    fn check_misbehaviour_and_update_state(
        &self,
        _store: &dyn KvStore,
        _misbehaviour: &Any,
    ) -> Result<AnyClientState, ClientError> {
        Err(ClientError::Unsupported {
            client_type: MERKLE_CLIENT_TYPE,
            operation: "check_misbehaviour_and_update_state",
        })
    }

    fn zero_custom_fields(&self) -> AnyClientState {
        AnyClientState::Merkle(MerkleClientState {
            chain_id: self.chain_id.clone(),
            latest_height: self.latest_height,
            frozen_height: None,
        })
    }

    fn export_metadata(&self, store: &dyn KvRead) -> Vec<GenesisMetadata> {
        [
            processed_time_key(&self.latest_height),
            processed_height_key(&self.latest_height),
        ]
        .into_iter()
        .filter_map(|key| {
            store.get(key.as_bytes()).map(|value| GenesisMetadata {
                key: key.into_bytes(),
                value,
            })
        })
        .collect()
    }
}

// =============================================================================
// Proxy support
// =============================================================================

/// Builds block-time verifiers for wrapped merkle clients.
#[derive(Clone, Copy, Debug, Default)]
pub struct MerkleProxyClientBuilder;

/// Verifies `block/<height>` commitments with a merkle client.
#[derive(Clone, Debug)]
pub struct MerkleBlockTimeVerifier {
    client_state: MerkleClientState,
}

impl ProxyClientBuilder for MerkleProxyClientBuilder {
    fn client_type(&self) -> &'static str {
        MERKLE_CLIENT_TYPE
    }

    fn build(
        &self,
        client_state: &AnyClientState,
    ) -> Result<Box<dyn BlockTimeVerifier>, ClientError> {
        match client_state {
            AnyClientState::Merkle(cs) => Ok(Box::new(MerkleBlockTimeVerifier {
                client_state: cs.clone(),
            })),
            other => Err(ClientError::ClientTypeMismatch {
                expected: MERKLE_CLIENT_TYPE,
                got: other.client_type().to_string(),
            }),
        }
    }
}

impl BlockTimeVerifier for MerkleBlockTimeVerifier {
    fn verify_block_time(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        upstream_height: Height,
        timestamp: u64,
    ) -> Result<(), ClientError> {
        self.client_state.verify_value(
            store,
            &proof,
            &upstream_block_path(&upstream_height),
            &timestamp.to_be_bytes(),
        )
    }
}
