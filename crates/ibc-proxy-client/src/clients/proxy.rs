//! # Proxy Light Client
//!
//! Wraps the client a proxy chain keeps for an upstream chain. Facts about
//! the upstream are read from the proxy chain's commitment store, so every
//! public verification rewrites the caller's prefix into
//! `proxy_prefix ++ "<upstream_client_id>/" ++ caller_prefix` before handing
//! it to the wrapped client.
//!
//! The `ibc_verify_*` entry points are used by the multi-hop walker: they
//! verify against a supplied consensus state with no prefix rewrite.

use ibc_proxy_types::{
    Any, ChannelEnd, CommitmentPrefix, ConnectionEnd, Height, KvRead, KvStore,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapters::{ProxyExtractorStore, SingleFactStore};
use crate::clients::{AnyClientState, AnyConsensusState, AnyHeader};
use crate::domain::{
    invariant_upstream_monotonic, ClientError, DelayContext, GenesisMetadata, HostInfo,
    ProofContext, Status, PROXY_CLIENT_TYPE,
};
use crate::ports::{LightClient, UpdateContext};

/// Client-store key of the upstream block time at `height`.
pub fn upstream_block_time_key(height: &Height) -> String {
    format!("upstreamBlockTimes/{height}")
}

/// Upstream block time recorded in a proxy client store.
pub fn upstream_block_time(store: &dyn KvRead, height: &Height) -> Option<u64> {
    let bz = store.get(upstream_block_time_key(height).as_bytes())?;
    let raw: [u8; 8] = bz.as_slice().try_into().ok()?;
    Some(u64::from_be_bytes(raw))
}

fn set_upstream_block_time(store: &dyn KvStore, height: &Height, timestamp: u64) {
    store.set(
        upstream_block_time_key(height).as_bytes(),
        timestamp.to_be_bytes().to_vec(),
    );
}

/// State of a proxy client.
///
/// A placeholder (only `upstream_client_id` set) is created by a bootstrap
/// request and filled in when the proxy acknowledges it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyClientState {
    /// Client the proxy chain keeps for the upstream chain.
    pub proxy_client_state: Option<Box<AnyClientState>>,
    /// Id of that client on the proxy chain.
    pub upstream_client_id: String,
    /// Prefix of the proxy chain's commitment store.
    pub proxy_prefix: Option<CommitmentPrefix>,
    /// IBC prefix of the proxy chain.
    pub ibc_prefix: Option<CommitmentPrefix>,
    /// Latest upstream height known through the proxy.
    pub upstream_height: Height,
    /// Upstream block time at `upstream_height`.
    pub upstream_timestamp: u64,
}

/// Consensus state of a proxy client: the wrapped client's consensus state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConsensusState {
    /// Wrapped consensus state.
    pub inner: Box<AnyConsensusState>,
}

impl ProxyConsensusState {
    /// Wrap a consensus state.
    pub fn new(inner: AnyConsensusState) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }
}

/// Proof that the proxy chain committed an upstream block time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamBlockProof {
    /// Proxy chain height the proof was generated at.
    pub proof_height: Height,
    /// Upstream height the block time belongs to.
    pub upstream_height: Height,
    /// Upstream block time in nanoseconds.
    pub upstream_timestamp: u64,
    /// Membership proof of `block/<upstream_height>`.
    pub proof: Vec<u8>,
}

/// Header of a proxy client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyHeader {
    /// Header for the wrapped client.
    pub header: Box<AnyHeader>,
    /// Optional upstream block-time proof.
    pub upstream_block_proof: Option<UpstreamBlockProof>,
}

impl ProxyClientState {
    /// Placeholder awaiting bootstrap.
    pub fn new(upstream_client_id: impl Into<String>) -> Self {
        Self {
            upstream_client_id: upstream_client_id.into(),
            ..Self::default()
        }
    }

    /// Fully populated proxy client.
    pub fn initialized(
        proxy_client_state: AnyClientState,
        upstream_client_id: impl Into<String>,
        proxy_prefix: CommitmentPrefix,
        ibc_prefix: CommitmentPrefix,
        upstream_height: Height,
        upstream_timestamp: u64,
    ) -> Self {
        Self {
            proxy_client_state: Some(Box::new(proxy_client_state)),
            upstream_client_id: upstream_client_id.into(),
            proxy_prefix: Some(proxy_prefix),
            ibc_prefix: Some(ibc_prefix),
            upstream_height,
            upstream_timestamp,
        }
    }

    /// Whether the client wraps a client state.
    pub fn is_initialized(&self) -> bool {
        self.proxy_client_state.is_some()
    }

    /// The wrapped client state.
    pub fn wrapped(&self) -> Result<&AnyClientState, ClientError> {
        self.proxy_client_state
            .as_deref()
            .ok_or(ClientError::UninitializedProxy)
    }

    /// Prefix of the proxy chain's commitment store.
    pub fn proxy_prefix(&self) -> Result<&CommitmentPrefix, ClientError> {
        self.proxy_prefix.as_ref().ok_or(ClientError::UninitializedProxy)
    }

    /// IBC prefix of the proxy chain.
    pub fn ibc_prefix(&self) -> Result<&CommitmentPrefix, ClientError> {
        self.ibc_prefix.as_ref().ok_or(ClientError::UninitializedProxy)
    }

    /// Prefix under which the proxy chain exposes `caller_prefix` facts of
    /// the upstream.
    pub fn composed_prefix(
        &self,
        caller_prefix: &CommitmentPrefix,
    ) -> Result<CommitmentPrefix, ClientError> {
        Ok(CommitmentPrefix::compose(
            self.proxy_prefix()?,
            &self.upstream_client_id,
            caller_prefix,
        ))
    }

    fn check_populated(&self) -> Result<(), ClientError> {
        let missing = if self.proxy_client_state.is_none() {
            Some("proxy client state")
        } else if self.upstream_client_id.trim().is_empty() {
            Some("upstream client id")
        } else if self.proxy_prefix.as_ref().map_or(true, CommitmentPrefix::is_empty) {
            Some("proxy prefix")
        } else if self.ibc_prefix.as_ref().map_or(true, CommitmentPrefix::is_empty) {
            Some("ibc prefix")
        } else if self.upstream_height.is_zero() {
            Some("upstream height")
        } else if self.upstream_timestamp == 0 {
            Some("upstream timestamp")
        } else {
            None
        };
        match missing {
            Some(field) => Err(ClientError::InvalidClientState(format!(
                "each field of the proxy client state must be non-empty: {field} is empty"
            ))),
            None => Ok(()),
        }
    }

    /// Verify the client state the upstream stores for
    /// `counterparty_client_id`, against `consensus_state` at `proof.height`.
    pub fn ibc_verify_client_state(
        &self,
        consensus_state: &AnyConsensusState,
        proof: ProofContext<'_>,
        counterparty_client_id: &str,
        client_state: &AnyClientState,
    ) -> Result<(), ClientError> {
        let wrapped = self.wrapped()?;
        let store = SingleFactStore::consensus(&proof.height, consensus_state)?;
        wrapped.verify_client_state(
            &ProxyExtractorStore::new(&store),
            proof,
            counterparty_client_id,
            client_state,
        )
    }

    /// Verify a consensus state the upstream stores for
    /// `counterparty_client_id`, against `consensus_state` at `proof.height`.
    pub fn ibc_verify_client_consensus_state(
        &self,
        consensus_state: &AnyConsensusState,
        proof: ProofContext<'_>,
        counterparty_client_id: &str,
        target_height: Height,
        target: &AnyConsensusState,
    ) -> Result<(), ClientError> {
        let wrapped = self.wrapped()?;
        let store = SingleFactStore::consensus(&proof.height, consensus_state)?;
        wrapped.verify_client_consensus_state(
            &ProxyExtractorStore::new(&store),
            proof,
            counterparty_client_id,
            target_height,
            target,
        )
    }

    /// Verify an upstream block-time proof with the (already updated)
    /// wrapped client and record the block time.
    fn apply_upstream_block_proof(
        &mut self,
        ctx: &UpdateContext<'_>,
        store: &dyn KvStore,
        ubp: &UpstreamBlockProof,
    ) -> Result<(), ClientError> {
        let verifier = {
            let wrapped = self.wrapped()?;
            ctx.registry.get(wrapped.client_type())?.build(wrapped)?
        };
        let prefix = CommitmentPrefix::compose(
            self.proxy_prefix()?,
            &self.upstream_client_id,
            &CommitmentPrefix::default(),
        );
        verifier.verify_block_time(
            &ProxyExtractorStore::new(store),
            ProofContext::new(ubp.proof_height, &prefix, &ubp.proof),
            ubp.upstream_height,
            ubp.upstream_timestamp,
        )?;
        if invariant_upstream_monotonic(
            self.upstream_height,
            self.upstream_timestamp,
            ubp.upstream_height,
            ubp.upstream_timestamp,
        )? {
            self.upstream_height = ubp.upstream_height;
            self.upstream_timestamp = ubp.upstream_timestamp;
        }
        set_upstream_block_time(store, &ubp.upstream_height, ubp.upstream_timestamp);
        debug!(
            upstream_client_id = %self.upstream_client_id,
            upstream_height = %ubp.upstream_height,
            upstream_timestamp = ubp.upstream_timestamp,
            "[proxy-client] upstream block time recorded"
        );
        Ok(())
    }
}

impl LightClient for ProxyClientState {
    fn client_type(&self) -> &'static str {
        PROXY_CLIENT_TYPE
    }

    fn latest_height(&self) -> Height {
        self.proxy_client_state
            .as_deref()
            .map_or(Height::zero(), |cs| cs.latest_height())
    }

    fn validate(&self) -> Result<(), ClientError> {
        self.check_populated()?;
        self.wrapped()?.validate()
    }

    fn status(&self, store: &dyn KvRead) -> Status {
        match self.proxy_client_state.as_deref() {
            Some(wrapped) => wrapped.status(&ProxyExtractorStore::new(store)),
            None => Status::Unknown,
        }
    }

    fn initialize(
        &self,
        host: HostInfo,
        store: &dyn KvStore,
        consensus_state: &AnyConsensusState,
    ) -> Result<(), ClientError> {
        self.check_populated()?;
        let proxy_consensus = consensus_state.as_proxy().ok_or_else(|| {
            ClientError::InvalidConsensusState(format!(
                "expected a proxy consensus state, got {}",
                consensus_state.client_type()
            ))
        })?;
        set_upstream_block_time(store, &self.upstream_height, self.upstream_timestamp);
        self.wrapped()?
            .initialize(host, &ProxyExtractorStore::new(store), &proxy_consensus.inner)?;
        info!(
            upstream_client_id = %self.upstream_client_id,
            upstream_height = %self.upstream_height,
            "[proxy-client] initialized"
        );
        Ok(())
    }

    fn verify_client_state(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        counterparty_client_id: &str,
        client_state: &AnyClientState,
    ) -> Result<(), ClientError> {
        let prefix = self.composed_prefix(proof.prefix)?;
        self.wrapped()?.verify_client_state(
            &ProxyExtractorStore::new(store),
            proof.with_prefix(&prefix),
            counterparty_client_id,
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
        let prefix = self.composed_prefix(proof.prefix)?;
        self.wrapped()?.verify_client_consensus_state(
            &ProxyExtractorStore::new(store),
            proof.with_prefix(&prefix),
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
        let prefix = self.composed_prefix(proof.prefix)?;
        self.wrapped()?.verify_connection_state(
            &ProxyExtractorStore::new(store),
            proof.with_prefix(&prefix),
            connection_id,
            connection,
        )
    }

    fn verify_channel_state(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        port_id: &str,
        channel_id: &str,
        channel: &ChannelEnd,
    ) -> Result<(), ClientError> {
        let prefix = self.composed_prefix(proof.prefix)?;
        self.wrapped()?.verify_channel_state(
            &ProxyExtractorStore::new(store),
            proof.with_prefix(&prefix),
            port_id,
            channel_id,
            channel,
        )
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
        let prefix = self.composed_prefix(proof.prefix)?;
        self.wrapped()?.verify_packet_commitment(
            &ProxyExtractorStore::new(store),
            proof.with_prefix(&prefix),
            delay,
            port_id,
            channel_id,
            sequence,
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
        let prefix = self.composed_prefix(proof.prefix)?;
        self.wrapped()?.verify_packet_acknowledgement(
            &ProxyExtractorStore::new(store),
            proof.with_prefix(&prefix),
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
        let prefix = self.composed_prefix(proof.prefix)?;
        self.wrapped()?.verify_packet_receipt_absence(
            &ProxyExtractorStore::new(store),
            proof.with_prefix(&prefix),
            delay,
            port_id,
            channel_id,
            sequence,
        )
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
        let prefix = self.composed_prefix(proof.prefix)?;
        self.wrapped()?.verify_next_sequence_recv(
            &ProxyExtractorStore::new(store),
            proof.with_prefix(&prefix),
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
        let header = match header {
            AnyHeader::Proxy(h) => h,
            other => {
                return Err(ClientError::ClientTypeMismatch {
                    expected: PROXY_CLIENT_TYPE,
                    got: other.client_type().to_string(),
                })
            }
        };
        let wrapped = self.wrapped()?;
        let (new_wrapped, new_consensus) = wrapped.check_header_and_update_state(
            ctx,
            &ProxyExtractorStore::new(store),
            &header.header,
        )?;

        let mut updated = self.clone();
        updated.proxy_client_state = Some(Box::new(new_wrapped));
        if let Some(ubp) = &header.upstream_block_proof {
            updated.apply_upstream_block_proof(ctx, store, ubp)?;
        }
        Ok((
            AnyClientState::Proxy(updated),
            AnyConsensusState::Proxy(ProxyConsensusState::new(new_consensus)),
        ))
    }

    fn check_misbehaviour_and_update_state(
        &self,
        store: &dyn KvStore,
        misbehaviour: &Any,
    ) -> Result<AnyClientState, ClientError> {
        let new_wrapped = self
            .wrapped()?
            .check_misbehaviour_and_update_state(&ProxyExtractorStore::new(store), misbehaviour)?;
        let mut updated = self.clone();
        updated.proxy_client_state = Some(Box::new(new_wrapped));
        Ok(AnyClientState::Proxy(updated))
    }

    fn zero_custom_fields(&self) -> AnyClientState {
        let mut zeroed = self.clone();
        zeroed.proxy_client_state = self
            .proxy_client_state
            .as_deref()
            .map(|cs| Box::new(cs.zero_custom_fields()));
        zeroed.upstream_height = Height::zero();
        zeroed.upstream_timestamp = 0;
        AnyClientState::Proxy(zeroed)
    }

    fn export_metadata(&self, store: &dyn KvRead) -> Vec<GenesisMetadata> {
        let mut metadata = self
            .proxy_client_state
            .as_deref()
            .map(|cs| cs.export_metadata(&ProxyExtractorStore::new(store)))
            .unwrap_or_default();
        let key = upstream_block_time_key(&self.upstream_height);
        if let Some(value) = store.get(key.as_bytes()) {
            metadata.push(GenesisMetadata {
                key: key.into_bytes(),
                value,
            });
        }
        metadata
    }
}
