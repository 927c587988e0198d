//! # Outbound Ports
//!
//! Host-chain capabilities the proxy keeper consumes: client, connection
//! and channel keepers, the current block, and the raw chain store the
//! proxy namespace lives in.

use ibc_proxy_client::{AnyClientState, AnyConsensusState, HostInfo};
use ibc_proxy_types::{ChannelEnd, ConnectionEnd, Height, KvStore, Packet};

use crate::domain::ProxyError;

/// Client keeper of the host chain - outbound port.
pub trait ClientKeeper {
    /// Store scoped to one client.
    type ClientStore: KvStore;

    /// Client state stored under `client_id`.
    fn client_state(&self, client_id: &str) -> Option<AnyClientState>;

    /// Store `client_state` under `client_id`.
    fn set_client_state(
        &self,
        client_id: &str,
        client_state: &AnyClientState,
    ) -> Result<(), ProxyError>;

    /// Consensus state of `client_id` at `height`.
    fn consensus_state(&self, client_id: &str, height: &Height) -> Option<AnyConsensusState>;

    /// Store a consensus state of `client_id` at `height`.
    fn set_consensus_state(
        &self,
        client_id: &str,
        height: &Height,
        consensus_state: &AnyConsensusState,
    ) -> Result<(), ProxyError>;

    /// Store of `client_id`.
    fn client_store(&self, client_id: &str) -> Self::ClientStore;

    /// Allocate an id and store `client_state` under it, with no consensus
    /// state and no initialization.
    fn create_client(&self, client_state: &AnyClientState) -> Result<String, ProxyError>;

    /// Check that `client_state` is a valid client of this chain.
    fn validate_self_client(&self, client_state: &AnyClientState) -> Result<(), ProxyError>;
}

/// Connection keeper of the host chain - outbound port.
pub trait ConnectionKeeper {
    /// Connection end stored under `connection_id`.
    fn connection(&self, connection_id: &str) -> Option<ConnectionEnd>;

    /// Expected time per block (ns); zero disables block delays.
    fn max_expected_time_per_block(&self) -> u64;
}

/// Channel keeper of the host chain - outbound port.
pub trait ChannelKeeper {
    /// Channel end stored under the port and channel.
    fn channel(&self, port_id: &str, channel_id: &str) -> Option<ChannelEnd>;

    /// Next sequence the channel will send.
    fn next_sequence_send(&self, port_id: &str, channel_id: &str) -> Option<u64>;

    /// Commit and send `packet`, advancing the send sequence.
    fn send_packet(&self, packet: &Packet) -> Result<(), ProxyError>;
}

/// Current block of the host chain - outbound port.
pub trait HostContext {
    /// Current height and block time.
    fn host_info(&self) -> HostInfo;
}

/// Everything a proxy keeper needs from its host chain.
pub trait ProxyHost: ClientKeeper + ConnectionKeeper + ChannelKeeper + HostContext {
    /// Root store of the chain.
    type Store: KvStore;

    /// Root store the proxy namespace and bootstrap records live in.
    fn store(&self) -> Self::Store;
}
