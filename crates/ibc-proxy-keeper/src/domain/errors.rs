//! # Domain Errors
//!
//! Error types for the proxy keeper.

use ibc_proxy_client::ClientError;
use ibc_proxy_types::{Height, TypesError};
use thiserror::Error;

use crate::domain::value_objects::BootstrapState;

/// Proxy keeper error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    /// Encoding or decoding of a shared type failed.
    #[error(transparent)]
    Types(#[from] TypesError),

    /// A light client operation failed outside of a verification.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// No client is registered under the id.
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// The client has no consensus state at the height.
    #[error("Consensus state not found for client {client_id} at {height}")]
    ConsensusStateNotFound {
        /// Client id
        client_id: String,
        /// Requested height
        height: Height,
    },

    /// No connection is stored under the id.
    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    /// No channel is stored under the port and channel id.
    #[error("Channel not found: {port_id}/{channel_id}")]
    ChannelNotFound {
        /// Port id
        port_id: String,
        /// Channel id
        channel_id: String,
    },

    /// The channel has no next send sequence.
    #[error("Next send sequence not found: {port_id}/{channel_id}")]
    SequenceNotFound {
        /// Port id
        port_id: String,
        /// Channel id
        channel_id: String,
    },

    /// Nothing is committed in the proxy namespace under the key.
    #[error("Commitment not found: {0}")]
    CommitmentNotFound(String),

    /// A prefix differs from the one this keeper is configured with.
    #[error("Invalid prefix: expected {expected}, got {got}")]
    InvalidPrefix {
        /// Configured prefix
        expected: String,
        /// Supplied prefix
        got: String,
    },

    /// A connection or channel end is in an unexpected state.
    #[error("State mismatch for {object}: expected {expected}, got {got}")]
    StateMismatch {
        /// Object being checked
        object: String,
        /// Required state
        expected: String,
        /// Actual state
        got: String,
    },

    /// The object is already stored.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A connection or channel version is not acceptable.
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// The packet can no longer be received.
    #[error("Packet timeout: {0}")]
    PacketTimeout(String),

    /// The packet does not match the channel it claims to use.
    #[error("Invalid packet: {0}")]
    InvalidPacket(String),

    /// A client is not of the expected variant or shape.
    #[error("Invalid client: {0}")]
    InvalidClient(String),

    /// A message failed stateless validation.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// The channel operation is refused by the proxy module.
    #[error("Invalid channel operation: {0}")]
    InvalidChannelOperation(String),

    /// No bootstrap request was recorded for the proxy client.
    #[error("Bootstrap request not found: {0}")]
    BootstrapNotFound(String),

    /// A bootstrap request cannot move between the two states.
    #[error("Invalid bootstrap transition for {client_id}: {from:?} -> {to:?}")]
    InvalidBootstrapTransition {
        /// Proxy client id
        client_id: String,
        /// Current state
        from: BootstrapState,
        /// Requested state
        to: BootstrapState,
    },

    /// A single-hop verification failed.
    #[error("Verification failed for client {client_id}: {source}")]
    Verification {
        /// Client that performed the verification
        client_id: String,
        /// Underlying failure
        source: ClientError,
    },

    /// The upstream client was not enabled for proxying.
    #[error("Proxy not enabled for client {0}")]
    ProxyNotEnabled(String),
}

impl ProxyError {
    /// Wrap a verification failure with the client that produced it.
    pub fn verification(client_id: impl Into<String>, source: ClientError) -> Self {
        ProxyError::Verification {
            client_id: client_id.into(),
            source,
        }
    }

    /// State mismatch of `object`.
    pub fn state_mismatch(
        object: impl Into<String>,
        expected: impl std::fmt::Debug,
        got: impl std::fmt::Debug,
    ) -> Self {
        ProxyError::StateMismatch {
            object: object.into(),
            expected: format!("{expected:?}"),
            got: format!("{got:?}"),
        }
    }
}
