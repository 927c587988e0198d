//! # Domain Errors
//!
//! Error types for the proxy, multi-hop and merkle light clients.

use ibc_proxy_types::{Height, TypesError};
use thiserror::Error;

/// Light client error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Encoding or decoding of a shared type failed.
    #[error(transparent)]
    Types(#[from] TypesError),

    /// A commitment proof did not verify against the consensus root.
    #[error("Invalid proof: {0}")]
    InvalidProof(String),

    /// Proof bytes are not a well-formed proof of the expected shape.
    #[error("Malformed proof: {0}")]
    MalformedProof(String),

    /// The proof targets a height the client has not reached.
    #[error("Client state height < proof height ({latest_height} < {proof_height}), please ensure the client has been updated")]
    ProofHeightTooHigh {
        /// Height the proof was generated at
        proof_height: Height,
        /// Latest height known to the client
        latest_height: Height,
    },

    /// Verification was asked for with an empty prefix.
    #[error("Prefix cannot be empty")]
    EmptyPrefix,

    /// Verification was asked for with empty proof bytes.
    #[error("Proof cannot be empty")]
    EmptyProof,

    /// No consensus state stored at the height.
    #[error("Consensus state not found at height {0}")]
    ConsensusStateNotFound(Height),

    /// A value was of a different client type than required.
    #[error("Client type mismatch: expected {expected}, got {got}")]
    ClientTypeMismatch {
        /// Required client type
        expected: &'static str,
        /// Client type found
        got: String,
    },

    /// The client is frozen.
    #[error("Client is frozen at height {0}")]
    Frozen(Height),

    /// Client state failed validation.
    #[error("Invalid client state: {0}")]
    InvalidClientState(String),

    /// Consensus state failed validation.
    #[error("Invalid consensus state: {0}")]
    InvalidConsensusState(String),

    /// Header failed validation.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The proxy client is still a bootstrap placeholder.
    #[error("Proxy client is not initialized")]
    UninitializedProxy,

    /// A multi-hop proof carried the wrong number of branches.
    #[error("Branch count mismatch: expected {expected}, got {got}")]
    BranchCountMismatch {
        /// Depth configured on the verifying client
        expected: u32,
        /// Branches present in the proof
        got: usize,
    },

    /// The head segment was not generated at the requested height.
    #[error("First proof's height must be {expected}, but got {got}")]
    HeadHeightMismatch {
        /// Height requested by the caller
        expected: Height,
        /// Head segment proof height
        got: Height,
    },

    /// The leaf segment variant does not match the requested fact.
    #[error("Last element must be a {expected} leaf, but got a {got} leaf")]
    UnexpectedLeaf {
        /// Required leaf variant
        expected: &'static str,
        /// Leaf variant found
        got: &'static str,
    },

    /// The consensus leaf proves a different consensus height than requested.
    #[error("Leaf consensus height must be {expected}, but got {got}")]
    ConsensusHeightMismatch {
        /// Requested consensus height
        expected: Height,
        /// Leaf consensus height
        got: Height,
    },

    /// One hop of a multi-hop verification failed.
    #[error("Hop {hop} verification failed for client {client_id}: {source}")]
    HopVerification {
        /// 1-based hop index (head = 1, leaf = depth + 2)
        hop: usize,
        /// Client id the hop attested to
        client_id: String,
        /// Underlying failure
        source: Box<ClientError>,
    },

    /// The operation is not supported by this client variant.
    #[error("Operation {operation} is not supported by {client_type} clients")]
    Unsupported {
        /// Client type
        client_type: &'static str,
        /// Operation name
        operation: &'static str,
    },

    /// A proxy client builder was registered twice.
    #[error("Proxy client builder already registered: {0}")]
    DuplicateRegistration(String),

    /// No proxy client builder registered for the client type.
    #[error("No proxy client builder registered for {0}")]
    NotRegistered(String),

    /// Processed time or height metadata is missing for a consensus height.
    #[error("Processed metadata not found for height {0}")]
    ProcessedMetadataNotFound(Height),

    /// The delay period has not elapsed since the consensus state was stored.
    #[error("Delay period not passed: {0}")]
    DelayPeriodNotPassed(String),
}

impl ClientError {
    /// Wrap this error as the failure of hop `hop`.
    pub fn at_hop(self, hop: usize, client_id: impl Into<String>) -> Self {
        ClientError::HopVerification {
            hop,
            client_id: client_id.into(),
            source: Box::new(self),
        }
    }

    /// Hop index of a multi-hop failure.
    pub fn failing_hop(&self) -> Option<usize> {
        match self {
            ClientError::HopVerification { hop, .. } => Some(*hop),
            _ => None,
        }
    }
}
