//! # Connection Records
//!
//! ICS-03 connection ends as stored in a host's IBC namespace.

use serde::{Deserialize, Serialize};

use crate::prefix::CommitmentPrefix;

/// Connection handshake state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Not yet created.
    Uninitialized,
    /// `ConnOpenInit` executed.
    Init,
    /// `ConnOpenTry` executed.
    TryOpen,
    /// Handshake complete.
    Open,
}

/// A negotiated connection version.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Version identifier.
    pub identifier: String,
    /// Supported channel orderings (`ORDER_ORDERED`, `ORDER_UNORDERED`).
    pub features: Vec<String>,
}

impl Version {
    /// The default IBC connection version.
    pub fn default_ibc() -> Self {
        Self {
            identifier: "1".into(),
            features: vec!["ORDER_ORDERED".into(), "ORDER_UNORDERED".into()],
        }
    }

    /// Whether this version supports `feature`.
    pub fn supports_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// The other end of a connection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionCounterparty {
    /// Client on the counterparty chain tracking this chain.
    pub client_id: String,
    /// Counterparty connection id; empty until known.
    pub connection_id: String,
    /// Counterparty commitment prefix.
    pub prefix: CommitmentPrefix,
}

/// A connection end.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionEnd {
    /// Handshake state.
    pub state: ConnectionState,
    /// Local client tracking the counterparty.
    pub client_id: String,
    /// Counterparty information.
    pub counterparty: ConnectionCounterparty,
    /// Compatible versions.
    pub versions: Vec<Version>,
    /// Delay period in nanoseconds.
    pub delay_period: u64,
}

impl ConnectionEnd {
    /// Whether the connection completed its handshake.
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }
}
