//! # Multi-Hop Proof
//!
//! Wire evidence of an N-hop trust chain: a head segment verified by the
//! local base client, `depth` branch segments each verified by the previous
//! hop's proxy client, and a leaf carrying the proof of the requested fact.

use ibc_proxy_types::{decode, encode, Any, Height};
use serde::{Deserialize, Serialize};

use crate::domain::errors::ClientError;

/// One hop's authenticated proxy client and consensus snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofSegment {
    /// Proxy client state stored by the previous hop.
    pub client_state: Any,
    /// Proof of `client_state`.
    pub client_proof: Vec<u8>,
    /// Proxy consensus state stored by the previous hop.
    pub consensus_state: Any,
    /// Proof of `consensus_state`.
    pub consensus_proof: Vec<u8>,
    /// Height the consensus state is stored at.
    pub consensus_height: Height,
    /// Height both proofs were generated at.
    pub proof_height: Height,
}

/// Final proof of the requested fact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeafSegment {
    /// Proof of a client state.
    Client {
        /// Existence proof.
        proof: Vec<u8>,
        /// Height the proof was generated at.
        proof_height: Height,
    },
    /// Proof of a consensus state.
    Consensus {
        /// Existence proof.
        proof: Vec<u8>,
        /// Height the proof was generated at.
        proof_height: Height,
        /// Height the proven consensus state is stored at.
        consensus_height: Height,
    },
}

impl LeafSegment {
    /// Variant name, for error reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            LeafSegment::Client { .. } => "client",
            LeafSegment::Consensus { .. } => "consensus",
        }
    }

    /// Height the leaf proof was generated at.
    pub fn proof_height(&self) -> Height {
        match self {
            LeafSegment::Client { proof_height, .. }
            | LeafSegment::Consensus { proof_height, .. } => *proof_height,
        }
    }
}

/// A multi-hop proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiHopProof {
    /// Segment verified against the local base client.
    pub head: ProofSegment,
    /// Intermediate segments, in walk order.
    pub branches: Vec<ProofSegment>,
    /// Proof of the requested fact.
    pub leaf: LeafSegment,
}

impl MultiHopProof {
    /// Wire bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ClientError> {
        Ok(encode(self)?)
    }

    /// Parse wire bytes. Anything that is not exactly a `MultiHopProof` is
    /// malformed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ClientError> {
        decode(bytes).map_err(|e| ClientError::MalformedProof(e.to_string()))
    }
}
