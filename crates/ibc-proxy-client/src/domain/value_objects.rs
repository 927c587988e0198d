//! # Value Objects
//!
//! Immutable values passed through verification: proof nodes, commitment
//! proofs, host/delay context and client status.

use ibc_proxy_types::{CommitmentPrefix, Height};
use serde::{Deserialize, Serialize};

/// Hash type alias (32-byte SHA-256)
pub type Hash = [u8; 32];

/// Client type of the merkle reference client.
pub const MERKLE_CLIENT_TYPE: &str = "merkle";
/// Client type of the proxy client.
pub const PROXY_CLIENT_TYPE: &str = "proxy";
/// Client type of the multi-hop client.
pub const MULTIHOP_CLIENT_TYPE: &str = "multihop";

/// Position of sibling in Merkle proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    /// Sibling is on the left.
    Left,
    /// Sibling is on the right.
    Right,
}

/// Node in a Merkle proof path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNode {
    /// Hash of the sibling node.
    pub hash: Hash,
    /// Position of sibling (left or right).
    pub position: Position,
}

/// Inclusion proof of one `(key, value)` leaf of a commitment tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistenceProof {
    /// Full store key of the leaf.
    pub key: Vec<u8>,
    /// SHA-256 of the leaf value.
    pub value_hash: Hash,
    /// Sibling path from leaf to tree root.
    pub path: Vec<ProofNode>,
    /// Number of leaves in the tree.
    pub leaf_count: u64,
}

/// Exclusion proof: the neighbours bracketing an absent key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonExistenceProof {
    /// The absent key.
    pub key: Vec<u8>,
    /// Greatest present key below `key`.
    pub left: Option<ExistenceProof>,
    /// Smallest present key above `key`.
    pub right: Option<ExistenceProof>,
}

/// Commitment proof as carried in proof bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitmentProof {
    /// Key is present.
    Exist(ExistenceProof),
    /// Key is absent.
    NonExist(NonExistenceProof),
}

/// Client liveness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Usable for verification.
    Active,
    /// Frozen after misbehaviour.
    Frozen,
    /// Not usable (e.g. an uninitialized proxy).
    Unknown,
}

/// Current height and time of the verifying (host) chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    /// Host block height.
    pub height: Height,
    /// Host block time in nanoseconds.
    pub timestamp: u64,
}

impl HostInfo {
    /// Create host info.
    pub fn new(height: Height, timestamp: u64) -> Self {
        Self { height, timestamp }
    }
}

/// Delay requirements for packet verification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DelayContext {
    /// Host state at verification time.
    pub host: HostInfo,
    /// Minimum elapsed time (ns) since the consensus state was processed.
    pub delay_time: u64,
    /// Minimum elapsed blocks since the consensus state was processed.
    pub delay_blocks: u64,
}

impl DelayContext {
    /// No delay enforced.
    pub fn none(host: HostInfo) -> Self {
        Self {
            host,
            delay_time: 0,
            delay_blocks: 0,
        }
    }

    /// Whether any delay is enforced.
    pub fn is_enforced(&self) -> bool {
        self.delay_time > 0 || self.delay_blocks > 0
    }
}

/// Where a proof is rooted: counterparty height, prefix and proof bytes.
#[derive(Clone, Copy, Debug)]
pub struct ProofContext<'a> {
    /// Counterparty height the proof was generated at.
    pub height: Height,
    /// Commitment prefix the proven path lives under.
    pub prefix: &'a CommitmentPrefix,
    /// Encoded proof.
    pub proof: &'a [u8],
}

impl<'a> ProofContext<'a> {
    /// Create a proof context.
    pub fn new(height: Height, prefix: &'a CommitmentPrefix, proof: &'a [u8]) -> Self {
        Self {
            height,
            prefix,
            proof,
        }
    }

    /// Same proof under another prefix.
    pub fn with_prefix<'b>(&self, prefix: &'b CommitmentPrefix) -> ProofContext<'b>
    where
        'a: 'b,
    {
        ProofContext {
            height: self.height,
            prefix,
            proof: self.proof,
        }
    }
}

/// A client-store entry exported for genesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisMetadata {
    /// Client-store key.
    pub key: Vec<u8>,
    /// Stored value.
    pub value: Vec<u8>,
}
