//! # IBC Proxy Light Clients
//!
//! Light clients that let a chain verify facts about a chain it has no
//! direct client for, by routing trust through one or more proxy chains.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Client Variants
//!
//! | Client | Verifies |
//! |--------|----------|
//! | Merkle | Facts committed by a directly tracked chain |
//! | Proxy | Upstream facts re-committed by a proxy chain under `proxy/<upstream-client-id>/` |
//! | Multi-hop | Client and consensus states at the end of an N-hop proxy chain |
//!
//! ## Module Structure
//!
//! ```text
//! ibc-proxy-client/
//! ├── domain/          # Errors, proof shapes, multi-hop proof, invariants
//! ├── algorithms/      # Commitment tree proofs, chain walker
//! ├── ports/           # LightClient (inbound) + proxy client builders (outbound)
//! ├── clients/         # Merkle, proxy and multi-hop client variants
//! ├── adapters/        # Single-fact and proxy-extractor store views
//! └── application/     # Proxy client registry
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod clients;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{ProxyExtractorStore, SingleFactStore};
pub use algorithms::{ChainWalker, CommitmentTree, TrustedHop};
pub use application::{ProxyClientRegistry, ProxyClientRegistryBuilder};
pub use clients::{
    AnyClientState, AnyConsensusState, AnyHeader, MerkleClientState, MerkleConsensusState,
    MerkleHeader, MerkleProxyClientBuilder, MultiHopClientState, ProxyClientState,
    ProxyConsensusState, ProxyHeader, UpstreamBlockProof,
};
pub use domain::{
    ClientError, CommitmentProof, DelayContext, GenesisMetadata, Hash, HostInfo, LeafSegment,
    MultiHopProof, ProofContext, ProofSegment, Status, MERKLE_CLIENT_TYPE, MULTIHOP_CLIENT_TYPE,
    PROXY_CLIENT_TYPE,
};
pub use ports::{BlockTimeVerifier, LightClient, ProxyClientBuilder, UpdateContext};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
