//! # Multi-Chain Harness
//!
//! In-memory chains that commit real blocks, and a coordinator that
//! wires light clients between them.

pub mod chain;
pub mod coordinator;

pub use chain::{TestChain, BLOCK_TIME};
pub use coordinator::Coordinator;
