//! # Adapters Layer (Hexagonal Architecture)
//!
//! Store views light clients verify through.

mod stores;

pub use stores::{ProxyExtractorStore, SingleFactStore};
