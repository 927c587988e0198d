//! # Adapters Layer
//!
//! - `proxy_store`: typed proxy module state over any [`KvStore`]
//! - `in_memory_host`: a complete host chain over a shared memory store
//!
//! [`KvStore`]: ibc_proxy_types::KvStore

pub mod in_memory_host;
pub mod proxy_store;

pub use in_memory_host::{CommittedBlock, InMemoryHost};
pub use proxy_store::ProxyStore;
