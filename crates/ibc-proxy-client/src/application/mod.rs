//! # Application Layer
//!
//! Process-wide wiring shared by every client: the proxy client registry.

pub mod registry;

pub use registry::{ProxyClientRegistry, ProxyClientRegistryBuilder};
