//! # IBC Proxy Test Suite
//!
//! Multi-chain harness and end-to-end scenarios for the proxy workspace.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness/          # TestChain + Coordinator over in-memory hosts
//! │   ├── chain.rs
//! │   └── coordinator.rs
//! │
//! └── integration/      # End-to-end scenarios
//!     ├── multihop.rs   # Chain-walker over real committed chains
//!     ├── proxy_flow.rs # Proxied handshakes read back by a downstream proxy client
//!     ├── bootstrap.rs  # Proxy client bootstrap over the `proxy` port
//!     └── properties.rs # Commitment and delay properties
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ibc-proxy-tests
//!
//! # By category
//! cargo test -p ibc-proxy-tests integration::multihop
//! cargo test -p ibc-proxy-tests integration::proxy_flow
//!
//! # Benchmarks
//! cargo bench -p ibc-proxy-tests
//! ```

pub mod harness;
pub mod integration;
