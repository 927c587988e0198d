//! # Application Layer
//!
//! The proxy keeper and its operations:
//!
//! - `keeper`: single-hop verification and verify-then-commit
//! - `handshake`: proxied connection, channel and packet steps
//! - `bootstrap`: proxy client bootstrap over the `proxy` port
//! - `module`: channel callbacks of the `proxy` port
//! - `router`: relayer message dispatch

pub mod bootstrap;
pub mod handshake;
pub mod keeper;
pub mod module;
pub mod router;

#[cfg(test)]
pub(crate) mod fixtures;

pub use keeper::ProxyKeeper;
