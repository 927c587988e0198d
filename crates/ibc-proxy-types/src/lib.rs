//! # IBC Proxy Types
//!
//! Shared vocabulary of the proxy workspace: heights, commitment prefixes,
//! host store paths, connection/channel/packet records, the `Any` envelope
//! and the key-value store ports.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses the light-client /
//!   keeper boundary is defined here.
//! - **Deterministic Encoding**: values committed to a store are encoded with
//!   fixed-width bincode, so identical values always commit to identical bytes.
//! - **Narrow Store Contract**: verification only ever needs `KvRead`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod codec;
pub mod connection;
pub mod errors;
pub mod height;
pub mod path;
pub mod prefix;
pub mod store;

pub use channel::{
    commit_acknowledgement, commit_packet, Acknowledgement, ChannelCounterparty, ChannelEnd,
    ChannelState, Order, Packet,
};
pub use codec::{decode, encode, Any};
pub use connection::{ConnectionCounterparty, ConnectionEnd, ConnectionState, Version};
pub use errors::{validate_identifier, TypesError};
pub use height::Height;
pub use prefix::CommitmentPrefix;
pub use store::{KvRead, KvStore, MemoryStore, PrefixStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
