//! # IBC Proxy Keeper
//!
//! Lets a chain act as a proxy between an upstream chain it tracks and
//! downstream chains that only track the proxy. Upstream facts are verified
//! against the local client of the upstream and re-committed under the
//! proxy prefix, where downstream proxy clients prove them.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Operations
//!
//! | Area | Operations |
//! |------|------------|
//! | Commitments | `verify_*` / `verify_and_proxy_*` for client, consensus, connection, channel and packet facts |
//! | Handshakes | connection and channel `OpenTry`/`OpenAck`/`OpenConfirm`/`OpenFinalize` |
//! | Packets | `RecvPacket`, `AcknowledgePacket`, `TimeoutPacket` |
//! | Bootstrap | proxy client request / serve / fulfil over the `proxy` port |
//!
//! ## Proxy Namespace
//!
//! ```text
//! proxy/<upstream-client-id>/ibc/clients/<id>/clientState
//! proxy/<upstream-client-id>/ibc/connections/<id>
//! proxy/<upstream-client-id>/ibc/commitments/<port>/<channel>/<seq>
//! proxy/<upstream-client-id>/block/<height>
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! ibc-proxy-keeper/
//! ├── domain/          # Errors, messages, bootstrap payloads, invariants
//! ├── algorithms/      # Block delay, proxy key layout
//! ├── ports/           # Message handler + channel callbacks (inbound), host keepers (outbound)
//! ├── adapters/        # Proxy store, in-memory host chain
//! ├── application/     # Keeper, handshakes, bootstrap, module callbacks, router
//! └── config.rs        # Prefixes, port, version, expected block time
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{CommittedBlock, InMemoryHost, ProxyStore};
pub use algorithms::{block_delay, ProxyKeys};
pub use application::ProxyKeeper;
pub use config::ProxyConfig;
pub use domain::{
    AckStatus, BootstrapState, CommitmentKind, MsgProxyAcknowledgePacket, MsgProxyChannelOpen,
    MsgProxyChannelOpenConfirm, MsgProxyClientState, MsgProxyConnectionOpen,
    MsgProxyConnectionOpenConfirm, MsgProxyRecvPacket, MsgProxyTimeoutPacket,
    MsgProxyUpstreamBlockTime, ProxyError, ProxyMsg, ProxyRequestAcknowledgement,
    ProxyRequestPacketData, UpstreamState, PROXY_PORT_ID, PROXY_VERSION,
};
pub use ports::{
    ChannelKeeper, ClientKeeper, ConnectionKeeper, HostContext, IbcModule, ProxyHost,
    ProxyMsgHandler,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
