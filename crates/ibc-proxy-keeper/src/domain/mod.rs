//! # Domain Layer
//!
//! Errors, messages, bootstrap payloads and invariants of the proxy keeper.

pub mod errors;
pub mod invariants;
pub mod messages;
pub mod value_objects;

pub use errors::ProxyError;
pub use invariants::{
    invariant_bootstrap_transition, invariant_connection_supports_order,
    invariant_prefix_matches,
};
pub use messages::{
    MsgProxyAcknowledgePacket, MsgProxyChannelOpen, MsgProxyChannelOpenConfirm,
    MsgProxyClientState, MsgProxyConnectionOpen, MsgProxyConnectionOpenConfirm,
    MsgProxyRecvPacket, MsgProxyTimeoutPacket, MsgProxyUpstreamBlockTime, ProxyMsg,
};
pub use value_objects::{
    AckStatus, BootstrapState, CommitmentKind, ProxyRequestAcknowledgement,
    ProxyRequestPacketData, UpstreamState, PROXY_PORT_ID, PROXY_VERSION,
};
