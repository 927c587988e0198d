//! # Ports Layer
//!
//! - **Inbound**: relayer message handler, channel callbacks
//! - **Outbound**: host-chain keepers, current block, chain store

pub mod inbound;
pub mod outbound;

pub use inbound::{IbcModule, ProxyMsgHandler};
pub use outbound::{ChannelKeeper, ClientKeeper, ConnectionKeeper, HostContext, ProxyHost};
