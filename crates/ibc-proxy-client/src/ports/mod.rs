//! # Ports Module
//!
//! Hexagonal architecture ports (light-client capability, proxy builders).

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
