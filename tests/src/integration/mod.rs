//! # End-to-End Scenarios
//!
//! Every scenario runs over [`crate::harness`] chains, so each proof is
//! checked against a root a real client stored.

pub mod bootstrap;
pub mod multihop;
pub mod properties;
pub mod proxy_flow;
