//! # Algorithms
//!
//! Pure helpers of the proxy keeper: block delays and the proxy namespace
//! key layout.

pub mod block_delay;
pub mod commitment_keys;

pub use block_delay::block_delay;
pub use commitment_keys::{
    bootstrap_request_key, packet_receipt_absence_path, proxy_enabled_key, ProxyKeys,
    RECEIPT_ABSENCE_VALUE,
};
