//! # Proxy Keeper Configuration

use ibc_proxy_types::CommitmentPrefix;
use serde::{Deserialize, Serialize};

use crate::domain::{PROXY_PORT_ID, PROXY_VERSION};

/// Default expected block time: 30 seconds, in nanoseconds.
pub const DEFAULT_MAX_EXPECTED_TIME_PER_BLOCK: u64 = 30_000_000_000;

/// Configuration of a proxy keeper.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Prefix of the host's own IBC store.
    pub ibc_prefix: CommitmentPrefix,
    /// Prefix of the proxy commitment namespace.
    pub proxy_prefix: CommitmentPrefix,
    /// Port the bootstrap module binds.
    pub port_id: String,
    /// Channel version of the bootstrap module.
    pub version: String,
    /// Expected time per block (ns), used to derive block delays.
    /// Zero disables block delays.
    pub max_expected_time_per_block: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            ibc_prefix: CommitmentPrefix::from("ibc/"),
            proxy_prefix: CommitmentPrefix::from("proxy/"),
            port_id: PROXY_PORT_ID.to_string(),
            version: PROXY_VERSION.to_string(),
            max_expected_time_per_block: DEFAULT_MAX_EXPECTED_TIME_PER_BLOCK,
        }
    }
}

impl ProxyConfig {
    /// Create config for testing: no block delay, so proofs verify
    /// as soon as a consensus state is stored.
    pub fn for_testing() -> Self {
        Self {
            max_expected_time_per_block: 0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefixes() {
        let config = ProxyConfig::default();
        assert_eq!(config.ibc_prefix, CommitmentPrefix::from("ibc/"));
        assert_eq!(config.proxy_prefix, CommitmentPrefix::from("proxy/"));
        assert_eq!(config.port_id, "proxy");
        assert_eq!(config.version, "proxy-1");
    }

    #[test]
    fn test_for_testing_disables_block_delay() {
        let config = ProxyConfig::for_testing();
        assert_eq!(config.max_expected_time_per_block, 0);
        assert_eq!(config.ibc_prefix, ProxyConfig::default().ibc_prefix);
    }
}
