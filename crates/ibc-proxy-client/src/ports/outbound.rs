//! # Outbound Ports
//!
//! Per-client-type capabilities the proxy client looks up in the registry:
//! a builder that turns a wrapped client state into a block-time verifier.

use ibc_proxy_types::{Height, KvRead};

use crate::clients::AnyClientState;
use crate::domain::{ClientError, ProofContext};

/// Verifies an upstream block time exposed by a proxy chain.
pub trait BlockTimeVerifier {
    /// Verify that the proxy chain committed `timestamp` for the upstream
    /// block at `upstream_height`, under `proof.prefix`.
    fn verify_block_time(
        &self,
        store: &dyn KvRead,
        proof: ProofContext<'_>,
        upstream_height: Height,
        timestamp: u64,
    ) -> Result<(), ClientError>;
}

/// Builds block-time verifiers for one wrapped client type - outbound port.
pub trait ProxyClientBuilder: Send + Sync {
    /// Client type this builder handles.
    fn client_type(&self) -> &'static str;

    /// Build a verifier from a wrapped client state of this builder's type.
    fn build(&self, client_state: &AnyClientState)
        -> Result<Box<dyn BlockTimeVerifier>, ClientError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock builder whose verifiers accept or reject every proof.
#[derive(Clone, Debug)]
pub struct MockProxyClientBuilder {
    /// Client type served.
    pub client_type: &'static str,
    /// Should verification fail?
    pub should_fail: bool,
}

impl MockProxyClientBuilder {
    /// Builder whose verifiers accept.
    pub fn accepting(client_type: &'static str) -> Self {
        Self {
            client_type,
            should_fail: false,
        }
    }

    /// Builder whose verifiers reject.
    pub fn rejecting(client_type: &'static str) -> Self {
        Self {
            client_type,
            should_fail: true,
        }
    }
}

struct MockBlockTimeVerifier {
    should_fail: bool,
}

impl BlockTimeVerifier for MockBlockTimeVerifier {
    fn verify_block_time(
        &self,
        _store: &dyn KvRead,
        _proof: ProofContext<'_>,
        upstream_height: Height,
        _timestamp: u64,
    ) -> Result<(), ClientError> {
        if self.should_fail {
            return Err(ClientError::InvalidProof(format!(
                "mock rejected block time at {upstream_height}"
            )));
        }
        Ok(())
    }
}

impl ProxyClientBuilder for MockProxyClientBuilder {
    fn client_type(&self) -> &'static str {
        self.client_type
    }

    fn build(
        &self,
        _client_state: &AnyClientState,
    ) -> Result<Box<dyn BlockTimeVerifier>, ClientError> {
        Ok(Box::new(MockBlockTimeVerifier {
            should_fail: self.should_fail,
        }))
    }
}
