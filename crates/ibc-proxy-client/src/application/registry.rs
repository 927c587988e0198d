//! # Proxy Client Registry
//!
//! Proxy client builders keyed by wrapped client type. A registry is
//! assembled once with [`ProxyClientRegistryBuilder`] and is immutable
//! afterwards; header updates receive it by reference.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::clients::MerkleProxyClientBuilder;
use crate::domain::ClientError;
use crate::ports::ProxyClientBuilder;

/// Accumulates builders before freezing them into a registry.
#[derive(Default)]
pub struct ProxyClientRegistryBuilder {
    builders: BTreeMap<&'static str, Box<dyn ProxyClientBuilder>>,
}

impl ProxyClientRegistryBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder for its client type.
    pub fn register<B>(&mut self, builder: B) -> Result<&mut Self, ClientError>
    where
        B: ProxyClientBuilder + 'static,
    {
        let client_type = builder.client_type();
        if self.builders.contains_key(client_type) {
            return Err(ClientError::DuplicateRegistration(client_type.to_string()));
        }
        debug!(client_type, "[proxy-registry] builder registered");
        self.builders.insert(client_type, Box::new(builder));
        Ok(self)
    }

    /// Freeze into an immutable registry.
    pub fn build(self) -> ProxyClientRegistry {
        ProxyClientRegistry {
            builders: self.builders,
        }
    }
}

/// Immutable set of proxy client builders.
pub struct ProxyClientRegistry {
    builders: BTreeMap<&'static str, Box<dyn ProxyClientBuilder>>,
}

impl ProxyClientRegistry {
    /// Registry without builders.
    pub fn empty() -> Self {
        ProxyClientRegistryBuilder::new().build()
    }

    /// Registry with the builders of every in-tree client type.
    pub fn with_defaults() -> Self {
        let mut builder = ProxyClientRegistryBuilder::new();
        builder.builders.insert(
            MerkleProxyClientBuilder.client_type(),
            Box::new(MerkleProxyClientBuilder),
        );
        builder.build()
    }

    /// Builder for `client_type`.
    pub fn get(&self, client_type: &str) -> Result<&dyn ProxyClientBuilder, ClientError> {
        self.builders
            .get(client_type)
            .map(|b| b.as_ref())
            .ok_or_else(|| ClientError::NotRegistered(client_type.to_string()))
    }

    /// Registered client types, in order.
    pub fn client_types(&self) -> Vec<&'static str> {
        self.builders.keys().copied().collect()
    }
}

impl Default for ProxyClientRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ProxyClientRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyClientRegistry")
            .field("client_types", &self.client_types())
            .finish()
    }
}
