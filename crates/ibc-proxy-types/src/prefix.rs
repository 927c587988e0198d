//! # Commitment Prefix
//!
//! The namespace a chain commits its IBC state under. Prefixes are plain
//! byte strings and compose by concatenation: a proxy exposes the upstream's
//! facts under `proxy_prefix ++ "<upstream_client_id>/" ++ upstream_prefix`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A commitment-store namespace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentPrefix(Vec<u8>);

impl CommitmentPrefix {
    /// Wrap raw prefix bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the prefix is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Full store key of `path` under this prefix.
    pub fn apply_path(&self, path: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.0.len() + path.len());
        key.extend_from_slice(&self.0);
        key.extend_from_slice(path.as_bytes());
        key
    }

    /// Prefix under which a proxy exposes facts rooted in an upstream chain.
    pub fn compose(
        proxy_prefix: &CommitmentPrefix,
        upstream_client_id: &str,
        caller_prefix: &CommitmentPrefix,
    ) -> CommitmentPrefix {
        let mut bytes = Vec::with_capacity(
            proxy_prefix.0.len() + upstream_client_id.len() + 1 + caller_prefix.0.len(),
        );
        bytes.extend_from_slice(&proxy_prefix.0);
        bytes.extend_from_slice(upstream_client_id.as_bytes());
        bytes.push(b'/');
        bytes.extend_from_slice(&caller_prefix.0);
        CommitmentPrefix(bytes)
    }
}

impl From<&str> for CommitmentPrefix {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes().to_vec())
    }
}

impl fmt::Display for CommitmentPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) => f.write_str(s),
            Err(_) => write!(f, "0x{}", hex::encode(&self.0)),
        }
    }
}
