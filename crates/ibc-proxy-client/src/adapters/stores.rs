//! Client Store Views
//!
//! `SingleFactStore` is an ephemeral store holding one consensus state, used
//! to verify against a consensus value that never lives in a real store.
//! `ProxyExtractorStore` lets a wrapped client read a proxy client's store:
//! consensus states are stored as `ProxyConsensusState` and unwrapped on read.

use ibc_proxy_types::path::{consensus_state_key, is_consensus_state_key};
use ibc_proxy_types::{Height, KvRead, KvStore};

use crate::clients::AnyConsensusState;
use crate::domain::ClientError;

/// Read-only store containing exactly one `(key, value)` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingleFactStore {
    key: Vec<u8>,
    value: Vec<u8>,
}

impl SingleFactStore {
    /// Store holding a single entry.
    pub fn new(key: impl Into<Vec<u8>>, value: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Store holding `consensus_state` at `consensusStates/<height>`.
    pub fn consensus(
        height: &Height,
        consensus_state: &AnyConsensusState,
    ) -> Result<Self, ClientError> {
        Ok(Self::new(
            consensus_state_key(height).into_bytes(),
            consensus_state.to_bytes()?,
        ))
    }
}

impl KvRead for SingleFactStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        (key == self.key.as_slice()).then(|| self.value.clone())
    }
}

/// View of a proxy client's store as seen by the wrapped client.
#[derive(Clone, Debug)]
pub struct ProxyExtractorStore<S> {
    inner: S,
}

impl<S> ProxyExtractorStore<S> {
    /// Wrap a proxy client store.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: KvRead> KvRead for ProxyExtractorStore<S> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let value = self.inner.get(key)?;
        if !is_consensus_state_key(key) {
            return Some(value);
        }
        // Values that are not proxy consensus states pass through untouched,
        // so decode errors surface in the reading client.
        match AnyConsensusState::from_bytes(&value) {
            Ok(AnyConsensusState::Proxy(proxy)) => proxy.inner.to_bytes().ok().or(Some(value)),
            _ => Some(value),
        }
    }

    fn has(&self, key: &[u8]) -> bool {
        self.inner.has(key)
    }
}

impl<S: KvStore> KvStore for ProxyExtractorStore<S> {
    fn set(&self, key: &[u8], value: Vec<u8>) {
        self.inner.set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{MerkleConsensusState, ProxyConsensusState};
    use ibc_proxy_types::MemoryStore;

    fn merkle_cs(ts: u64) -> AnyConsensusState {
        AnyConsensusState::Merkle(MerkleConsensusState {
            root: [3u8; 32],
            timestamp: ts,
        })
    }

    #[test]
    fn test_single_fact_store() {
        let h = Height::new(0, 4);
        let store = SingleFactStore::consensus(&h, &merkle_cs(1)).unwrap();
        assert_eq!(
            store.get(b"consensusStates/0-4"),
            Some(merkle_cs(1).to_bytes().unwrap())
        );
        assert!(!store.has(b"consensusStates/0-5"));
        assert!(!store.has(b"clientState"));
    }

    #[test]
    fn test_extractor_unwraps_proxy_consensus() {
        let store = MemoryStore::new();
        let wrapped = AnyConsensusState::Proxy(ProxyConsensusState::new(merkle_cs(9)));
        store.set(b"consensusStates/0-2", wrapped.to_bytes().unwrap());
        store.set(b"clientState", vec![1, 2]);

        let view = ProxyExtractorStore::new(&store);
        assert_eq!(
            view.get(b"consensusStates/0-2"),
            Some(merkle_cs(9).to_bytes().unwrap())
        );
        assert_eq!(view.get(b"clientState"), Some(vec![1, 2]));
        assert_eq!(view.get(b"consensusStates/0-3"), None);
    }

    #[test]
    fn test_extractor_passes_through_plain_values() {
        let store = MemoryStore::new();
        store.set(b"consensusStates/0-2", merkle_cs(5).to_bytes().unwrap());
        store.set(b"consensusStates/0-3", b"junk".to_vec());
        let view = ProxyExtractorStore::new(&store);
        assert_eq!(
            view.get(b"consensusStates/0-2"),
            Some(merkle_cs(5).to_bytes().unwrap())
        );
        assert_eq!(view.get(b"consensusStates/0-3"), Some(b"junk".to_vec()));
    }

    #[test]
    fn test_extractor_writes_through() {
        let store = MemoryStore::new();
        let view = ProxyExtractorStore::new(&store);
        view.set(b"processedTimes/0-1", vec![0; 8]);
        assert!(store.has(b"processedTimes/0-1"));
    }
}
