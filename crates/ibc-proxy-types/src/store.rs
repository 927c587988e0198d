//! # Key-Value Store Ports
//!
//! The store capability consumed by light clients and the proxy keeper,
//! split into a read side (`KvRead`, all verification needs) and a write
//! side (`KvStore`). `MemoryStore` is the in-memory implementation; clones
//! share the same underlying map.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Read access to a key-value store.
pub trait KvRead {
    /// Value stored under `key`.
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Whether `key` is present.
    fn has(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }
}

/// Read/write access to a key-value store.
pub trait KvStore: KvRead {
    /// Store `value` under `key`, overwriting any previous value.
    fn set(&self, key: &[u8], value: Vec<u8>);
}

impl<T: KvRead + ?Sized> KvRead for &T {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        (**self).get(key)
    }
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn set(&self, key: &[u8], value: Vec<u8>) {
        (**self).set(key, value)
    }
}

/// Shared in-memory ordered store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every entry, in key order.
    pub fn snapshot(&self) -> BTreeMap<Vec<u8>, Vec<u8>> {
        self.inner.read().clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// View of this store under `prefix`.
    pub fn prefixed(&self, prefix: impl Into<Vec<u8>>) -> PrefixStore<MemoryStore> {
        PrefixStore::new(self.clone(), prefix)
    }
}

impl KvRead for MemoryStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.inner.read().get(key).cloned()
    }

    fn has(&self, key: &[u8]) -> bool {
        self.inner.read().contains_key(key)
    }
}

impl KvStore for MemoryStore {
    fn set(&self, key: &[u8], value: Vec<u8>) {
        self.inner.write().insert(key.to_vec(), value);
    }
}

/// A store view that transparently prefixes every key.
#[derive(Clone, Debug)]
pub struct PrefixStore<S> {
    parent: S,
    prefix: Vec<u8>,
}

impl<S> PrefixStore<S> {
    /// Wrap `parent` under `prefix`.
    pub fn new(parent: S, prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            parent,
            prefix: prefix.into(),
        }
    }

    fn full_key(&self, key: &[u8]) -> Vec<u8> {
        let mut full = Vec::with_capacity(self.prefix.len() + key.len());
        full.extend_from_slice(&self.prefix);
        full.extend_from_slice(key);
        full
    }
}

impl<S: KvRead> KvRead for PrefixStore<S> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.parent.get(&self.full_key(key))
    }

    fn has(&self, key: &[u8]) -> bool {
        self.parent.has(&self.full_key(key))
    }
}

impl<S: KvStore> KvStore for PrefixStore<S> {
    fn set(&self, key: &[u8], value: Vec<u8>) {
        self.parent.set(&self.full_key(key), value)
    }
}
