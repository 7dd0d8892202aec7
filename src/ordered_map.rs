//! OrderedMap: key/value façade over one `OrderedStore`.

use crate::compaction::CompactionPolicy;
use crate::ordered_store::{self, OrderedStore};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Insertion-ordered map whose traversal callbacks may mutate the map.
///
/// Callbacks receive `(value, key, map)`; the map handed back is this
/// façade, not the underlying store.
pub struct OrderedMap<K, V, S = RandomState> {
    store: OrderedStore<K, V, S>,
}

impl<K, V> OrderedMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            store: OrderedStore::new(),
        }
    }

    pub fn with_policy(policy: CompactionPolicy) -> Self {
        Self {
            store: OrderedStore::with_policy(policy),
        }
    }
}

impl<K, V> Default for OrderedMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            store: OrderedStore::with_hasher(hasher),
        }
    }

    pub fn with_hasher_and_policy(hasher: S, policy: CompactionPolicy) -> Self {
        Self {
            store: OrderedStore::with_hasher_and_policy(hasher, policy),
        }
    }

    /// The backing store, for inspecting slot and hole counts.
    pub fn store(&self) -> &OrderedStore<K, V, S> {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn has<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.has(q)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.has(q)
    }

    pub fn get<Q>(&self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.store.get(q)
    }

    pub fn get_with<Q, R, F>(&self, q: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.store.get_with(q, f)
    }

    pub fn set(&self, key: K, value: V) -> &Self {
        self.store.set(key, value);
        self
    }

    pub fn delete<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.delete(q)
    }

    pub fn remove<Q>(&self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.remove_entry(q).map(|(_, v)| v)
    }

    pub fn clear(&self) {
        self.store.clear()
    }

    /// Visit entries in insertion order as `f(value, key, map)`.
    pub fn for_each<F>(&self, mut f: F)
    where
        K: Clone,
        V: Clone,
        F: FnMut(&V, &K, &Self),
    {
        for (k, v) in self.store.iter() {
            f(&v, &k, self);
        }
    }

    /// Visit entries as `f(receiver, value, key, map)`.
    pub fn for_each_with<R, F>(&self, receiver: &R, mut f: F)
    where
        R: ?Sized,
        K: Clone,
        V: Clone,
        F: FnMut(&R, &V, &K, &Self),
    {
        for (k, v) in self.store.iter() {
            f(receiver, &v, &k, self);
        }
    }

    pub fn try_for_each<E, F>(&self, mut f: F) -> Result<(), E>
    where
        K: Clone,
        V: Clone,
        F: FnMut(&V, &K, &Self) -> Result<(), E>,
    {
        for (k, v) in self.store.iter() {
            f(&v, &k, self)?;
        }
        Ok(())
    }

    pub fn iter(&self) -> ordered_store::Iter<'_, K, V, S> {
        self.store.iter()
    }

    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.store.keys()
    }

    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.store.values()
    }
}

impl<K, V, S> fmt::Debug for OrderedMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.store, f)
    }
}

impl<K, V, S> Clone for OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            store: OrderedStore::from_iter(iter),
        }
    }
}

impl<K, V, S> Extend<(K, V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.store.extend(iter);
    }
}
