//! OrderedSet: a map whose value is its own key.

use crate::compaction::CompactionPolicy;
use crate::ordered_store::OrderedStore;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Insertion-ordered set whose traversal callbacks may mutate the set.
///
/// Stored as `(v, v)` pairs, so callbacks receive `(value, value, set)`.
pub struct OrderedSet<T, S = RandomState> {
    store: OrderedStore<T, T, S>,
}

impl<T> OrderedSet<T>
where
    T: Eq + Hash,
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

impl<T> Default for OrderedSet<T>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> OrderedSet<T, S>
where
    T: Eq + Hash,
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

    pub fn store(&self) -> &OrderedStore<T, T, S> {
        &self.store
    }

    /// Number of members.
    pub fn size(&self) -> usize {
        self.store.len()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn has<Q>(&self, q: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.has(q)
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.has(q)
    }

    /// Add `value`. Re-adding a member keeps its position.
    pub fn add(&self, value: T) -> &Self
    where
        T: Clone,
    {
        self.store.set(value.clone(), value);
        self
    }

    pub fn delete<Q>(&self, q: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.delete(q)
    }

    pub fn clear(&self) {
        self.store.clear()
    }

    /// Visit members in insertion order as `f(value, value, set)`.
    pub fn for_each<F>(&self, mut f: F)
    where
        T: Clone,
        F: FnMut(&T, &T, &Self),
    {
        for (k, v) in self.store.iter() {
            f(&v, &k, self);
        }
    }

    pub fn for_each_with<R, F>(&self, receiver: &R, mut f: F)
    where
        R: ?Sized,
        T: Clone,
        F: FnMut(&R, &T, &T, &Self),
    {
        for (k, v) in self.store.iter() {
            f(receiver, &v, &k, self);
        }
    }

    pub fn try_for_each<E, F>(&self, mut f: F) -> Result<(), E>
    where
        T: Clone,
        F: FnMut(&T, &T, &Self) -> Result<(), E>,
    {
        for (k, v) in self.store.iter() {
            f(&v, &k, self)?;
        }
        Ok(())
    }

    /// Cursor over members; see [`OrderedStore::iter`].
    pub fn iter(&self) -> impl Iterator<Item = T> + '_
    where
        T: Clone,
    {
        self.store.iter().map(|(_, v)| v)
    }

    /// Ordered snapshot of the members.
    pub fn values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.store.values()
    }
}

impl<T, S> fmt::Debug for OrderedSet<T, S>
where
    T: fmt::Debug + Clone + Eq + Hash,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.store.values()).finish()
    }
}

impl<T, S> Clone for OrderedSet<T, S>
where
    T: Eq + Hash + Clone,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T, S> FromIterator<T> for OrderedSet<T, S>
where
    T: Eq + Hash + Clone,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut out = Self::with_hasher(S::default());
        out.extend(iter);
        out
    }
}

impl<T, S> Extend<T> for OrderedSet<T, S>
where
    T: Eq + Hash + Clone,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.add(v);
        }
    }
}
