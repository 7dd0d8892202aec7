//! OrderedStore: hash index plus a hole-tolerant order array.
//!
//! Records live in a generational slot arena. The hash index and the order
//! array both refer to records by slot key, so compaction only rewrites the
//! order array and each record's `position`; the index is never touched.

use crate::compaction::CompactionPolicy;
use crate::iteration::{DepthGuard, IterationDepth};
use core::borrow::Borrow;
use core::cell::RefCell;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use hashbrown::hash_table::Entry;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;
use tracing::trace;

#[derive(Debug)]
struct Record<K, V> {
    key: K,
    value: V,
    hash: u64,
    position: usize,
}

struct Slots<K, V> {
    index: HashTable<DefaultKey>,
    records: SlotMap<DefaultKey, Record<K, V>>,
    // None marks a tombstone.
    order: Vec<Option<DefaultKey>>,
    holes: usize,
}

impl<K, V> Slots<K, V> {
    fn new() -> Self {
        Self {
            index: HashTable::new(),
            records: SlotMap::with_key(),
            order: Vec::new(),
            holes: 0,
        }
    }

    fn find<Q>(&self, hash: u64, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.index
            .find(hash, |&k| {
                self.records
                    .get(k)
                    .map(|r| r.key.borrow() == q)
                    .unwrap_or(false)
            })
            .copied()
    }

    fn live(&self) -> impl Iterator<Item = &Record<K, V>> + '_ {
        self.order
            .iter()
            .flatten()
            .filter_map(move |&k| self.records.get(k))
    }

    fn compact(&mut self) {
        let before = self.order.len();
        let holes = self.holes;
        let mut order = Vec::with_capacity(self.records.len());
        for k in self.order.drain(..).flatten() {
            if let Some(r) = self.records.get_mut(k) {
                r.position = order.len();
                order.push(Some(k));
            }
        }
        self.order = order;
        self.holes = 0;
        trace!(before, after = self.order.len(), holes, "compacted order array");
    }
}

/// Insertion-ordered key/value store that tolerates mutation during its own
/// traversal.
///
/// Every method takes `&self`; a callback running inside `for_each` may call
/// `set`, `delete`, `clear` or start a nested `for_each` on the same store.
/// Keys deleted ahead of the traversal cursor are skipped, keys appended
/// during the traversal are visited in the same pass.
///
/// `K: Eq`/`K: Hash` and `Clone` of keys and values run while the store is
/// borrowed internally and must not call back into it.
pub struct OrderedStore<K, V, S = RandomState> {
    hasher: S,
    slots: RefCell<Slots<K, V>>,
    depth: IterationDepth,
    policy: CompactionPolicy,
}

impl<K, V> OrderedStore<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_policy(policy: CompactionPolicy) -> Self {
        Self::with_hasher_and_policy(Default::default(), policy)
    }
}

impl<K, V> Default for OrderedStore<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> OrderedStore<K, V, S> {
    /// Compaction check run after deletes and when a traversal ends.
    fn maybe_compact(&self) {
        if !self.depth.is_idle() {
            return;
        }
        let mut slots = self.slots.borrow_mut();
        if self.policy.should_compact(slots.order.len(), slots.holes) {
            slots.compact();
        }
    }
}

impl<K, V, S> OrderedStore<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_hasher_and_policy(hasher, CompactionPolicy::default())
    }

    pub fn with_hasher_and_policy(hasher: S, policy: CompactionPolicy) -> Self {
        Self {
            hasher,
            slots: RefCell::new(Slots::new()),
            depth: IterationDepth::new(),
            policy,
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.slots.borrow().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().records.is_empty()
    }

    /// Physical length of the order array, tombstones included.
    pub fn slot_count(&self) -> usize {
        self.slots.borrow().order.len()
    }

    /// Tombstones currently held in the order array.
    pub fn hole_count(&self) -> usize {
        self.slots.borrow().holes
    }

    /// Traversals currently in progress on this store.
    pub fn iteration_depth(&self) -> usize {
        self.depth.get()
    }

    pub fn policy(&self) -> CompactionPolicy {
        self.policy
    }

    pub fn has<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.slots.borrow().find(hash, q).is_some()
    }

    /// Alias of [`has`](Self::has) using std naming.
    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.has(q)
    }

    /// Run `f` against the stored value without cloning it. `f` must not
    /// mutate this store.
    pub fn get_with<Q, R, F>(&self, q: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        let hash = self.make_hash(q);
        let slots = self.slots.borrow();
        let k = slots.find(hash, q)?;
        slots.records.get(k).map(|r| f(&r.value))
    }

    pub fn get<Q>(&self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.get_with(q, V::clone)
    }

    /// Insert or overwrite. An existing key keeps its position; a new key is
    /// appended after every slot in the order array.
    pub fn set(&self, key: K, value: V) -> &Self {
        let hash = self.make_hash(&key);
        let replaced = {
            let mut slots = self.slots.borrow_mut();
            let Slots {
                index,
                records,
                order,
                ..
            } = &mut *slots;
            match index.entry(
                hash,
                |&kk| records.get(kk).map(|r| r.key == key).unwrap_or(false),
                |&kk| records.get(kk).map(|r| r.hash).unwrap_or(0),
            ) {
                Entry::Occupied(o) => records
                    .get_mut(*o.get())
                    .map(|r| mem::replace(&mut r.value, value)),
                Entry::Vacant(v) => {
                    let position = order.len();
                    let k = records.insert(Record {
                        key,
                        value,
                        hash,
                        position,
                    });
                    let _ = v.insert(k);
                    order.push(Some(k));
                    None
                }
            }
        };
        // Old value drops after the borrow ends so its Drop may reenter.
        drop(replaced);
        self
    }

    /// Remove `q`. Returns whether an entry was removed.
    pub fn delete<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).is_some()
    }

    /// Remove `q` and hand back the owned key and value.
    pub fn remove_entry<Q>(&self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let record = {
            let mut slots = self.slots.borrow_mut();
            let Slots {
                index,
                records,
                order,
                holes,
            } = &mut *slots;
            let entry = index
                .find_entry(hash, |&k| {
                    records
                        .get(k)
                        .map(|r| r.key.borrow() == q)
                        .unwrap_or(false)
                })
                .ok()?;
            let (k, _) = entry.remove();
            let record = records.remove(k)?;
            order[record.position] = None;
            *holes += 1;
            record
        };
        self.maybe_compact();
        Some((record.key, record.value))
    }

    /// Remove every entry. While a traversal is in progress the order array
    /// keeps its length and every slot becomes a tombstone.
    pub fn clear(&self) {
        let dropped = {
            let mut slots = self.slots.borrow_mut();
            slots.index.clear();
            let records = mem::take(&mut slots.records);
            if self.depth.is_idle() {
                slots.order = Vec::new();
                slots.holes = 0;
            } else {
                slots.order.iter_mut().for_each(|s| *s = None);
                slots.holes = slots.order.len();
                trace!(
                    depth = self.depth.get(),
                    slots = slots.holes,
                    "cleared during traversal"
                );
            }
            records
        };
        drop(dropped);
    }

    /// Cursor over `(key, value)` clones in insertion order.
    ///
    /// The iterator counts as an active traversal until dropped: the store
    /// may be mutated from the loop body, and compaction is deferred.
    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter {
            store: self,
            cursor: 0,
            guard: Some(self.depth.enter()),
        }
    }

    /// Visit live entries in order as `f(value, key, store)`.
    pub fn for_each<F>(&self, mut f: F)
    where
        K: Clone,
        V: Clone,
        F: FnMut(&V, &K, &Self),
    {
        for (k, v) in self.iter() {
            f(&v, &k, self);
        }
    }

    /// Like [`for_each`](Self::for_each) with an explicit receiver passed as
    /// the first callback argument.
    pub fn for_each_with<R, F>(&self, receiver: &R, mut f: F)
    where
        R: ?Sized,
        K: Clone,
        V: Clone,
        F: FnMut(&R, &V, &K, &Self),
    {
        for (k, v) in self.iter() {
            f(receiver, &v, &k, self);
        }
    }

    /// Visit live entries until the callback fails; the first error is
    /// returned.
    pub fn try_for_each<E, F>(&self, mut f: F) -> Result<(), E>
    where
        K: Clone,
        V: Clone,
        F: FnMut(&V, &K, &Self) -> Result<(), E>,
    {
        for (k, v) in self.iter() {
            f(&v, &k, self)?;
        }
        Ok(())
    }

    /// Ordered snapshot of the live keys.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.slots.borrow().live().map(|r| r.key.clone()).collect()
    }

    /// Ordered snapshot of the live values.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.slots.borrow().live().map(|r| r.value.clone()).collect()
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let slots = self.slots.borrow();
        assert_eq!(slots.index.len(), slots.records.len());
        assert_eq!(slots.order.len() - slots.holes, slots.records.len());
        for (k, r) in slots.records.iter() {
            assert_eq!(slots.order[r.position], Some(k), "position out of sync");
            assert_eq!(self.make_hash(&r.key), r.hash);
        }
    }
}

/// Iterator returned by [`OrderedStore::iter`].
pub struct Iter<'a, K, V, S> {
    store: &'a OrderedStore<K, V, S>,
    cursor: usize,
    guard: Option<DepthGuard<'a>>,
}

impl<'a, K, V, S> Iterator for Iter<'a, K, V, S>
where
    K: Clone,
    V: Clone,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.store.slots.borrow();
        // Length is re-read on every step so appended records are reached.
        while let Some(&slot) = slots.order.get(self.cursor) {
            self.cursor += 1;
            if let Some(r) = slot.and_then(|k| slots.records.get(k)) {
                return Some((r.key.clone(), r.value.clone()));
            }
        }
        None
    }
}

impl<'a, K, V, S> Drop for Iter<'a, K, V, S> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.store.maybe_compact();
    }
}

impl<K, V, S> fmt::Debug for OrderedStore<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.borrow();
        f.debug_map()
            .entries(slots.live().map(|r| (&r.key, &r.value)))
            .finish()
    }
}

impl<K, V, S> Clone for OrderedStore<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        let out = Self::with_hasher_and_policy(self.hasher.clone(), self.policy);
        for (k, v) in self.iter() {
            out.set(k, v);
        }
        out
    }
}

impl<K, V, S> FromIterator<(K, V)> for OrderedStore<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Self::with_hasher(S::default());
        out.extend(iter);
        out
    }
}

impl<K, V, S> Extend<(K, V)> for OrderedStore<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}
