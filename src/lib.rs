//! foreach-map: insertion-ordered map and set that stay consistent while
//! they are mutated from inside their own traversal.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: O(1) average `has/get/set/delete` with a defined iteration order
//!   that survives reentrant mutation from traversal callbacks.
//! - Layers:
//!   - OrderedStore<K, V, S>: hash index over a generational slot arena plus
//!     an append-only order array of slot keys. Deletion leaves a tombstone;
//!     the array is compacted once tombstones dominate.
//!   - IterationDepth: counts live traversals. Compaction waits for zero.
//!   - OrderedMap<K, V, S> / OrderedSet<T, S>: public façades. The set is a
//!     store whose value equals its key.
//!
//! Ordering
//! - A new key is appended after every slot of the order array, tombstones
//!   included. Overwriting a key keeps its slot. Delete then re-add moves
//!   the key to the end.
//! - Traversal walks the order array by index and re-reads its length on
//!   every step. Tombstoned slots are skipped, so keys deleted ahead of the
//!   cursor are never visited; appended keys are visited in the same pass.
//!
//! Compaction
//! - Runs after a delete or when the outermost traversal ends, only at
//!   depth zero, and only when `CompactionPolicy` says so (default: array
//!   longer than 16 slots and tombstones a strict majority).
//! - Live slot keys are copied in order into a fresh array and each
//!   record's `position` is rewritten. The hash index stores slot keys, so
//!   it is unaffected.
//!
//! Reentrancy policy and interior mutability
//! - All operations take `&self`; state sits in a `RefCell` whose borrows
//!   are scoped to a single operation and never held while a traversal
//!   callback runs. Callbacks may call any operation, including nested
//!   traversals and `clear`.
//! - `K: Eq/Hash` and `Clone` of keys and values do run under a borrow and
//!   must not reenter the same container.
//! - Replaced and removed values are dropped after the borrow is released,
//!   so `Drop` for `K`/`V` may reenter safely.
//! - A panicking callback, or an `Err` from `try_for_each`, unwinds through
//!   the traversal guard: depth is released and the deferred compaction
//!   check still runs.
//!
//! Hashing
//! - Each record stores its `u64` hash; the index never calls `K: Hash`
//!   after insertion.
//!
//! Notes and non-goals
//! - Single-threaded: containers are `!Send`/`!Sync`.
//! - Values are handed to callbacks as clones taken at visit time.
//! - Keys without a useful `Eq`/`Hash` can use `IdentityKey`, which compares
//!   by allocation identity.

mod compaction;
mod identity;
mod iteration;
mod ordered_map;
mod ordered_set;
pub mod ordered_store;
mod ordered_store_proptest;

// Public surface
pub use compaction::CompactionPolicy;
pub use identity::IdentityKey;
pub use iteration::{DepthGuard, IterationDepth};
pub use ordered_map::OrderedMap;
pub use ordered_set::OrderedSet;
pub use ordered_store::OrderedStore;
