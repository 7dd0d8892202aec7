#![cfg(test)]

// Property tests for OrderedStore kept inside the crate so they can call the
// internal consistency check.

use crate::compaction::CompactionPolicy;
use crate::ordered_store::OrderedStore;
use core::hash::BuildHasher;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::fmt;
use std::hash::Hasher;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking.
#[derive(Clone, Debug)]
enum Op {
    Set(usize, i32),
    Delete(usize),
    Get(usize),
    Has(String),
    Clear,
    // Traverse; on the first visited entry delete `del`, then clear if asked,
    // then set `add`.
    Walk {
        del: usize,
        add: usize,
        v: i32,
        clear: bool,
    },
}

// Reference model: a tombstone array that never compacts.
#[derive(Default)]
struct Model {
    slots: Vec<Option<(Key, i32)>>,
}

impl Model {
    fn pos(&self, k: &Key) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| matches!(s, Some((kk, _)) if kk == k))
    }

    fn set(&mut self, k: Key, v: i32) {
        match self.pos(&k) {
            Some(i) => self.slots[i] = Some((k, v)),
            None => self.slots.push(Some((k, v))),
        }
    }

    fn delete(&mut self, k: &Key) -> bool {
        match self.pos(k) {
            Some(i) => {
                self.slots[i] = None;
                true
            }
            None => false,
        }
    }

    fn clear(&mut self, iterating: bool) {
        if iterating {
            self.slots.iter_mut().for_each(|s| *s = None);
        } else {
            self.slots.clear();
        }
    }

    fn get(&self, k: &Key) -> Option<i32> {
        self.pos(k).and_then(|i| self.slots[i].as_ref().map(|(_, v)| *v))
    }

    fn live(&self) -> Vec<(Key, i32)> {
        self.slots.iter().flatten().cloned().collect()
    }
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let has_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Set(i, v)),
            3 => idx.clone().prop_map(Op::Delete),
            1 => idx.clone().prop_map(Op::Get),
            1 => prop_oneof![has_pool.prop_map(|s: String| s), "[a-z]{0,4}".prop_map(|s| s)]
                .prop_map(Op::Has),
            1 => Just(Op::Clear),
            2 => (idx.clone(), idx.clone(), any::<i32>(), proptest::bool::weighted(0.1))
                .prop_map(|(del, add, v, clear)| Op::Walk { del, add, v, clear }),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run<S: BuildHasher>(
    sut: OrderedStore<Key, i32, S>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model = Model::default();
    for op in ops {
        match op {
            Op::Set(i, v) => {
                let k = key_from(pool, i);
                sut.set(k.clone(), v);
                model.set(k, v);
            }
            Op::Delete(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.delete(&k), model.delete(&k));
            }
            Op::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            Op::Has(s) => {
                let has_model = model.live().iter().any(|(k, _)| k.0 == s);
                prop_assert_eq!(sut.has(s.as_str()), has_model);
            }
            Op::Clear => {
                sut.clear();
                model.clear(false);
            }
            Op::Walk { del, add, v, clear } => {
                let kd = key_from(pool, del);
                let ka = key_from(pool, add);

                let mut seen = Vec::new();
                let mut first = true;
                sut.for_each(|&val, k, st| {
                    seen.push((k.clone(), val));
                    if first {
                        first = false;
                        st.delete(&kd);
                        if clear {
                            st.clear();
                        }
                        st.set(ka.clone(), v);
                    }
                });

                let mut expected = Vec::new();
                let mut first = true;
                let mut cursor = 0;
                while cursor < model.slots.len() {
                    if let Some(entry) = model.slots[cursor].clone() {
                        expected.push(entry);
                        if first {
                            first = false;
                            model.delete(&kd);
                            if clear {
                                model.clear(true);
                            }
                            model.set(ka.clone(), v);
                        }
                    }
                    cursor += 1;
                }
                prop_assert_eq!(seen, expected);
                prop_assert_eq!(sut.iteration_depth(), 0);
            }
        }

        // Post-conditions after each op
        sut.assert_consistent();
        let live = model.live();
        prop_assert_eq!(sut.len(), live.len());
        prop_assert_eq!(sut.is_empty(), live.is_empty());
        let keys: Vec<Key> = live.iter().map(|(k, _)| k.clone()).collect();
        prop_assert_eq!(sut.keys(), keys);
        let values: Vec<i32> = live.iter().map(|(_, v)| *v).collect();
        prop_assert_eq!(sut.values(), values);
        prop_assert!(sut.slot_count() <= model.slots.len());
    }
    Ok(())
}

// Property: the store matches a never-compacting tombstone model for every
// policy. Order, lookups, visit sequences during mutating traversals and
// size agree after each op, so compaction is observably a no-op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_matches_model_default_policy((pool, ops) in arb_scenario()) {
        run(OrderedStore::new(), &pool, ops)?;
    }

    #[test]
    fn prop_matches_model_eager_policy((pool, ops) in arb_scenario()) {
        let policy = CompactionPolicy::new().with_min_len(0);
        run(OrderedStore::with_policy(policy), &pool, ops)?;
    }

    #[test]
    fn prop_matches_model_never_policy((pool, ops) in arb_scenario()) {
        run(OrderedStore::with_policy(CompactionPolicy::never()), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: same model equivalence under worst-case collisions, with
// eager compaction so slot rewrites interleave with collided probes.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_matches_model_with_collisions((pool, ops) in arb_scenario()) {
        let policy = CompactionPolicy::new().with_min_len(0);
        run(OrderedStore::with_hasher_and_policy(ConstBuildHasher, policy), &pool, ops)?;
    }
}
