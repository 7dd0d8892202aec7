// OrderedSet integration suite.
//
// Invariants exercised:
// - Members are visited in first-insertion order; re-adding is a no-op for
//   order.
// - Callbacks receive the same element as value and key.
// - `size` equals the number of members for which `has` is true.
use foreach_map::{IdentityKey, OrderedSet};
use std::cell::Cell;

fn keys<T: Clone + Eq + std::hash::Hash>(s: &OrderedSet<T>) -> Vec<T> {
    let mut rv = Vec::new();
    s.for_each(|_, k, _| rv.push(k.clone()));
    rv
}

fn values<T: Clone + Eq + std::hash::Hash>(s: &OrderedSet<T>) -> Vec<T> {
    let mut rv = Vec::new();
    s.for_each(|v, _, _| rv.push(v.clone()));
    rv
}

// Test: reentrant delete/add during traversal, then bulk deletes.
// Verifies: order and value identity throughout.
#[test]
fn mutation_during_traversal_then_bulk_delete() {
    let s: OrderedSet<String> = OrderedSet::new();
    s.add("a".into());
    assert!(s.has("a"));
    assert!(!s.has("A"));

    s.add("b".into());
    s.delete("a");
    assert!(!s.has("a"));
    s.add("a".into());

    s.for_each(|v, k, this| {
        assert_eq!(v, k);
        assert!(this.has(k));
        if k == "b" {
            this.delete("b");
            this.add("c".into());
        }
    });

    assert_eq!(keys(&s).concat(), "ac");
    assert_eq!(values(&s).concat(), "ac");

    for i in 0..500 {
        s.add(i.to_string());
    }
    for i in 0..500 {
        if i % 100 != 0 {
            s.delete(i.to_string().as_str());
        }
    }

    assert_eq!(keys(&s).concat(), "ac0100200300400");
    assert_eq!(values(&s).concat(), "ac0100200300400");
    assert_eq!(s.size(), 7);
}

// Verifies: receiver passthrough and the container argument is the set.
#[test]
fn receiver_and_container_arguments() {
    let s = OrderedSet::new();
    s.add(1).add(2);
    let calls = Cell::new(0);
    s.for_each_with(&calls, |this, v, k, set| {
        assert_eq!(v, k);
        assert!(std::ptr::eq(set, &s));
        this.set(this.get() + 1);
    });
    assert_eq!(calls.get(), 2);
}

#[test]
fn numeric_key_ordering() {
    let s = OrderedSet::new();
    s.add(5).add(1).add(9);
    assert_eq!(keys(&s), vec![5, 1, 9]);
}

#[test]
fn string_key_ordering() {
    let s = OrderedSet::new();
    s.add("f").add("a").add("b");
    assert_eq!(keys(&s), vec!["f", "a", "b"]);
}

#[test]
fn boolean_key_ordering() {
    let s = OrderedSet::new();
    s.add(false).add(true).add(false);
    assert_eq!(keys(&s), vec![false, true]);
}

#[test]
fn option_key_ordering() {
    let s = OrderedSet::new();
    s.add(None).add(Some(()));
    assert_eq!(keys(&s), vec![None, Some(())]);
}

#[test]
fn identity_key_ordering() {
    let o = IdentityKey::new(());
    let p = IdentityKey::new(());
    let s = OrderedSet::new();
    s.add(o.clone()).add(p.clone()).add(o.clone());
    assert_eq!(s.size(), 2);
    assert_eq!(keys(&s), vec![o, p]);
}

// Verifies: `size` matches `has` across add, delete, clear mid-traversal.
#[test]
fn size_matches_membership() {
    let s: OrderedSet<u32> = (0..40).collect();
    assert_eq!(s.size(), 40);
    s.for_each(|&v, _, this| {
        if v % 2 == 0 {
            this.delete(&(v + 1));
        }
        let counted = (0..40).filter(|k| this.has(k)).count();
        assert_eq!(this.size(), counted);
        if v == 30 {
            this.clear();
            assert_eq!(this.size(), 0);
        }
    });
    assert_eq!(s.size(), 0);
    assert_eq!(s.store().slot_count(), 0, "compacted once the traversal ended");
    s.add(3);
    assert_eq!(s.iter().collect::<Vec<_>>(), vec![3]);
}
