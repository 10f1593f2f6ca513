//! Integration tests for reference containers
//!
//! Tests copy-on-write isolation, freeze elision and snapshot round trips.

use proptest::prelude::*;
use refstore_foundation::{ChildEntityId, ClassId, ConnectionId, ConnectionType, EntityId};
use refstore_storage::{
    ImmutableRefs, MutableRefs, OneToAbstractManyRefs, OneToManyRefs, OneToOneRefs,
    ReferenceContainer, RelationCollection,
};

fn connection(name: u32) -> ConnectionId {
    ConnectionId::new(ClassId(0), ClassId(name), ConnectionType::OneToMany, false)
}

fn snapshot(edges: &[(u32, u32, u32)]) -> ImmutableRefs<OneToManyRefs> {
    let mut refs: MutableRefs<OneToManyRefs> = MutableRefs::new();
    for &(name, child, parent) in edges {
        refs.get_or_insert_default(connection(name)).put(child, parent);
    }
    refs.to_immutable()
}

// =============================================================================
// The central scenario
// =============================================================================

#[test]
fn removal_in_derived_container_leaves_old_snapshot_intact() {
    let a = connection(1);

    let mut m: MutableRefs<OneToManyRefs> = ImmutableRefs::empty().to_mutable();
    m.get_or_insert_default(a).put(1, 10);
    let s1 = m.to_immutable();

    let mut m = s1.to_mutable();
    m.get_mut(a).unwrap().remove_child(1);
    let s2 = m.to_immutable();

    assert_eq!(s1.get(a).unwrap().get_parent(1), Some(10));
    assert_eq!(s2.get(a).unwrap().get_parent(1), None);
}

// =============================================================================
// Copy-on-write isolation
// =============================================================================

#[test]
fn sibling_views_are_isolated() {
    let a = connection(1);
    let s = snapshot(&[(1, 1, 10), (1, 2, 10)]);

    let mut m1 = s.to_mutable();
    let m2 = s.to_mutable();
    m1.get_mut(a).unwrap().put(3, 10);
    m1.get_mut(a).unwrap().remove_child(1);

    assert_eq!(m1.get(a).unwrap().get_parent(3), Some(10));
    assert_eq!(m1.get(a).unwrap().get_parent(1), None);

    for untouched in [s.get(a).unwrap(), m2.get(a).unwrap()] {
        assert_eq!(untouched.get_parent(1), Some(10));
        assert_eq!(untouched.get_parent(3), None);
        assert_eq!(untouched.len(), 2);
    }
    assert!(m2.is_frozen());
}

#[test]
fn set_in_view_does_not_leak_into_snapshot() {
    let s = snapshot(&[(1, 1, 10)]);
    let mut m = s.to_mutable();
    m.set(connection(2), OneToManyRefs::new());

    assert!(m.contains(connection(2)));
    assert!(!s.contains(connection(2)));
    assert_eq!(s.keys().len(), 1);
}

#[test]
fn writes_after_first_copy_stay_in_place() {
    let a = connection(1);
    let s = snapshot(&[(1, 1, 10)]);
    let mut m = s.to_mutable();

    m.get_mut(a).unwrap().put(2, 10);
    let after_first: *const OneToManyRefs = m.get(a).unwrap();
    m.get_mut(a).unwrap().put(3, 10);
    let after_second: *const OneToManyRefs = m.get(a).unwrap();

    assert_eq!(after_first, after_second);
}

#[test]
fn ordered_collections_are_isolated_too() {
    let a = ConnectionId::new(ClassId(0), ClassId(1), ConnectionType::OneToAbstractMany, false);
    let child = |index| EntityId::new(ClassId(1), index).as_child();
    let parent = EntityId::new(ClassId(0), 0).as_parent();

    let mut m: MutableRefs<OneToAbstractManyRefs> = MutableRefs::new();
    for index in 0..3 {
        m.get_or_insert_default(a).put(child(index), parent);
    }
    let s = m.to_immutable();

    let mut m = s.to_mutable();
    m.get_mut(a).unwrap().remove_child(&child(0));
    m.get_mut(a).unwrap().put(child(0), parent);

    let before: Vec<ChildEntityId> = s.get(a).unwrap().get_children(&parent).copied().collect();
    let after: Vec<ChildEntityId> = m.get(a).unwrap().get_children(&parent).copied().collect();
    assert_eq!(before, vec![child(0), child(1), child(2)]);
    assert_eq!(after, vec![child(1), child(2), child(0)]);
}

// =============================================================================
// Freeze elision and round trips
// =============================================================================

#[test]
fn unwritten_view_freezes_back_to_same_storage() {
    let s = snapshot(&[(1, 1, 10), (2, 5, 50)]);
    let m = s.to_mutable();
    assert!(m.is_frozen());

    let back = m.to_immutable();
    assert!(back.shares_storage_with(&s));
    assert_eq!(back, s);
}

#[test]
fn reads_do_not_unfreeze() {
    let s = snapshot(&[(1, 1, 10)]);
    let m = s.to_mutable();

    let _ = m.get(connection(1));
    let _ = m.keys();
    m.for_each(|_, _| {});

    assert!(m.is_frozen());
    assert!(m.to_immutable().shares_storage_with(&s));
}

#[test]
fn written_view_equals_snapshot_when_write_is_undone() {
    let a = connection(1);
    let s = snapshot(&[(1, 1, 10)]);
    let mut m = s.to_mutable();
    m.get_mut(a).unwrap().put(2, 10);
    m.get_mut(a).unwrap().remove_child(2);

    let back = m.to_immutable();
    assert!(!back.shares_storage_with(&s));
    assert_eq!(back, s);
}

#[test]
fn snapshot_clone_shares_storage() {
    let s = snapshot(&[(1, 1, 10)]);
    let clone = s.clone();
    assert!(clone.shares_storage_with(&s));
}

#[test]
fn empty_snapshots_compare_equal() {
    let a: ImmutableRefs<OneToOneRefs> = ImmutableRefs::empty();
    let b: ImmutableRefs<OneToOneRefs> = ImmutableRefs::default();
    assert_eq!(a, b);
    assert!(a.is_empty());
}

fn parent_lookup(refs: &impl ReferenceContainer<OneToManyRefs>, name: u32, child: u32) -> Option<u32> {
    refs.get(connection(name))?.get_parent(child)
}

#[test]
fn base_contract_is_shared_by_both_states() {
    let s = snapshot(&[(1, 1, 10)]);
    let m = s.to_mutable();

    assert_eq!(parent_lookup(&s, 1, 1), Some(10));
    assert_eq!(parent_lookup(&m, 1, 1), Some(10));
    assert_eq!(parent_lookup(&m, 9, 1), None);
}

// =============================================================================
// Property tests
// =============================================================================

proptest! {
    #[test]
    fn derived_writes_never_reach_the_source(
        base in prop::collection::vec((0u32..3, 0u32..20, 0u32..5), 0..40),
        writes in prop::collection::vec((0u32..3, 0u32..20, 0u32..5), 1..40)
    ) {
        let s = snapshot(&base);
        let expected: Vec<(ConnectionId, Vec<(u32, u32)>)> = s
            .keys()
            .into_iter()
            .map(|key| (key, s.get(key).unwrap().iter().collect()))
            .collect();

        let mut m = s.to_mutable();
        for (name, child, parent) in writes {
            m.get_or_insert_default(connection(name)).put(child, parent);
        }
        prop_assert!(!m.is_frozen());
        drop(m.to_immutable());

        let actual: Vec<(ConnectionId, Vec<(u32, u32)>)> = s
            .keys()
            .into_iter()
            .map(|key| (key, s.get(key).unwrap().iter().collect()))
            .collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn round_trip_without_writes_is_identity(
        base in prop::collection::vec((0u32..3, 0u32..20, 0u32..5), 0..40)
    ) {
        let s = snapshot(&base);
        let back = s.to_mutable().to_immutable();
        prop_assert!(back.shares_storage_with(&s));
        prop_assert_eq!(back, s);
    }
}
