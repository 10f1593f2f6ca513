//! Integration tests for sharing snapshots across threads
//!
//! Snapshots are read without locks while a derived container is written.

use std::sync::Barrier;
use std::thread;

use refstore_foundation::{ClassId, ConnectionId, ConnectionType, EntityId};
use refstore_storage::{
    ImmutableRefs, ImmutableRefsTable, MutableRefs, OneToManyRefs, ReferenceContainer, RefsView,
};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn snapshots_are_send_and_sync() {
    assert_send_sync::<ImmutableRefs<OneToManyRefs>>();
    assert_send_sync::<ImmutableRefsTable>();
}

#[test]
fn readers_see_original_while_writer_copies() {
    let a = ConnectionId::new(ClassId(0), ClassId(1), ConnectionType::OneToMany, false);
    let mut refs: MutableRefs<OneToManyRefs> = MutableRefs::new();
    for child in 0..1_000 {
        refs.get_or_insert_default(a).put(child, child % 10);
    }
    let snapshot = refs.to_immutable();
    let start = Barrier::new(5);

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                start.wait();
                for _ in 0..50 {
                    let collection = snapshot.get(a).unwrap();
                    assert_eq!(collection.children_count(3), 100);
                    for child in 0..1_000 {
                        assert_eq!(collection.get_parent(child), Some(child % 10));
                    }
                }
            });
        }

        let mut writer = snapshot.to_mutable();
        start.wait();
        let collection = writer.get_mut(a).unwrap();
        for child in 0..1_000 {
            collection.remove_child(child);
        }
        let emptied = writer.to_immutable();
        assert!(emptied.get(a).unwrap().get_parent(0).is_none());
    });

    assert_eq!(snapshot.get(a).unwrap().get_parent(999), Some(9));
}

#[test]
fn table_snapshot_is_readable_from_many_threads() {
    let contains = ConnectionId::new(ClassId(0), ClassId(1), ConnectionType::OneToAbstractMany, false);
    let parent = EntityId::new(ClassId(0), 0).as_parent();
    let children: Vec<_> = (0..64)
        .map(|index| EntityId::new(ClassId(1), index).as_child())
        .collect();

    let mut table = ImmutableRefsTable::empty().to_mutable();
    table.replace_children_of_parent(contains, parent, &children);
    let snapshot = table.to_immutable();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| snapshot.get_children(contains, parent)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), children);
        }
    });
}
