//! Integration tests for entity and connection identifiers

use std::collections::{BTreeSet, HashSet};

use refstore_foundation::{ClassId, ConnectionId, ConnectionType, EntityId};

// =============================================================================
// EntityId
// =============================================================================

#[test]
fn same_index_in_different_classes_is_a_different_entity() {
    let module = EntityId::new(ClassId(1), 7);
    let facet = EntityId::new(ClassId(2), 7);

    assert_ne!(module, facet);
    let set: HashSet<_> = [module, facet].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn positional_wrappers_compare_by_entity() {
    let id = EntityId::new(ClassId(3), 4);

    assert_eq!(id.as_child().id(), id);
    assert_eq!(id.as_parent().id(), id);
    assert_eq!(id.as_child(), EntityId::new(ClassId(3), 4).as_child());
}

#[test]
fn entity_formats() {
    let id = EntityId::new(ClassId(3), 4);
    assert_eq!(format!("{id:?}"), "EntityId(3:4)");
    assert_eq!(format!("{id}"), "Entity(3:4)");
    assert_eq!(format!("{:?}", id.as_child()), "Child(3:4)");
    assert_eq!(format!("{:?}", id.as_parent()), "Parent(3:4)");
}

// =============================================================================
// ConnectionId
// =============================================================================

#[test]
fn connection_types_classify_cardinality() {
    let all = [
        ConnectionType::OneToOne,
        ConnectionType::OneToMany,
        ConnectionType::OneToAbstractMany,
        ConnectionType::AbstractOneToOne,
    ];
    let abstract_types: Vec<_> = all.iter().filter(|t| t.is_abstract()).collect();
    let single_child: Vec<_> = all.iter().filter(|t| t.is_one_to_one()).collect();

    assert_eq!(
        abstract_types,
        vec![
            &ConnectionType::OneToAbstractMany,
            &ConnectionType::AbstractOneToOne
        ]
    );
    assert_eq!(
        single_child,
        vec![&ConnectionType::OneToOne, &ConnectionType::AbstractOneToOne]
    );
}

#[test]
fn nullability_distinguishes_connections() {
    let required = ConnectionId::new(ClassId(1), ClassId(2), ConnectionType::OneToMany, false);
    let optional = ConnectionId::new(ClassId(1), ClassId(2), ConnectionType::OneToMany, true);

    assert_ne!(required, optional);
}

#[test]
fn connection_sets_iterate_deterministically() {
    let a = ConnectionId::new(ClassId(2), ClassId(1), ConnectionType::OneToOne, false);
    let b = ConnectionId::new(ClassId(1), ClassId(3), ConnectionType::OneToMany, false);
    let c = ConnectionId::new(ClassId(1), ClassId(2), ConnectionType::AbstractOneToOne, true);

    let forward: Vec<_> = BTreeSet::from([a, b, c]).into_iter().collect();
    let backward: Vec<_> = BTreeSet::from([c, b, a]).into_iter().collect();
    assert_eq!(forward, backward);
}

#[test]
fn connection_display_names_both_classes() {
    let connection = ConnectionId::new(ClassId(1), ClassId(2), ConnectionType::OneToAbstractMany, false);
    assert_eq!(
        connection.to_string(),
        "Connection(1 -> 2, one-to-abstract-many)"
    );
}
