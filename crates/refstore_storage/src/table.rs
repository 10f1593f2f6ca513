//! Refs table: one reference container per relation family.
//!
//! The table is what the entity storage talks to. It takes full
//! [`EntityId`]s, dispatches on [`ConnectionId::connection_type`] to the
//! right container, and reports every edge it adds or removes as a
//! [`RefModification`] so callers can maintain a change log.
//!
//! Numeric families store only `array_id`; the entity classes come from the
//! connection, which fixes both sides.

use std::collections::{BTreeMap, HashSet};

use refstore_foundation::{
    ChildEntityId, ConnectionId, ConnectionType, EntityId, ErrorContext, ParentEntityId, Result,
};

use crate::abstract_one_to_one::AbstractOneToOneRefs;
use crate::collection::RelationCollection;
use crate::config::{ConsistencyCheck, RefsConfig};
use crate::container::{ImmutableRefs, MutableRefs, ReferenceContainer};
use crate::one_to_abstract_many::OneToAbstractManyRefs;
use crate::one_to_many::OneToManyRefs;
use crate::one_to_one::OneToOneRefs;

/// One edge change produced by a refs table write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefModification {
    /// The edge was created.
    Added {
        /// The relation.
        connection: ConnectionId,
        /// Parent side of the edge.
        parent: ParentEntityId,
        /// Child side of the edge.
        child: ChildEntityId,
    },
    /// The edge was removed.
    Removed {
        /// The relation.
        connection: ConnectionId,
        /// Parent side of the edge.
        parent: ParentEntityId,
        /// Child side of the edge.
        child: ChildEntityId,
    },
}

impl RefModification {
    fn added(connection: ConnectionId, parent: ParentEntityId, child: ChildEntityId) -> Self {
        Self::Added {
            connection,
            parent,
            child,
        }
    }

    fn removed(connection: ConnectionId, parent: ParentEntityId, child: ChildEntityId) -> Self {
        Self::Removed {
            connection,
            parent,
            child,
        }
    }
}

fn child_entity(connection: ConnectionId, array_id: u32) -> ChildEntityId {
    EntityId::new(connection.child_class, array_id).as_child()
}

fn parent_entity(connection: ConnectionId, array_id: u32) -> ParentEntityId {
    EntityId::new(connection.parent_class, array_id).as_parent()
}

/// Read operations shared by immutable and mutable refs tables.
pub trait RefsView {
    /// Container of one-to-one relations.
    type OneToOne: ReferenceContainer<OneToOneRefs>;
    /// Container of one-to-many relations.
    type OneToMany: ReferenceContainer<OneToManyRefs>;
    /// Container of one-to-abstract-many relations.
    type OneToAbstractMany: ReferenceContainer<OneToAbstractManyRefs>;
    /// Container of abstract one-to-one relations.
    type AbstractOneToOne: ReferenceContainer<AbstractOneToOneRefs>;

    /// Returns the one-to-one container.
    fn one_to_one(&self) -> &Self::OneToOne;
    /// Returns the one-to-many container.
    fn one_to_many(&self) -> &Self::OneToMany;
    /// Returns the one-to-abstract-many container.
    fn one_to_abstract_many(&self) -> &Self::OneToAbstractMany;
    /// Returns the abstract one-to-one container.
    fn abstract_one_to_one(&self) -> &Self::AbstractOneToOne;

    /// Gets the parent of `child` in a relation.
    fn get_parent(&self, connection: ConnectionId, child: ChildEntityId) -> Option<ParentEntityId> {
        match connection.connection_type {
            ConnectionType::OneToOne => {
                if child.0.class != connection.child_class {
                    return None;
                }
                let parent = self.one_to_one().get(connection)?.get_parent(child.0.array_id)?;
                Some(parent_entity(connection, parent))
            }
            ConnectionType::OneToMany => {
                if child.0.class != connection.child_class {
                    return None;
                }
                let parent = self.one_to_many().get(connection)?.get_parent(child.0.array_id)?;
                Some(parent_entity(connection, parent))
            }
            ConnectionType::OneToAbstractMany => self
                .one_to_abstract_many()
                .get(connection)?
                .get_parent(&child)
                .copied(),
            ConnectionType::AbstractOneToOne => self
                .abstract_one_to_one()
                .get(connection)?
                .get_parent(&child)
                .copied(),
        }
    }

    /// Gets the children of `parent` in a relation.
    ///
    /// For one-to-abstract-many relations the result is in insertion order.
    fn get_children(&self, connection: ConnectionId, parent: ParentEntityId) -> Vec<ChildEntityId> {
        let numeric_mismatch = !connection.is_abstract() && parent.0.class != connection.parent_class;
        if numeric_mismatch {
            return Vec::new();
        }
        match connection.connection_type {
            ConnectionType::OneToOne => self
                .one_to_one()
                .get(connection)
                .and_then(|refs| refs.get_child(parent.0.array_id))
                .map(|child| child_entity(connection, child))
                .into_iter()
                .collect(),
            ConnectionType::OneToMany => self
                .one_to_many()
                .get(connection)
                .map(|refs| {
                    refs.get_children(parent.0.array_id)
                        .map(|child| child_entity(connection, child))
                        .collect()
                })
                .unwrap_or_default(),
            ConnectionType::OneToAbstractMany => self
                .one_to_abstract_many()
                .get(connection)
                .map(|refs| refs.get_children(&parent).copied().collect())
                .unwrap_or_default(),
            ConnectionType::AbstractOneToOne => self
                .abstract_one_to_one()
                .get(connection)
                .and_then(|refs| refs.get_child(&parent))
                .copied()
                .into_iter()
                .collect(),
        }
    }

    /// Returns the parent of `child` in every relation where it has one.
    fn parent_refs_of_child(&self, child: ChildEntityId) -> BTreeMap<ConnectionId, ParentEntityId> {
        let mut parents = BTreeMap::new();
        self.one_to_one().for_each(|connection, refs| {
            if connection.child_class == child.0.class {
                if let Some(parent) = refs.get_parent(child.0.array_id) {
                    parents.insert(connection, parent_entity(connection, parent));
                }
            }
        });
        self.one_to_many().for_each(|connection, refs| {
            if connection.child_class == child.0.class {
                if let Some(parent) = refs.get_parent(child.0.array_id) {
                    parents.insert(connection, parent_entity(connection, parent));
                }
            }
        });
        self.one_to_abstract_many().for_each(|connection, refs| {
            if let Some(&parent) = refs.get_parent(&child) {
                parents.insert(connection, parent);
            }
        });
        self.abstract_one_to_one().for_each(|connection, refs| {
            if let Some(&parent) = refs.get_parent(&child) {
                parents.insert(connection, parent);
            }
        });
        parents
    }

    /// Returns the children of `parent` in every relation where it has some.
    fn children_refs_of_parent(
        &self,
        parent: ParentEntityId,
    ) -> BTreeMap<ConnectionId, Vec<ChildEntityId>> {
        let mut children = BTreeMap::new();
        for connection in self
            .one_to_one()
            .keys()
            .into_iter()
            .chain(self.one_to_many().keys())
            .chain(self.one_to_abstract_many().keys())
            .chain(self.abstract_one_to_one().keys())
        {
            let found = self.get_children(connection, parent);
            if !found.is_empty() {
                children.insert(connection, found);
            }
        }
        children
    }

    /// Verifies the indices of every relation.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found, with the relation as context.
    fn check_consistency(&self) -> Result<()> {
        check_container::<OneToOneRefs, _>(self.one_to_one())?;
        check_container::<OneToManyRefs, _>(self.one_to_many())?;
        check_container::<OneToAbstractManyRefs, _>(self.one_to_abstract_many())?;
        check_container::<AbstractOneToOneRefs, _>(self.abstract_one_to_one())
    }
}

fn check_container<C, R>(container: &R) -> Result<()>
where
    C: RelationCollection,
    R: ReferenceContainer<C>,
{
    for (&connection, refs) in container.refs() {
        refs.check_consistency()
            .map_err(|err| err.with_context(ErrorContext::new().with_connection(connection)))?;
    }
    Ok(())
}

/// Read-only snapshot of every relation in the graph.
///
/// Clone and [`to_mutable`](Self::to_mutable) are O(1).
#[derive(Clone, Debug, Default)]
pub struct ImmutableRefsTable {
    one_to_one: ImmutableRefs<OneToOneRefs>,
    one_to_many: ImmutableRefs<OneToManyRefs>,
    one_to_abstract_many: ImmutableRefs<OneToAbstractManyRefs>,
    abstract_one_to_one: ImmutableRefs<AbstractOneToOneRefs>,
    config: RefsConfig,
}

impl ImmutableRefsTable {
    /// Creates an empty table with the default configuration.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates an empty table with the given configuration.
    #[must_use]
    pub fn with_config(config: RefsConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RefsConfig {
        &self.config
    }

    /// Derives a mutable table in O(1). Nothing is copied until a family is written.
    #[must_use]
    pub fn to_mutable(&self) -> MutableRefsTable {
        let trace = self.config.trace_copies;
        MutableRefsTable {
            one_to_one: self.one_to_one.to_mutable().with_copy_tracing(trace),
            one_to_many: self.one_to_many.to_mutable().with_copy_tracing(trace),
            one_to_abstract_many: self.one_to_abstract_many.to_mutable().with_copy_tracing(trace),
            abstract_one_to_one: self.abstract_one_to_one.to_mutable().with_copy_tracing(trace),
            config: self.config.clone(),
        }
    }

    /// Returns true if both tables read the very same maps for every family.
    #[must_use]
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        self.one_to_one.shares_storage_with(&other.one_to_one)
            && self.one_to_many.shares_storage_with(&other.one_to_many)
            && self
                .one_to_abstract_many
                .shares_storage_with(&other.one_to_abstract_many)
            && self
                .abstract_one_to_one
                .shares_storage_with(&other.abstract_one_to_one)
    }
}

/// Equal when every relation holds the same edges; configuration is ignored.
impl PartialEq for ImmutableRefsTable {
    fn eq(&self, other: &Self) -> bool {
        self.one_to_one == other.one_to_one
            && self.one_to_many == other.one_to_many
            && self.one_to_abstract_many == other.one_to_abstract_many
            && self.abstract_one_to_one == other.abstract_one_to_one
    }
}

impl RefsView for ImmutableRefsTable {
    type OneToOne = ImmutableRefs<OneToOneRefs>;
    type OneToMany = ImmutableRefs<OneToManyRefs>;
    type OneToAbstractMany = ImmutableRefs<OneToAbstractManyRefs>;
    type AbstractOneToOne = ImmutableRefs<AbstractOneToOneRefs>;

    fn one_to_one(&self) -> &Self::OneToOne {
        &self.one_to_one
    }

    fn one_to_many(&self) -> &Self::OneToMany {
        &self.one_to_many
    }

    fn one_to_abstract_many(&self) -> &Self::OneToAbstractMany {
        &self.one_to_abstract_many
    }

    fn abstract_one_to_one(&self) -> &Self::AbstractOneToOne {
        &self.abstract_one_to_one
    }
}

/// Single-writer table derived from a snapshot.
#[derive(Debug, Default)]
pub struct MutableRefsTable {
    one_to_one: MutableRefs<OneToOneRefs>,
    one_to_many: MutableRefs<OneToManyRefs>,
    one_to_abstract_many: MutableRefs<OneToAbstractManyRefs>,
    abstract_one_to_one: MutableRefs<AbstractOneToOneRefs>,
    config: RefsConfig,
}

impl MutableRefsTable {
    /// Creates an empty table with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no family has been written since the table was derived.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.one_to_one.is_frozen()
            && self.one_to_many.is_frozen()
            && self.one_to_abstract_many.is_frozen()
            && self.abstract_one_to_one.is_frozen()
    }

    /// Links `child` to `parent`, replacing the child's previous parent.
    ///
    /// In one-to-one relations the parent's previous child is unlinked too.
    ///
    /// # Panics
    ///
    /// Panics if a one-to-one or one-to-many relation is given an entity
    /// whose `array_id` is `u32::MAX`.
    pub fn update_parent_of_child(
        &mut self,
        connection: ConnectionId,
        child: ChildEntityId,
        parent: ParentEntityId,
    ) -> Vec<RefModification> {
        if self.get_parent(connection, child) == Some(parent) {
            return Vec::new();
        }
        let mut modifications = Vec::new();
        if let Some(previous) = self.get_parent(connection, child) {
            modifications.push(RefModification::removed(connection, previous, child));
        }
        if connection.is_one_to_one() {
            if let Some(&previous) = self.get_children(connection, parent).first() {
                modifications.push(RefModification::removed(connection, parent, previous));
            }
        }

        match connection.connection_type {
            ConnectionType::OneToOne => {
                debug_assert_fixed_classes(connection, child, parent);
                self.one_to_one
                    .get_or_insert_default(connection)
                    .put(child.0.array_id, parent.0.array_id);
            }
            ConnectionType::OneToMany => {
                debug_assert_fixed_classes(connection, child, parent);
                self.one_to_many
                    .get_or_insert_default(connection)
                    .put(child.0.array_id, parent.0.array_id);
            }
            ConnectionType::OneToAbstractMany => {
                self.one_to_abstract_many
                    .get_or_insert_default(connection)
                    .put(child, parent);
            }
            ConnectionType::AbstractOneToOne => {
                self.abstract_one_to_one
                    .get_or_insert_default(connection)
                    .put(child, parent);
            }
        }

        modifications.push(RefModification::added(connection, parent, child));
        modifications
    }

    /// Unlinks `child` from its parent.
    pub fn remove_ref_by_child(
        &mut self,
        connection: ConnectionId,
        child: ChildEntityId,
    ) -> Option<RefModification> {
        let parent = self.get_parent(connection, child)?;
        match connection.connection_type {
            ConnectionType::OneToOne => {
                if let Some(refs) = self.one_to_one.get_mut(connection) {
                    refs.remove_by_child(child.0.array_id);
                }
            }
            ConnectionType::OneToMany => {
                if let Some(refs) = self.one_to_many.get_mut(connection) {
                    refs.remove_child(child.0.array_id);
                }
            }
            ConnectionType::OneToAbstractMany => {
                if let Some(refs) = self.one_to_abstract_many.get_mut(connection) {
                    refs.remove_child(&child);
                }
            }
            ConnectionType::AbstractOneToOne => {
                if let Some(refs) = self.abstract_one_to_one.get_mut(connection) {
                    refs.remove_by_child(&child);
                }
            }
        }
        self.prune(connection);
        Some(RefModification::removed(connection, parent, child))
    }

    /// Unlinks every child of `parent`.
    pub fn remove_refs_by_parent(
        &mut self,
        connection: ConnectionId,
        parent: ParentEntityId,
    ) -> Vec<RefModification> {
        let children = self.get_children(connection, parent);
        if children.is_empty() {
            return Vec::new();
        }
        match connection.connection_type {
            ConnectionType::OneToOne => {
                if let Some(refs) = self.one_to_one.get_mut(connection) {
                    refs.remove_by_parent(parent.0.array_id);
                }
            }
            ConnectionType::OneToMany => {
                if let Some(refs) = self.one_to_many.get_mut(connection) {
                    refs.remove_parent(parent.0.array_id);
                }
            }
            ConnectionType::OneToAbstractMany => {
                if let Some(refs) = self.one_to_abstract_many.get_mut(connection) {
                    refs.remove_parent(&parent);
                }
            }
            ConnectionType::AbstractOneToOne => {
                if let Some(refs) = self.abstract_one_to_one.get_mut(connection) {
                    refs.remove_by_parent(&parent);
                }
            }
        }
        self.prune(connection);
        children
            .into_iter()
            .map(|child| RefModification::removed(connection, parent, child))
            .collect()
    }

    /// Unlinks the edge `parent -> child` if exactly that edge exists.
    pub fn remove_parent_to_child_ref(
        &mut self,
        connection: ConnectionId,
        parent: ParentEntityId,
        child: ChildEntityId,
    ) -> bool {
        if self.get_parent(connection, child) != Some(parent) {
            return false;
        }
        self.remove_ref_by_child(connection, child).is_some()
    }

    /// Makes `children` the complete child list of `parent`.
    ///
    /// Current children missing from the list are unlinked; listed children
    /// linked elsewhere are moved. For one-to-abstract-many relations the
    /// resulting order is the order of `children`.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as
    /// [`update_parent_of_child`](Self::update_parent_of_child).
    pub fn replace_children_of_parent(
        &mut self,
        connection: ConnectionId,
        parent: ParentEntityId,
        children: &[ChildEntityId],
    ) -> Vec<RefModification> {
        debug_assert!(
            !connection.is_one_to_one() || children.len() <= 1,
            "{connection:?} allows one child, got {}",
            children.len()
        );
        let wanted: HashSet<ChildEntityId> = children.iter().copied().collect();
        let existing = self.get_children(connection, parent);
        let retained: HashSet<ChildEntityId> = existing
            .iter()
            .copied()
            .filter(|child| wanted.contains(child))
            .collect();

        let mut modifications = Vec::new();
        for &child in existing.iter().filter(|child| !wanted.contains(*child)) {
            modifications.extend(self.remove_ref_by_child(connection, child));
        }

        let reorder = connection.connection_type == ConnectionType::OneToAbstractMany
            && !retained.is_empty();
        if reorder {
            if let Some(refs) = self.one_to_abstract_many.get_mut(connection) {
                refs.remove_parent(&parent);
            }
        }

        for &child in children {
            if retained.contains(&child) {
                if reorder {
                    self.one_to_abstract_many
                        .get_or_insert_default(connection)
                        .put(child, parent);
                }
            } else {
                modifications.extend(self.update_parent_of_child(connection, child, parent));
            }
        }
        self.prune(connection);
        modifications
    }

    /// Finalizes this table into a snapshot.
    ///
    /// Families that were never written are handed back without copying.
    #[must_use]
    pub fn to_immutable(self) -> ImmutableRefsTable {
        let written = !self.is_frozen();
        let snapshot = ImmutableRefsTable {
            one_to_one: self.one_to_one.to_immutable(),
            one_to_many: self.one_to_many.to_immutable(),
            one_to_abstract_many: self.one_to_abstract_many.to_immutable(),
            abstract_one_to_one: self.abstract_one_to_one.to_immutable(),
            config: self.config,
        };
        if written && snapshot.config.consistency == ConsistencyCheck::OnFreeze {
            if let Err(err) = snapshot.check_consistency() {
                tracing::error!(
                    error = %err,
                    connection = ?err.context.as_ref().and_then(|ctx| ctx.connection),
                    "refs table failed consistency check on freeze"
                );
                if cfg!(debug_assertions) {
                    panic!("inconsistent refs table: {err}");
                }
            }
        }
        snapshot
    }

    /// Drops the collection of `connection` if it no longer holds edges.
    fn prune(&mut self, connection: ConnectionId) {
        match connection.connection_type {
            ConnectionType::OneToOne => prune_container(&mut self.one_to_one, connection),
            ConnectionType::OneToMany => prune_container(&mut self.one_to_many, connection),
            ConnectionType::OneToAbstractMany => {
                prune_container(&mut self.one_to_abstract_many, connection);
            }
            ConnectionType::AbstractOneToOne => {
                prune_container(&mut self.abstract_one_to_one, connection);
            }
        }
    }
}

fn prune_container<C: RelationCollection>(container: &mut MutableRefs<C>, connection: ConnectionId) {
    if container.get(connection).is_some_and(RelationCollection::is_empty) {
        container.remove(connection);
    }
}

fn debug_assert_fixed_classes(connection: ConnectionId, child: ChildEntityId, parent: ParentEntityId) {
    debug_assert_eq!(
        child.0.class, connection.child_class,
        "{child:?} does not belong to {connection:?}"
    );
    debug_assert_eq!(
        parent.0.class, connection.parent_class,
        "{parent:?} does not belong to {connection:?}"
    );
}

impl RefsView for MutableRefsTable {
    type OneToOne = MutableRefs<OneToOneRefs>;
    type OneToMany = MutableRefs<OneToManyRefs>;
    type OneToAbstractMany = MutableRefs<OneToAbstractManyRefs>;
    type AbstractOneToOne = MutableRefs<AbstractOneToOneRefs>;

    fn one_to_one(&self) -> &Self::OneToOne {
        &self.one_to_one
    }

    fn one_to_many(&self) -> &Self::OneToMany {
        &self.one_to_many
    }

    fn one_to_abstract_many(&self) -> &Self::OneToAbstractMany {
        &self.one_to_abstract_many
    }

    fn abstract_one_to_one(&self) -> &Self::AbstractOneToOne {
        &self.abstract_one_to_one
    }
}
