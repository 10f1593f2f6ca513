//! Entity identifiers.
//!
//! An entity is identified by its type ([`ClassId`]) and a dense index within
//! that type. Which side of a relation an entity sits on is expressed by the
//! positional wrappers [`ChildEntityId`] and [`ParentEntityId`].

use std::fmt;

/// Identifies an entity type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

/// Entity identifier: entity type plus a dense per-type index.
///
/// # Layout
/// - `class`: the entity type
/// - `array_id`: 32-bit dense index into the storage of that type
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    /// The entity type.
    pub class: ClassId,
    /// Dense index within the entity type.
    pub array_id: u32,
}

impl EntityId {
    /// Creates a new entity ID.
    #[must_use]
    pub const fn new(class: ClassId, array_id: u32) -> Self {
        Self { class, array_id }
    }

    /// Views this entity as the child side of a relation.
    #[must_use]
    pub const fn as_child(self) -> ChildEntityId {
        ChildEntityId(self)
    }

    /// Views this entity as the parent side of a relation.
    #[must_use]
    pub const fn as_parent(self) -> ParentEntityId {
        ParentEntityId(self)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}:{})", self.class.0, self.array_id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}:{})", self.class.0, self.array_id)
    }
}

/// An entity in the child position of a relation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ChildEntityId(pub EntityId);

impl ChildEntityId {
    /// Returns the wrapped entity ID.
    #[must_use]
    pub const fn id(self) -> EntityId {
        self.0
    }
}

impl fmt::Debug for ChildEntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Child({}:{})", self.0.class.0, self.0.array_id)
    }
}

/// An entity in the parent position of a relation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ParentEntityId(pub EntityId);

impl ParentEntityId {
    /// Returns the wrapped entity ID.
    #[must_use]
    pub const fn id(self) -> EntityId {
        self.0
    }
}

impl fmt::Debug for ParentEntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parent({}:{})", self.0.class.0, self.0.array_id)
    }
}
