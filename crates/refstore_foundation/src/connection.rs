//! Connection identifiers.
//!
//! A [`ConnectionId`] names one relation slot in the entity graph, such as
//! "a module contains content roots". It fixes the cardinality of the
//! relation and, for non-abstract relations, the entity types on both sides.

use std::fmt;

use crate::entity::ClassId;

/// Cardinality and typing of a relation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum ConnectionType {
    /// One parent, one child, both of fixed types.
    OneToOne,
    /// One parent, many children, both of fixed types.
    OneToMany,
    /// One parent, many children; either side may be any subtype.
    /// Children keep their insertion order under a parent.
    OneToAbstractMany,
    /// One parent, one child; either side may be any subtype.
    AbstractOneToOne,
}

impl ConnectionType {
    /// Returns true if the relation stores polymorphic (opaque) identifiers.
    #[must_use]
    pub const fn is_abstract(self) -> bool {
        matches!(self, Self::OneToAbstractMany | Self::AbstractOneToOne)
    }

    /// Returns true if a parent has at most one child.
    #[must_use]
    pub const fn is_one_to_one(self) -> bool {
        matches!(self, Self::OneToOne | Self::AbstractOneToOne)
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OneToOne => "one-to-one",
            Self::OneToMany => "one-to-many",
            Self::OneToAbstractMany => "one-to-abstract-many",
            Self::AbstractOneToOne => "abstract-one-to-one",
        };
        f.write_str(name)
    }
}

/// Stable key of one relation slot.
///
/// Immutable once created. Ordering is structural and only serves to make
/// iteration over connection sets deterministic.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ConnectionId {
    /// Entity type on the parent side.
    pub parent_class: ClassId,
    /// Entity type on the child side.
    pub child_class: ClassId,
    /// Cardinality of the relation.
    pub connection_type: ConnectionType,
    /// Whether a child may exist without a parent.
    pub is_parent_nullable: bool,
}

impl ConnectionId {
    /// Creates a new connection ID.
    #[must_use]
    pub const fn new(
        parent_class: ClassId,
        child_class: ClassId,
        connection_type: ConnectionType,
        is_parent_nullable: bool,
    ) -> Self {
        Self {
            parent_class,
            child_class,
            connection_type,
            is_parent_nullable,
        }
    }

    /// Returns true if the relation stores polymorphic identifiers.
    #[must_use]
    pub const fn is_abstract(self) -> bool {
        self.connection_type.is_abstract()
    }

    /// Returns true if a parent has at most one child.
    #[must_use]
    pub const fn is_one_to_one(self) -> bool {
        self.connection_type.is_one_to_one()
    }
}

impl fmt::Debug for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Connection({} -> {}, {}{})",
            self.parent_class.0,
            self.child_class.0,
            self.connection_type,
            if self.is_parent_nullable {
                ", nullable"
            } else {
                ""
            }
        )
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
