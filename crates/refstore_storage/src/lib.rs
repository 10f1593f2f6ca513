//! Per-relation collections and copy-on-write reference containers.
//!
//! This crate provides:
//! - [`OneToOneRefs`], [`OneToManyRefs`] - Packed indices for fixed-type relations
//! - [`OneToAbstractManyRefs`], [`AbstractOneToOneRefs`] - Persistent indices
//!   for polymorphic relations
//! - [`ImmutableRefs`] / [`MutableRefs`] - Relation containers with O(1)
//!   snapshots and copy-on-first-write
//! - [`ImmutableRefsTable`] / [`MutableRefsTable`] - One container per
//!   relation family, addressed by full entity ids

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod abstract_one_to_one;
pub mod collection;
pub mod config;
pub mod container;
pub mod one_to_abstract_many;
pub mod one_to_many;
pub mod one_to_one;
pub mod table;

pub use abstract_one_to_one::AbstractOneToOneRefs;
pub use collection::{OpaqueId, RelationCollection};
pub use config::{ConsistencyCheck, RefsConfig};
pub use container::{ImmutableRefs, MutableRefs, ReferenceContainer, RefsMap};
pub use one_to_abstract_many::OneToAbstractManyRefs;
pub use one_to_many::OneToManyRefs;
pub use one_to_one::OneToOneRefs;
pub use table::{ImmutableRefsTable, MutableRefsTable, RefModification, RefsView};
