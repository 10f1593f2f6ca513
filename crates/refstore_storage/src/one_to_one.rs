//! One-to-one relation between entities of fixed types.
//!
//! Both sides are dense array ids, so each direction is a packed `u32`
//! array indexed by id. Lookups are a single bounds-checked load.

use std::fmt;

use refstore_foundation::{Error, Result};

use crate::collection::{
    RelationCollection, assert_storable, packed_get, packed_iter, packed_set, packed_take,
};

/// Bijection between child and parent array ids.
///
/// `put` supersedes any previous edge of either endpoint. There is no
/// rejection path: the last write wins.
///
/// Ids range over `0..u32::MAX`; `u32::MAX` marks an empty slot.
#[derive(Clone, Default)]
pub struct OneToOneRefs {
    /// child id -> parent id
    parent_of: Vec<u32>,
    /// parent id -> child id
    child_of: Vec<u32>,
    len: usize,
}

impl OneToOneRefs {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the parent of a child.
    #[must_use]
    pub fn get_parent(&self, child: u32) -> Option<u32> {
        packed_get(&self.parent_of, child)
    }

    /// Gets the child of a parent.
    #[must_use]
    pub fn get_child(&self, parent: u32) -> Option<u32> {
        packed_get(&self.child_of, parent)
    }

    /// Links `child` to `parent`.
    ///
    /// Any previous edge of `child` and any previous edge of `parent` are
    /// removed first.
    ///
    /// # Panics
    ///
    /// Panics if either id is `u32::MAX`.
    pub fn put(&mut self, child: u32, parent: u32) {
        assert_storable(child, parent);
        if self.get_parent(child) == Some(parent) {
            return;
        }
        self.remove_by_child(child);
        self.remove_by_parent(parent);
        packed_set(&mut self.parent_of, child, parent);
        packed_set(&mut self.child_of, parent, child);
        self.len += 1;
    }

    /// Removes the edge of `child`, returning its former parent.
    pub fn remove_by_child(&mut self, child: u32) -> Option<u32> {
        let parent = packed_take(&mut self.parent_of, child)?;
        packed_take(&mut self.child_of, parent);
        self.len -= 1;
        Some(parent)
    }

    /// Removes the edge of `parent`, returning its former child.
    pub fn remove_by_parent(&mut self, parent: u32) -> Option<u32> {
        let child = packed_take(&mut self.child_of, parent)?;
        packed_take(&mut self.parent_of, child);
        self.len -= 1;
        Some(child)
    }

    /// Iterates `(child, parent)` edges in ascending child order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        packed_iter(&self.parent_of)
    }
}

impl RelationCollection for OneToOneRefs {
    fn len(&self) -> usize {
        self.len
    }

    fn check_consistency(&self) -> Result<()> {
        let mut forward = 0;
        for (child, parent) in self.iter() {
            if self.get_child(parent) != Some(child) {
                return Err(Error::broken_bijection(format!(
                    "child {child} -> parent {parent}, but parent {parent} -> {:?}",
                    self.get_child(parent)
                )));
            }
            forward += 1;
        }
        let reverse = packed_iter(&self.child_of).count();
        if forward != reverse || forward != self.len {
            return Err(Error::length_mismatch(forward, reverse));
        }
        Ok(())
    }
}

impl PartialEq for OneToOneRefs {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for OneToOneRefs {}

impl fmt::Debug for OneToOneRefs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
