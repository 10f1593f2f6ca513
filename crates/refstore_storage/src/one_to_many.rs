//! One-to-many relation between entities of fixed types.

use std::collections::{HashMap, HashSet};
use std::fmt;

use refstore_foundation::{Error, Result};

use crate::collection::{
    RelationCollection, assert_storable, packed_get, packed_iter, packed_set, packed_take,
};

/// Each child has at most one parent; a parent may have many children.
///
/// The order of children under a parent is unspecified and may change when
/// a sibling is removed.
///
/// Ids range over `0..u32::MAX`; `u32::MAX` marks an empty slot.
#[derive(Clone, Default)]
pub struct OneToManyRefs {
    /// child id -> parent id
    parent_of: Vec<u32>,
    /// parent id -> child ids
    children: HashMap<u32, Vec<u32>>,
    len: usize,
}

impl OneToManyRefs {
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

    /// Gets the children of a parent.
    ///
    /// The iterator borrows the collection, so it cannot be held across a
    /// write. Collect it first if the children are needed while mutating.
    pub fn get_children(&self, parent: u32) -> impl Iterator<Item = u32> + '_ {
        self.children
            .get(&parent)
            .into_iter()
            .flat_map(|children| children.iter().copied())
    }

    /// Returns the number of children of a parent.
    #[must_use]
    pub fn children_count(&self, parent: u32) -> usize {
        self.children.get(&parent).map_or(0, Vec::len)
    }

    /// Links `child` under `parent`, moving it away from any previous parent.
    ///
    /// # Panics
    ///
    /// Panics if either id is `u32::MAX`.
    pub fn put(&mut self, child: u32, parent: u32) {
        assert_storable(child, parent);
        match self.get_parent(child) {
            Some(existing) if existing == parent => return,
            Some(existing) => self.detach(child, existing),
            None => self.len += 1,
        }
        packed_set(&mut self.parent_of, child, parent);
        self.children.entry(parent).or_default().push(child);
    }

    /// Unlinks `child`, returning its former parent.
    pub fn remove_child(&mut self, child: u32) -> Option<u32> {
        let parent = packed_take(&mut self.parent_of, child)?;
        self.detach(child, parent);
        self.len -= 1;
        Some(parent)
    }

    /// Unlinks every child of `parent`, returning them.
    pub fn remove_parent(&mut self, parent: u32) -> Vec<u32> {
        let children = self.children.remove(&parent).unwrap_or_default();
        for &child in &children {
            packed_take(&mut self.parent_of, child);
        }
        self.len -= children.len();
        children
    }

    /// Iterates `(child, parent)` edges in ascending child order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        packed_iter(&self.parent_of)
    }

    /// Lists `child` under `parent` without recording the reverse edge.
    #[cfg(test)]
    pub(crate) fn insert_dangling_child(&mut self, child: u32, parent: u32) {
        self.children.entry(parent).or_default().push(child);
    }

    fn detach(&mut self, child: u32, parent: u32) {
        if let Some(siblings) = self.children.get_mut(&parent) {
            if let Some(position) = siblings.iter().position(|&c| c == child) {
                siblings.swap_remove(position);
            }
            if siblings.is_empty() {
                self.children.remove(&parent);
            }
        }
    }
}

impl RelationCollection for OneToManyRefs {
    fn len(&self) -> usize {
        self.len
    }

    fn check_consistency(&self) -> Result<()> {
        let mut reverse = 0;
        for (&parent, children) in &self.children {
            let mut seen = HashSet::with_capacity(children.len());
            for &child in children {
                if !seen.insert(child) {
                    return Err(Error::duplicate_child(format!(
                        "parent {parent} lists child {child} twice"
                    )));
                }
                if self.get_parent(child) != Some(parent) {
                    return Err(Error::dangling_index(format!(
                        "parent {parent} lists child {child}, whose parent is {:?}",
                        self.get_parent(child)
                    )));
                }
            }
            reverse += children.len();
        }
        let forward = self.iter().count();
        if forward != reverse || forward != self.len {
            return Err(Error::length_mismatch(forward, reverse));
        }
        Ok(())
    }
}

impl PartialEq for OneToManyRefs {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for OneToManyRefs {}

impl fmt::Debug for OneToManyRefs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
