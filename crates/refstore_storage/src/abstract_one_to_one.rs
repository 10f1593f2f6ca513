//! One-to-one relation between polymorphic entities.

use std::fmt;

use refstore_foundation::{ChildEntityId, Error, ParentEntityId, Result};

use crate::collection::{OpaqueId, RelationCollection};

/// Bijection between opaque child and parent identifiers.
///
/// Backed by two persistent maps, so [`copy`](RelationCollection::copy) is
/// O(1) and still fully independent of the original.
#[derive(Clone)]
pub struct AbstractOneToOneRefs<C = ChildEntityId, P = ParentEntityId>
where
    C: OpaqueId,
    P: OpaqueId,
{
    parent_of: im::HashMap<C, P>,
    child_of: im::HashMap<P, C>,
}

impl<C: OpaqueId, P: OpaqueId> AbstractOneToOneRefs<C, P> {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent_of: im::HashMap::new(),
            child_of: im::HashMap::new(),
        }
    }

    /// Gets the parent of a child.
    #[must_use]
    pub fn get_parent(&self, child: &C) -> Option<&P> {
        self.parent_of.get(child)
    }

    /// Gets the child of a parent.
    #[must_use]
    pub fn get_child(&self, parent: &P) -> Option<&C> {
        self.child_of.get(parent)
    }

    /// Links `child` to `parent`, superseding any previous edge of either.
    pub fn put(&mut self, child: C, parent: P) {
        if self.parent_of.get(&child) == Some(&parent) {
            return;
        }
        self.remove_by_child(&child);
        self.remove_by_parent(&parent);
        self.parent_of.insert(child.clone(), parent.clone());
        self.child_of.insert(parent, child);
    }

    /// Removes the edge of `child`, returning its former parent.
    pub fn remove_by_child(&mut self, child: &C) -> Option<P> {
        let parent = self.parent_of.remove(child)?;
        self.child_of.remove(&parent);
        Some(parent)
    }

    /// Removes the edge of `parent`, returning its former child.
    pub fn remove_by_parent(&mut self, parent: &P) -> Option<C> {
        let child = self.child_of.remove(parent)?;
        self.parent_of.remove(&child);
        Some(child)
    }

    /// Iterates `(child, parent)` edges in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&C, &P)> + '_ {
        self.parent_of.iter()
    }
}

impl<C: OpaqueId, P: OpaqueId> Default for AbstractOneToOneRefs<C, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: OpaqueId, P: OpaqueId> RelationCollection for AbstractOneToOneRefs<C, P> {
    fn len(&self) -> usize {
        self.parent_of.len()
    }

    fn check_consistency(&self) -> Result<()> {
        for (child, parent) in &self.parent_of {
            if self.child_of.get(parent) != Some(child) {
                return Err(Error::broken_bijection(format!(
                    "{child:?} -> {parent:?}, but {parent:?} -> {:?}",
                    self.child_of.get(parent)
                )));
            }
        }
        if self.parent_of.len() != self.child_of.len() {
            return Err(Error::length_mismatch(
                self.parent_of.len(),
                self.child_of.len(),
            ));
        }
        Ok(())
    }
}

impl<C: OpaqueId, P: OpaqueId> PartialEq for AbstractOneToOneRefs<C, P> {
    fn eq(&self, other: &Self) -> bool {
        self.parent_of == other.parent_of
    }
}

impl<C: OpaqueId, P: OpaqueId> Eq for AbstractOneToOneRefs<C, P> {}

impl<C: OpaqueId, P: OpaqueId> fmt::Debug for AbstractOneToOneRefs<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.parent_of.iter()).finish()
    }
}
