//! One-to-many relation between polymorphic entities, with ordered children.
//!
//! The order in which children were linked under a parent is observable
//! through [`OneToAbstractManyRefs::get_children`] and survives removals of
//! siblings and [`copy`](RelationCollection::copy). Downstream diffing relies
//! on it being deterministic.

use std::collections::HashSet;
use std::fmt;

use refstore_foundation::{ChildEntityId, Error, ParentEntityId, Result};

use crate::collection::{OpaqueId, RelationCollection};

/// Ordered bidirectional multimap from parents to children.
///
/// Each child has at most one parent. Children of a parent are kept in
/// insertion order.
#[derive(Clone)]
pub struct OneToAbstractManyRefs<C = ChildEntityId, P = ParentEntityId>
where
    C: OpaqueId,
    P: OpaqueId,
{
    parent_of: im::HashMap<C, P>,
    children: im::HashMap<P, im::Vector<C>>,
}

impl<C: OpaqueId, P: OpaqueId> OneToAbstractManyRefs<C, P> {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent_of: im::HashMap::new(),
            children: im::HashMap::new(),
        }
    }

    /// Gets the parent of a child.
    #[must_use]
    pub fn get_parent(&self, child: &C) -> Option<&P> {
        self.parent_of.get(child)
    }

    /// Gets the children of a parent in insertion order.
    pub fn get_children<'a>(&'a self, parent: &P) -> impl Iterator<Item = &'a C> + use<'a, C, P> {
        self.children
            .get(parent)
            .into_iter()
            .flat_map(im::Vector::iter)
    }

    /// Returns the number of children of a parent.
    #[must_use]
    pub fn children_count(&self, parent: &P) -> usize {
        self.children.get(parent).map_or(0, im::Vector::len)
    }

    /// Appends `child` to the children of `parent`.
    ///
    /// A child linked elsewhere is moved. Re-linking a child to its current
    /// parent keeps its position.
    pub fn put(&mut self, child: C, parent: P) {
        match self.parent_of.get(&child).cloned() {
            Some(existing) if existing == parent => return,
            Some(existing) => self.detach(&child, &existing),
            None => {}
        }
        self.parent_of.insert(child.clone(), parent.clone());
        self.children
            .entry(parent)
            .or_insert_with(im::Vector::new)
            .push_back(child);
    }

    /// Unlinks `child`, returning its former parent.
    ///
    /// The remaining siblings keep their relative order.
    pub fn remove_child(&mut self, child: &C) -> Option<P> {
        let parent = self.parent_of.remove(child)?;
        self.detach(child, &parent);
        Some(parent)
    }

    /// Unlinks every child of `parent`, returning them in order.
    pub fn remove_parent(&mut self, parent: &P) -> Vec<C> {
        let Some(children) = self.children.remove(parent) else {
            return Vec::new();
        };
        for child in &children {
            self.parent_of.remove(child);
        }
        children.into_iter().collect()
    }

    /// Iterates `(child, parent)` edges in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&C, &P)> + '_ {
        self.parent_of.iter()
    }

    fn detach(&mut self, child: &C, parent: &P) {
        if let Some(siblings) = self.children.get_mut(parent) {
            if let Some(position) = siblings.index_of(child) {
                siblings.remove(position);
            }
            if siblings.is_empty() {
                self.children.remove(parent);
            }
        }
    }
}

impl<C: OpaqueId, P: OpaqueId> Default for OneToAbstractManyRefs<C, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: OpaqueId, P: OpaqueId> RelationCollection for OneToAbstractManyRefs<C, P> {
    fn len(&self) -> usize {
        self.parent_of.len()
    }

    fn check_consistency(&self) -> Result<()> {
        let mut reverse = 0;
        for (parent, children) in &self.children {
            let mut seen = HashSet::with_capacity(children.len());
            for child in children {
                if !seen.insert(child) {
                    return Err(Error::duplicate_child(format!(
                        "{parent:?} lists {child:?} twice"
                    )));
                }
                if self.parent_of.get(child) != Some(parent) {
                    return Err(Error::dangling_index(format!(
                        "{parent:?} lists {child:?}, whose parent is {:?}",
                        self.parent_of.get(child)
                    )));
                }
            }
            reverse += children.len();
        }
        if self.parent_of.len() != reverse {
            return Err(Error::length_mismatch(self.parent_of.len(), reverse));
        }
        Ok(())
    }
}

/// Equal when both hold the same edges with the same child order.
impl<C: OpaqueId, P: OpaqueId> PartialEq for OneToAbstractManyRefs<C, P> {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
    }
}

impl<C: OpaqueId, P: OpaqueId> Eq for OneToAbstractManyRefs<C, P> {}

impl<C: OpaqueId, P: OpaqueId> fmt::Debug for OneToAbstractManyRefs<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.children.iter()).finish()
    }
}
