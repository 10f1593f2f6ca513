//! The contract shared by every per-relation collection.

use std::fmt::Debug;
use std::hash::Hash;

use refstore_foundation::Result;

/// Sentinel for "no entry" in the packed index arrays of the numeric collections.
///
/// Never a storable array id; see [`assert_storable`].
pub(crate) const ABSENT: u32 = u32::MAX;

/// Rejects an edge the packed arrays cannot represent.
///
/// Checked in release builds too: storing the sentinel would silently break
/// the bijection and cardinality invariants.
pub(crate) fn assert_storable(child: u32, parent: u32) {
    assert!(
        child != ABSENT && parent != ABSENT,
        "array id {ABSENT} is reserved (child {child}, parent {parent})"
    );
}

/// An identifier the abstract collections can store.
///
/// Implemented for every type with the listed bounds; the default is
/// [`ChildEntityId`](refstore_foundation::ChildEntityId) /
/// [`ParentEntityId`](refstore_foundation::ParentEntityId).
pub trait OpaqueId: Clone + Eq + Hash + Debug + Send + Sync {}

impl<T: Clone + Eq + Hash + Debug + Send + Sync> OpaqueId for T {}

/// A bidirectional child/parent index for one relation.
///
/// Implementors are plain owned values: `&mut` access mutates in place, so a
/// container that shares a collection with a snapshot must [`copy`] it first.
/// They must not hold shared interior-mutable state (`Rc<RefCell<_>>`,
/// `Arc<Mutex<_>>`), or the default `copy` would alias instead of duplicate.
///
/// [`copy`]: RelationCollection::copy
pub trait RelationCollection: Default + Clone + PartialEq + Debug + Send + Sync {
    /// Returns an independent duplicate.
    ///
    /// Writes to the duplicate are never observable through `self`, and
    /// writes to `self` are never observable through the duplicate.
    #[must_use]
    fn copy(&self) -> Self {
        self.clone()
    }

    /// Returns the number of child/parent edges.
    fn len(&self) -> usize;

    /// Returns true if the collection holds no edges.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verifies that the forward and reverse indices describe the same edges.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first disagreement found.
    fn check_consistency(&self) -> Result<()>;
}

/// Reads slot `index` of a packed array, treating out-of-range as absent.
pub(crate) fn packed_get(slots: &[u32], index: u32) -> Option<u32> {
    match slots.get(index as usize) {
        Some(&value) if value != ABSENT => Some(value),
        _ => None,
    }
}

/// Writes slot `index` of a packed array, growing it with absent slots.
pub(crate) fn packed_set(slots: &mut Vec<u32>, index: u32, value: u32) {
    debug_assert_ne!(index, ABSENT, "id {ABSENT} is reserved");
    let index = index as usize;
    if index >= slots.len() {
        slots.resize(index + 1, ABSENT);
    }
    slots[index] = value;
}

/// Clears slot `index` of a packed array, returning its previous value.
pub(crate) fn packed_take(slots: &mut [u32], index: u32) -> Option<u32> {
    let slot = slots.get_mut(index as usize)?;
    let previous = std::mem::replace(slot, ABSENT);
    (previous != ABSENT).then_some(previous)
}

/// Iterates the occupied slots of a packed array as `(index, value)`.
pub(crate) fn packed_iter(slots: &[u32]) -> impl Iterator<Item = (u32, u32)> + '_ {
    slots
        .iter()
        .enumerate()
        .filter(|&(_, &value)| value != ABSENT)
        .map(|(index, &value)| (index_to_id(index), value))
}

#[allow(clippy::cast_possible_truncation)]
fn index_to_id(index: usize) -> u32 {
    // Packed arrays are only ever grown through `packed_set` with a u32 index.
    index as u32
}
