//! Reference containers with copy-on-write snapshots.
//!
//! A container maps each [`ConnectionId`] to the collection holding that
//! relation's edges. It exists in two states:
//!
//! - [`ImmutableRefs`]: an `Arc`-shared, read-only map. Cloning and
//!   deriving mutable views are O(1); any number of threads may read it.
//! - [`MutableRefs`]: starts *frozen*, aliasing the snapshot's map. The first
//!   write deep-copies every collection into an exclusively owned map; later
//!   writes mutate that map in place.
//!
//! ```text
//! ImmutableRefs --to_mutable()--> MutableRefs { frozen }   (O(1), shared Arc)
//!                                      | first set/get_mut
//!                                      v
//!                                 MutableRefs { owned }    (one deep copy)
//!                                      | to_immutable(self)
//!                                      v
//!                                 ImmutableRefs            (map moved into a new Arc)
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use refstore_foundation::ConnectionId;

use crate::collection::RelationCollection;

/// Backing map of a reference container.
pub type RefsMap<C> = HashMap<ConnectionId, C>;

/// Read access shared by immutable and mutable containers.
pub trait ReferenceContainer<C: RelationCollection> {
    /// Returns the underlying map.
    fn refs(&self) -> &RefsMap<C>;

    /// Gets the collection of a relation.
    fn get(&self, connection: ConnectionId) -> Option<&C> {
        self.refs().get(&connection)
    }

    /// Returns true if the relation has a collection.
    fn contains(&self, connection: ConnectionId) -> bool {
        self.refs().contains_key(&connection)
    }

    /// Returns a snapshot of the current relation keys.
    fn keys(&self) -> BTreeSet<ConnectionId> {
        self.refs().keys().copied().collect()
    }

    /// Visits every relation and its collection.
    fn for_each(&self, mut f: impl FnMut(ConnectionId, &C)) {
        for (&connection, collection) in self.refs() {
            f(connection, collection);
        }
    }

    /// Returns the number of relations.
    fn len(&self) -> usize {
        self.refs().len()
    }

    /// Returns true if no relation has a collection.
    fn is_empty(&self) -> bool {
        self.refs().is_empty()
    }
}

/// Read-only relation container, freely shareable.
///
/// Clone is O(1): all clones share one map.
pub struct ImmutableRefs<C: RelationCollection> {
    map: Arc<RefsMap<C>>,
}

impl<C: RelationCollection> ImmutableRefs<C> {
    /// Creates an empty container.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            map: Arc::new(HashMap::new()),
        }
    }

    /// Derives a mutable view in O(1).
    ///
    /// The view aliases this container's map until its first write, so this
    /// container is never affected by anything done to the view.
    #[must_use]
    pub fn to_mutable(&self) -> MutableRefs<C> {
        tracing::trace!(relations = self.map.len(), "derived mutable refs view");
        MutableRefs::frozen(Arc::clone(&self.map))
    }

    /// Returns true if both containers read the very same map.
    #[must_use]
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.map, &other.map)
    }
}

impl<C: RelationCollection> ReferenceContainer<C> for ImmutableRefs<C> {
    fn refs(&self) -> &RefsMap<C> {
        &self.map
    }
}

impl<C: RelationCollection> Clone for ImmutableRefs<C> {
    fn clone(&self) -> Self {
        Self {
            map: Arc::clone(&self.map),
        }
    }
}

impl<C: RelationCollection> Default for ImmutableRefs<C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<C: RelationCollection> PartialEq for ImmutableRefs<C> {
    fn eq(&self, other: &Self) -> bool {
        self.shares_storage_with(other) || self.map == other.map
    }
}

impl<C: RelationCollection> fmt::Debug for ImmutableRefs<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}

/// Single-writer relation container with copy-on-first-write.
///
/// Writes take `&mut self`, so at most one writer exists at a time.
pub struct MutableRefs<C: RelationCollection> {
    /// The snapshot's map, until the first write.
    shared: Option<Arc<RefsMap<C>>>,
    /// Exclusively owned map; empty and unused while `shared` is set.
    owned: RefsMap<C>,
    trace_copies: bool,
}

impl<C: RelationCollection> MutableRefs<C> {
    /// Creates an empty, already owned container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: None,
            owned: HashMap::new(),
            trace_copies: true,
        }
    }

    fn frozen(shared: Arc<RefsMap<C>>) -> Self {
        Self {
            shared: Some(shared),
            owned: HashMap::new(),
            trace_copies: true,
        }
    }

    /// Sets whether the first-write copy is reported as a `debug` event.
    #[must_use]
    pub fn with_copy_tracing(mut self, enabled: bool) -> Self {
        self.trace_copies = enabled;
        self
    }

    /// Returns true while the container still aliases its source snapshot.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.shared.is_some()
    }

    /// Stores `collection` as the edges of `connection`, replacing any previous one.
    pub fn set(&mut self, connection: ConnectionId, collection: C) {
        self.owned().insert(connection, collection);
    }

    /// Gets the collection of a relation for writing.
    pub fn get_mut(&mut self, connection: ConnectionId) -> Option<&mut C> {
        self.owned().get_mut(&connection)
    }

    /// Gets the collection of a relation for writing, creating an empty one if needed.
    pub fn get_or_insert_default(&mut self, connection: ConnectionId) -> &mut C {
        self.owned().entry(connection).or_default()
    }

    /// Drops the collection of a relation, returning it.
    pub fn remove(&mut self, connection: ConnectionId) -> Option<C> {
        if self.is_frozen() && !self.contains(connection) {
            return None;
        }
        self.owned().remove(&connection)
    }

    /// Finalizes this container into a snapshot.
    ///
    /// If nothing was written the source snapshot's map is handed back
    /// without copying. Otherwise the owned map moves into the snapshot.
    #[must_use]
    pub fn to_immutable(self) -> ImmutableRefs<C> {
        if let Some(map) = self.shared {
            tracing::trace!(relations = map.len(), "refs unchanged, reusing snapshot");
            return ImmutableRefs { map };
        }
        ImmutableRefs {
            map: Arc::new(self.owned),
        }
    }

    /// Returns the owned map, deep-copying the shared one on first use.
    fn owned(&mut self) -> &mut RefsMap<C> {
        if let Some(shared) = self.shared.take() {
            self.owned = shared
                .iter()
                .map(|(&connection, collection)| (connection, collection.copy()))
                .collect();
            if self.trace_copies {
                tracing::debug!(relations = self.owned.len(), "copied shared refs on first write");
            }
        }
        &mut self.owned
    }
}

impl<C: RelationCollection> ReferenceContainer<C> for MutableRefs<C> {
    fn refs(&self) -> &RefsMap<C> {
        self.shared.as_deref().unwrap_or(&self.owned)
    }
}

impl<C: RelationCollection> Default for MutableRefs<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: RelationCollection> fmt::Debug for MutableRefs<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableRefs")
            .field("frozen", &self.is_frozen())
            .field("refs", self.refs())
            .finish()
    }
}
