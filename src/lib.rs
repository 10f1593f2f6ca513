//! refstore - relation storage for a typed entity graph
//!
//! This crate re-exports all layers of the refstore system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: refstore_storage    — Relation collections, copy-on-write containers, refs tables
//! Layer 0: refstore_foundation — Core types (EntityId, ConnectionId, Error)
//! ```

pub use refstore_foundation as foundation;
pub use refstore_storage as storage;
