//! Integration tests for Layer 1: Storage
//!
//! Tests for relation collections, copy-on-write containers, snapshots
//! shared across threads, and refs tables.

mod concurrency;
mod containers;
