//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: EntityId, ConnectionId, and Error.

mod errors;
mod ids;
