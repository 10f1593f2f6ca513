//! Core identifiers and errors for refstore.
//!
//! This crate provides:
//! - [`EntityId`] - Entity type plus dense index, with the positional
//!   [`ChildEntityId`] / [`ParentEntityId`] wrappers
//! - [`ConnectionId`] - Stable key of one relation slot
//! - [`Error`] - Consistency diagnostics with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod connection;
pub mod entity;
pub mod error;

pub use connection::{ConnectionId, ConnectionType};
pub use entity::{ChildEntityId, ClassId, EntityId, ParentEntityId};
pub use error::{Error, ErrorContext, ErrorKind, Result};
