//! Error types for refstore.
//!
//! Relation storage has no recoverable failures on its normal paths: lookups
//! return `None` and conflicting writes are resolved last-write-wins. Errors
//! exist to report broken internal invariants found by consistency checks.

use thiserror::Error;

use crate::connection::ConnectionId;

/// The main error type for refstore operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context, usually the relation that was being checked.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a broken bijection error.
    #[must_use]
    pub fn broken_bijection(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::BrokenBijection(detail.into()))
    }

    /// Creates a dangling index error.
    #[must_use]
    pub fn dangling_index(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::DanglingIndex(detail.into()))
    }

    /// Creates a duplicate child error.
    #[must_use]
    pub fn duplicate_child(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateChild(detail.into()))
    }

    /// Creates a length mismatch error.
    #[must_use]
    pub fn length_mismatch(forward: usize, reverse: usize) -> Self {
        Self::new(ErrorKind::LengthMismatch { forward, reverse })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A one-to-one index maps two ways that do not agree.
    #[error("broken bijection: {0}")]
    BrokenBijection(String),

    /// One index refers to an edge the other index does not have.
    #[error("dangling index entry: {0}")]
    DanglingIndex(String),

    /// A parent lists the same child more than once.
    #[error("duplicate child: {0}")]
    DuplicateChild(String),

    /// The forward and reverse indices hold different numbers of edges.
    #[error("index size mismatch: {forward} forward edges, {reverse} reverse edges")]
    LengthMismatch {
        /// Edges counted from the child side.
        forward: usize,
        /// Edges counted from the parent side.
        reverse: usize,
    },
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The relation whose collection failed the check.
    pub connection: Option<ConnectionId>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the relation.
    #[must_use]
    pub fn with_connection(mut self, connection: ConnectionId) -> Self {
        self.connection = Some(connection);
        self
    }
}

/// Result type alias using the refstore [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
