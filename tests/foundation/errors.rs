//! Integration tests for Error types
//!
//! Tests error construction, display, and context.

use refstore_foundation::{ClassId, ConnectionId, ConnectionType, Error, ErrorContext, ErrorKind};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_broken_bijection() {
    let err = Error::broken_bijection("child 1 -> parent 2, parent 2 -> child 3");
    assert!(matches!(err.kind, ErrorKind::BrokenBijection(_)));
    assert!(err.context.is_none());
}

#[test]
fn error_dangling_index() {
    let err = Error::dangling_index("child 5");
    assert!(matches!(err.kind, ErrorKind::DanglingIndex(_)));
}

#[test]
fn error_duplicate_child() {
    let err = Error::duplicate_child("child 5 under parent 1");
    assert!(matches!(err.kind, ErrorKind::DuplicateChild(_)));
}

#[test]
fn error_length_mismatch() {
    let err = Error::length_mismatch(4, 3);
    assert_eq!(
        err.kind,
        ErrorKind::LengthMismatch {
            forward: 4,
            reverse: 3
        }
    );
}

// =============================================================================
// Error Display
// =============================================================================

#[test]
fn error_display_includes_detail() {
    let err = Error::dangling_index("child 5");
    let msg = err.to_string();
    assert!(msg.contains("dangling"));
    assert!(msg.contains("child 5"));
}

#[test]
fn error_display_length_mismatch() {
    let msg = Error::length_mismatch(4, 3).to_string();
    assert!(msg.contains('4'));
    assert!(msg.contains('3'));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn error_with_connection_context() {
    let connection = ConnectionId::new(ClassId(1), ClassId(2), ConnectionType::OneToOne, false);
    let err = Error::broken_bijection("x")
        .with_context(ErrorContext::new().with_connection(connection));

    let context = err.context.expect("context was set");
    assert_eq!(context.connection, Some(connection));
}

#[test]
fn error_is_std_error() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>(_: &E) {}
    assert_error(&Error::duplicate_child("x"));
}
