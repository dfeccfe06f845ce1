//! Contract compliance tests for core_types
//!
//! These tests pin the parts of the API the engine and the bridge rely on.

use core_types::{ErrorKind, JsError, ObjectId, SourcePosition, Value};

/// Contract: object handles are copyable and hashable map keys
#[test]
fn test_object_id_is_hashable_key() {
    let mut set = std::collections::HashSet::new();
    set.insert(ObjectId::new(1, 0));
    set.insert(ObjectId::new(1, 0));
    set.insert(ObjectId::new(1, 1));
    assert_eq!(set.len(), 2);
}

/// Contract: int32 boundary decides the number representation
#[test]
fn test_int32_boundary() {
    assert_eq!(Value::from_i64(i32::MAX as i64), Value::Smi(i32::MAX));
    assert!(matches!(Value::from_i64(i32::MAX as i64 + 1), Value::Double(d) if d == 2147483648.0));
}

/// Contract: errors render as "<text> at <origin>:<line>"
#[test]
fn test_error_rendering() {
    let error = JsError::new(ErrorKind::SyntaxError, "Unexpected end of input").with_origin(
        "EVAL",
        SourcePosition {
            line: 1,
            column: 9,
            offset: 8,
        },
    );
    let text = error.to_string();
    assert!(text.ends_with(" at EVAL:1"));
    assert!(text.starts_with("SyntaxError: "));
}
