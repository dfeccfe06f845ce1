//! Unit tests for JsError and ErrorKind

use core_types::{ErrorKind, JsError, SourcePosition};

fn at_line(line: u32) -> SourcePosition {
    SourcePosition {
        line,
        column: 1,
        offset: 0,
    }
}

#[test]
fn test_error_without_origin_has_no_location() {
    let error = JsError::new(ErrorKind::RangeError, "bad length");
    assert_eq!(error.to_string(), "RangeError: bad length");
    assert_eq!(error.line(), 0);
}

#[test]
fn test_error_with_origin_formats_location() {
    let error = JsError::new(ErrorKind::ReferenceError, "x is not defined")
        .with_origin("EVAL", at_line(4));
    assert_eq!(error.to_string(), "ReferenceError: x is not defined at EVAL:4");
}

#[test]
fn test_thrown_string_keeps_text() {
    let error = JsError::new(ErrorKind::Thrown, "plain text").with_origin("lib.js", at_line(2));
    assert_eq!(error.to_string(), "plain text at lib.js:2");
}

#[test]
fn test_terminated_text() {
    let error =
        JsError::new(ErrorKind::Terminated, "execution timed out").with_origin("EVAL", at_line(1));
    assert_eq!(error.to_string(), "execution timed out at EVAL:1");
}

#[test]
fn test_empty_message_prints_kind_only() {
    let error = JsError::new(ErrorKind::Error, "");
    assert_eq!(error.text(), "Error");
}

#[test]
fn test_unknown_constructor_name() {
    assert_eq!(ErrorKind::from_name("MyError"), None);
}
