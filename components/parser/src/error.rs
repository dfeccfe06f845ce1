//! Parser error types and helpers

use core_types::{ErrorKind, JsError, SourcePosition};

/// Create a syntax error at a given position
pub fn syntax_error(message: impl Into<String>, position: Option<SourcePosition>) -> JsError {
    let mut error = JsError::new(ErrorKind::SyntaxError, message);
    error.source_position = position;
    error
}

/// Create an unexpected token error
pub fn unexpected_token(got: &str, position: Option<SourcePosition>) -> JsError {
    syntax_error(format!("Unexpected {}", got), position)
}

/// Create an unexpected end of input error
pub fn unexpected_eof(position: Option<SourcePosition>) -> JsError {
    syntax_error("Unexpected end of input", position)
}
