//! Script error types and error handling.
//!
//! This module provides error types that correspond to the guest language's
//! built-in error types, along with origin and stack information. Errors are
//! rendered as `"<text> at <origin>:<line>"` once a position is attached.

use crate::{SourcePosition, StackFrame};
use std::fmt;

/// The kind of script error.
///
/// The first group corresponds to the guest language's built-in error
/// constructors. [`ErrorKind::Thrown`] covers any other thrown value and
/// [`ErrorKind::Terminated`] marks an execution that was interrupted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Plain `Error`
    Error,
    /// Syntax error in script code
    SyntaxError,
    /// Type error (e.g., calling a non-function)
    TypeError,
    /// Reference to an undefined variable
    ReferenceError,
    /// Value out of allowed range
    RangeError,
    /// Error in eval() function
    EvalError,
    /// Error in URI handling functions
    URIError,
    /// Internal engine error
    InternalError,
    /// A thrown value that is not a recognised error object
    Thrown,
    /// Execution was interrupted from outside
    Terminated,
}

impl ErrorKind {
    /// Constructor name used as the message prefix, if any.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            ErrorKind::Error => Some("Error"),
            ErrorKind::SyntaxError => Some("SyntaxError"),
            ErrorKind::TypeError => Some("TypeError"),
            ErrorKind::ReferenceError => Some("ReferenceError"),
            ErrorKind::RangeError => Some("RangeError"),
            ErrorKind::EvalError => Some("EvalError"),
            ErrorKind::URIError => Some("URIError"),
            ErrorKind::InternalError => Some("InternalError"),
            ErrorKind::Thrown | ErrorKind::Terminated => None,
        }
    }

    /// Maps a constructor name back to its kind.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Error" => ErrorKind::Error,
            "SyntaxError" => ErrorKind::SyntaxError,
            "TypeError" => ErrorKind::TypeError,
            "ReferenceError" => ErrorKind::ReferenceError,
            "RangeError" => ErrorKind::RangeError,
            "EvalError" => ErrorKind::EvalError,
            "URIError" => ErrorKind::URIError,
            "InternalError" => ErrorKind::InternalError,
            _ => return None,
        })
    }
}

/// A script error with message, origin and stack trace.
///
/// # Examples
///
/// ```
/// use core_types::{JsError, ErrorKind, SourcePosition};
///
/// let error = JsError::new(ErrorKind::SyntaxError, "Unexpected token }")
///     .with_origin("EVAL", SourcePosition { line: 1, column: 4, offset: 3 });
///
/// assert_eq!(error.to_string(), "SyntaxError: Unexpected token } at EVAL:1");
/// ```
#[derive(Debug, Clone)]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message, without the constructor prefix
    pub message: String,
    /// Stack trace (call stack at the time of the error)
    pub stack: Vec<StackFrame>,
    /// Source position where the error occurred
    pub source_position: Option<SourcePosition>,
    /// Origin name of the script the error came from
    pub source_name: Option<String>,
}

impl JsError {
    /// Creates an error without position information.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stack: Vec::new(),
            source_position: None,
            source_name: None,
        }
    }

    /// Attaches the script origin and position.
    pub fn with_origin(mut self, source: impl Into<String>, position: SourcePosition) -> Self {
        self.source_name = Some(source.into());
        self.source_position = Some(position);
        self
    }

    /// Line number of the error, `0` when unknown.
    pub fn line(&self) -> u32 {
        self.source_position.as_ref().map_or(0, |p| p.line)
    }

    /// The error text as the guest would stringify it, without location.
    pub fn text(&self) -> String {
        match self.kind.name() {
            Some(name) if self.message.is_empty() => name.to_string(),
            Some(name) => format!("{}: {}", name, self.message),
            None => self.message.clone(),
        }
    }
}

impl fmt::Display for JsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())?;
        if let Some(source) = &self.source_name {
            write!(f, " at {}:{}", source, self.line())?;
        }
        Ok(())
    }
}

impl std::error::Error for JsError {}
