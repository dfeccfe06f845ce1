//! Core guest value types and error handling.
//!
//! This crate provides the foundational types shared by the guest script
//! engine and the cross-runtime bridge: value representation, heap object
//! handles, error types, and source location tracking.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of guest script values
//! - [`ObjectId`] - Generation-checked handle to a heap object
//! - [`JsError`] - Script errors with origin and stack information
//! - [`ErrorKind`] - Types of script errors
//! - [`SourcePosition`] - Source code location
//! - [`StackFrame`] - Call stack frame information
//!
//! # Examples
//!
//! ```
//! use core_types::{Value, JsError, ErrorKind};
//!
//! // Integral numbers inside the 32-bit range are stored as small integers
//! let num = Value::from_f64(42.0);
//! assert_eq!(num, Value::Smi(42));
//! assert_eq!(num.type_of(), "number");
//!
//! // Create an error
//! let error = JsError::new(ErrorKind::TypeError, "undefined is not a function");
//! assert_eq!(error.to_string(), "TypeError: undefined is not a function");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod object_id;
mod source;
mod value;

pub use error::{ErrorKind, JsError};
pub use object_id::ObjectId;
pub use source::{SourcePosition, StackFrame};
pub use value::{number_to_string, string_to_number, Value};
