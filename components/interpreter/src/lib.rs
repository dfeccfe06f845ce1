//! Guest script engine
//!
//! This crate provides a tree-walking interpreter for the guest scripting
//! language with:
//! - A mark/sweep heap shared with embedders through [`VM::add_root`] and
//!   per-object host data
//! - Native functions that may re-enter the engine
//! - Cooperative termination through [`InterruptHandle`]
//! - Call depth limits and engine flags
//!
//! # Example
//!
//! ```
//! use interpreter::VM;
//! use core_types::Value;
//!
//! let vm = VM::new();
//! let result = vm.eval("var x = 40; x + 2", "EVAL").unwrap();
//! assert_eq!(result, Value::Smi(42));
//!
//! let err = vm.eval("null.foo", "EVAL").unwrap_err();
//! let described = vm.describe_exception(&err);
//! assert_eq!(
//!     described.to_string(),
//!     "TypeError: Cannot read properties of null (reading 'foo') at EVAL:1"
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod builtins;
pub mod call_frame;
pub mod exception;
mod exec;
pub mod flags;
pub mod interrupt;
mod ops;
pub mod realm;
pub mod vm;

// Re-export main types at crate root
pub use call_frame::CallFrame;
pub use exception::{Exception, ThrowSite};
pub use flags::EngineFlags;
pub use interrupt::{InterruptHandle, InterruptToken};
pub use ops::Hint;
pub use realm::Realm;
pub use vm::{HandleScope, NativeCall, NativeFn, VM};
