//! Memory Manager - guest heap and garbage collection
//!
//! This component provides:
//! - A non-moving mark/sweep heap of generation-checked slots
//! - Guest objects, arrays, functions and scope records
//! - Persistent roots and weak object handles
//! - Per-object identity hashes and embedder data with finalization
//!
//! # Examples
//!
//! ```
//! use memory_manager::{Heap, JsObject, ObjectKind};
//! use core_types::Value;
//!
//! let mut heap = Heap::new();
//! let kept = heap.allocate(JsObject::new(ObjectKind::Ordinary, None));
//! let dropped = heap.allocate(JsObject::new(ObjectKind::Ordinary, None));
//! let root = heap.add_root(Value::HeapObject(kept));
//!
//! heap.collect_garbage(&[]);
//! assert!(heap.is_valid(kept));
//! assert!(!heap.is_valid(dropped));
//!
//! heap.remove_root(root);
//! heap.collect_garbage(&[]);
//! assert!(!heap.is_valid(kept));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod gc;
pub mod handle;
pub mod heap;
pub mod object;

pub use gc::GcStats;
pub use handle::{RootId, WeakObject};
pub use heap::{Heap, DEFAULT_IDENTITY_HASH_MASK};
pub use object::{
    Binding, FunctionCode, FunctionData, JsObject, ObjectKind, Property, PropertyMap, Scope,
};
