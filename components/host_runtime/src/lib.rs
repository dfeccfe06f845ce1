//! Host runtime
//!
//! A reference-counted value model for the embedding side of the bridge:
//! - [`HostValue`] scalars and [`HostRef`] references to shared cells
//! - Arrays, hashes, boxed scalars and code values
//! - Blessing into classes with depth-first method resolution
//! - Native attachments dropped together with their cell
//! - Calls that report errors as [`HostError`] values
//!
//! # Example
//!
//! ```
//! use host_runtime::{CallContext, HostRef, HostRuntime, HostValue};
//! use std::collections::HashMap;
//!
//! let rt = HostRuntime::new();
//! rt.define_class("Counter", &[]);
//! rt.define_method("Counter", "get", |_, call| {
//!     let this = call.args[0].as_ref().and_then(|r| r.hash_get("n"));
//!     Ok(vec![this.unwrap_or_default()])
//! });
//!
//! let object = HostRef::new_hash(HashMap::from([("n".to_string(), HostValue::Int(3))]));
//! rt.bless(&object, "Counter");
//! let result = rt
//!     .call_method(&HostValue::Ref(object), "get", vec![], CallContext::Scalar)
//!     .unwrap();
//! assert!(matches!(result[0], HostValue::Int(3)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cell;
pub mod error;
pub mod runtime;
pub mod value;

pub use cell::{CallContext, HostCall, HostCell, HostCode, HostData, HostFn, HostKind, HostRef, WeakHostRef};
pub use error::{HostError, HostResult};
pub use runtime::HostRuntime;
pub use value::{latin1_to_string, HostValue};
