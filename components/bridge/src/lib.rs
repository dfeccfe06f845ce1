//! Bridge - exchange of values between the host runtime and the guest engine
//!
//! This component provides:
//! - [`BridgeContext`], a guest engine bound to a host runtime
//! - Conversion of scalars, arrays, hashes and code in both directions,
//!   preserving sharing, cycles and object identity
//! - Guest proxies for blessed host references, with per-class prototypes
//!   and optional `to_js` specialization
//! - Host classes synthesized from guest objects carrying `__hostPackage`
//! - Wall-clock budgets for evaluations and a guest `Thread` constructor
//!
//! # Examples
//!
//! ```
//! use bridge::{BridgeConfig, BridgeContext};
//! use host_runtime::{HostRef, HostRuntime, HostValue};
//! use std::collections::HashMap;
//! use std::rc::Rc;
//!
//! let context = BridgeContext::new(Rc::new(HostRuntime::new()), BridgeConfig::default());
//!
//! let mut entries = HashMap::new();
//! entries.insert("name".to_string(), HostValue::from("bridge"));
//! context.bind("config", HostValue::Ref(HostRef::new_hash(entries)));
//!
//! let greeting = context.evaluate("'hello ' + config.name", None).unwrap();
//! assert_eq!(greeting.to_display_string(), "hello bridge");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod call;
mod classing;
pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod identity;
mod marshal;
mod prototype;
mod thread;
pub mod timeout;
mod wrapper;

pub use config::BridgeConfig;
pub use context::BridgeContext;
pub use error::{BridgeError, BridgeResult, CONTEXT_GONE, DEFAULT_ORIGIN};
pub use wrapper::{CallTarget, WRAPPER_EXTERNAL_BYTES};

/// Guest function property asking for the elements of an array result to be
/// returned as a list.
pub const HOST_RETURNS_LIST: &str = "__hostReturnsList";

/// Guest object property naming the host package of a reverse-classed
/// instance.
pub const HOST_PACKAGE: &str = "__hostPackage";

/// Host method returning guest source of a per-class converter.
pub const TO_JS: &str = "to_js";
