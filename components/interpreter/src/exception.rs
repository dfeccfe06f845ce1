//! Abrupt completions carried through the engine.

use core_types::{StackFrame, Value};
use std::fmt;
use std::rc::Rc;

/// Where an exception was raised.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowSite {
    /// Origin of the innermost script frame
    pub source: Rc<str>,
    /// Line in that origin
    pub line: u32,
    /// Call stack at the throw, innermost first
    pub stack: Vec<StackFrame>,
}

impl ThrowSite {
    /// A site outside of any script frame.
    pub fn unknown() -> Self {
        Self {
            source: Rc::from("<unknown>"),
            line: 0,
            stack: Vec::new(),
        }
    }
}

/// An exception propagating out of script or native code.
#[derive(Debug, Clone)]
pub enum Exception {
    /// A value thrown by `throw` or raised by the engine. Catchable.
    Thrown {
        /// The thrown value
        value: Value,
        /// Location of the throw
        site: ThrowSite,
    },
    /// Execution was interrupted. Skips every `catch` and `finally`.
    Terminated {
        /// Location where termination was observed
        site: ThrowSite,
    },
}

impl Exception {
    /// Location of the exception.
    pub fn site(&self) -> &ThrowSite {
        match self {
            Exception::Thrown { site, .. } | Exception::Terminated { site } => site,
        }
    }

    /// The thrown value, `None` after termination.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Exception::Thrown { value, .. } => Some(value),
            Exception::Terminated { .. } => None,
        }
    }

    /// Whether this is a termination.
    pub fn is_termination(&self) -> bool {
        matches!(self, Exception::Terminated { .. })
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exception::Thrown { value, site } => {
                write!(f, "uncaught {} at {}:{}", value, site.source, site.line)
            }
            Exception::Terminated { site } => {
                write!(f, "execution terminated at {}:{}", site.source, site.line)
            }
        }
    }
}
