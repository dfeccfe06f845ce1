//! Bridge errors and exception formatting.

use host_runtime::HostError;
use interpreter::{Exception, VM};
use thiserror::Error;

/// Origin reported for scripts evaluated without one.
pub const DEFAULT_ORIGIN: &str = "EVAL";

/// Message of a host call into a dropped context.
pub const CONTEXT_GONE: &str = "Fatal error: context is gone";

/// Errors surfaced by [`crate::BridgeContext`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// Script failed to compile, threw, or ran out of time. The message reads
    /// `"<message> at <source>:<line>"`.
    #[error("{0}")]
    Script(String),

    /// A host function raised an error outside of any script.
    #[error("{}", .0.trimmed())]
    Host(#[from] HostError),

    /// Configuration could not be loaded.
    #[error("invalid bridge configuration: {0}")]
    Config(String),
}

impl BridgeError {
    /// The script error text, if this is a script error.
    pub fn script_message(&self) -> Option<&str> {
        match self {
            BridgeError::Script(message) => Some(message),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Config(err.to_string())
    }
}

/// Result of bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Formats an exception as `"<message> at <source>:<line>"`.
///
/// Termination reads `"execution timed out"`. Exceptions raised outside of
/// any script frame are attributed to [`DEFAULT_ORIGIN`].
pub fn exception_message(vm: &VM, exception: &Exception) -> String {
    let site = exception.site();
    let source = if site.line == 0 && site.stack.iter().all(|f| f.source_url.is_none()) {
        DEFAULT_ORIGIN
    } else {
        &*site.source
    };
    let text = if exception.is_termination() {
        "execution timed out".to_string()
    } else {
        vm.describe_exception(exception).text()
    };
    format!("{} at {}:{}", text, source, site.line)
}
