//! Errors raised by host code.
//!
//! Host errors follow `die` conventions: the message always ends with a
//! newline once raised, and callers that forward the text elsewhere strip it
//! again with [`HostError::trimmed`].

use thiserror::Error;

/// An error thrown by a host function or raised by the runtime itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    /// Raises `message`, appending a newline when it lacks one.
    ///
    /// # Examples
    ///
    /// ```
    /// use host_runtime::HostError;
    ///
    /// let err = HostError::die("boom");
    /// assert_eq!(err.message(), "boom\n");
    /// assert_eq!(err.trimmed(), "boom");
    /// ```
    pub fn die(message: impl Into<String>) -> Self {
        let mut message = message.into();
        if !message.ends_with('\n') {
            message.push('\n');
        }
        Self { message }
    }

    /// Full message, trailing newline included.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Message without its trailing newline.
    pub fn trimmed(&self) -> &str {
        self.message.strip_suffix('\n').unwrap_or(&self.message)
    }
}

/// Result of host operations.
pub type HostResult<T> = Result<T, HostError>;
