//! Source position and stack frame types for error tracking.

use std::fmt;

/// A position in script source.
///
/// Lines and columns are 1-indexed; `offset` is a byte offset.
///
/// # Examples
///
/// ```
/// use core_types::SourcePosition;
///
/// let pos = SourcePosition::start();
/// assert_eq!((pos.line, pos.column, pos.offset), (1, 1, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePosition {
    /// Line number, 1-indexed
    pub line: u32,
    /// Column number, 1-indexed
    pub column: u32,
    /// Byte offset from the start of the source
    pub offset: usize,
}

impl SourcePosition {
    /// The first character of a script.
    pub const fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

/// A single frame of the guest call stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Name of the function, or None for anonymous functions
    pub function_name: Option<String>,
    /// Origin name of the script, or None if not available
    pub source_url: Option<String>,
    /// Line number where the call occurred
    pub line: u32,
    /// Column number where the call occurred
    pub column: u32,
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.function_name.as_deref().unwrap_or("<anonymous>");
        let source = self.source_url.as_deref().unwrap_or("<unknown>");
        write!(f, "at {} ({}:{}:{})", name, source, self.line, self.column)
    }
}
