//! Call frame for function call stack management

use core_types::StackFrame;
use std::cell::Cell;
use std::rc::Rc;

/// Call frame representing one active invocation
///
/// Frames are pushed for script entry points, script functions and native
/// functions alike; their count is the engine's call depth.
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// Function name, empty for top-level code and anonymous functions
    pub function_name: String,
    /// Origin of the code running in this frame, `None` for native code
    pub source: Option<Rc<str>>,
    /// Line of the statement being executed
    pub line: Cell<u32>,
    /// Column of the statement being executed
    pub column: Cell<u32>,
}

impl CallFrame {
    /// Create a frame for script code from `source`
    pub fn script(function_name: impl Into<String>, source: Rc<str>, line: u32) -> Self {
        Self {
            function_name: function_name.into(),
            source: Some(source),
            line: Cell::new(line),
            column: Cell::new(1),
        }
    }

    /// Create a frame for a native function
    pub fn native(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            source: None,
            line: Cell::new(0),
            column: Cell::new(0),
        }
    }

    /// Whether the frame runs script code
    pub fn is_script(&self) -> bool {
        self.source.is_some()
    }

    /// Snapshot for error stack traces
    pub fn to_stack_frame(&self) -> StackFrame {
        StackFrame {
            function_name: (!self.function_name.is_empty()).then(|| self.function_name.clone()),
            source_url: self.source.as_deref().map(str::to_string),
            line: self.line.get(),
            column: self.column.get(),
        }
    }
}
