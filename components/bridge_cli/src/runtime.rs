//! Runtime orchestration for script execution
//!
//! The Runtime owns a host runtime and a bridge context, and binds the host
//! functions scripts may call:
//! - `print(...)` writes its arguments, space separated, to the output
//! - `env(name)` returns an environment variable or undefined

use crate::error::CliResult;
use bridge::{BridgeConfig, BridgeContext};
use host_runtime::{HostError, HostRuntime, HostValue};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use tracing::debug;

/// Destination of `print` output.
pub type Output = Rc<RefCell<dyn Write>>;

/// Main runtime that executes scripts through the bridge
pub struct Runtime {
    context: BridgeContext,
}

impl Runtime {
    /// Create a runtime printing to stdout
    ///
    /// # Example
    /// ```
    /// use bridge::BridgeConfig;
    /// use bridge_cli::Runtime;
    ///
    /// let runtime = Runtime::new(BridgeConfig::default());
    /// let result = runtime.execute_string("6 * 7").unwrap();
    /// assert_eq!(result.to_display_string(), "42");
    /// ```
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_output(config, Rc::new(RefCell::new(std::io::stdout())))
    }

    /// Create a runtime printing to `output`
    pub fn with_output(config: BridgeConfig, output: Output) -> Self {
        let context = BridgeContext::new(Rc::new(HostRuntime::new()), config);
        context.bind_function("print", move |_, call| {
            let line: Vec<String> = call.args.iter().map(HostValue::to_display_string).collect();
            writeln!(output.borrow_mut(), "{}", line.join(" "))
                .map_err(|e| HostError::die(format!("print failed: {}", e)))?;
            Ok(vec![])
        });
        context.bind_function("env", |_, call| {
            let name = call.args.first().map(HostValue::to_display_string).unwrap_or_default();
            Ok(vec![std::env::var(name).map(HostValue::from).unwrap_or_default()])
        });
        Self { context }
    }

    /// The bridge context scripts run in
    pub fn context(&self) -> &BridgeContext {
        &self.context
    }

    /// Execute a script file; the path is used as the script origin
    ///
    /// # Errors
    /// Returns `CliError` if the file cannot be read or execution fails
    pub fn execute_file(&self, path: &str) -> CliResult<HostValue> {
        let source = std::fs::read_to_string(path)?;
        debug!(path, bytes = source.len(), "executing file");
        Ok(self.context.evaluate(&source, Some(path))?)
    }

    /// Execute a script source string
    ///
    /// # Errors
    /// Returns `CliError` if compilation or execution fails
    pub fn execute_string(&self, source: &str) -> CliResult<HostValue> {
        Ok(self.context.evaluate(source, None)?)
    }

    /// Start the interactive REPL
    pub fn repl(&self) -> CliResult<()> {
        crate::repl::run_repl(self)
    }
}
