//! Engine flags.
//!
//! Flags are given as a whitespace separated string in command line style,
//! e.g. `"--stack-limit=32 --expose-gc"`. Unknown flags are reported and
//! ignored.

/// Default maximum number of nested calls.
pub const DEFAULT_STACK_LIMIT: usize = 64;

/// Default number of allocations between automatic collections.
pub const DEFAULT_GC_INTERVAL: usize = 100_000;

/// Tunables of a script engine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFlags {
    /// Maximum call depth before a `RangeError` is thrown
    pub stack_limit: usize,
    /// Install a global `gc()` function
    pub expose_gc: bool,
    /// Allocations between automatic collections at top-level entry points
    pub gc_interval: usize,
}

impl Default for EngineFlags {
    fn default() -> Self {
        Self {
            stack_limit: DEFAULT_STACK_LIMIT,
            expose_gc: false,
            gc_interval: DEFAULT_GC_INTERVAL,
        }
    }
}

impl EngineFlags {
    /// Parses a flag string on top of the defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use interpreter::EngineFlags;
    ///
    /// let flags = EngineFlags::parse("--stack-limit=10 --expose-gc");
    /// assert_eq!(flags.stack_limit, 10);
    /// assert!(flags.expose_gc);
    /// ```
    pub fn parse(flags: &str) -> Self {
        let mut parsed = Self::default();
        parsed.apply(flags);
        parsed
    }

    /// Applies a flag string to these flags.
    pub fn apply(&mut self, flags: &str) {
        for flag in flags.split_whitespace() {
            let flag = flag.trim_start_matches('-');
            let (name, value) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (flag, None),
            };
            match (name.replace('_', "-").as_str(), value) {
                ("stack-limit", Some(v)) => match v.parse::<usize>() {
                    Ok(limit) if limit > 0 => self.stack_limit = limit,
                    _ => tracing::warn!(value = v, "invalid --stack-limit value"),
                },
                ("gc-interval", Some(v)) => match v.parse::<usize>() {
                    Ok(interval) if interval > 0 => self.gc_interval = interval,
                    _ => tracing::warn!(value = v, "invalid --gc-interval value"),
                },
                ("expose-gc", None) => self.expose_gc = true,
                ("no-expose-gc", None) => self.expose_gc = false,
                _ => tracing::warn!(flag, "ignoring unknown engine flag"),
            }
        }
    }
}
