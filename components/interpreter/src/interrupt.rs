//! Cooperative interruption of running scripts.
//!
//! The engine polls an [`InterruptToken`] on every loop iteration and every
//! function call. Another thread holding the matching [`InterruptHandle`] can
//! request termination; the running script then unwinds with an uncatchable
//! termination.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A token observed by the engine to detect interrupt requests.
#[derive(Debug, Clone)]
pub struct InterruptToken {
    interrupted: Arc<AtomicBool>,
}

impl InterruptToken {
    /// Create a new token + handle pair.
    pub fn new() -> (Self, InterruptHandle) {
        let interrupted = Arc::new(AtomicBool::new(false));
        (
            Self {
                interrupted: interrupted.clone(),
            },
            InterruptHandle { interrupted },
        )
    }

    /// Whether termination was requested.
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Relaxed)
    }

    /// Clears a previous request.
    pub fn reset(&self) {
        self.interrupted.store(false, Ordering::Relaxed);
    }
}

/// A handle used to request that the engine stops executing script.
///
/// Handles are `Send + Sync` and may be moved to a watchdog thread.
#[derive(Debug, Clone)]
pub struct InterruptHandle {
    interrupted: Arc<AtomicBool>,
}

impl InterruptHandle {
    /// Request that the engine terminates at its next check.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Relaxed);
    }
}
