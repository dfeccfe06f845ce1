//! Integration test suite for the Corten value bridge
//!
//! This crate provides integration tests that verify components work
//! together correctly across component boundaries.

/// Re-export components for test convenience
pub mod components {
    pub use bridge;
    pub use bridge_cli;
    pub use core_types;
    pub use host_runtime;
    pub use interpreter;
    pub use memory_manager;
    pub use parser;
}
