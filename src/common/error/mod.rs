//! Unified error types for wordbin.

// Submodule declarations
pub mod types;

// Re-exports
pub use types::{Error, Result};
