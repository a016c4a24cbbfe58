//! Types and utilities shared by the container and document readers.

// Submodule declarations
pub mod binary;
pub mod error;

// Re-exports for convenience
pub use error::{Error, Result};
