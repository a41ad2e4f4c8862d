//! # Blueprint Core
//!
//! Core types and errors for working with blueprint documents: the typed
//! document model, the resolved deployment plan, the error surface of the
//! parsing pipeline, and the alias-map configuration.
//!
//! The actual pipeline (import resolution, schema validation, type and node
//! resolution) lives in the `blueprint-service` crate; this crate holds the
//! vocabulary shared between the pipeline and its callers.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Core error types for blueprint parsing and resolution
pub mod error;

/// Alias-map configuration for import and ref path indirection
pub mod aliases;

/// Type definitions for blueprint documents and deployment plans
pub mod types;

// Re-export commonly used types
pub use aliases::AliasMap;
pub use error::{BlueprintError, Result};
pub use types::{Document, Plan, ProcessedNode};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::aliases::AliasMap;
    pub use crate::error::{BlueprintError, Result};
    pub use crate::types::*;
}
