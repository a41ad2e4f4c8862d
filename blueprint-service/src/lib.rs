//! Blueprint parsing and resolution service
//!
//! This crate turns a YAML blueprint document into a fully resolved
//! deployment plan: it folds the document's transitive imports into one
//! combined tree, validates the result against the DSL schema, linearizes
//! type derivation chains, wires plugins to node interfaces, and resolves
//! workflow and policy bodies.
//!
//! The entry points are [`parse`] and [`parse_from_file`], or the
//! [`Parser`] type when a custom alias map is injected.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Document parsing: YAML front end, import resolution, schema validation
pub mod parser;

/// Semantic resolution: types, nodes, workflow and policy bodies
pub mod resolver;

mod cycle;

pub use blueprint_core::prelude::*;
pub use parser::{Parser, parse, parse_from_file};
