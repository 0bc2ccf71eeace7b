// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Definition records for the relmap compiler
//!
//! This crate contains the parsed value records for store and mapping
//! definitions, plus the foundation types (qualified names, source spans)
//! shared by the grammar layer and the resolution engine.

pub mod ast;
pub mod foundation;

// Re-export commonly used types
pub use foundation::{QualifiedName, SourceFile, SourceMap, Span};

pub use ast::*;
