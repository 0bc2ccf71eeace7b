//! Foundation types shared across the compiler.

pub mod name;
pub mod span;

pub use name::QualifiedName;
pub use span::{SourceFile, SourceMap, Span};
