//! Parsed definition records.
//!
//! These are plain value records produced by the grammar layer. They are
//! immutable for the lifetime of a compilation snapshot; the resolution
//! engine builds all derived graphs fresh from them on every pass.

pub mod mapping;
pub mod store;

pub use mapping::{
    BindingSource, ExtendsRef, IncludedMapping, MappingDefinition, MappingEntry, MappingKind,
    PropertyBinding, SubstitutionEdge,
};
pub use store::{
    Column, ColumnRef, ColumnType, ComparisonOp, Filter, IncludedStore, Join, Literal, Operand,
    Predicate, Schema, StoreDefinition, Table,
};
