//! Resolution and validation passes.
//!
//! The passes run in the order `pipeline::compile` wires them; each one
//! consumes the immutable registry and the structures of earlier passes
//! and produces either a fresh derived structure or diagnostics.

pub mod cycles;
pub mod inheritance;
pub mod mapping_graph;
pub mod pipeline;
pub mod registry;
pub mod store_graph;
pub mod substitution;

pub use cycles::{find_cycle, format_cycle, CycleReport};
pub use inheritance::validate_inheritance;
pub use mapping_graph::{build_mapping_graph, MappingEdge, MappingGraph, MappingId};
pub use pipeline::{compile, Compiler, ResolvedProgram};
pub use registry::{DefinitionRegistry, EntryLocation};
pub use store_graph::{build_store_graph, StoreEdge, StoreGraph, StoreId};
pub use substitution::{resolve_substitutions, SubstitutionPath, SubstitutionTable};
