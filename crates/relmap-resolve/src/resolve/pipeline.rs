//! Compilation pipeline for store and mapping definitions.
//!
//! Orchestrates the validation passes over one immutable snapshot of
//! parsed definitions:
//!
//! 1. Registry construction (duplicate names)
//! 2. Store inclusion graph (self/duplicate includes)
//! 3. Mapping inclusion graph
//! 4. Cycle detection on the store graph
//! 5. Cycle detection on the raw mapping graph
//! 6. Substitution resolution + resolved-overlay cycle detection
//! 7. Extension legality
//!
//! Each pass aggregates its diagnostics; the pipeline aborts at the first
//! pass boundary with errors, so the first failure per traversal order is
//! always preserved. Compilation is single-threaded and synchronous; every
//! pass rebuilds its structures from scratch, and nothing from a previous
//! snapshot is patched in place.

use crate::error::{CompileError, CompileFailure, ErrorKind, PassResult};
use crate::resolve::cycles::{find_cycle, format_cycle};
use crate::resolve::inheritance::validate_inheritance;
use crate::resolve::mapping_graph::{build_mapping_graph, MappingGraph};
use crate::resolve::registry::DefinitionRegistry;
use crate::resolve::store_graph::{build_store_graph, StoreGraph};
use crate::resolve::substitution::{resolve_substitutions, SubstitutionTable};
use relmap_ast::{MappingDefinition, QualifiedName, StoreDefinition};
use tracing::{debug, trace};

/// The validated output of one successful compilation pass.
///
/// Owned exclusively by the pass that built it until committed; the
/// execution layer queries it read-only afterwards.
#[derive(Debug)]
pub struct ResolvedProgram {
    pub registry: DefinitionRegistry,
    pub store_graph: StoreGraph,
    pub mapping_graph: MappingGraph,
    pub substitutions: SubstitutionTable,
}

impl ResolvedProgram {
    /// Resolve a raw store reference made by `descendant` into its
    /// effective store as seen from `root`, per the substitutions
    /// accumulated on the include chain between them.
    ///
    /// Returns None when either mapping is unknown or the descendant is
    /// not reachable from the root.
    pub fn resolved_store(
        &self,
        root: &QualifiedName,
        descendant: &QualifiedName,
        store: &QualifiedName,
    ) -> Option<QualifiedName> {
        let root_id = self.mapping_graph.id(root)?;
        let descendant_id = self.mapping_graph.id(descendant)?;
        self.substitutions
            .resolve_store(root_id, descendant_id, store)
    }
}

/// Compile one snapshot of parsed definitions.
///
/// # Errors
///
/// The diagnostics of the first failing pass, in traversal order. See
/// [`crate::error::ErrorKind`] for the kinds each pass raises.
pub fn compile(
    stores: Vec<StoreDefinition>,
    mappings: Vec<MappingDefinition>,
) -> PassResult<ResolvedProgram> {
    debug!(
        stores = stores.len(),
        mappings = mappings.len(),
        "compilation pass starting"
    );

    let registry = DefinitionRegistry::build(stores, mappings)?;
    trace!("registry built");

    let store_graph = build_store_graph(&registry)?;
    let mapping_graph = build_mapping_graph(&registry)?;
    trace!(
        store_nodes = store_graph.node_count(),
        mapping_nodes = mapping_graph.node_count(),
        "inclusion graphs built"
    );

    if let Some(report) = find_cycle(store_graph.node_count(), |node| {
        store_graph
            .neighbors(node)
            .iter()
            .map(|e| (e.target, e.span))
            .collect()
    }) {
        let message = format_cycle(&report, |n| store_graph.name(n).clone());
        return Err(vec![CompileError::new(
            ErrorKind::CircularStoreInclude,
            report.closing_span,
            message,
        )]);
    }

    if let Some(report) = find_cycle(mapping_graph.node_count(), |node| {
        mapping_graph
            .neighbors(node)
            .iter()
            .map(|e| (e.target, e.span))
            .collect()
    }) {
        let message = format_cycle(&report, |n| mapping_graph.name(n).clone());
        return Err(vec![CompileError::new(
            ErrorKind::CircularMappingInclude,
            report.closing_span,
            message,
        )]);
    }
    trace!("inclusion graphs are acyclic");

    let substitutions = resolve_substitutions(&registry, &store_graph, &mapping_graph)?;
    trace!(pairs = substitutions.pairs().count(), "substitutions resolved");

    let inheritance_errors = validate_inheritance(&registry);
    if !inheritance_errors.is_empty() {
        return Err(inheritance_errors);
    }

    debug!("compilation pass succeeded");
    Ok(ResolvedProgram {
        registry,
        store_graph,
        mapping_graph,
        substitutions,
    })
}

/// Compile-or-rollback wrapper around [`compile`].
///
/// Holds the committed result of the last successful pass. A recompilation
/// builds everything fresh; on failure the pending structures are
/// discarded and the committed program stays untouched.
#[derive(Debug, Default)]
pub struct Compiler {
    committed: Option<ResolvedProgram>,
}

impl Compiler {
    /// A compiler with no committed program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompile from a full snapshot of the current source set.
    ///
    /// # Errors
    ///
    /// [`CompileFailure`] carrying the failed pass's diagnostics; the
    /// previously committed program is retained.
    pub fn recompile(
        &mut self,
        stores: Vec<StoreDefinition>,
        mappings: Vec<MappingDefinition>,
    ) -> Result<&ResolvedProgram, CompileFailure> {
        match compile(stores, mappings) {
            Ok(program) => Ok(&*self.committed.insert(program)),
            Err(diagnostics) => {
                debug!(
                    diagnostics = diagnostics.len(),
                    "compilation pass failed; previous program retained"
                );
                Err(CompileFailure::new(diagnostics))
            }
        }
    }

    /// The committed program of the last successful pass, if any.
    pub fn committed(&self) -> Option<&ResolvedProgram> {
        self.committed.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relmap_ast::{
        IncludedMapping, IncludedStore, MappingEntry, MappingKind, Span,
    };

    fn test_span() -> Span {
        Span::new(0, 0, 0, 1)
    }

    fn store(name: &str) -> StoreDefinition {
        StoreDefinition::new(name, test_span())
    }

    fn store_including(name: &str, targets: &[&str]) -> StoreDefinition {
        let mut store = store(name);
        for target in targets {
            store.includes.push(IncludedStore::new(*target, test_span()));
        }
        store
    }

    fn mapping(name: &str) -> MappingDefinition {
        MappingDefinition::new(name, test_span())
    }

    #[test]
    fn test_empty_unit_compiles() {
        let program = compile(vec![], vec![]).unwrap();
        assert_eq!(program.registry.store_count(), 0);
        assert_eq!(program.registry.mapping_count(), 0);
    }

    #[test]
    fn test_store_cycle_reported_with_path() {
        // A includes B; B includes C; C includes A
        let errors = compile(
            vec![
                store_including("A", &["B"]),
                store_including("B", &["C"]),
                store_including("C", &["A"]),
            ],
            vec![],
        )
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::CircularStoreInclude);
        assert_eq!(errors[0].message, "A: A -> B -> C -> A");
    }

    #[test]
    fn test_mapping_cycle_reported_with_path() {
        let mut m1 = mapping("M1");
        m1.includes.push(IncludedMapping::new("M2", test_span()));
        let mut m2 = mapping("M2");
        m2.includes.push(IncludedMapping::new("M1", test_span()));

        let errors = compile(vec![], vec![m1, m2]).unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::CircularMappingInclude);
        assert_eq!(errors[0].message, "M1: M1 -> M2 -> M1");
    }

    #[test]
    fn test_resolved_store_lookup() {
        let mut am = mapping("AM");
        am.entries.push(
            MappingEntry::new("Person", MappingKind::Class, "model.Person", test_span())
                .with_store("StoreX"),
        );
        let mut bm = mapping("BM");
        bm.includes.push(IncludedMapping::with_substitution(
            "AM", "StoreX", "StoreY", test_span(),
        ));

        let program = compile(vec![store("StoreX"), store("StoreY")], vec![am, bm]).unwrap();

        assert_eq!(
            program.resolved_store(&"BM".into(), &"AM".into(), &"StoreX".into()),
            Some("StoreY".into())
        );
        // From AM itself the reference is unsubstituted.
        assert_eq!(
            program.resolved_store(&"AM".into(), &"AM".into(), &"StoreX".into()),
            Some("StoreX".into())
        );
        assert_eq!(
            program.resolved_store(&"AM".into(), &"BM".into(), &"StoreX".into()),
            None
        );
    }

    #[test]
    fn test_compiler_commits_on_success() {
        let mut compiler = Compiler::new();
        assert!(compiler.committed().is_none());

        compiler.recompile(vec![store("A")], vec![]).unwrap();
        assert_eq!(compiler.committed().unwrap().registry.store_count(), 1);
    }

    #[test]
    fn test_compiler_retains_previous_program_on_failure() {
        let mut compiler = Compiler::new();
        compiler.recompile(vec![store("A")], vec![]).unwrap();

        let failure = compiler
            .recompile(vec![store_including("B", &["B"])], vec![])
            .unwrap_err();
        assert_eq!(failure.diagnostics[0].kind, ErrorKind::SelfInclude);

        // The committed program still reflects the last successful pass.
        let committed = compiler.committed().unwrap();
        assert_eq!(committed.registry.store_count(), 1);
        assert!(committed.registry.store(&"A".into()).is_some());
    }

    #[test]
    fn test_recompilation_rebuilds_from_scratch() {
        let mut compiler = Compiler::new();
        compiler
            .recompile(vec![store("A"), store("B")], vec![])
            .unwrap();

        // Deleting B from the source set leaves no residue after recompile.
        compiler.recompile(vec![store("A")], vec![]).unwrap();
        let committed = compiler.committed().unwrap();
        assert_eq!(committed.registry.store_count(), 1);
        assert!(committed.registry.store(&"B".into()).is_none());
        assert!(committed.store_graph.id(&"B".into()).is_none());
    }
}
