//! Store substitution resolution.
//!
//! For every root mapping this pass walks the mapping-inclusion graph
//! depth-first, accumulating the substitution edges declared on the
//! includes along the way. The result is, per (root, descendant) pair, the
//! [`SubstitutionPath`] that rewrites any store referenced by the
//! descendant into its effective identity as seen from the root.
//!
//! # Rewrite order
//!
//! Edges apply innermost-first: the substitution on the include nearest the
//! referencing descendant rewrites first, and the edge declared on the
//! include closest to the root takes effect last. With
//! `BM includes AM[StoreX -> StoreY]` and `CM includes BM[StoreY -> StoreX]`,
//! a reference to `StoreX` inside `AM` resolves, from root `CM`, through
//! `StoreX -> StoreY -> StoreX`: a circular substitution.
//!
//! # Cycle checking
//!
//! While walking, every rewrite chain is checked for a revisited store
//! name. The check is per accumulated path: two substitutions that would
//! only form a loop if they sat on one include chain do not conflict when
//! they sit on different chains. A substitution of a store to itself is
//! identity, not a one-step cycle.
//!
//! The walk itself never mutates the graphs; the table it produces is a
//! derived, pass-scoped structure.

use crate::error::{CompileError, ErrorKind, PassResult};
use crate::resolve::mapping_graph::{MappingGraph, MappingId};
use crate::resolve::registry::DefinitionRegistry;
use crate::resolve::store_graph::StoreGraph;
use indexmap::IndexMap;
use relmap_ast::foundation::Span;
use relmap_ast::{QualifiedName, SubstitutionEdge};
use std::collections::HashSet;

/// The substitution edges accumulated from a root mapping down to one of
/// its descendants, in root-to-leaf order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionPath {
    edges: Vec<SubstitutionEdge>,
}

impl SubstitutionPath {
    /// The accumulated edges, root-to-leaf.
    pub fn edges(&self) -> &[SubstitutionEdge] {
        &self.edges
    }

    /// True when no substitution applies on this path.
    pub fn is_identity(&self) -> bool {
        self.edges.is_empty()
    }

    /// Resolve a store name through this path.
    ///
    /// Applies edges innermost-first: the leafmost edge rewrites first, the
    /// root edge last. At each step the name is replaced only when it equals
    /// the edge's original.
    pub fn resolve(&self, name: &QualifiedName) -> QualifiedName {
        let mut current = name.clone();
        for edge in self.edges.iter().rev() {
            if current == edge.original {
                current = edge.replacement.clone();
            }
        }
        current
    }
}

/// Memoized substitution paths keyed by (root, descendant) mapping id.
///
/// On diamond include shapes the first path found in DFS declaration order
/// wins; the cycle check still walks every path.
#[derive(Debug, Default)]
pub struct SubstitutionTable {
    paths: IndexMap<(MappingId, MappingId), SubstitutionPath>,
}

impl SubstitutionTable {
    /// The substitution path from `root` to `descendant`, if the descendant
    /// is reachable from the root through mapping includes.
    pub fn path(&self, root: MappingId, descendant: MappingId) -> Option<&SubstitutionPath> {
        self.paths.get(&(root, descendant))
    }

    /// Resolve a raw store name referenced by `descendant` into its
    /// effective identity as seen from `root`.
    pub fn resolve_store(
        &self,
        root: MappingId,
        descendant: MappingId,
        store: &QualifiedName,
    ) -> Option<QualifiedName> {
        self.path(root, descendant).map(|p| p.resolve(store))
    }

    /// The (root, descendant) pairs in discovery order.
    pub fn pairs(&self) -> impl Iterator<Item = (MappingId, MappingId)> + '_ {
        self.paths.keys().copied()
    }

    fn record(&mut self, root: MappingId, descendant: MappingId, path: &[PathStep]) {
        self.paths.entry((root, descendant)).or_insert_with(|| {
            SubstitutionPath {
                edges: path.iter().map(|step| step.edge.clone()).collect(),
            }
        });
    }
}

/// One substituting include on the current DFS path.
///
/// Identity includes contribute nothing to rewriting and are not stacked.
#[derive(Debug, Clone)]
struct PathStep {
    edge: SubstitutionEdge,
    /// Span of the include declaration carrying the edge
    span: Span,
}

/// Walk every root mapping, building the substitution table and rejecting
/// circular store substitutions.
///
/// Requires the mapping graph to be acyclic (the raw cycle check runs
/// before this pass).
///
/// # Errors
///
/// [`ErrorKind::CircularStoreSubstitution`] when a rewrite chain along an
/// include path maps a store back onto an already-resolved name, or
/// [`ErrorKind::UnresolvedReference`] when a mapping entry is scoped to an
/// unknown store. The first failure in registry/declaration order aborts
/// the pass.
pub fn resolve_substitutions(
    registry: &DefinitionRegistry,
    store_graph: &StoreGraph,
    mapping_graph: &MappingGraph,
) -> PassResult<SubstitutionTable> {
    let mut table = SubstitutionTable::default();

    for root in 0..mapping_graph.node_count() {
        let mut path = Vec::new();
        if let Err(error) = walk(
            root,
            root,
            registry,
            store_graph,
            mapping_graph,
            &mut path,
            &mut table,
        ) {
            return Err(vec![*error]);
        }
    }

    Ok(table)
}

fn walk(
    root: MappingId,
    current: MappingId,
    registry: &DefinitionRegistry,
    store_graph: &StoreGraph,
    mapping_graph: &MappingGraph,
    path: &mut Vec<PathStep>,
    table: &mut SubstitutionTable,
) -> Result<(), Box<CompileError>> {
    table.record(root, current, path);
    check_referenced_stores(current, registry, store_graph, mapping_graph, path)?;

    for edge in mapping_graph.neighbors(current) {
        let pushed = match &edge.substitution {
            Some(substitution) => {
                path.push(PathStep {
                    edge: substitution.clone(),
                    span: edge.span,
                });
                // The new edge itself may close a rewrite loop with the
                // outer path, independently of what the subtree references.
                check_chain(&substitution.original, path, edge.span)?;
                true
            }
            None => false,
        };

        let result = walk(
            root,
            edge.target,
            registry,
            store_graph,
            mapping_graph,
            path,
            table,
        );
        if pushed {
            path.pop();
        }
        result?;
    }

    Ok(())
}

/// Check every store referenced by `mapping`'s entries, and every store
/// those stores reach through store includes, against the accumulated
/// path.
fn check_referenced_stores(
    mapping: MappingId,
    registry: &DefinitionRegistry,
    store_graph: &StoreGraph,
    mapping_graph: &MappingGraph,
    path: &[PathStep],
) -> Result<(), Box<CompileError>> {
    let name = mapping_graph.name(mapping);
    let definition = registry
        .mapping(name)
        .expect("mapping graph node must be registered");

    let mut checked: HashSet<&QualifiedName> = HashSet::new();
    for entry in &definition.entries {
        let Some(store) = &entry.store else { continue };
        if !checked.insert(store) {
            continue;
        }
        let Some(store_id) = store_graph.id(store) else {
            return Err(Box::new(CompileError::new(
                ErrorKind::UnresolvedReference,
                entry.span,
                format!(
                    "mapping entry '{}' is scoped to unknown store '{}'",
                    entry.id, store
                ),
            )));
        };

        check_chain(store, path, entry.span)?;
        for included in store_graph.reachable(store_id) {
            check_chain(store_graph.name(included), path, entry.span)?;
        }
    }
    Ok(())
}

/// Apply the accumulated path to `start`, innermost edge first, and fail if
/// any store name is produced twice.
fn check_chain(
    start: &QualifiedName,
    path: &[PathStep],
    reference_span: Span,
) -> Result<(), Box<CompileError>> {
    let mut chain = vec![start.clone()];
    let mut current = start.clone();

    for step in path.iter().rev() {
        if current != step.edge.original || step.edge.original == step.edge.replacement {
            continue;
        }
        current = step.edge.replacement.clone();

        if let Some(position) = chain.iter().position(|name| name == &current) {
            let mut cycle: Vec<String> = chain[position..]
                .iter()
                .map(QualifiedName::to_string)
                .collect();
            cycle.push(current.to_string());
            let mut error = CompileError::new(
                ErrorKind::CircularStoreSubstitution,
                step.span,
                format!("{}: {}", current, cycle.join(" -> ")),
            );
            if step.span != reference_span {
                error = error.with_label(reference_span, "store referenced here".to_string());
            }
            return Err(Box::new(error));
        }
        chain.push(current.clone());
    }
    Ok(())
}
