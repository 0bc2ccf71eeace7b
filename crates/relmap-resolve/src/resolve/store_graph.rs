//! Store inclusion graph construction.
//!
//! Builds a directed graph of "store A includes store B" edges from the
//! registry. Nodes live in an arena indexed by integer id (registry order);
//! edges are index pairs carrying the span of the include declaration.
//!
//! Two invariants are enforced here, at construction time, because both are
//! detectable without traversal and deserve a more specific diagnostic than
//! the general cycle detector gives:
//!
//! - a store must not include itself ([`ErrorKind::SelfInclude`])
//! - a store must not include the same target twice
//!   ([`ErrorKind::DuplicateInclude`])
//!
//! Longer cycles are left to `resolve::cycles`.

use crate::error::{CompileError, ErrorKind, PassResult};
use crate::resolve::registry::DefinitionRegistry;
use indexmap::IndexMap;
use relmap_ast::foundation::Span;
use relmap_ast::QualifiedName;
use std::collections::{HashSet, VecDeque};

/// Integer id of a store node, stable within one pass.
pub type StoreId = usize;

/// An include edge to another store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreEdge {
    /// Target store id
    pub target: StoreId,
    /// Span of the include declaration
    pub span: Span,
}

/// Directed store inclusion graph over arena-allocated nodes.
#[derive(Debug, Default)]
pub struct StoreGraph {
    /// Node id → store name, in registry order
    names: Vec<QualifiedName>,
    /// Store name → node id
    ids: IndexMap<QualifiedName, StoreId>,
    /// Adjacency in declaration order, indexed by node id
    edges: Vec<Vec<StoreEdge>>,
}

impl StoreGraph {
    /// Number of stores in the graph.
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// The name of a node.
    pub fn name(&self, id: StoreId) -> &QualifiedName {
        &self.names[id]
    }

    /// The node id of a store name.
    pub fn id(&self, name: &QualifiedName) -> Option<StoreId> {
        self.ids.get(name).copied()
    }

    /// Outgoing include edges of a node, in declaration order.
    pub fn neighbors(&self, id: StoreId) -> &[StoreEdge] {
        &self.edges[id]
    }

    /// Stores reachable from `id` through include edges, excluding `id`
    /// itself, breadth-first in declaration order.
    pub fn reachable(&self, id: StoreId) -> Vec<StoreId> {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<StoreId> = self.edges[id].iter().map(|e| e.target).collect();
        let mut out = Vec::new();
        while let Some(next) = queue.pop_front() {
            if seen.insert(next) {
                out.push(next);
                queue.extend(self.edges[next].iter().map(|e| e.target));
            }
        }
        out
    }
}

/// Build the store inclusion graph from the registry.
///
/// # Errors
///
/// [`ErrorKind::SelfInclude`], [`ErrorKind::DuplicateInclude`], or
/// [`ErrorKind::UnresolvedReference`] per offending include declaration.
/// Independent stores keep being checked so one pass reports every
/// ill-formed include list.
pub fn build_store_graph(registry: &DefinitionRegistry) -> PassResult<StoreGraph> {
    let mut errors = Vec::new();
    let mut graph = StoreGraph::default();

    for store in registry.stores() {
        let id = graph.names.len();
        graph.names.push(store.name.clone());
        graph.ids.insert(store.name.clone(), id);
        graph.edges.push(Vec::new());
    }

    for store in registry.stores() {
        let id = graph.ids[&store.name];
        let mut seen_targets: HashSet<&QualifiedName> = HashSet::new();

        for include in &store.includes {
            if include.target == store.name {
                errors.push(CompileError::new(
                    ErrorKind::SelfInclude,
                    include.span,
                    format!("store '{}' includes itself", store.name),
                ));
                continue;
            }
            if !seen_targets.insert(&include.target) {
                errors.push(CompileError::new(
                    ErrorKind::DuplicateInclude,
                    include.span,
                    format!(
                        "store '{}' includes '{}' more than once",
                        store.name, include.target
                    ),
                ));
                continue;
            }
            let Some(target) = graph.ids.get(&include.target).copied() else {
                errors.push(CompileError::new(
                    ErrorKind::UnresolvedReference,
                    include.span,
                    format!(
                        "store '{}' includes unknown store '{}'",
                        store.name, include.target
                    ),
                ));
                continue;
            };
            graph.edges[id].push(StoreEdge {
                target,
                span: include.span,
            });
        }
    }

    if errors.is_empty() {
        Ok(graph)
    } else {
        Err(errors)
    }
}
