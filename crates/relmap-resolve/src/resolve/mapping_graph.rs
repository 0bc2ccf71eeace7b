//! Mapping inclusion graph construction.
//!
//! Builds a directed graph of "mapping A includes mapping B" edges, each
//! edge optionally carrying the store substitution declared on the include.
//! Same arena layout as the store graph: integer node ids in registry
//! order, adjacency in declaration order.
//!
//! Unlike the store graph, no direct self- or duplicate-include restriction
//! is enforced here. A store self-reference is always meaningless, but a
//! mapping path only becomes illegal once the accumulated substitution maps
//! a node back onto itself; that judgement belongs to the cycle detector
//! and the substitution resolver, which see the whole path.

use crate::error::{CompileError, ErrorKind, PassResult};
use crate::resolve::registry::DefinitionRegistry;
use indexmap::IndexMap;
use relmap_ast::foundation::Span;
use relmap_ast::{QualifiedName, SubstitutionEdge};

/// Integer id of a mapping node, stable within one pass.
pub type MappingId = usize;

/// An include edge to another mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEdge {
    /// Target mapping id
    pub target: MappingId,
    /// Store substitution declared on this include; None means identity
    pub substitution: Option<SubstitutionEdge>,
    /// Span of the include declaration
    pub span: Span,
}

/// Directed mapping inclusion graph over arena-allocated nodes.
#[derive(Debug, Default)]
pub struct MappingGraph {
    /// Node id → mapping name, in registry order
    names: Vec<QualifiedName>,
    /// Mapping name → node id
    ids: IndexMap<QualifiedName, MappingId>,
    /// Adjacency in declaration order, indexed by node id
    edges: Vec<Vec<MappingEdge>>,
}

impl MappingGraph {
    /// Number of mappings in the graph.
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// The name of a node.
    pub fn name(&self, id: MappingId) -> &QualifiedName {
        &self.names[id]
    }

    /// The node id of a mapping name.
    pub fn id(&self, name: &QualifiedName) -> Option<MappingId> {
        self.ids.get(name).copied()
    }

    /// Outgoing include edges of a node, in declaration order.
    pub fn neighbors(&self, id: MappingId) -> &[MappingEdge] {
        &self.edges[id]
    }
}

/// Build the mapping inclusion graph from the registry.
///
/// # Errors
///
/// [`ErrorKind::UnresolvedReference`] per include naming an unknown
/// mapping; independent mappings keep being checked in the same pass.
pub fn build_mapping_graph(registry: &DefinitionRegistry) -> PassResult<MappingGraph> {
    let mut errors = Vec::new();
    let mut graph = MappingGraph::default();

    for mapping in registry.mappings() {
        let id = graph.names.len();
        graph.names.push(mapping.name.clone());
        graph.ids.insert(mapping.name.clone(), id);
        graph.edges.push(Vec::new());
    }

    for mapping in registry.mappings() {
        let id = graph.ids[&mapping.name];
        for include in &mapping.includes {
            let Some(target) = graph.ids.get(&include.target).copied() else {
                errors.push(CompileError::new(
                    ErrorKind::UnresolvedReference,
                    include.span,
                    format!(
                        "mapping '{}' includes unknown mapping '{}'",
                        mapping.name, include.target
                    ),
                ));
                continue;
            };
            graph.edges[id].push(MappingEdge {
                target,
                substitution: include.substitution.clone(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use relmap_ast::{IncludedMapping, MappingDefinition, Span};

    fn test_span() -> Span {
        Span::new(0, 0, 0, 1)
    }

    fn mapping_with_includes(name: &str, includes: &[&str]) -> MappingDefinition {
        let mut mapping = MappingDefinition::new(name, test_span());
        for target in includes {
            mapping
                .includes
                .push(IncludedMapping::new(*target, test_span()));
        }
        mapping
    }

    fn build(mappings: Vec<MappingDefinition>) -> PassResult<MappingGraph> {
        let registry = DefinitionRegistry::build(vec![], mappings).unwrap();
        build_mapping_graph(&registry)
    }

    #[test]
    fn test_edges_carry_substitutions() {
        let mut root = MappingDefinition::new("Root", test_span());
        root.includes.push(IncludedMapping::with_substitution(
            "Child", "StoreX", "StoreY", test_span(),
        ));
        let child = mapping_with_includes("Child", &[]);

        let graph = build(vec![root, child]).unwrap();
        let root_id = graph.id(&"Root".into()).unwrap();
        let edge = &graph.neighbors(root_id)[0];
        let substitution = edge.substitution.as_ref().unwrap();
        assert_eq!(substitution.original, "StoreX");
        assert_eq!(substitution.replacement, "StoreY");
    }

    #[test]
    fn test_self_include_is_not_rejected_here() {
        // A direct self-include is a one-node cycle; the cycle detector
        // reports it, not the graph builder.
        let graph = build(vec![mapping_with_includes("A", &["A"])]).unwrap();
        let a = graph.id(&"A".into()).unwrap();
        assert_eq!(graph.neighbors(a).len(), 1);
    }

    #[test]
    fn test_unknown_target_rejected() {
        let errors = build(vec![mapping_with_includes("A", &["Missing"])]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::UnresolvedReference);
        assert!(errors[0].message.contains("unknown mapping 'Missing'"));
    }
}
