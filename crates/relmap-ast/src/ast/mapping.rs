//! Mapping definitions
//!
//! A mapping binds object-model classes and associations to store structure.
//! Mappings may include other mappings; an include edge optionally carries a
//! store substitution, replacing references to one store with another within
//! the included mapping's subtree.
//!
//! Every mapping entry carries a closed [`MappingKind`] tag. The extension
//! legality checker in `relmap-resolve` matches on it exhaustively, so a new
//! kind forces every inheritance-related call site through the compiler's
//! exhaustiveness check.

use crate::ast::store::{ColumnRef, Predicate};
use crate::foundation::{QualifiedName, Span};
use serde::{Deserialize, Serialize};

/// A mapping definition: identity, entries, and included mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingDefinition {
    /// Fully-qualified mapping name
    pub name: QualifiedName,
    /// Source location of the mapping declaration
    pub span: Span,
    /// Class and association mapping entries in declaration order
    pub entries: Vec<MappingEntry>,
    /// Included mappings in declaration order
    pub includes: Vec<IncludedMapping>,
    /// Documentation comment from source
    pub doc: Option<String>,
}

impl MappingDefinition {
    /// Create a mapping definition with no entries or includes.
    pub fn new(name: impl Into<QualifiedName>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
            entries: Vec::new(),
            includes: Vec::new(),
            doc: None,
        }
    }

    /// Look up an entry by its mapping-set id.
    pub fn entry(&self, id: &QualifiedName) -> Option<&MappingEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// The stores referenced by this mapping's entries, first-reference
    /// order, deduplicated.
    pub fn referenced_stores(&self) -> Vec<&QualifiedName> {
        let mut out: Vec<&QualifiedName> = Vec::new();
        for entry in &self.entries {
            if let Some(store) = &entry.store {
                if !out.contains(&store) {
                    out.push(store);
                }
            }
        }
        out
    }
}

/// Kind tag of a mapping entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingKind {
    Class,
    Association,
    Operation,
    PureInstance,
}

impl MappingKind {
    /// The phrasing diagnostics use for this kind.
    pub fn descriptive_name(self) -> &'static str {
        match self {
            MappingKind::Class => "Class Mappings",
            MappingKind::Association => "Association Mappings",
            MappingKind::Operation => "Operation Mappings",
            MappingKind::PureInstance => "Model to Model Pure Mappings",
        }
    }
}

/// One entry of a mapping: binds a class, association, or operation to
/// store structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Mapping-set identifier, unique across the compilation unit
    pub id: QualifiedName,
    /// Kind tag
    pub kind: MappingKind,
    /// The object-model class/association/operation being bound
    pub target: QualifiedName,
    /// The store this entry's bindings are scoped to.
    ///
    /// Operation and pure-instance entries bind no store.
    pub store: Option<QualifiedName>,
    /// Parent class-mapping-set this entry overrides, if any
    pub extends: Option<ExtendsRef>,
    /// Property bindings in declaration order
    pub bindings: Vec<PropertyBinding>,
    /// Source location of the entry declaration
    pub span: Span,
}

impl MappingEntry {
    /// Create an entry with no store scope, extends, or bindings.
    pub fn new(
        id: impl Into<QualifiedName>,
        kind: MappingKind,
        target: impl Into<QualifiedName>,
        span: Span,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            target: target.into(),
            store: None,
            extends: None,
            bindings: Vec::new(),
            span,
        }
    }

    /// Scope the entry's bindings to a store.
    pub fn with_store(mut self, store: impl Into<QualifiedName>) -> Self {
        self.store = Some(store.into());
        self
    }

    /// Declare this entry as extending a parent mapping set.
    pub fn with_extends(mut self, parent: impl Into<QualifiedName>, span: Span) -> Self {
        self.extends = Some(ExtendsRef {
            parent: parent.into(),
            span,
        });
        self
    }
}

/// An `extends [<parent-mapping-set>]` qualifier on a mapping entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendsRef {
    /// The parent mapping-set id
    pub parent: QualifiedName,
    /// Source location of the extends declaration
    pub span: Span,
}

/// A binding from an object-model property to store structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyBinding {
    pub property: String,
    pub source: BindingSource,
    pub span: Span,
}

/// What a property is bound to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BindingSource {
    /// Directly a qualified column
    Column(ColumnRef),
    /// A store-scoped expression over qualified columns
    Expression(Predicate),
}

/// A reference to another mapping pulled into this mapping's scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncludedMapping {
    /// Name of the included mapping
    pub target: QualifiedName,
    /// Store substitution applied to the included subtree; None means
    /// identity
    pub substitution: Option<SubstitutionEdge>,
    /// Source location of the include declaration
    pub span: Span,
}

impl IncludedMapping {
    /// Include with identity substitution.
    pub fn new(target: impl Into<QualifiedName>, span: Span) -> Self {
        Self {
            target: target.into(),
            substitution: None,
            span,
        }
    }

    /// Include with a store substitution.
    pub fn with_substitution(
        target: impl Into<QualifiedName>,
        original: impl Into<QualifiedName>,
        replacement: impl Into<QualifiedName>,
        span: Span,
    ) -> Self {
        Self {
            target: target.into(),
            substitution: Some(SubstitutionEdge {
                original: original.into(),
                replacement: replacement.into(),
            }),
            span,
        }
    }
}

/// A store substitution attached to a mapping include edge.
///
/// Within the included mapping's subtree, references to `original` resolve
/// to `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubstitutionEdge {
    pub original: QualifiedName,
    pub replacement: QualifiedName,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_span() -> Span {
        Span::new(0, 0, 0, 1)
    }

    #[test]
    fn test_referenced_stores_dedup_in_order() {
        let mut mapping = MappingDefinition::new("shop.mapping.Main", test_span());
        mapping.entries.push(
            MappingEntry::new(
                "shop.Person",
                MappingKind::Class,
                "shop.model.Person",
                test_span(),
            )
            .with_store("shop.db.MainStore"),
        );
        mapping.entries.push(
            MappingEntry::new(
                "shop.Firm",
                MappingKind::Class,
                "shop.model.Firm",
                test_span(),
            )
            .with_store("shop.db.SideStore"),
        );
        mapping.entries.push(
            MappingEntry::new(
                "shop.Employment",
                MappingKind::Association,
                "shop.model.Employment",
                test_span(),
            )
            .with_store("shop.db.MainStore"),
        );

        let stores = mapping.referenced_stores();
        assert_eq!(stores.len(), 2);
        assert_eq!(stores[0], &QualifiedName::from("shop.db.MainStore"));
        assert_eq!(stores[1], &QualifiedName::from("shop.db.SideStore"));
    }

    #[test]
    fn test_entry_lookup() {
        let mut mapping = MappingDefinition::new("shop.mapping.Main", test_span());
        mapping.entries.push(MappingEntry::new(
            "shop.Person",
            MappingKind::Class,
            "shop.model.Person",
            test_span(),
        ));

        assert!(mapping.entry(&"shop.Person".into()).is_some());
        assert!(mapping.entry(&"shop.Firm".into()).is_none());
    }

    #[test]
    fn test_descriptive_names_cover_all_kinds() {
        assert_eq!(MappingKind::Class.descriptive_name(), "Class Mappings");
        assert_eq!(
            MappingKind::Association.descriptive_name(),
            "Association Mappings"
        );
        assert_eq!(
            MappingKind::Operation.descriptive_name(),
            "Operation Mappings"
        );
        assert_eq!(
            MappingKind::PureInstance.descriptive_name(),
            "Model to Model Pure Mappings"
        );
    }
}
