//! Definition registry
//!
//! Collects the compilation unit's store and mapping definitions by
//! fully-qualified name, preserving declaration order. The registry is
//! append-only within a pass and rebuilt from scratch on every
//! recompilation; no derived graph ever mutates it.
//!
//! Besides name lookup, the registry indexes every mapping-set entry by its
//! entry id so the extension legality checker can resolve `extends` targets
//! without walking the include graph.

use crate::error::{CompileError, ErrorKind, PassResult};
use indexmap::IndexMap;
use relmap_ast::{MappingDefinition, MappingEntry, QualifiedName, StoreDefinition};

/// Location of a mapping-set entry: owning mapping plus entry index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLocation {
    pub mapping: QualifiedName,
    pub index: usize,
}

/// All definitions of one compilation snapshot, in declaration order.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    stores: IndexMap<QualifiedName, StoreDefinition>,
    mappings: IndexMap<QualifiedName, MappingDefinition>,
    entry_index: IndexMap<QualifiedName, EntryLocation>,
}

impl DefinitionRegistry {
    /// Build a registry from parsed definitions.
    ///
    /// Definitions are taken in source order; the resulting iteration order
    /// is the registry order every later pass traverses in.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::DuplicateDefinition`] when two stores, two mappings, or
    /// two mapping-set entries share a name. All duplicates in the unit are
    /// reported in one pass.
    pub fn build(
        stores: Vec<StoreDefinition>,
        mappings: Vec<MappingDefinition>,
    ) -> PassResult<Self> {
        let mut errors = Vec::new();
        let mut registry = Self::default();

        for store in stores {
            if let Some(existing) = registry.stores.get(&store.name) {
                errors.push(
                    CompileError::new(
                        ErrorKind::DuplicateDefinition,
                        store.span,
                        format!("store '{}' is declared multiple times", store.name),
                    )
                    .with_label(existing.span, "first declared here".to_string()),
                );
                continue;
            }
            registry.stores.insert(store.name.clone(), store);
        }

        for mapping in mappings {
            if let Some(existing) = registry.mappings.get(&mapping.name) {
                errors.push(
                    CompileError::new(
                        ErrorKind::DuplicateDefinition,
                        mapping.span,
                        format!("mapping '{}' is declared multiple times", mapping.name),
                    )
                    .with_label(existing.span, "first declared here".to_string()),
                );
                continue;
            }
            registry.mappings.insert(mapping.name.clone(), mapping);
        }

        registry.index_entries(&mut errors);

        if errors.is_empty() {
            Ok(registry)
        } else {
            Err(errors)
        }
    }

    /// Index every mapping-set entry id across the registered mappings.
    fn index_entries(&mut self, errors: &mut Vec<CompileError>) {
        for (name, mapping) in &self.mappings {
            for (index, entry) in mapping.entries.iter().enumerate() {
                if let Some(existing) = self.entry_index.get(&entry.id) {
                    let first_span = self.mappings[&existing.mapping].entries[existing.index].span;
                    errors.push(
                        CompileError::new(
                            ErrorKind::DuplicateDefinition,
                            entry.span,
                            format!(
                                "mapping-set entry '{}' is declared multiple times",
                                entry.id
                            ),
                        )
                        .with_label(first_span, "first declared here".to_string()),
                    );
                    continue;
                }
                self.entry_index.insert(
                    entry.id.clone(),
                    EntryLocation {
                        mapping: name.clone(),
                        index,
                    },
                );
            }
        }
    }

    /// Look up a store by name.
    pub fn store(&self, name: &QualifiedName) -> Option<&StoreDefinition> {
        self.stores.get(name)
    }

    /// Look up a mapping by name.
    pub fn mapping(&self, name: &QualifiedName) -> Option<&MappingDefinition> {
        self.mappings.get(name)
    }

    /// Look up a mapping-set entry by its entry id.
    pub fn entry(&self, id: &QualifiedName) -> Option<(&MappingDefinition, &MappingEntry)> {
        let location = self.entry_index.get(id)?;
        let mapping = self.mappings.get(&location.mapping)?;
        Some((mapping, &mapping.entries[location.index]))
    }

    /// Stores in registry (declaration) order.
    pub fn stores(&self) -> impl Iterator<Item = &StoreDefinition> {
        self.stores.values()
    }

    /// Mappings in registry (declaration) order.
    pub fn mappings(&self) -> impl Iterator<Item = &MappingDefinition> {
        self.mappings.values()
    }

    /// Number of registered stores.
    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    /// Number of registered mappings.
    pub fn mapping_count(&self) -> usize {
        self.mappings.len()
    }
}
