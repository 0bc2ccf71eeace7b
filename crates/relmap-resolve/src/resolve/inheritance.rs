//! Extension legality checking.
//!
//! A mapping entry may declare `extends [<parent-mapping-set>]`, overriding
//! an entry of an included mapping. Inheritance is only defined between
//! class mappings: association, operation, and model-to-model pure
//! mappings can neither extend nor be extended.
//!
//! Legality is a local property of the entry and its immediate parent; the
//! check never follows the parent's own extends chain, and it is
//! independent of cycle detection.

use crate::error::{CompileError, ErrorKind};
use crate::resolve::registry::DefinitionRegistry;
use relmap_ast::MappingKind;

/// Validate every `extends` declaration in the registry.
///
/// Entries are visited in registry order, then declaration order. Each
/// offending entry produces one error; independent entries keep being
/// checked in the same pass.
///
/// # Errors
///
/// [`ErrorKind::IllegalMappingInheritance`] when either side of an extends
/// relationship is not a class mapping, with the diagnostic naming the
/// offending side's kind. [`ErrorKind::UnresolvedReference`] when the
/// parent mapping set does not exist.
pub fn validate_inheritance(registry: &DefinitionRegistry) -> Vec<CompileError> {
    let mut errors = Vec::new();

    for mapping in registry.mappings() {
        for entry in &mapping.entries {
            let Some(extends) = &entry.extends else {
                continue;
            };

            if entry.kind != MappingKind::Class {
                errors.push(CompileError::new(
                    ErrorKind::IllegalMappingInheritance,
                    extends.span,
                    format!(
                        "mapping inheritance is only applicable to Class Mappings; \
                         it is not applicable for {}",
                        entry.kind.descriptive_name()
                    ),
                ));
                continue;
            }

            let Some((_, parent)) = registry.entry(&extends.parent) else {
                errors.push(CompileError::new(
                    ErrorKind::UnresolvedReference,
                    extends.span,
                    format!(
                        "mapping entry '{}' extends unknown mapping set '{}'",
                        entry.id, extends.parent
                    ),
                ));
                continue;
            };

            if parent.kind != MappingKind::Class {
                errors.push(
                    CompileError::new(
                        ErrorKind::IllegalMappingInheritance,
                        extends.span,
                        format!(
                            "mapping inheritance is only applicable to Class Mappings; \
                             it is not applicable for {}",
                            parent.kind.descriptive_name()
                        ),
                    )
                    .with_label(parent.span, "extended mapping set declared here".to_string()),
                );
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use relmap_ast::{MappingDefinition, MappingEntry, Span};

    fn test_span() -> Span {
        Span::new(0, 0, 0, 1)
    }

    fn entry(id: &str, kind: MappingKind) -> MappingEntry {
        MappingEntry::new(id, kind, format!("model.{id}"), test_span())
    }

    fn registry_with_entries(entries: Vec<MappingEntry>) -> DefinitionRegistry {
        let mut mapping = MappingDefinition::new("M", test_span());
        mapping.entries = entries;
        DefinitionRegistry::build(vec![], vec![mapping]).unwrap()
    }

    #[test]
    fn test_class_extending_class_is_legal() {
        let registry = registry_with_entries(vec![
            entry("Base", MappingKind::Class),
            entry("Derived", MappingKind::Class).with_extends("Base", test_span()),
        ]);

        assert!(validate_inheritance(&registry).is_empty());
    }

    #[test]
    fn test_association_child_is_illegal() {
        let registry = registry_with_entries(vec![
            entry("Base", MappingKind::Class),
            entry("Bad", MappingKind::Association).with_extends("Base", test_span()),
        ]);

        let errors = validate_inheritance(&registry);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::IllegalMappingInheritance);
        assert!(errors[0].message.contains("Association Mappings"));
    }

    #[test]
    fn test_operation_parent_is_illegal() {
        let registry = registry_with_entries(vec![
            entry("Base", MappingKind::Operation),
            entry("Bad", MappingKind::Class).with_extends("Base", test_span()),
        ]);

        let errors = validate_inheritance(&registry);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Operation Mappings"));
        assert_eq!(errors[0].labels.len(), 1);
    }

    #[test]
    fn test_pure_instance_parent_is_illegal() {
        let registry = registry_with_entries(vec![
            entry("Base", MappingKind::PureInstance),
            entry("Bad", MappingKind::Class).with_extends("Base", test_span()),
        ]);

        let errors = validate_inheritance(&registry);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Model to Model Pure Mappings"));
    }

    #[test]
    fn test_unknown_parent_is_unresolved() {
        let registry = registry_with_entries(vec![
            entry("Bad", MappingKind::Class).with_extends("Missing", test_span()),
        ]);

        let errors = validate_inheritance(&registry);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::UnresolvedReference);
    }

    #[test]
    fn test_all_offending_entries_reported() {
        let registry = registry_with_entries(vec![
            entry("Base", MappingKind::Class),
            entry("BadAssoc", MappingKind::Association).with_extends("Base", test_span()),
            entry("BadOp", MappingKind::Operation).with_extends("Base", test_span()),
        ]);

        let errors = validate_inheritance(&registry);
        assert_eq!(errors.len(), 2);
    }
}
