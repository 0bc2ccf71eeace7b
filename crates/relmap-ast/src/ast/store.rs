//! Store definitions
//!
//! A store is a relational schema definition: schemas owning tables, plus
//! named joins and filters expressed as boolean predicate trees over
//! qualified columns. Stores may include other stores, pulling the included
//! structure into the including store's scope.
//!
//! Invariant: a store's include list contains no duplicate target and no
//! self-reference. The builders in `relmap-resolve` enforce this at graph
//! construction time; the records here carry the raw declarations.

use crate::foundation::{QualifiedName, Span};
use serde::{Deserialize, Serialize};

/// A store definition: identity, schemas, and included stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDefinition {
    /// Fully-qualified store name
    pub name: QualifiedName,
    /// Source location of the store declaration
    pub span: Span,
    /// Schemas in declaration order
    pub schemas: Vec<Schema>,
    /// Included stores in declaration order
    pub includes: Vec<IncludedStore>,
    /// Documentation comment from source
    pub doc: Option<String>,
}

impl StoreDefinition {
    /// Create a store definition with no schemas or includes.
    pub fn new(name: impl Into<QualifiedName>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
            schemas: Vec::new(),
            includes: Vec::new(),
            doc: None,
        }
    }

    /// Look up a schema by name.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    /// Look up a table across all schemas.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.schemas.iter().find_map(|s| s.table(name))
    }
}

/// A relational schema owning tables, joins, and filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub span: Span,
    /// Tables in declaration order
    pub tables: Vec<Table>,
    /// Named join predicates
    pub joins: Vec<Join>,
    /// Named filter predicates
    pub filters: Vec<Filter>,
}

impl Schema {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
            tables: Vec::new(),
            joins: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// A table: ordered typed columns and an optional primary-key column set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub span: Span,
    /// Columns in declaration order
    pub columns: Vec<Column>,
    /// Primary-key column names; None when the table declares no key
    pub primary_key: Option<Vec<String>>,
}

impl Table {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
            columns: Vec::new(),
            primary_key: None,
        }
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// True when the named column is part of the primary key.
    pub fn is_key_column(&self, name: &str) -> bool {
        self.primary_key
            .as_ref()
            .is_some_and(|key| key.iter().any(|k| k == name))
    }
}

/// A typed table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable,
        }
    }
}

/// Relational column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    BigInt,
    Float,
    Double,
    Bit,
    Date,
    Timestamp,
    Varchar { length: u32 },
    Char { length: u32 },
    Decimal { precision: u32, scale: u32 },
    Binary { length: u32 },
}

/// A named join: a boolean predicate relating columns of two tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub name: String,
    pub span: Span,
    pub condition: Predicate,
}

/// A named filter: a boolean predicate restricting one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    pub span: Span,
    pub condition: Predicate,
}

/// A table-qualified column reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Boolean predicate tree over qualified columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    Comparison {
        op: ComparisonOp,
        left: Operand,
        right: Operand,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    IsNull(Operand),
    IsNotNull(Operand),
}

impl Predicate {
    /// Collect every column referenced anywhere in the tree, in source order.
    pub fn referenced_columns(&self) -> Vec<&ColumnRef> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a ColumnRef>) {
        match self {
            Predicate::Comparison { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Predicate::And(a, b) | Predicate::Or(a, b) => {
                a.collect_columns(out);
                b.collect_columns(out);
            }
            Predicate::Not(inner) => inner.collect_columns(out),
            Predicate::IsNull(operand) | Predicate::IsNotNull(operand) => {
                operand.collect_columns(out)
            }
        }
    }
}

/// A comparison operand: a qualified column or a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Column(ColumnRef),
    Literal(Literal),
}

impl Operand {
    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a ColumnRef>) {
        if let Operand::Column(column) = self {
            out.push(column);
        }
    }
}

/// Literal values usable in predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// A reference to another store pulled into this store's scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncludedStore {
    /// Name of the included store
    pub target: QualifiedName,
    /// Source location of the include declaration
    pub span: Span,
}

impl IncludedStore {
    pub fn new(target: impl Into<QualifiedName>, span: Span) -> Self {
        Self {
            target: target.into(),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_span() -> Span {
        Span::new(0, 0, 0, 1)
    }

    #[test]
    fn test_table_lookup_across_schemas() {
        let mut store = StoreDefinition::new("shop.db.MainStore", test_span());
        let mut schema = Schema::new("public", test_span());
        let mut table = Table::new("person", test_span());
        table
            .columns
            .push(Column::new("id", ColumnType::Integer, false));
        table.primary_key = Some(vec!["id".to_string()]);
        schema.tables.push(table);
        store.schemas.push(schema);

        assert!(store.table("person").is_some());
        assert!(store.table("order").is_none());
        assert!(store.table("person").unwrap().is_key_column("id"));
        assert!(!store.table("person").unwrap().is_key_column("name"));
    }

    #[test]
    fn test_predicate_column_collection() {
        // person.firm_id = firm.id AND firm.active IS NOT NULL
        let condition = Predicate::And(
            Box::new(Predicate::Comparison {
                op: ComparisonOp::Eq,
                left: Operand::Column(ColumnRef::new("person", "firm_id")),
                right: Operand::Column(ColumnRef::new("firm", "id")),
            }),
            Box::new(Predicate::IsNotNull(Operand::Column(ColumnRef::new(
                "firm", "active",
            )))),
        );

        let columns = condition.referenced_columns();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0], &ColumnRef::new("person", "firm_id"));
        assert_eq!(columns[2], &ColumnRef::new("firm", "active"));
    }
}
