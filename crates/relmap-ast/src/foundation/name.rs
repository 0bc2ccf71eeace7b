//! Qualified names for stores, mappings, and model elements
//!
//! Every definition the compiler handles is addressed by a dot-separated
//! qualified name:
//! - `shop.db.MainStore`
//! - `shop.mapping.PersonMapping`
//! - `shop.model.Person`
//!
//! Qualified names are the keys of the definition registry and of every
//! derived graph, so they are immutable and cheap to compare and hash.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A hierarchical, dot-separated identifier.
///
/// # Examples
///
/// ```
/// # use relmap_ast::foundation::QualifiedName;
/// let name = QualifiedName::from("shop.db.MainStore");
/// assert_eq!(name.segments(), &["shop", "db", "MainStore"]);
/// assert_eq!(name.local_name(), Some("MainStore"));
/// assert_eq!(name.to_string(), "shop.db.MainStore");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    segments: Vec<String>,
}

impl QualifiedName {
    /// Create a name from pre-split segments.
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Parse a name from a dot-separated string.
    pub fn parse(s: &str) -> Self {
        Self {
            segments: s.split('.').map(String::from).collect(),
        }
    }

    /// The name's segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when the name has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The unqualified trailing segment.
    pub fn local_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The qualifying prefix (all segments except the last).
    ///
    /// Returns None for a single-segment name.
    pub fn qualifier(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            None
        } else {
            Some(Self::new(self.segments[..self.segments.len() - 1].to_vec()))
        }
    }

    /// Append a segment, producing a new name.
    pub fn append(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self::new(segments)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for QualifiedName {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl PartialEq<&str> for QualifiedName {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let name = QualifiedName::parse("a.b.c");
        assert_eq!(name.len(), 3);
        assert_eq!(name.to_string(), "a.b.c");
        assert_eq!(name, "a.b.c");
    }

    #[test]
    fn test_local_name_and_qualifier() {
        let name = QualifiedName::from("shop.db.MainStore");
        assert_eq!(name.local_name(), Some("MainStore"));
        assert_eq!(name.qualifier().unwrap(), "shop.db");

        let single = QualifiedName::from("Store");
        assert_eq!(single.qualifier(), None);
    }

    #[test]
    fn test_append() {
        let base = QualifiedName::from("shop.db");
        assert_eq!(base.append("MainStore"), "shop.db.MainStore");
        // append does not mutate the original
        assert_eq!(base, "shop.db");
    }

    #[test]
    fn test_ordering_is_segment_wise() {
        let a = QualifiedName::from("a.b");
        let b = QualifiedName::from("a.c");
        assert!(a < b);
    }
}
