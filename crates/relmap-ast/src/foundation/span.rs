//! Source location tracking for diagnostics.
//!
//! Store and mapping definitions arrive from the grammar layer with spans
//! attached; the resolution engine never reads source text itself, but every
//! diagnostic it raises points back at the include or extends declaration
//! responsible. A [`Span`] is a compact byte range; the [`SourceMap`] turns
//! spans into file/line/column locations and snippets when a diagnostic is
//! rendered.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Compact source location reference.
///
/// Points to a byte range in a source file with a cached start line so
/// production error messages avoid a line lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Index into [`SourceMap`] files
    pub file_id: u16,
    /// Byte offset of start position
    pub start: u32,
    /// Byte offset of end position (exclusive)
    pub end: u32,
    /// Cached line number (1-based) for the start position
    pub start_line: u16,
}

impl Span {
    /// Create a new span.
    pub fn new(file_id: u16, start: u32, end: u32, start_line: u16) -> Self {
        Self {
            file_id,
            start,
            end,
            start_line,
        }
    }

    /// Zero-length span at the start of a file.
    pub fn zero(file_id: u16) -> Self {
        Self::new(file_id, 0, 0, 1)
    }

    /// True when the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Length of the span in bytes.
    ///
    /// # Panics
    /// Panics if end < start (malformed span).
    pub fn len(&self) -> u32 {
        assert!(
            self.end >= self.start,
            "malformed span: end ({}) < start ({})",
            self.end,
            self.start
        );
        self.end - self.start
    }
}

/// All source files of one compilation unit.
///
/// Converts spans into human-readable locations and snippets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

/// A single source file with line indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path to this file
    pub path: PathBuf,
    /// Original source text
    pub source: String,
    /// Byte offsets of each line start, with an EOF sentinel at the end
    line_starts: Vec<u32>,
}

impl SourceMap {
    /// Create an empty source map.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Add a source file and return its id.
    pub fn add_file(&mut self, path: PathBuf, source: String) -> u16 {
        let file_id = self.files.len();
        assert!(file_id < u16::MAX as usize, "too many source files");
        self.files.push(SourceFile::new(path, source));
        file_id as u16
    }

    /// The source file a span points into.
    pub fn file(&self, span: &Span) -> &SourceFile {
        &self.files[span.file_id as usize]
    }

    /// The file path for a span.
    pub fn file_path(&self, span: &Span) -> &Path {
        &self.files[span.file_id as usize].path
    }

    /// The source text covered by a span.
    pub fn snippet(&self, span: &Span) -> &str {
        let file = &self.files[span.file_id as usize];
        &file.source[span.start as usize..span.end as usize]
    }

    /// (line, column) of a span's start, both 1-based.
    pub fn line_col(&self, span: &Span) -> (u32, u32) {
        self.files[span.file_id as usize].line_col(span.start)
    }

    /// Number of files in this map.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl SourceFile {
    /// Create a new source file, indexing line starts.
    pub fn new(path: PathBuf, source: String) -> Self {
        let line_starts = compute_line_starts(&source);
        Self {
            path,
            source,
            line_starts,
        }
    }

    /// (line, column) for a byte offset, both 1-based.
    ///
    /// # Panics
    /// Panics if offset is beyond EOF.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        assert!(
            offset <= self.source.len() as u32,
            "offset {} is beyond EOF (len = {})",
            offset,
            self.source.len()
        );

        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.max(1) - 1,
        };

        let line = (line_idx + 1) as u32;
        let col = (offset - self.line_starts[line_idx]) + 1;
        (line, col)
    }

    /// Text of a line (1-based), without splitting trailing newlines off.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        if line == 0 || line as usize >= self.line_starts.len() {
            return None;
        }
        let line_idx = (line - 1) as usize;
        let start = self.line_starts[line_idx] as usize;
        let end = self.line_starts[line_idx + 1] as usize;
        Some(&self.source[start..end])
    }

    /// Number of lines in this file.
    pub fn line_count(&self) -> usize {
        self.line_starts.len() - 1
    }
}

/// Byte offsets of line starts, with an EOF sentinel so the last line has a
/// well-defined end.
fn compute_line_starts(source: &str) -> Vec<u32> {
    let mut line_starts = vec![0];
    for (idx, ch) in source.char_indices() {
        if ch == '\n' {
            line_starts.push((idx + 1) as u32);
        }
    }
    if line_starts.last() != Some(&(source.len() as u32)) {
        line_starts.push(source.len() as u32);
    }
    line_starts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_basics() {
        let span = Span::new(0, 10, 20, 1);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());
        assert!(Span::zero(0).is_empty());
    }

    #[test]
    fn test_line_col_lookup() {
        let file = SourceFile::new(PathBuf::from("shop.store"), "hello\nworld\n".to_string());
        assert_eq!(file.line_col(0), (1, 1));
        assert_eq!(file.line_col(6), (2, 1));
        assert_eq!(file.line_col(11), (2, 6));
        assert_eq!(file.line_count(), 2);
    }

    #[test]
    fn test_line_text() {
        let file = SourceFile::new(PathBuf::from("shop.store"), "hello\nworld".to_string());
        assert_eq!(file.line_text(1), Some("hello\n"));
        assert_eq!(file.line_text(2), Some("world"));
        assert_eq!(file.line_text(3), None);
    }

    #[test]
    fn test_source_map_snippet() {
        let mut map = SourceMap::new();
        let file_id = map.add_file(
            PathBuf::from("shop.store"),
            "Store shop.db.MainStore\ninclude shop.db.SideStore".to_string(),
        );
        let span = Span::new(file_id, 6, 23, 1);

        assert_eq!(map.file_count(), 1);
        assert_eq!(map.snippet(&span), "shop.db.MainStore");
        assert_eq!(map.line_col(&span), (1, 7));
        assert_eq!(map.file_path(&span).to_str(), Some("shop.store"));
    }

    #[test]
    #[should_panic(expected = "malformed span")]
    fn test_span_len_panics_on_inverted() {
        let span = Span::new(0, 10, 5, 1);
        let _ = span.len();
    }
}
