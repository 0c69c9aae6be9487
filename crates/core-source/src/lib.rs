//! Read-only, line-indexed view over a source document.
//!
//! Every other crate in the workspace consumes source text exclusively
//! through `Document`: line count, per-line text, and derived
//! first-non-whitespace offsets. The view is a snapshot — resolution code
//! never mutates it, and a caller that applies an edit re-reads the file
//! into a fresh `Document` before the next resolution. Mutation lives with
//! the editor/file collaborator, not here.

use anyhow::Result;
use ropey::Rope;

/// A source file snapshot backed by a `ropey::Rope`.
#[derive(Clone)]
pub struct Document {
    rope: Rope,
    pub name: String,
}

/// One line of a `Document`: ordinal index, raw text (no trailing newline),
/// and the byte offset of the first non-whitespace character (equal to the
/// text length for blank lines).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub index: usize,
    pub text: String,
    pub first_non_whitespace: usize,
}

impl SourceLine {
    /// Leading-whitespace prefix of the line.
    pub fn indentation(&self) -> &str {
        &self.text[..self.first_non_whitespace]
    }

    /// True when the line holds no visible characters.
    pub fn is_blank(&self) -> bool {
        self.first_non_whitespace == self.text.len()
    }
}

/// A caller-identified variable/expression occurrence: the name and the line
/// it was found on. The operations layer rejects empty or untrimmed
/// selections before any resolution starts; resolution code may assume the
/// invariant holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub line: usize,
    pub text: String,
}

impl Selection {
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }

    /// Invariant check used by callers: non-empty and already trimmed.
    pub fn is_resolvable(&self) -> bool {
        !self.text.is_empty() && self.text.trim() == self.text
    }
}

/// An inclusive span of whole lines `[start, end]`. When materialized into
/// an edit, a range covers its lines including their line-break characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn single(line: usize) -> Self {
        Self {
            start: line,
            end: line,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }
}

impl Document {
    /// Construct a document from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
        })
    }

    /// Total number of lines in the document.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// The requested line as a `SourceLine`, or `None` past the end.
    pub fn line(&self, idx: usize) -> Option<SourceLine> {
        let text = self.line_text(idx)?;
        let first_non_whitespace = text
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(text.len());
        Some(SourceLine {
            index: idx,
            text,
            first_non_whitespace,
        })
    }

    /// Line text without any trailing newline, or `None` past the end.
    pub fn line_text(&self, idx: usize) -> Option<String> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        let mut s = self.rope.line(idx).to_string();
        if s.ends_with('\n') {
            s.pop();
            if s.ends_with('\r') {
                s.pop();
            }
        }
        Some(s)
    }

    /// Byte offset of the first non-whitespace character on a line.
    pub fn first_non_whitespace(&self, idx: usize) -> Option<usize> {
        self.line(idx).map(|l| l.first_non_whitespace)
    }

    /// The whole document as one string (tree parsing needs the full text).
    pub fn text(&self) -> String {
        self.rope.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_document_and_read_lines() {
        let d = Document::from_str("test.js", "const a = 1;\n  const b = 2;").unwrap();
        assert_eq!(d.line_count(), 2);
        assert_eq!(d.line_text(0).unwrap(), "const a = 1;");
        assert_eq!(d.line_text(1).unwrap(), "  const b = 2;");
        assert_eq!(d.line_text(2), None);
    }

    #[test]
    fn first_non_whitespace_offsets() {
        let d = Document::from_str("t", "top\n    indented\n\t\ttabs\n   ").unwrap();
        assert_eq!(d.first_non_whitespace(0), Some(0));
        assert_eq!(d.first_non_whitespace(1), Some(4));
        assert_eq!(d.first_non_whitespace(2), Some(2));
        // whitespace-only line: offset equals length
        let blank = d.line(3).unwrap();
        assert!(blank.is_blank());
        assert_eq!(blank.first_non_whitespace, 3);
    }

    #[test]
    fn line_text_strips_crlf() {
        let d = Document::from_str("t", "one\r\ntwo\r\n").unwrap();
        assert_eq!(d.line_text(0).unwrap(), "one");
        assert_eq!(d.line_text(1).unwrap(), "two");
    }

    #[test]
    fn indentation_slice_matches_offset() {
        let d = Document::from_str("t", "    const x = 5;").unwrap();
        let line = d.line(0).unwrap();
        assert_eq!(line.indentation(), "    ");
    }

    #[test]
    fn selection_resolvable_invariant() {
        assert!(Selection::new(0, "x").is_resolvable());
        assert!(!Selection::new(0, "").is_resolvable());
        assert!(!Selection::new(0, " x ").is_resolvable());
    }

    #[test]
    fn line_range_membership() {
        let r = LineRange::new(3, 6);
        assert_eq!(r.len(), 4);
        assert!(r.contains(3) && r.contains(6));
        assert!(!r.contains(2) && !r.contains(7));
        assert_eq!(LineRange::single(5).len(), 1);
    }
}
