use serde::{Deserialize, Serialize};
use std::fmt;

/// Source location of a token or AST node.
///
/// Lines and columns are 1-based; diagnostics surface them directly to the
/// submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Span {
    pub fn new(line: u32, col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            line,
            col,
            end_line,
            end_col,
        }
    }

    /// A zero-width span at a single position.
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, line, col)
    }

    /// The smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Span {
        let (line, col) = match self.line.cmp(&other.line) {
            std::cmp::Ordering::Less => (self.line, self.col),
            std::cmp::Ordering::Greater => (other.line, other.col),
            std::cmp::Ordering::Equal => (self.line, self.col.min(other.col)),
        };
        let (end_line, end_col) = match self.end_line.cmp(&other.end_line) {
            std::cmp::Ordering::Greater => (self.end_line, self.end_col),
            std::cmp::Ordering::Less => (other.end_line, other.end_col),
            std::cmp::Ordering::Equal => (self.end_line, self.end_col.max(other.end_col)),
        };
        Span::new(line, col, end_line, end_col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// One submission's source text, with cached line offsets for diagnostics.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub source: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            name: name.into(),
            source,
            line_starts,
        }
    }

    /// The text of a 1-based line, without its trailing newline.
    pub fn line(&self, number: u32) -> Option<&str> {
        let idx = number.checked_sub(1)? as usize;
        let start = *self.line_starts.get(idx)?;
        let end = match self.line_starts.get(idx + 1) {
            Some(&next) => next - 1,
            None => self.source.len(),
        };
        Some(self.source[start..end].trim_end_matches('\r'))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
