//! Core types for source positions

use serde::{Deserialize, Serialize};

/// A position in source text (1-based line and column).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters not bytes)
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position of the first character of a document.
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }

    /// Move this position forward by `columns` characters on the same line.
    pub fn advance_columns(self, columns: usize) -> Self {
        Self {
            line: self.line,
            column: self.column + columns,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source metadata for a value in a blueprint document.
///
/// The end position is optional: decoders only provide it where it can be
/// determined reliably (e.g. single-line scalars).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMeta {
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_position: Option<Position>,
}

impl SourceMeta {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            end_position: None,
        }
    }

    /// Source metadata spanning from `start` to `end`.
    pub fn span(start: Position, end: Position) -> Self {
        Self {
            position: start,
            end_position: Some(end),
        }
    }

    pub fn with_end(mut self, end: Position) -> Self {
        self.end_position = Some(end);
        self
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }
}

impl From<Position> for SourceMeta {
    fn from(position: Position) -> Self {
        SourceMeta::new(position)
    }
}
