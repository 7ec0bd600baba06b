//! FILENAME: formula-parser/src/position.rs
//! PURPOSE: Line/column cursor used to stamp tokens and AST nodes.
//! CONTEXT: The lexer owns a single mutable Position and advances it one
//! character at a time. Tokens copy it when they are finalized, so every
//! position stored in the tree is an immutable value.

use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A 1-based (line, column) location in the formula source.
/// Ordering is lexicographic: line first, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }

    /// Moves to the first column of the following line.
    pub fn next_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    pub fn next_column(&mut self) {
        self.column += 1;
    }

    /// The position one column to the left.
    ///
    /// At column 1 there is nothing to the left on the same line, so this
    /// returns `(line - 1, 0)`. A column of 0 means "unavailable" and must
    /// not be reported as a real location; see [`Position::is_available`].
    pub fn left(&self) -> Position {
        if self.column <= 1 {
            return Position {
                line: self.line.saturating_sub(1),
                column: 0,
            };
        }
        Position {
            line: self.line,
            column: self.column - 1,
        }
    }

    /// False for the degenerate sentinel produced by [`Position::left`].
    pub fn is_available(&self) -> bool {
        self.line >= 1 && self.column >= 1
    }
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.line, self.column)
    }
}
