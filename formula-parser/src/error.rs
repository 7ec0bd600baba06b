//! FILENAME: formula-parser/src/error.rs
//! PURPOSE: Error types for lexing, parsing and cell-reference decoding.
//! CONTEXT: Lexer and parser errors carry the source position of the first
//! problem found. There is no recovery: the first error aborts the parse.

use crate::position::Position;
use thiserror::Error;

/// Malformed input at the character level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{pos}: {message}")]
pub struct LexError {
    pub pos: Position,
    pub message: String,
}

impl LexError {
    pub fn new(pos: Position, message: impl Into<String>) -> Self {
        LexError {
            pos,
            message: message.into(),
        }
    }
}

/// Malformed input at the grammar level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{pos}: {message}")]
pub struct ParseError {
    pub pos: Position,
    pub message: String,
}

impl ParseError {
    pub fn new(pos: Position, message: impl Into<String>) -> Self {
        ParseError {
            pos,
            message: message.into(),
        }
    }
}

/// Any failure produced while turning formula text into an AST.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulaError {
    #[error("lex error at {0}")]
    Lex(#[from] LexError),

    #[error("parse error at {0}")]
    Parse(#[from] ParseError),
}

impl FormulaError {
    pub fn position(&self) -> Position {
        match self {
            FormulaError::Lex(e) => e.pos,
            FormulaError::Parse(e) => e.pos,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FormulaError::Lex(e) => &e.message,
            FormulaError::Parse(e) => &e.message,
        }
    }

    pub fn is_lex(&self) -> bool {
        matches!(self, FormulaError::Lex(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, FormulaError::Parse(_))
    }
}

/// Failures of the A1-reference codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CellRefError {
    #[error("cell reference cannot be empty")]
    Empty,

    #[error("no column specified in {0:?}")]
    MissingColumn(String),

    #[error("no row specified in {0:?}")]
    MissingRow(String),

    #[error("unexpected characters after row in {0:?}")]
    TrailingCharacters(String),

    #[error("column out of range in {0:?}")]
    ColumnOutOfRange(String),

    #[error("row out of range in {0:?}")]
    RowOutOfRange(String),
}
