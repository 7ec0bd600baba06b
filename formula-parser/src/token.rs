//! FILENAME: formula-parser/src/token.rs
//! PURPOSE: Token definitions for the formula lexer.
//! CONTEXT: Tokens are the atomic units produced by the lexer and consumed by the parser.
//! Every token keeps its exact source slice in `raw` so that literals, operators
//! and references can be reproduced verbatim from the AST.

use crate::position::Position;
use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Kinds of tokens recognized by the formula lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum TokenKind {
    // Literals
    Identifier,
    Number,
    String,
    Boolean,
    /// Error value literal: #DIV/0!, #N/A, #REF! ...
    ErrorValue,

    // Delimiters
    /// Sheet reference separator: !
    Exclamation,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    /// Array row separator: ;
    Semicolon,
    Colon,

    // Operators
    /// Implicit intersection: @
    At,
    Percent,
    Caret,
    Asterisk,
    Slash,
    Plus,
    Minus,
    Ampersand,
    Equals,
    NotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,

    // References
    /// A1, $A$1, A$1, $A1
    Cell,
    /// $1
    AbsoluteRow,
    /// $A
    AbsoluteColumn,
}

impl TokenKind {
    /// Kinds that the parser turns into a `LiteralExpr`.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::Number | TokenKind::String | TokenKind::Boolean | TokenKind::ErrorValue
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Boolean => "boolean",
            TokenKind::ErrorValue => "error value",
            TokenKind::Exclamation => "'!'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::At => "'@'",
            TokenKind::Percent => "'%'",
            TokenKind::Caret => "'^'",
            TokenKind::Asterisk => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Ampersand => "'&'",
            TokenKind::Equals => "'='",
            TokenKind::NotEqual => "'<>'",
            TokenKind::LessThan => "'<'",
            TokenKind::GreaterThan => "'>'",
            TokenKind::LessEqual => "'<='",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::Cell => "cell reference",
            TokenKind::AbsoluteRow => "absolute row reference",
            TokenKind::AbsoluteColumn => "absolute column reference",
        };
        f.write_str(name)
    }
}

/// A lexed token. `start` and `end` are inclusive: `end` is the position of
/// the token's last character, so a one-character token has `start == end`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Token {
    pub start: Position,
    pub end: Position,
    pub kind: TokenKind,
    pub raw: String,
}

impl Token {
    pub fn new(start: Position, end: Position, kind: TokenKind, raw: impl Into<String>) -> Self {
        Token {
            start,
            end,
            kind,
            raw: raw.into(),
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
