//! FILENAME: formula-parser/src/ast.rs
//! PURPOSE: Defines the Abstract Syntax Tree (AST) for formula expressions.
//! CONTEXT: After the Lexer tokenizes a formula string, the Parser converts
//! those tokens into this tree structure. Downstream evaluators and static
//! analysis walk this tree; see `analysis.rs`.
//!
//! SUPPORTED EXPRESSIONS:
//! - Literals: numbers, strings, booleans, error values (#N/A, #REF!, ...)
//! - Names: bare identifiers that are not cell references
//! - Cell references: A1, AA100, $A$1, A$1, $A1
//! - Ranges, including chained ones: A1:B10, A1:B2:C3
//! - Column references: A:A, $A:$B (row is None)
//! - Row references: 1:1, $1:$5 (col is None)
//! - Binary operations: + - * / ^ & = <> < > <= >=
//! - Unary operations: prefix - + @, postfix %
//! - Function calls: SUM(A1:A10), IF(A1>0, "yes", "no")
//! - Parenthesized groups and array literals {1,2;3,4}
//!
//! Every node owns the tokens it was built from, so positions and raw text
//! survive into the tree. `Display` produces the canonical string form used
//! by the tests to assert tree shape.

use crate::cell_ref::{format_cell_reference, index_to_column_name, CellReference};
use crate::position::Position;
use crate::token::{Token, TokenKind};
use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A parsed formula expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Node {
    FunCall(FunCallExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Literal(LiteralExpr),
    Ident(IdentExpr),
    Parenthesized(ParenthesizedExpr),
    Range(RangeExpr),
    Cell(CellExpr),
    Array(ArrayExpr),
}

/// A call `NAME(arg, arg, ...)`. The name is not checked against any
/// list of builtins.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FunCallExpr {
    pub name: Token,
    pub lparen: Token,
    pub arguments: Vec<Node>,
    pub rparen: Token,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BinaryExpr {
    pub left: Box<Node>,
    pub operator: Token,
    pub right: Box<Node>,
}

/// Prefix `-`, `+`, `@` or postfix `%`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct UnaryExpr {
    pub operator: Token,
    pub operand: Box<Node>,
}

/// Number, string, boolean or error value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LiteralExpr {
    pub value: Token,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct IdentExpr {
    pub name: Token,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ParenthesizedExpr {
    pub lparen: Token,
    pub inner: Box<Node>,
    pub rparen: Token,
}

/// `begin:end[:end...]`. There is always one colon per end, and at least one end.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RangeExpr {
    pub begin: CellExpr,
    pub colons: Vec<Token>,
    pub ends: Vec<CellExpr>,
}

/// A cell, full-column or full-row reference with 0-based indices.
/// `row == None` is a whole column (the `A` in `A:A`);
/// `col == None` is a whole row (the `1` in `1:1`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CellExpr {
    pub token: Token,
    pub row: Option<u32>,
    pub col: Option<u32>,
    pub row_absolute: bool,
    pub col_absolute: bool,
}

/// `{a,b;c,d}`: outer vector is rows, inner is columns. All rows have the
/// same length.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ArrayExpr {
    pub lbrace: Token,
    pub elements: Vec<Vec<Node>>,
    pub rbrace: Token,
}

impl Node {
    pub fn start(&self) -> Position {
        match self {
            Node::FunCall(e) => e.name.start,
            Node::Binary(e) => e.left.start(),
            Node::Unary(e) => {
                if e.is_postfix() {
                    e.operand.start()
                } else {
                    e.operator.start
                }
            }
            Node::Literal(e) => e.value.start,
            Node::Ident(e) => e.name.start,
            Node::Parenthesized(e) => e.lparen.start,
            Node::Range(e) => e.begin.token.start,
            Node::Cell(e) => e.token.start,
            Node::Array(e) => e.lbrace.start,
        }
    }

    pub fn end(&self) -> Position {
        match self {
            Node::FunCall(e) => e.rparen.end,
            Node::Binary(e) => e.right.end(),
            Node::Unary(e) => {
                if e.is_postfix() {
                    e.operator.end
                } else {
                    e.operand.end()
                }
            }
            Node::Literal(e) => e.value.end,
            Node::Ident(e) => e.name.end,
            Node::Parenthesized(e) => e.rparen.end,
            Node::Range(e) => e.last_end().token.end,
            Node::Cell(e) => e.token.end,
            Node::Array(e) => e.rbrace.end,
        }
    }

    /// Name of the variant as it appears in the canonical string form.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::FunCall(_) => "FunCallExpr",
            Node::Binary(_) => "BinaryExpr",
            Node::Unary(_) => "UnaryExpr",
            Node::Literal(_) => "LiteralExpr",
            Node::Ident(_) => "IdentExpr",
            Node::Parenthesized(_) => "ParenthesizedExpr",
            Node::Range(_) => "RangeExpr",
            Node::Cell(_) => "CellExpr",
            Node::Array(_) => "ArrayExpr",
        }
    }

    /// Visits this node and all of its descendants in pre-order.
    /// Range endpoints belong to their `RangeExpr` and are not visited on their own.
    pub fn walk<'a, F: FnMut(&'a Node)>(&'a self, f: &mut F) {
        f(self);
        match self {
            Node::FunCall(e) => {
                for arg in &e.arguments {
                    arg.walk(f);
                }
            }
            Node::Binary(e) => {
                e.left.walk(f);
                e.right.walk(f);
            }
            Node::Unary(e) => e.operand.walk(f),
            Node::Parenthesized(e) => e.inner.walk(f),
            Node::Array(e) => {
                for element in e.elements.iter().flatten() {
                    element.walk(f);
                }
            }
            Node::Literal(_) | Node::Ident(_) | Node::Cell(_) | Node::Range(_) => {}
        }
    }
}

impl UnaryExpr {
    /// True for `%`, the only operator written after its operand.
    pub fn is_postfix(&self) -> bool {
        self.operator.is(TokenKind::Percent)
    }
}

impl LiteralExpr {
    pub fn as_number(&self) -> Option<f64> {
        if !self.value.is(TokenKind::Number) {
            return None;
        }
        self.value.raw.parse().ok()
    }

    /// The string contents without the surrounding quotes, with doubled
    /// quotes collapsed: `"say ""hi"""` -> `say "hi"`.
    pub fn as_text(&self) -> Option<String> {
        if !self.value.is(TokenKind::String) {
            return None;
        }
        let raw = &self.value.raw;
        let quote = raw.chars().next()?;
        let inner = raw.get(quote.len_utf8()..raw.len() - quote.len_utf8())?;
        let doubled: String = [quote, quote].iter().collect();
        Some(inner.replace(&doubled, &quote.to_string()))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match (self.value.kind, self.value.raw.as_str()) {
            (TokenKind::Boolean, "TRUE") => Some(true),
            (TokenKind::Boolean, "FALSE") => Some(false),
            _ => None,
        }
    }
}

impl RangeExpr {
    /// The final endpoint of the chain.
    pub fn last_end(&self) -> &CellExpr {
        self.ends.last().unwrap_or(&self.begin)
    }
}

impl CellExpr {
    pub fn is_full_column(&self) -> bool {
        self.row.is_none()
    }

    pub fn is_full_row(&self) -> bool {
        self.col.is_none()
    }

    /// Renders the reference in normalized A1 form ("$A$1", "B", "$3").
    pub fn to_a1(&self) -> String {
        match (self.row, self.col) {
            (Some(row), Some(col)) => format_cell_reference(&CellReference {
                row,
                col,
                row_absolute: self.row_absolute,
                col_absolute: self.col_absolute,
            }),
            (None, Some(col)) => format!(
                "{}{}",
                if self.col_absolute { "$" } else { "" },
                index_to_column_name(col)
            ),
            (Some(row), None) => format!(
                "{}{}",
                if self.row_absolute { "$" } else { "" },
                u64::from(row) + 1
            ),
            (None, None) => String::new(),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, nodes: &[Node]) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", node)?;
    }
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::FunCall(e) => {
                write!(f, "FunCallExpr(Name: {}, Arguments: [", e.name.raw)?;
                write_list(f, &e.arguments)?;
                f.write_str("])")
            }
            Node::Binary(e) => write!(
                f,
                "BinaryExpr(Left: {}, Operator: {}, Right: {})",
                e.left, e.operator.raw, e.right
            ),
            Node::Unary(e) => write!(
                f,
                "UnaryExpr(Operator: {}, Operand: {})",
                e.operator.raw, e.operand
            ),
            Node::Literal(e) => write!(f, "LiteralExpr(Value: {})", e.value.raw),
            Node::Ident(e) => write!(f, "IdentExpr(Name: {})", e.name.raw),
            Node::Parenthesized(e) => write!(f, "ParenthesizedExpr(Inner: {})", e.inner),
            Node::Range(e) => {
                write!(f, "RangeExpr({}", e.begin)?;
                for end in &e.ends {
                    write!(f, ":{}", end)?;
                }
                f.write_str(")")
            }
            Node::Cell(e) => write!(f, "{}", e),
            Node::Array(e) => {
                f.write_str("ArrayExpr(")?;
                for (i, row) in e.elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str("[")?;
                    write_list(f, row)?;
                    f.write_str("]")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for CellExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellExpr({})", self.token.raw)
    }
}
