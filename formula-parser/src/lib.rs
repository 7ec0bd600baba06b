//! FILENAME: formula-parser/src/lib.rs
//! PURPOSE: Library root for the spreadsheet formula parser.
//! CONTEXT: This crate exposes the lexer, parser, and AST components
//! needed to convert formula strings into typed expression trees for
//! evaluation or static analysis. It does not evaluate anything.
//!
//! PIPELINE: Formula String --> Lexer --> Tokens --> Parser --> AST
//!
//! SUPPORTED FEATURES:
//! - Arithmetic: +, -, *, /, ^ (power), postfix % (percent)
//! - Comparison: =, <>, <, >, <=, >=
//! - String concatenation: &
//! - Prefix operators: - (negation), + (identity), @ (implicit intersection)
//! - Cell references: A1, AA100, $A$1, A$1, $A1
//! - Ranges, chained ranges, whole columns and rows: A1:B10, A1:B2:C3, A:A, 1:1
//! - Function calls: SUM(A1:A10), IF(A1>0, "yes", "no")
//! - Array literals: {1,2;3,4}
//! - Error values: #DIV/0!, #N/A, #REF!, ...
//! - Parentheses for grouping

pub mod analysis;
pub mod ast;
pub mod cell_ref;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod token;


// Re-export commonly used types for convenience
pub use analysis::{collect_function_names, collect_references, Reference};
pub use ast::{
    ArrayExpr, BinaryExpr, CellExpr, FunCallExpr, IdentExpr, LiteralExpr, Node,
    ParenthesizedExpr, RangeExpr, UnaryExpr,
};
pub use cell_ref::{
    column_name_to_index, format_cell_reference, index_to_column_name, parse_cell_reference,
    CellReference,
};
pub use error::{CellRefError, FormulaError, LexError, ParseError};
pub use lexer::{tokenize, Lexer};
pub use parser::{parse, ParseResult, Parser, MAX_NESTING_DEPTH};
pub use position::Position;
pub use token::{Token, TokenKind};
