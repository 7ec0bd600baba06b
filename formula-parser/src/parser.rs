//! FILENAME: formula-parser/src/parser.rs
//! PURPOSE: Recursive descent parser that converts a stream of Tokens into an AST.
//! CONTEXT: This is the second stage of the parsing pipeline. It pulls tokens
//! from the Lexer on demand, keeping the current token plus at most one
//! buffered lookahead, and builds the Node tree bottom-up.
//!
//! GRAMMAR (loosest to tightest):
//!   formula        --> "="? comparison
//!   comparison     --> concatenation ( ("=" | "<>" | "<" | ">" | "<=" | ">=") concatenation )*
//!   concatenation  --> additive ( "&" additive )*
//!   additive       --> multiplicative ( ("+" | "-") multiplicative )*
//!   multiplicative --> exponent ( ("*" | "/") exponent )*
//!   exponent       --> percent ( "^" percent )*
//!   percent        --> prefix "%"*
//!   prefix         --> ("-" | "+" | "@") prefix | range
//!   range          --> primary ( ":" primary )*
//!   primary        --> NUMBER | STRING | BOOLEAN | ERROR | CELL | "$1" | "$A"
//!                    | IDENTIFIER | function_call | "(" comparison ")" | array
//!   function_call  --> IDENTIFIER "(" ( comparison ( "," comparison )* )? ")"
//!   array          --> "{" row ( ";" row )* "}"
//!   row            --> comparison ( "," comparison )*
//!
//! Every binary level is left-associative. Range endpoints are normalized to
//! CellExpr: a bare name becomes a full column (A:A), a bare number a full row (1:1).

use crate::ast::{
    ArrayExpr, BinaryExpr, CellExpr, FunCallExpr, IdentExpr, LiteralExpr, Node,
    ParenthesizedExpr, RangeExpr, UnaryExpr,
};
use crate::cell_ref::{column_name_to_index, parse_cell_reference, row_number_to_index};
use crate::error::{FormulaError, ParseError};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};
use log::{debug, trace};

pub type ParseResult<T> = Result<T, FormulaError>;

const COMPARISON_OPERATORS: &[TokenKind] = &[
    TokenKind::Equals,
    TokenKind::NotEqual,
    TokenKind::LessThan,
    TokenKind::GreaterThan,
    TokenKind::LessEqual,
    TokenKind::GreaterEqual,
];
const CONCAT_OPERATORS: &[TokenKind] = &[TokenKind::Ampersand];
const ADDITIVE_OPERATORS: &[TokenKind] = &[TokenKind::Plus, TokenKind::Minus];
const MULTIPLICATIVE_OPERATORS: &[TokenKind] = &[TokenKind::Asterisk, TokenKind::Slash];
const EXPONENT_OPERATORS: &[TokenKind] = &[TokenKind::Caret];

/// Deepest allowed nesting of prefix operators, parentheses, call arguments
/// and array elements, matching Excel's limit on nested function levels.
pub const MAX_NESTING_DEPTH: usize = 64;

/// The Parser struct holds the lexer and the token lookahead state.
pub struct Parser {
    lexer: Lexer,
    /// `None` once the input is exhausted.
    current: Option<Token>,
    lookahead: Option<Token>,
    depth: usize,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Parser {
            lexer: Lexer::new(input),
            current: None,
            lookahead: None,
            depth: 0,
        }
    }

    /// Parses the entire input and returns the AST.
    /// Handles the optional leading '=' that indicates a formula.
    pub fn parse(&mut self) -> ParseResult<Node> {
        self.advance()?;

        // Skip the leading '=' if present (formula indicator)
        if self.at(TokenKind::Equals) {
            self.advance()?;
        }

        if self.current.is_none() {
            return Err(ParseError::new(self.lexer.position(), "empty expression").into());
        }

        let expr = self.parse_comparison()?;

        if let Some(token) = &self.current {
            return Err(ParseError::new(
                token.start,
                format!("unexpected trailing token {}", token.raw),
            )
            .into());
        }

        Ok(expr)
    }

    // ------------------------------------------------------------------
    // Token handling
    // ------------------------------------------------------------------

    /// Drops the current token and moves to the next one.
    fn advance(&mut self) -> ParseResult<()> {
        self.current = match self.lookahead.take() {
            Some(token) => Some(token),
            None => self.lexer.next_token()?,
        };
        Ok(())
    }

    /// Returns the token after `current` without consuming anything.
    fn peek(&mut self) -> ParseResult<Option<&Token>> {
        if self.lookahead.is_none() {
            self.lookahead = self.lexer.next_token()?;
        }
        Ok(self.lookahead.as_ref())
    }

    /// Takes ownership of the current token and advances past it.
    fn bump(&mut self) -> ParseResult<Token> {
        let token = match self.current.take() {
            Some(token) => token,
            None => return Err(self.end_of_input("unexpected end of input")),
        };
        self.advance()?;
        Ok(token)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current.as_ref().is_some_and(|t| t.kind == kind)
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        self.current.as_ref().is_some_and(|t| kinds.contains(&t.kind))
    }

    fn unexpected_token(&self) -> FormulaError {
        match &self.current {
            Some(token) => {
                ParseError::new(token.start, format!("unexpected token {}", token.raw)).into()
            }
            None => self.end_of_input("unexpected end of input"),
        }
    }

    fn end_of_input(&self, message: &str) -> FormulaError {
        ParseError::new(self.lexer.position(), message).into()
    }

    /// Consumes a token of the given kind or fails with `message`.
    fn expect(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        match &self.current {
            Some(token) if token.kind == kind => self.bump(),
            Some(token) => Err(ParseError::new(
                token.start,
                format!("{}, found {}", message, token.raw),
            )
            .into()),
            None => Err(self.end_of_input(message)),
        }
    }

    /// Runs `parse` one nesting level deeper, failing once the input nests
    /// past `MAX_NESTING_DEPTH`.
    fn nested(&mut self, parse: fn(&mut Self) -> ParseResult<Node>) -> ParseResult<Node> {
        if self.depth >= MAX_NESTING_DEPTH {
            let pos = match &self.current {
                Some(token) => token.start,
                None => self.lexer.position(),
            };
            return Err(ParseError::new(pos, "expression nested too deeply").into());
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ------------------------------------------------------------------
    // Binary levels
    // ------------------------------------------------------------------

    /// Parses `next (op next)*` into a left-associative BinaryExpr chain.
    fn parse_left_assoc(
        &mut self,
        operators: &[TokenKind],
        next: fn(&mut Self) -> ParseResult<Node>,
    ) -> ParseResult<Node> {
        let mut left = next(self)?;

        while self.at_any(operators) {
            let operator = self.bump()?;
            let right = next(self)?;
            left = Node::Binary(BinaryExpr {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    /// Parses comparison expressions (=, <>, <, >, <=, >=).
    fn parse_comparison(&mut self) -> ParseResult<Node> {
        self.parse_left_assoc(COMPARISON_OPERATORS, Self::parse_concatenation)
    }

    /// Parses concatenation expressions (&).
    fn parse_concatenation(&mut self) -> ParseResult<Node> {
        self.parse_left_assoc(CONCAT_OPERATORS, Self::parse_additive)
    }

    /// Parses additive expressions (+ and -).
    fn parse_additive(&mut self) -> ParseResult<Node> {
        self.parse_left_assoc(ADDITIVE_OPERATORS, Self::parse_multiplicative)
    }

    /// Parses multiplicative expressions (* and /).
    fn parse_multiplicative(&mut self) -> ParseResult<Node> {
        self.parse_left_assoc(MULTIPLICATIVE_OPERATORS, Self::parse_exponent)
    }

    /// Parses exponentiation (^). Left-associative: 2^3^2 is (2^3)^2.
    fn parse_exponent(&mut self) -> ParseResult<Node> {
        self.parse_left_assoc(EXPONENT_OPERATORS, Self::parse_percent)
    }

    // ------------------------------------------------------------------
    // Unary levels
    // ------------------------------------------------------------------

    /// Parses postfix percent. May repeat: 10%% is (10%)%.
    fn parse_percent(&mut self) -> ParseResult<Node> {
        let mut operand = self.parse_prefix()?;

        while self.at(TokenKind::Percent) {
            let operator = self.bump()?;
            operand = Node::Unary(UnaryExpr {
                operator,
                operand: Box::new(operand),
            });
        }

        Ok(operand)
    }

    /// Parses prefix -, + and @. Recurses so that --1 is -(-(1)).
    fn parse_prefix(&mut self) -> ParseResult<Node> {
        if self.at_any(&[TokenKind::Minus, TokenKind::Plus, TokenKind::At]) {
            let operator = self.bump()?;
            let operand = self.nested(Self::parse_prefix)?;
            return Ok(Node::Unary(UnaryExpr {
                operator,
                operand: Box::new(operand),
            }));
        }

        self.parse_range()
    }

    // ------------------------------------------------------------------
    // References
    // ------------------------------------------------------------------

    /// Parses `primary (":" primary)*`. Without a colon the primary is
    /// returned as is.
    fn parse_range(&mut self) -> ParseResult<Node> {
        let first = self.parse_primary()?;
        if !self.at(TokenKind::Colon) {
            return Ok(first);
        }

        let begin = Self::to_cell_expr(first)?;
        let mut colons = Vec::new();
        let mut ends = Vec::new();

        while self.at(TokenKind::Colon) {
            colons.push(self.bump()?);
            let end = self.parse_primary()?;
            ends.push(Self::to_cell_expr(end)?);
        }

        Ok(Node::Range(RangeExpr {
            begin,
            colons,
            ends,
        }))
    }

    /// Normalizes a range endpoint into a CellExpr.
    fn to_cell_expr(node: Node) -> ParseResult<CellExpr> {
        match node {
            Node::Cell(cell) => Ok(cell),

            // Column reference like the A in A:A
            Node::Ident(IdentExpr { name }) => match column_name_to_index(&name.raw) {
                Some(col) => Ok(CellExpr {
                    token: name,
                    row: None,
                    col: Some(col),
                    row_absolute: false,
                    col_absolute: false,
                }),
                None => Err(ParseError::new(
                    name.start,
                    format!("expected a cell reference, found {}", name.raw),
                )
                .into()),
            },

            // Row reference like the 1 in 1:1
            Node::Literal(LiteralExpr { value }) => {
                if !value.is(TokenKind::Number) {
                    return Err(ParseError::new(
                        value.start,
                        format!("expected a row reference, found {}", value.raw),
                    )
                    .into());
                }
                match row_number_to_index(&value.raw) {
                    Some(row) => Ok(CellExpr {
                        token: value,
                        row: Some(row),
                        col: None,
                        row_absolute: false,
                        col_absolute: false,
                    }),
                    None => Err(ParseError::new(
                        value.start,
                        format!("invalid row reference {}", value.raw),
                    )
                    .into()),
                }
            }

            other => Err(ParseError::new(
                other.start(),
                format!("expected a cell reference, found {}", other.kind_name()),
            )
            .into()),
        }
    }

    fn parse_cell(&mut self) -> ParseResult<Node> {
        let token = self.bump()?;
        let reference = parse_cell_reference(&token.raw).map_err(|e| {
            FormulaError::from(ParseError::new(
                token.start,
                format!("invalid cell reference: {}", e),
            ))
        })?;

        Ok(Node::Cell(CellExpr {
            token,
            row: Some(reference.row),
            col: Some(reference.col),
            row_absolute: reference.row_absolute,
            col_absolute: reference.col_absolute,
        }))
    }

    /// `$5`: a whole row, row-absolute.
    fn parse_absolute_row(&mut self) -> ParseResult<Node> {
        let token = self.bump()?;
        let row = row_number_to_index(token.raw.trim_start_matches('$')).ok_or_else(|| {
            FormulaError::from(ParseError::new(
                token.start,
                format!("invalid absolute row reference {}", token.raw),
            ))
        })?;

        Ok(Node::Cell(CellExpr {
            token,
            row: Some(row),
            col: None,
            row_absolute: true,
            col_absolute: false,
        }))
    }

    /// `$B`: a whole column, column-absolute.
    fn parse_absolute_column(&mut self) -> ParseResult<Node> {
        let token = self.bump()?;
        let col = column_name_to_index(token.raw.trim_start_matches('$')).ok_or_else(|| {
            FormulaError::from(ParseError::new(
                token.start,
                format!("invalid absolute column reference {}", token.raw),
            ))
        })?;

        Ok(Node::Cell(CellExpr {
            token,
            row: None,
            col: Some(col),
            row_absolute: false,
            col_absolute: true,
        }))
    }

    // ------------------------------------------------------------------
    // Primary
    // ------------------------------------------------------------------

    /// Parses primary expressions (literals, references, calls, groups, arrays).
    fn parse_primary(&mut self) -> ParseResult<Node> {
        let Some(kind) = self.current.as_ref().map(|t| t.kind) else {
            return Err(self.end_of_input("unexpected end of input"));
        };

        match kind {
            TokenKind::LParen => self.parse_parenthesized(),
            TokenKind::LBrace => self.parse_array(),

            k if k.is_literal() => {
                let value = self.bump()?;
                Ok(Node::Literal(LiteralExpr { value }))
            }

            // Identifier: a function call when '(' follows, otherwise a name
            TokenKind::Identifier => {
                let is_call = self.peek()?.is_some_and(|t| t.is(TokenKind::LParen));
                if is_call {
                    return self.parse_function_call();
                }
                let name = self.bump()?;
                Ok(Node::Ident(IdentExpr { name }))
            }

            TokenKind::Cell => self.parse_cell(),
            TokenKind::AbsoluteRow => self.parse_absolute_row(),
            TokenKind::AbsoluteColumn => self.parse_absolute_column(),

            _ => Err(self.unexpected_token()),
        }
    }

    /// Parses a function call like SUM(A1, A2, 10).
    fn parse_function_call(&mut self) -> ParseResult<Node> {
        let name = self.bump()?;
        let lparen = self.expect(TokenKind::LParen, "expected '(' after function name")?;
        let mut arguments = Vec::new();

        // Handle empty argument list
        if self.at(TokenKind::RParen) {
            let rparen = self.bump()?;
            return Ok(Node::FunCall(FunCallExpr {
                name,
                lparen,
                arguments,
                rparen,
            }));
        }

        loop {
            arguments.push(self.nested(Self::parse_comparison)?);

            match &self.current {
                Some(t) if t.is(TokenKind::Comma) => {
                    self.bump()?;
                    if self.current.is_none() || self.at(TokenKind::RParen) {
                        return Err(ParseError::new(
                            name.start,
                            format!("expected argument after ',' in call to {}", name.raw),
                        )
                        .into());
                    }
                }
                Some(t) if t.is(TokenKind::RParen) => break,
                Some(t) => {
                    return Err(ParseError::new(
                        t.start,
                        format!("expected ',' or ')' in call to {}, found {}", name.raw, t.raw),
                    )
                    .into())
                }
                None => {
                    return Err(ParseError::new(
                        name.start,
                        format!(
                            "unexpected end of input, expected ')' to close call to {}",
                            name.raw
                        ),
                    )
                    .into())
                }
            }
        }

        let rparen = self.bump()?;
        Ok(Node::FunCall(FunCallExpr {
            name,
            lparen,
            arguments,
            rparen,
        }))
    }

    fn parse_parenthesized(&mut self) -> ParseResult<Node> {
        let lparen = self.bump()?;
        let inner = self.nested(Self::parse_comparison)?;
        let rparen = self.expect(TokenKind::RParen, "expected ')'")?;

        Ok(Node::Parenthesized(ParenthesizedExpr {
            lparen,
            inner: Box::new(inner),
            rparen,
        }))
    }

    /// Parses `{a,b;c,d}`. Every row must have the same number of columns.
    fn parse_array(&mut self) -> ParseResult<Node> {
        let lbrace = self.bump()?;
        if self.at(TokenKind::RBrace) {
            return Err(ParseError::new(lbrace.start, "empty array literal").into());
        }

        let mut elements: Vec<Vec<Node>> = Vec::new();
        let mut row = vec![self.nested(Self::parse_comparison)?];

        let rbrace = loop {
            match &self.current {
                Some(t) if t.is(TokenKind::Comma) => {
                    self.bump()?;
                    row.push(self.nested(Self::parse_comparison)?);
                }
                Some(t) if t.is(TokenKind::Semicolon) => {
                    self.bump()?;
                    elements.push(std::mem::take(&mut row));
                    row.push(self.nested(Self::parse_comparison)?);
                }
                Some(t) if t.is(TokenKind::RBrace) => {
                    elements.push(std::mem::take(&mut row));
                    break self.bump()?;
                }
                Some(t) => {
                    return Err(ParseError::new(
                        t.start,
                        format!("expected ',', ';' or '}}' in array literal, found {}", t.raw),
                    )
                    .into())
                }
                None => {
                    return Err(ParseError::new(
                        lbrace.start,
                        "unexpected end of input, expected '}' to close array literal",
                    )
                    .into())
                }
            }
        };

        let columns = elements[0].len();
        if let Some(index) = elements.iter().position(|r| r.len() != columns) {
            return Err(ParseError::new(
                lbrace.start,
                format!(
                    "array literal row {} has {} columns, expected {}",
                    index + 1,
                    elements[index].len(),
                    columns
                ),
            )
            .into());
        }

        Ok(Node::Array(ArrayExpr {
            lbrace,
            elements,
            rbrace,
        }))
    }
}

/// Convenience function to parse a formula string directly.
pub fn parse(input: &str) -> ParseResult<Node> {
    trace!("parsing formula ({} chars)", input.chars().count());
    let result = Parser::new(input).parse();
    match &result {
        Ok(node) => trace!("parsed formula into {}", node.kind_name()),
        Err(e) => debug!("failed to parse formula {:?}: {}", input, e),
    }
    result
}
