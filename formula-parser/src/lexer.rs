//! FILENAME: formula-parser/src/lexer.rs
//! PURPOSE: Scans a raw formula string and produces a stream of Tokens.
//! CONTEXT: This is the first stage of the parsing pipeline. It handles
//! whitespace skipping, number and string literals, error values, absolute
//! references and multi-character operators like <= and <>.
//!
//! SUPPORTED INPUT:
//! - Single char: ! { } [ ] ( ) , ; : + - * / & ^ % @ = < >
//! - Multi char: <= >= <>
//! - Strings: "text" or 'text', a doubled quote ("" or '') is a literal quote
//! - Numbers: 12, 12.5 (no exponent)
//! - Error values: #NULL! #DIV/0! #VALUE! #REF! #NAME? #NUM! #N/A
//! - References: A1, $A$1, A$1, $A1, $A (absolute column), $1 (absolute row)
//!
//! The source is decoded to chars once, so every offset and column counts
//! code points rather than bytes.

use crate::error::LexError;
use crate::position::Position;
use crate::token::{Token, TokenKind};

const ERROR_VALUES: [&str; 7] = [
    "#NULL!", "#DIV/0!", "#VALUE!", "#REF!", "#NAME?", "#NUM!", "#N/A",
];

pub struct Lexer {
    src: Vec<char>,
    /// Index of `ch` in `src`.
    offset: usize,
    ch: Option<char>,
    /// Position of `ch`.
    pos: Position,
    /// Position of the most recently consumed char.
    prev: Position,
    failed: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let src: Vec<char> = input.chars().collect();
        let ch = src.first().copied();
        Lexer {
            src,
            offset: 0,
            ch,
            pos: Position::default(),
            prev: Position::default(),
            failed: false,
        }
    }

    /// Position of the next unread character (one past the end at EOF).
    pub fn position(&self) -> Position {
        self.pos
    }

    /// Returns the next token, or `None` once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();

        let Some(ch) = self.ch else {
            return Ok(None);
        };
        let start = self.pos;
        let start_offset = self.offset;

        let kind = match ch {
            '"' | '\'' => return self.read_string(ch).map(Some),
            '$' => return self.read_absolute_reference().map(Some),
            '#' => return self.read_error_value().map(Some),
            '<' => self.read_less_than_operator(),
            '>' => self.read_greater_than_operator(),
            c if c.is_ascii_digit() => return self.read_number().map(Some),
            c => match punctuation(c) {
                Some(kind) => {
                    self.bump();
                    kind
                }
                None => return self.read_identifier().map(Some),
            },
        };

        Ok(Some(self.token_from(start_offset, start, kind)))
    }

    fn bump(&mut self) {
        if let Some(c) = self.ch {
            self.prev = self.pos;
            if c == '\n' {
                self.pos.next_line();
            } else {
                self.pos.next_column();
            }
            self.offset += 1;
            self.ch = self.src.get(self.offset).copied();
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.src.get(self.offset + 1).copied()
    }

    fn token_from(&self, start_offset: usize, start: Position, kind: TokenKind) -> Token {
        let raw: String = self.src[start_offset..self.offset].iter().collect();
        Token::new(start, self.prev, kind, raw)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, Some(' ' | '\t' | '\n' | '\r')) {
            self.bump();
        }
    }

    fn eat_digits(&mut self) -> usize {
        let mut count = 0;
        while self.ch.is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            count += 1;
        }
        count
    }

    /// Handles operators starting with '<': <, <=, <>
    fn read_less_than_operator(&mut self) -> TokenKind {
        self.bump();
        match self.ch {
            Some('=') => {
                self.bump();
                TokenKind::LessEqual
            }
            Some('>') => {
                self.bump();
                TokenKind::NotEqual
            }
            _ => TokenKind::LessThan,
        }
    }

    /// Handles operators starting with '>': >, >=
    fn read_greater_than_operator(&mut self) -> TokenKind {
        self.bump();
        match self.ch {
            Some('=') => {
                self.bump();
                TokenKind::GreaterEqual
            }
            _ => TokenKind::GreaterThan,
        }
    }

    /// Reads a string delimited by `quote`. The raw text keeps both quotes and
    /// any doubled-quote escapes untouched.
    fn read_string(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.pos;
        let start_offset = self.offset;
        self.bump(); // opening quote

        loop {
            match self.ch {
                None => return Err(LexError::new(start, "unterminated string literal")),
                Some('\n') => return Err(LexError::new(self.pos, "newline in string literal")),
                Some(c) if c == quote => {
                    self.bump();
                    if self.ch == Some(quote) {
                        // Escaped quote
                        self.bump();
                        continue;
                    }
                    break;
                }
                Some(_) => self.bump(),
            }
        }

        Ok(self.token_from(start_offset, start, TokenKind::String))
    }

    /// Reads `$123`, `$ABC`, `$A1` or `$A$1`.
    fn read_absolute_reference(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let start_offset = self.offset;
        self.bump(); // '$'

        match self.ch {
            Some(c) if c.is_ascii_digit() => {
                self.eat_digits();
                Ok(self.token_from(start_offset, start, TokenKind::AbsoluteRow))
            }
            Some(c) if c.is_ascii_alphabetic() => {
                while self.ch.is_some_and(|c| c.is_ascii_alphabetic()) {
                    self.bump();
                }
                let kind = match self.ch {
                    Some('$') if self.peek_char().is_some_and(|c| c.is_ascii_digit()) => {
                        self.bump();
                        self.eat_digits();
                        TokenKind::Cell
                    }
                    Some(c) if c.is_ascii_digit() => {
                        self.eat_digits();
                        TokenKind::Cell
                    }
                    _ => TokenKind::AbsoluteColumn,
                };
                Ok(self.token_from(start_offset, start, kind))
            }
            _ => Err(LexError::new(self.pos, "invalid absolute reference after '$'")),
        }
    }

    fn read_error_value(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let start_offset = self.offset;
        let rest = &self.src[self.offset..];

        let matched = ERROR_VALUES.iter().find_map(|candidate| {
            let len = candidate.chars().count();
            let hit = rest.len() >= len && candidate.chars().zip(rest).all(|(a, b)| a == *b);
            hit.then_some(len)
        });

        match matched {
            Some(len) => {
                for _ in 0..len {
                    self.bump();
                }
                Ok(self.token_from(start_offset, start, TokenKind::ErrorValue))
            }
            None => Err(LexError::new(start, "unrecognized error value")),
        }
    }

    /// Digits, optionally followed by '.' and at least one more digit.
    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let start_offset = self.offset;
        self.eat_digits();

        if self.ch == Some('.') {
            self.bump();
            if self.eat_digits() == 0 {
                return Err(LexError::new(
                    self.pos,
                    "invalid number format: expected digit after '.'",
                ));
            }
        }

        Ok(self.token_from(start_offset, start, TokenKind::Number))
    }

    /// Reads a name and classifies it as a boolean, a cell reference
    /// (A1, or A$1 when an absolute row follows) or a plain identifier.
    fn read_identifier(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let start_offset = self.offset;

        match self.ch {
            Some(c) if is_identifier_start(c) => self.bump(),
            Some(c) => {
                return Err(LexError::new(
                    start,
                    format!("invalid identifier start {:?}", c),
                ))
            }
            None => return Err(LexError::new(start, "unexpected end of input")),
        }
        while self.ch.is_some_and(is_identifier_continue) {
            self.bump();
        }

        let raw: String = self.src[start_offset..self.offset].iter().collect();
        if raw == "TRUE" || raw == "FALSE" {
            return Ok(Token::new(start, self.prev, TokenKind::Boolean, raw));
        }
        if is_cell_shape(&raw) {
            return Ok(Token::new(start, self.prev, TokenKind::Cell, raw));
        }
        if self.ch == Some('$') && self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.eat_digits();
            return Ok(self.token_from(start_offset, start, TokenKind::Cell));
        }

        Ok(Token::new(start, self.prev, TokenKind::Identifier, raw))
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, LexError>;

    /// Yields tokens until end of input, or a single error after which the
    /// iterator is exhausted.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_token() {
            Ok(token) => token.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Lexes a whole formula into a vector of tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).collect()
}

fn punctuation(ch: char) -> Option<TokenKind> {
    let kind = match ch {
        '!' => TokenKind::Exclamation,
        '{' => TokenKind::LBrace,
        '}' => TokenKind::RBrace,
        '[' => TokenKind::LBracket,
        ']' => TokenKind::RBracket,
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        ',' => TokenKind::Comma,
        ';' => TokenKind::Semicolon,
        ':' => TokenKind::Colon,
        '@' => TokenKind::At,
        '%' => TokenKind::Percent,
        '^' => TokenKind::Caret,
        '*' => TokenKind::Asterisk,
        '/' => TokenKind::Slash,
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '&' => TokenKind::Ampersand,
        '=' => TokenKind::Equals,
        _ => return None,
    };
    Some(kind)
}

/// ASCII letters, underscore, and any non-ASCII char (e.g. "工作表1").
fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

/// '.' is allowed after the first char for names like "Q1.Sales".
fn is_identifier_continue(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit() || ch == '.'
}

/// One or more ASCII letters followed by one or more digits, nothing else.
fn is_cell_shape(raw: &str) -> bool {
    let letters = raw.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    let digits = raw.chars().skip(letters).take_while(|c| c.is_ascii_digit()).count();
    letters > 0 && digits > 0 && letters + digits == raw.chars().count()
}
