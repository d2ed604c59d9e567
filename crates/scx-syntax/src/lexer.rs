//! Tokenization.
//!
//! The lexer scans bytes left to right, skipping ASCII whitespace and
//! `;` line comments, and produces a [`TokenStream`]. Only token kinds and
//! start offsets are recorded; literal text is decoded later by
//! [`literal`](crate::literal) when the evaluator touches an atom.
//!
//! - `(` and `)` are single-byte tokens.
//! - A digit, or `-` followed by a digit, starts a number. Digits are
//!   consumed, then at most one `.` followed by a digit turns the token into
//!   a real. The number ends at the first other byte, which starts the next
//!   token (`12abc` is `12` then `abc`).
//! - `#t` and `#f` are booleans and must be followed by a delimiter.
//! - `"` starts a string that runs to the next `"`; there are no escapes.
//! - Anything else is an identifier: the maximal run of bytes that are
//!   neither whitespace nor parentheses. Operators and non-ASCII names such
//!   as `<=` or `λ` are ordinary identifiers.
//!
//! # Examples
//!
//! ```
//! use scx_syntax::lexer::Lexer;
//! use scx_syntax::token::TokenKind;
//!
//! let tokens = Lexer::new("(+ 1 2.5)").lex().unwrap();
//! assert_eq!(
//!     tokens.kinds(),
//!     &[
//!         TokenKind::LParen,
//!         TokenKind::Ident,
//!         TokenKind::Int,
//!         TokenKind::Real,
//!         TokenKind::RParen,
//!         TokenKind::End,
//!     ]
//! );
//! assert_eq!(tokens.offsets(), &[0, 1, 3, 5, 8, 9]);
//! ```

use crate::error::{LexerError, LexerResult};
use crate::span::SrcPos;
use crate::token::{TokenKind, TokenStream};

/// Whether `byte` ends an identifier or a boolean.
pub(crate) const fn is_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == b'(' || byte == b')'
}

/// Lexical analyzer over a source buffer.
pub struct Lexer<'input> {
    /// Whole source text; offsets are relative to its start
    input: &'input [u8],

    /// Current byte offset
    position: usize,

    /// Accumulated tokens
    tokens: TokenStream,
}

impl<'input> Lexer<'input> {
    /// Creates a lexer over the whole of `input`.
    #[must_use]
    pub fn new(input: &'input str) -> Self {
        Self::with_offset(input, 0)
    }

    /// Creates a lexer that starts scanning at byte `start` of `input`.
    ///
    /// Offsets in the resulting stream are still relative to the start of
    /// `input`, so earlier text can stay addressable (used to append new
    /// forms to a persistent session).
    #[must_use]
    pub fn with_offset(input: &'input str, start: usize) -> Self {
        Self {
            input: input.as_bytes(),
            position: start.min(input.len()),
            tokens: TokenStream::new(),
        }
    }

    /// Tokenizes the remaining input. The stream always ends with
    /// [`TokenKind::End`].
    ///
    /// # Errors
    ///
    /// Returns [`LexerError::InvalidHash`] for `#` not forming `#t`/`#f`, and
    /// [`LexerError::UnterminatedString`] for a string with no closing quote.
    pub fn lex(mut self) -> LexerResult<TokenStream> {
        loop {
            self.skip_trivia();

            let Some(byte) = self.peek() else {
                let end = self.pos();
                self.tokens.push(TokenKind::End, end);
                return Ok(self.tokens);
            };

            match byte {
                b'(' => self.single(TokenKind::LParen),
                b')' => self.single(TokenKind::RParen),
                b'"' => self.read_string()?,
                b'#' => self.read_bool()?,
                b'0'..=b'9' => self.read_number(),
                b'-' if self.peek_at(1).is_some_and(|next| next.is_ascii_digit()) => {
                    self.read_number();
                }
                _ => self.read_identifier(),
            }
        }
    }

    fn pos(&self) -> SrcPos {
        self.position as SrcPos
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.position).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.input.get(self.position + ahead).copied()
    }

    fn skip_trivia(&mut self) {
        while let Some(byte) = self.peek() {
            if byte.is_ascii_whitespace() {
                self.position += 1;
            } else if byte == b';' {
                while self.peek().is_some_and(|byte| byte != b'\n') {
                    self.position += 1;
                }
            } else {
                break;
            }
        }
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|byte| byte.is_ascii_digit()) {
            self.position += 1;
        }
    }

    fn single(&mut self, kind: TokenKind) {
        let pos = self.pos();
        self.tokens.push(kind, pos);
        self.position += 1;
    }

    fn read_string(&mut self) -> LexerResult<()> {
        let quote = self.pos();
        let start = self.position + 1;

        let Some(len) = self.input[start..].iter().position(|&byte| byte == b'"') else {
            return Err(LexerError::UnterminatedString { pos: quote });
        };

        self.tokens.push(TokenKind::Str, start as SrcPos);
        self.position = start + len + 1;
        Ok(())
    }

    fn read_bool(&mut self) -> LexerResult<()> {
        let hash = self.pos();
        let valid = matches!(self.peek_at(1), Some(b't' | b'f'))
            && self
                .peek_at(2)
                .is_none_or(|next| is_delimiter(next) || next == b';');

        if !valid {
            return Err(LexerError::InvalidHash { pos: hash });
        }

        self.tokens.push(TokenKind::Bool, hash + 1);
        self.position += 2;
        Ok(())
    }

    fn read_number(&mut self) {
        let start = self.pos();
        if self.peek() == Some(b'-') {
            self.position += 1;
        }
        self.skip_digits();

        let kind = if self.peek() == Some(b'.')
            && self.peek_at(1).is_some_and(|next| next.is_ascii_digit())
        {
            self.position += 1;
            self.skip_digits();
            TokenKind::Real
        } else {
            TokenKind::Int
        };

        self.tokens.push(kind, start);
    }

    fn read_identifier(&mut self) {
        let start = self.pos();
        while self.peek().is_some_and(|byte| !is_delimiter(byte)) {
            self.position += 1;
        }
        self.tokens.push(TokenKind::Ident, start);
    }
}
