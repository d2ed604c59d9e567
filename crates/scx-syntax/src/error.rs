//! Error types for the lexer and parser.
//!
//! Every variant carries the source byte offset it refers to; use
//! [`line_col`](crate::span::line_col) to render it for humans.

use crate::span::{MAX_SOURCE_LEN, SrcPos};
use std::fmt;

/// Errors that can occur during tokenization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerError {
    /// `#` not followed by `t` or `f` and a delimiter.
    ///
    /// ```text
    /// (if #true 1 2)
    ///     ^
    /// ```
    InvalidHash {
        /// Offset of the `#`
        pos: SrcPos,
    },

    /// String literal without a closing quote.
    UnterminatedString {
        /// Offset of the opening quote
        pos: SrcPos,
    },
}

impl LexerError {
    /// Source offset the error refers to.
    #[must_use]
    pub const fn pos(&self) -> SrcPos {
        match self {
            Self::InvalidHash { pos } | Self::UnterminatedString { pos } => *pos,
        }
    }
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHash { .. } => write!(f, "expected #t or #f after '#'"),
            Self::UnterminatedString { .. } => write!(f, "unterminated string literal"),
        }
    }
}

impl std::error::Error for LexerError {}

/// Errors that can occur during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserError {
    /// A form did not start with `(`.
    ExpectedOpenParen {
        /// Offset of the offending token
        pos: SrcPos,
    },

    /// `(` was not immediately followed by an identifier.
    ///
    /// ```text
    /// (1 2 3)
    ///  ^
    /// ```
    ExpectedIdentifier {
        /// Offset of the offending token
        pos: SrcPos,
    },

    /// Input ended before the matching `)`.
    MissingCloseParen {
        /// Offset of the unmatched `(`
        pos: SrcPos,
    },

    /// An expression has more arguments than an AST node can count.
    TooManyArguments {
        /// Offset of the expression's identifier
        pos: SrcPos,
    },

    /// Forms nest deeper than [`MAX_NESTING`](crate::parser::MAX_NESTING).
    TooDeep {
        /// Offset of the first `(` past the limit
        pos: SrcPos,
    },

    /// The source exceeds [`MAX_SOURCE_LEN`] bytes.
    SourceTooLarge {
        /// Length of the rejected source in bytes
        len: usize,
    },
}

impl ParserError {
    /// Source offset the error refers to.
    #[must_use]
    pub const fn pos(&self) -> SrcPos {
        match self {
            Self::ExpectedOpenParen { pos }
            | Self::ExpectedIdentifier { pos }
            | Self::MissingCloseParen { pos }
            | Self::TooManyArguments { pos }
            | Self::TooDeep { pos } => *pos,
            Self::SourceTooLarge { .. } => MAX_SOURCE_LEN as SrcPos,
        }
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpectedOpenParen { .. } => write!(f, "expected '('"),
            Self::ExpectedIdentifier { .. } => write!(f, "expected identifier after '('"),
            Self::MissingCloseParen { .. } => write!(f, "missing ')' for this '('"),
            Self::TooManyArguments { .. } => write!(f, "too many arguments in one expression"),
            Self::TooDeep { .. } => write!(
                f,
                "expressions nested deeper than {} levels",
                crate::parser::MAX_NESTING
            ),
            Self::SourceTooLarge { len } => write!(
                f,
                "source is {len} bytes, at most {MAX_SOURCE_LEN} are accepted"
            ),
        }
    }
}

impl std::error::Error for ParserError {}

/// Any error produced while turning source text into an AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    /// Tokenization failed
    Lexer(LexerError),

    /// Parsing failed
    Parser(ParserError),
}

impl SyntaxError {
    /// Source offset the error refers to.
    #[must_use]
    pub const fn pos(&self) -> SrcPos {
        match self {
            Self::Lexer(err) => err.pos(),
            Self::Parser(err) => err.pos(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexer(err) => err.fmt(f),
            Self::Parser(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for SyntaxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lexer(err) => Some(err),
            Self::Parser(err) => Some(err),
        }
    }
}

impl From<LexerError> for SyntaxError {
    fn from(err: LexerError) -> Self {
        Self::Lexer(err)
    }
}

impl From<ParserError> for SyntaxError {
    fn from(err: ParserError) -> Self {
        Self::Parser(err)
    }
}

/// Result type for lexer operations.
pub type LexerResult<T> = Result<T, LexerError>;

/// Result type for parser operations.
pub type ParserResult<T> = Result<T, ParserError>;

/// Result type for the whole frontend.
pub type SyntaxResult<T> = Result<T, SyntaxError>;
