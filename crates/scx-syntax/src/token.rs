//! Token kinds and the token stream.
//!
//! The stream is kept as two parallel vectors (kinds and source offsets)
//! rather than a vector of token structs; the parser only ever needs the kind
//! to drive the grammar and the offset to record in the AST.

use crate::span::SrcPos;
use std::fmt;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of input, always the last token of a stream
    End,

    /// `(`
    LParen,

    /// `)`
    RParen,

    /// Maximal run of non-whitespace, non-parenthesis characters
    Ident,

    /// Integer literal, `-?[0-9]+`
    Int,

    /// Decimal literal, `-?[0-9]+.[0-9]+`
    Real,

    /// `#t` or `#f`
    Bool,

    /// `"..."`, without escape sequences
    Str,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::End => "end of input",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Ident => "identifier",
            TokenKind::Int => "integer",
            TokenKind::Real => "real",
            TokenKind::Bool => "boolean",
            TokenKind::Str => "string",
        };
        f.write_str(name)
    }
}

/// Tokens produced by the lexer, as parallel kind/offset sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    kinds: Vec<TokenKind>,
    offsets: Vec<SrcPos>,
}

impl TokenStream {
    /// Creates an empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, kind: TokenKind, pos: SrcPos) {
        self.kinds.push(kind);
        self.offsets.push(pos);
    }

    /// Number of tokens, including the end token.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the stream holds no tokens at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Kind of the token at `index`; [`TokenKind::End`] past the end.
    #[must_use]
    pub fn kind(&self, index: usize) -> TokenKind {
        self.kinds.get(index).copied().unwrap_or(TokenKind::End)
    }

    /// Source offset of the token at `index`; the last offset past the end.
    #[must_use]
    pub fn offset(&self, index: usize) -> SrcPos {
        self.offsets
            .get(index)
            .or_else(|| self.offsets.last())
            .copied()
            .unwrap_or(0)
    }

    /// Token kinds in source order.
    #[must_use]
    pub fn kinds(&self) -> &[TokenKind] {
        &self.kinds
    }

    /// Token offsets in source order.
    #[must_use]
    pub fn offsets(&self) -> &[SrcPos] {
        &self.offsets
    }

    /// Iterates over `(kind, offset)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (TokenKind, SrcPos)> + '_ {
        self.kinds.iter().copied().zip(self.offsets.iter().copied())
    }
}
