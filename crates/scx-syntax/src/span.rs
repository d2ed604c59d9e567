//! Source positions.
//!
//! Tokens and AST nodes store a single byte offset into the source text
//! rather than a full span; the extent of a token is recovered by rescanning
//! from that offset when the literal is decoded. Line and column numbers are
//! only computed when an error is reported.
//!
//! # Examples
//!
//! ```
//! use scx_syntax::span::{LineCol, line_col};
//!
//! let source = "(+ 1\n   (foo))";
//! assert_eq!(line_col(source, 8), LineCol { line: 2, col: 4 });
//! ```

use std::fmt;

/// Byte offset into the source text.
pub type SrcPos = u32;

/// Maximum number of source bytes accepted by a single parse.
pub const MAX_SOURCE_LEN: usize = u16::MAX as usize;

/// A 1-based line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineCol {
    /// Line number (1-indexed)
    pub line: usize,

    /// Column number in characters (1-indexed)
    pub col: usize,
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Converts a byte offset into a line/column position.
///
/// Offsets past the end of `source` are clamped to the end.
#[must_use]
pub fn line_col(source: &str, pos: SrcPos) -> LineCol {
    let mut end = (pos as usize).min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }

    let before = &source[..end];
    let line_start = before.rfind('\n').map_or(0, |newline| newline + 1);

    LineCol {
        line: before.matches('\n').count() + 1,
        col: before[line_start..].chars().count() + 1,
    }
}
