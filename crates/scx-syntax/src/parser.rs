//! Recursive-descent parser producing the flattened [`Ast`].
//!
//! Grammar:
//!
//! ```text
//! program := form+
//! form    := '(' IDENT (atom | form)* ')'
//! atom    := IDENT | INT | REAL | BOOL | STR
//! ```
//!
//! Each expression node is pushed as a placeholder before its children and
//! patched with its argument count and jump span once the closing `)` is
//! seen. On error the tree may hold a partial form; [`parse`] truncates it
//! back to where it started.
//!
//! Forms nest at most [`MAX_NESTING`] levels deep.

use crate::ast::{AtomKind, Ast, Node, NodeId};
use crate::error::{ParserError, ParserResult, SyntaxResult};
use crate::lexer::Lexer;
use crate::span::{MAX_SOURCE_LEN, SrcPos};
use crate::token::{TokenKind, TokenStream};

/// Deepest form nesting the parser accepts.
pub const MAX_NESTING: usize = 1024;

/// Parser over a token stream, appending to an existing tree.
pub struct Parser<'t, 'a> {
    tokens: &'t TokenStream,
    cursor: usize,
    depth: usize,
    ast: &'a mut Ast,
}

impl<'t, 'a> Parser<'t, 'a> {
    /// Creates a parser that appends nodes to `ast`.
    #[must_use]
    pub fn new(tokens: &'t TokenStream, ast: &'a mut Ast) -> Self {
        Self { tokens, cursor: 0, depth: 0, ast }
    }

    /// Parses one or more top-level forms and returns their root ids.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParserError`] encountered. An input with no forms
    /// at all is [`ParserError::ExpectedOpenParen`].
    pub fn parse_program(mut self) -> ParserResult<Vec<NodeId>> {
        let mut roots = Vec::new();
        loop {
            roots.push(self.parse_form()?);
            if self.peek() == TokenKind::End {
                return Ok(roots);
            }
        }
    }

    fn peek(&self) -> TokenKind {
        self.tokens.kind(self.cursor)
    }

    fn pos(&self) -> SrcPos {
        self.tokens.offset(self.cursor)
    }

    fn push(&mut self, node: Node) -> ParserResult<NodeId> {
        self.ast.push(node).ok_or(ParserError::SourceTooLarge {
            len: self.ast.len(),
        })
    }

    fn parse_form(&mut self) -> ParserResult<NodeId> {
        let open = self.pos();
        if self.peek() != TokenKind::LParen {
            return Err(ParserError::ExpectedOpenParen { pos: open });
        }
        if self.depth == MAX_NESTING {
            return Err(ParserError::TooDeep { pos: open });
        }
        self.depth += 1;
        self.cursor += 1;

        if self.peek() != TokenKind::Ident {
            return Err(ParserError::ExpectedIdentifier { pos: self.pos() });
        }
        let ident = self.pos();
        self.cursor += 1;

        let id = self.push(Node::Expr { ident, arg_count: 0, span: 1 })?;
        let mut arg_count: u16 = 0;

        loop {
            let kind = match self.peek() {
                TokenKind::RParen => {
                    self.cursor += 1;
                    break;
                }
                TokenKind::End => return Err(ParserError::MissingCloseParen { pos: open }),
                TokenKind::LParen => {
                    self.parse_form()?;
                    None
                }
                TokenKind::Ident => Some(AtomKind::Ident),
                TokenKind::Int => Some(AtomKind::Int),
                TokenKind::Real => Some(AtomKind::Real),
                TokenKind::Bool => Some(AtomKind::Bool),
                TokenKind::Str => Some(AtomKind::Str),
            };

            if let Some(kind) = kind {
                let pos = self.pos();
                self.push(Node::Atom { kind, pos })?;
                self.cursor += 1;
            }

            arg_count = arg_count
                .checked_add(1)
                .ok_or(ParserError::TooManyArguments { pos: ident })?;
        }

        self.ast.finish_expr(id, arg_count);
        self.depth -= 1;
        Ok(id)
    }
}

/// Tokenizes and parses `source[start..]`, appending to `ast`.
///
/// Offsets recorded in the tree are relative to the start of `source`.
/// On error, nodes added by this call are removed again.
///
/// # Errors
///
/// Returns [`ParserError::SourceTooLarge`] if the parsed text exceeds
/// [`MAX_SOURCE_LEN`] bytes, [`ParserError::TooDeep`] if forms nest deeper
/// than [`MAX_NESTING`], or the first lexer/parser error.
///
/// # Examples
///
/// ```
/// use scx_syntax::{Ast, Node, parse};
///
/// let mut ast = Ast::new();
/// let roots = parse("(+ 1 (* 2 3)) (f)", 0, &mut ast).unwrap();
///
/// assert_eq!(roots.len(), 2);
/// assert_eq!(ast[roots[0]].span(), 5);
/// assert!(matches!(ast[roots[1]], Node::Expr { arg_count: 0, .. }));
/// ```
pub fn parse(source: &str, start: usize, ast: &mut Ast) -> SyntaxResult<Vec<NodeId>> {
    let len = source.len().saturating_sub(start);
    if len > MAX_SOURCE_LEN {
        return Err(ParserError::SourceTooLarge { len }.into());
    }

    let tokens = Lexer::with_offset(source, start).lex()?;
    let mark = ast.len();
    let bytes = ast.encoded_bytes();

    match Parser::new(&tokens, ast).parse_program() {
        Ok(roots) => {
            scx_log::debug!(
                "parsed {} forms: {} tokens, {} nodes, {} bytes",
                roots.len(),
                tokens.len(),
                ast.len() - mark,
                ast.encoded_bytes() - bytes
            );
            Ok(roots)
        }
        Err(err) => {
            ast.truncate(mark);
            Err(err.into())
        }
    }
}
