//! `scx` syntax: tokenizer, flattened AST and parser.
//!
//! # Modules
//!
//! - [`span`] - Source offsets and line/column rendering
//! - [`token`] - Token kinds and the parallel kind/offset stream
//! - [`lexer`] - Tokenization
//! - [`ast`] - Pre-order node vector with jump spans
//! - [`parser`] - Recursive-descent parser
//! - [`literal`] - Deferred decoding of atom text
//! - [`error`] - Lexer and parser error types
//!
//! # Examples
//!
//! ```
//! use scx_syntax::{Ast, AtomKind, Node, literal, parse};
//!
//! let source = "(len \"Hello World!\")";
//! let mut ast = Ast::new();
//! let roots = parse(source, 0, &mut ast).unwrap();
//!
//! let Node::Expr { ident, .. } = ast[roots[0]] else { unreachable!() };
//! assert_eq!(literal::ident_text(source, ident), "len");
//!
//! let arg = ast.children(roots[0]).next().unwrap();
//! let Node::Atom { kind: AtomKind::Str, pos } = ast[arg] else { unreachable!() };
//! assert_eq!(literal::string_literal(source, pos), "Hello World!");
//! ```

#![warn(missing_docs)]

pub mod ast;
pub mod error;
pub mod lexer;
pub mod literal;
pub mod parser;
pub mod span;
pub mod token;

pub use ast::{ATOM_NODE_BYTES, Ast, AtomKind, Children, EXPR_NODE_BYTES, Node, NodeId};
pub use error::{
    LexerError, LexerResult, ParserError, ParserResult, SyntaxError, SyntaxResult,
};
pub use lexer::Lexer;
pub use parser::{MAX_NESTING, Parser, parse};
pub use span::{LineCol, MAX_SOURCE_LEN, SrcPos, line_col};
pub use token::{TokenKind, TokenStream};
