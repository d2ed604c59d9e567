//! `scx`: an embeddable interpreter for a small Lisp-like expression language
//!
//! Programs are sequences of parenthesized prefix expressions over integers,
//! reals, booleans, strings, lists and lambdas:
//!
//! - **Fixed arena**: every heap value lives in one bounded, reference
//!   counted arena per [`Context`]; running out of space is fatal
//! - **Flattened AST**: the parser writes a pre-order node vector whose size
//!   is charged against the same arena
//! - **Eager and lazy builtins**: special forms receive unevaluated
//!   [`Value::Thunk`]s and decide what to evaluate
//! - **Dynamic scope**: lambdas capture nothing and see their caller's
//!   bindings
//! - **Host extensions**: native functions and opaque userdata with
//!   finalizers
//!
//! # Architecture
//!
//! - [`scx_syntax`]: tokenizer and parser
//! - [`scx_mem`]: the arena and its free-slot table
//! - this crate: values, scopes, builtins and the evaluator
//!
//! # Example
//!
//! ```rust
//! use scx::{Context, Value};
//!
//! let mut ctx = Context::new();
//! let result = ctx.evaluate(
//!     "(define square (lambda x (* x x)))
//!      (square 12)",
//! );
//! assert_eq!(result, Value::Int(144));
//!
//! let err = ctx.evaluate("(car (list))");
//! assert_eq!(ctx.error_message(err), Some("'car' of an empty list"));
//! ```

pub mod builtins;
pub mod config;
pub mod context;
pub mod error;
mod eval;
pub mod scope;
pub mod value;

// Re-export commonly used types
pub use builtins::{Arity, Builtin, Extension, NativeFn, builtins, lookup};
pub use config::{Config, DEFAULT_HEAP_SIZE, DEFAULT_MAX_DEPTH};
pub use context::Context;
pub use error::{Error, Result};
pub use scope::{Binding, Frame, ScopeStack, Slot};
pub use scx_mem::{ArenaStats, Exhaustion, MAX_CAPACITY};
pub use value::{Cell, Finalizer, Lambda, Object, UserData, Value};
