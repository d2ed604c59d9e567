//! Error types for the `scx` interpreter.
//!
//! Errors never unwind through the evaluator. A native function returning
//! `Err` has the error converted into an error-tagged
//! [`Value`](crate::Value) whose message is the error's `Display` text, and
//! that value propagates like any other result.

use crate::builtins::Arity;
use scx_mem::ArenaError;
use scx_syntax::{LineCol, SyntaxError};
use std::fmt;

/// Errors that can occur while evaluating a program.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The source could not be tokenized or parsed.
    Syntax {
        /// The underlying error
        error: SyntaxError,
        /// Where it occurred
        at: LineCol,
    },

    /// The parsed program does not fit in the arena.
    ProgramTooLarge {
        /// Bytes of AST requested
        requested: usize,
        /// Bytes available
        available: usize,
    },

    /// An identifier atom is not bound in any frame.
    UnboundIdentifier {
        /// The identifier
        name: String,
    },

    /// The operator of an expression is neither a builtin, an extension nor
    /// a bound name.
    UnknownOperator {
        /// The operator name
        name: String,
    },

    /// The operator is bound, but not to a lambda.
    NotCallable {
        /// The operator name
        name: String,
        /// Type of the bound value
        found: &'static str,
    },

    /// Wrong number of arguments.
    Arity {
        /// The operator name
        name: String,
        /// Accepted argument counts
        expected: Arity,
        /// Arguments supplied
        got: usize,
    },

    /// An argument has the wrong type.
    Type {
        /// The operator name
        op: &'static str,
        /// Expected type
        expected: &'static str,
        /// Type found
        found: &'static str,
    },

    /// Division by zero.
    DivisionByZero,

    /// Integer arithmetic overflowed.
    Overflow {
        /// The operator name
        op: &'static str,
    },

    /// A numeric function is undefined for its argument.
    Domain {
        /// The operator name
        op: &'static str,
        /// The offending argument
        value: f64,
    },

    /// `car`/`cdr` of an empty list.
    EmptyList {
        /// The operator name
        op: &'static str,
    },

    /// A literal could not be decoded (integer out of range).
    InvalidLiteral {
        /// The literal text
        text: String,
    },

    /// A special form was used with arguments of the wrong shape.
    InvalidForm {
        /// The form name
        form: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Evaluation nested deeper than the configured limit.
    DepthExceeded {
        /// The configured limit
        limit: usize,
    },

    /// A value referred to a freed arena object.
    Arena(ArenaError),

    /// Raised by the `error` builtin or a host extension.
    User {
        /// The message
        message: String,
    },
}

impl Error {
    /// Creates a user error with the given message.
    pub fn user(message: impl Into<String>) -> Self {
        Error::User { message: message.into() }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Syntax { error, at } => write!(f, "syntax error at {at}: {error}"),
            Error::ProgramTooLarge { requested, available } => write!(
                f,
                "program too large: {requested} bytes of AST, {available} bytes available"
            ),
            Error::UnboundIdentifier { name } => write!(f, "unbound identifier '{name}'"),
            Error::UnknownOperator { name } => write!(f, "unknown operator '{name}'"),
            Error::NotCallable { name, found } => {
                write!(f, "'{name}' is bound to a {found}, not a lambda")
            }
            Error::Arity { name, expected, got } => write!(
                f,
                "wrong number of arguments to '{name}': expected {expected}, got {got}"
            ),
            Error::Type { op, expected, found } => {
                write!(f, "'{op}' expects {expected}, got {found}")
            }
            Error::DivisionByZero => write!(f, "division by zero"),
            Error::Overflow { op } => write!(f, "integer overflow in '{op}'"),
            Error::Domain { op, value } => write!(f, "'{op}' is undefined for {value}"),
            Error::EmptyList { op } => write!(f, "'{op}' of an empty list"),
            Error::InvalidLiteral { text } => write!(f, "invalid literal '{text}'"),
            Error::InvalidForm { form, reason } => write!(f, "malformed '{form}': {reason}"),
            Error::DepthExceeded { limit } => {
                write!(f, "evaluation nested deeper than {limit} levels")
            }
            Error::Arena(err) => write!(f, "{err}"),
            Error::User { message } => f.write_str(message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Syntax { error, .. } => Some(error),
            Error::Arena(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ArenaError> for Error {
    fn from(err: ArenaError) -> Self {
        Error::Arena(err)
    }
}

/// Result type for `scx` operations.
pub type Result<T> = std::result::Result<T, Error>;
