//! Builtin and host-extension registry.
//!
//! Builtins are a static table consulted before anything else when an
//! expression's operator is resolved. Each entry declares whether its
//! arguments are evaluated eagerly or passed as [`Value::Thunk`]s, and which
//! argument counts it accepts; the count is checked before any argument is
//! evaluated.
//!
//! ## Eager vs lazy
//!
//! - **Eager**: arguments are evaluated left to right and the first error
//!   value short-circuits the call (e.g. `+`, `car`, `begin`).
//! - **Lazy**: the native receives one thunk per argument and decides what
//!   to evaluate, how often, and in which scope (`if`, `define`, `while`,
//!   `lambda`, ...).
//!
//! ## Adding a builtin
//!
//! 1. Implement `fn(&mut Context, &[Value]) -> Result<Value>`. Arguments are
//!    borrowed; duplicate anything you store or return.
//! 2. Add an entry to `BUILTINS` with its arity and laziness.

mod forms;
mod list;
mod numeric;

use crate::Result;
use crate::context::Context;
use crate::value::Value;
use fxhash::FxHashMap;
use std::fmt;
use std::sync::OnceLock;

/// Signature of builtins and host extensions.
///
/// An `Err` is turned into an error value by the evaluator.
pub type NativeFn = fn(&mut Context, &[Value]) -> Result<Value>;

/// Accepted argument counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly n arguments
    Exact(usize),
    /// At least n arguments
    AtLeast(usize),
    /// Between min and max arguments (inclusive)
    Range(usize, usize),
}

impl Arity {
    /// Whether `count` arguments are accepted.
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Range(min, max) => count >= min && count <= max,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::Range(min, max) => write!(f, "{min} to {max}"),
        }
    }
}

/// Definition of a builtin.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    /// Operator name
    pub name: &'static str,
    /// Whether arguments are passed unevaluated
    pub lazy: bool,
    /// Accepted argument counts
    pub arity: Arity,
    /// Implementation
    pub func: NativeFn,
}

/// A host-supplied native function, consulted after the builtins.
#[derive(Debug, Clone, Copy)]
pub struct Extension {
    /// Operator name
    pub name: &'static str,
    /// Whether arguments are passed unevaluated
    pub lazy: bool,
    /// Implementation
    pub func: NativeFn,
}

impl Extension {
    /// An extension receiving evaluated arguments.
    #[must_use]
    pub const fn eager(name: &'static str, func: NativeFn) -> Self {
        Self { name, lazy: false, func }
    }

    /// An extension receiving thunks.
    #[must_use]
    pub const fn lazy(name: &'static str, func: NativeFn) -> Self {
        Self { name, lazy: true, func }
    }
}

const fn eager(name: &'static str, arity: Arity, func: NativeFn) -> Builtin {
    Builtin { name, lazy: false, arity, func }
}

const fn lazy(name: &'static str, arity: Arity, func: NativeFn) -> Builtin {
    Builtin { name, lazy: true, arity, func }
}

static BUILTINS: &[Builtin] = &[
    // Arithmetic
    eager("+", Arity::AtLeast(0), numeric::add),
    eager("-", Arity::AtLeast(0), numeric::sub),
    eager("*", Arity::AtLeast(0), numeric::mul),
    eager("/", Arity::AtLeast(0), numeric::div),
    // Comparison
    eager("<", Arity::AtLeast(2), numeric::lt),
    eager("<=", Arity::AtLeast(2), numeric::le),
    eager(">", Arity::AtLeast(2), numeric::gt),
    eager(">=", Arity::AtLeast(2), numeric::ge),
    eager("=", Arity::AtLeast(2), numeric::num_eq),
    // Derived numeric
    eager("abs", Arity::Exact(1), numeric::abs),
    eager("sqrt", Arity::Exact(1), numeric::sqrt),
    eager("expt", Arity::Exact(2), numeric::expt),
    eager("mean", Arity::AtLeast(1), numeric::mean),
    // Logic and equality
    eager("not", Arity::Exact(1), forms::not),
    eager("eq", Arity::Exact(2), forms::eq),
    eager("equal", Arity::Exact(2), forms::equal),
    // Lists and strings
    eager("len", Arity::Exact(1), list::len),
    eager("length", Arity::Exact(1), list::len),
    eager("list", Arity::AtLeast(0), list::list),
    eager("cons", Arity::Exact(2), list::cons),
    eager("car", Arity::Exact(1), list::car),
    eager("cdr", Arity::Exact(1), list::cdr),
    eager("append", Arity::AtLeast(0), list::append),
    // Sequencing and calls
    eager("begin", Arity::AtLeast(0), forms::begin),
    eager("call", Arity::AtLeast(1), forms::call),
    eager("error", Arity::AtLeast(0), forms::error),
    // Special forms
    lazy("define", Arity::Exact(2), forms::define),
    lazy("let", Arity::AtLeast(2), forms::let_),
    lazy("set!", Arity::Exact(2), forms::set),
    lazy("lambda", Arity::Range(1, 2), forms::lambda),
    lazy("if", Arity::AtLeast(1), forms::cond),
    lazy("cond", Arity::AtLeast(1), forms::cond),
    lazy("while", Arity::AtLeast(1), forms::while_),
];

static INDEX: OnceLock<FxHashMap<&'static str, usize>> = OnceLock::new();

/// All builtins, in table order.
#[must_use]
pub fn builtins() -> &'static [Builtin] {
    BUILTINS
}

/// Finds a builtin by exact name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    let index = INDEX.get_or_init(|| {
        BUILTINS
            .iter()
            .enumerate()
            .map(|(index, builtin)| (builtin.name, index))
            .collect()
    });
    index.get(name).map(|&index| &BUILTINS[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_exact_names() {
        assert_eq!(lookup("+").map(|b| b.name), Some("+"));
        assert_eq!(lookup("set!").map(|b| b.lazy), Some(true));
        assert!(lookup("car ").is_none());
        assert!(lookup("CAR").is_none());
    }

    #[test]
    fn test_builtin_names_are_unique() {
        let mut names: Vec<&str> = builtins().iter().map(|b| b.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), builtins().len());
    }

    #[test]
    fn test_special_forms_are_lazy() {
        for name in ["define", "let", "set!", "lambda", "if", "cond", "while"] {
            assert!(lookup(name).unwrap().lazy, "{name} should be lazy");
        }
        for name in ["+", "begin", "call", "list", "error"] {
            assert!(!lookup(name).unwrap().lazy, "{name} should be eager");
        }
    }

    #[test]
    fn test_arity_accepts() {
        assert!(Arity::Exact(2).accepts(2));
        assert!(!Arity::Exact(2).accepts(3));
        assert!(Arity::AtLeast(0).accepts(0));
        assert!(Arity::Range(1, 2).accepts(2));
        assert!(!Arity::Range(1, 2).accepts(0));
        assert_eq!(Arity::Range(1, 2).to_string(), "1 to 2");
    }
}
