//! Runtime values and the heap objects behind them.
//!
//! [`Value`] is a small `Copy` tagged union. Scalars live inline; strings,
//! list cells, error messages and userdata live in the context's arena and
//! are referenced by [`Handle`]. Copying a `Value` does not create an alias
//! in the refcounting sense: whoever stores a heap value in a second owning
//! place must call [`Context::dup`](crate::Context::dup), and every owned
//! value must eventually be passed to
//! [`Context::release`](crate::Context::release).

use scx_mem::Handle;
use scx_syntax::NodeId;
use std::any::Any;
use std::fmt;

/// Bytes a value occupies inside a heap object (tag + payload).
pub const VALUE_BYTES: usize = 16;

/// Bytes charged for a list cell: `current` and `next`.
pub const CELL_BYTES: usize = 2 * VALUE_BYTES;

/// Bytes charged for a userdata object: data and finalizer pointers.
pub const USERDATA_BYTES: usize = 16;

/// A runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Value {
    /// The absence of a value (`nil`)
    #[default]
    Nothing,

    /// 64-bit signed integer
    Int(i64),

    /// Double precision real
    Real(f64),

    /// `#t` / `#f`
    Bool(bool),

    /// Refcounted string
    Str(Handle),

    /// Refcounted list cell
    List(Handle),

    /// A lambda; captures no environment
    Lambda(Lambda),

    /// Error carrying a refcounted message string
    Error(Handle),

    /// An unevaluated argument of a lazy form
    Thunk(NodeId),

    /// Refcounted host data
    UserData(Handle),
}

impl Value {
    /// The arena handle of a heap-backed value.
    #[must_use]
    pub const fn handle(&self) -> Option<Handle> {
        match self {
            Value::Str(handle)
            | Value::List(handle)
            | Value::Error(handle)
            | Value::UserData(handle) => Some(*handle),
            _ => None,
        }
    }

    /// Whether this is an error value.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Whether this is `#t`.
    #[must_use]
    pub const fn is_true(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    /// Name of the value's type, as used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Nothing => "nothing",
            Value::Int(_) => "integer",
            Value::Real(_) => "real",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Lambda(_) => "lambda",
            Value::Error(_) => "error",
            Value::Thunk(_) => "thunk",
            Value::UserData(_) => "userdata",
        }
    }
}

/// A lambda value: where its parameters and body are in the AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lambda {
    /// Number of parameters
    pub arity: u16,
    /// Parameter node: an identifier atom, or an expression whose operator
    /// and arguments are the parameter names. `None` for zero parameters.
    pub params: Option<NodeId>,
    /// Body expression
    pub body: NodeId,
}

/// Callback run when a userdata object is freed.
pub type Finalizer = Box<dyn FnOnce(Box<dyn Any>)>;

/// Host data owned by the arena.
pub struct UserData {
    data: Box<dyn Any>,
    finalizer: Option<Finalizer>,
}

impl UserData {
    pub(crate) fn new<T: 'static>(data: T, finalizer: impl FnOnce(T) + 'static) -> Self {
        let finalizer: Finalizer = Box::new(move |data: Box<dyn Any>| {
            if let Ok(data) = data.downcast::<T>() {
                finalizer(*data);
            }
        });
        Self { data: Box::new(data), finalizer: Some(finalizer) }
    }

    /// Borrows the data if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.data.downcast_ref()
    }

    pub(crate) fn finalize(mut self) {
        if let Some(finalizer) = self.finalizer.take() {
            finalizer(self.data);
        }
    }
}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserData")
            .field("finalizer", &self.finalizer.is_some())
            .finish_non_exhaustive()
    }
}

/// A list cell. The terminal cell of a proper list is `{Nothing, Nothing}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Element held by this cell
    pub current: Value,
    /// Rest of the list: another list, `Nothing`, or an improper tail
    pub next: Value,
}

impl Cell {
    /// The empty-list terminator.
    pub const TERMINAL: Cell = Cell { current: Value::Nothing, next: Value::Nothing };

    /// Whether this cell terminates a list.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        *self == Self::TERMINAL
    }
}

/// A heap object stored in the arena.
#[derive(Debug)]
pub enum Object {
    /// String contents (also used for error messages and binding names)
    Str(String),
    /// List cell
    Cell(Cell),
    /// Host data
    UserData(UserData),
}

impl Object {
    /// Bytes this object is charged in the arena, excluding the header.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Object::Str(text) => text.len() + 1,
            Object::Cell(_) => CELL_BYTES,
            Object::UserData(_) => USERDATA_BYTES,
        }
    }
}
