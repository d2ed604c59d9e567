//! The interpreter context.
//!
//! A [`Context`] owns everything one evaluation session needs: the arena,
//! the parsed program and its source text, the scope stack and the host
//! extensions. Contexts share no state, so independent evaluations simply
//! use independent contexts.
//!
//! # Value ownership
//!
//! Values returned by [`Context::evaluate`] are owned by the caller. Without
//! `persist_globals` the next call resets the arena and reclaims them anyway;
//! with it, the caller should [`release`](Context::release) each result.
//!
//! # Examples
//!
//! ```
//! use scx::{Context, Value};
//!
//! let mut ctx = Context::new();
//!
//! assert_eq!(ctx.evaluate("(+ 1 (+ 1 (+ 2 3)))"), Value::Int(7));
//! assert_eq!(ctx.evaluate("(len \"Hello World!\")"), Value::Int(12));
//!
//! let pair = ctx.evaluate("(cons 1 3)");
//! assert_eq!(ctx.display(pair), "(1 3)");
//! ```

use crate::builtins::Extension;
use crate::config::{Config, clamp_heap_size};
use crate::error::{Error, Result};
use crate::scope::ScopeStack;
use crate::value::{Cell, Object, UserData, Value};
use scx_mem::{Arena, ArenaError, ArenaStats, Handle};
use scx_syntax::{Ast, SrcPos, line_col, literal};
use std::fmt::Write;

/// An interpreter instance.
pub struct Context {
    config: Config,
    pub(crate) heap: Arena<Object>,
    pub(crate) ast: Ast,
    pub(crate) source: String,
    pub(crate) scopes: ScopeStack,
    extensions: Vec<Extension>,
    pub(crate) depth: usize,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Creates a context with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a context with the given configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let heap_size = clamp_heap_size(config.heap_size);
        let heap = Arena::bounded(heap_size).with_exhaustion(config.exhaustion);

        Self {
            config: Config { heap_size, ..config },
            heap,
            ast: Ast::new(),
            source: String::new(),
            scopes: ScopeStack::new(),
            extensions: Vec::new(),
            depth: 0,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the host extensions. They are consulted in order, after the
    /// builtins.
    pub fn set_extensions(&mut self, extensions: impl IntoIterator<Item = Extension>) {
        self.extensions = extensions.into_iter().collect();
    }

    /// Appends a host extension.
    pub fn register(&mut self, extension: Extension) {
        self.extensions.push(extension);
    }

    /// Installed host extensions.
    #[must_use]
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Evaluates a program and returns the value of its last form.
    ///
    /// Without `persist_globals` the arena, program and scope stack are
    /// reset first. With it, the new forms are appended to the program and
    /// globals defined by earlier calls stay visible; a source that fails to
    /// parse leaves the session untouched.
    ///
    /// Forms run in order. The first form that produces an error value stops
    /// the run, and that error is returned.
    pub fn evaluate(&mut self, source: &str) -> Value {
        if !self.config.persist_globals {
            self.reset();
        }
        self.depth = 0;
        scx_log::debug!("evaluating {} bytes", source.len());

        let mark = self.source.len();
        let ast_mark = self.ast.len();
        let ast_bytes = self.ast.encoded_bytes();

        if mark > 0 {
            self.source.push('\n');
        }
        let start = self.source.len();
        self.source.push_str(source);

        let roots = match scx_syntax::parse(&self.source, start, &mut self.ast) {
            Ok(roots) => roots,
            Err(error) => {
                let at = line_col(source, error.pos().saturating_sub(start as SrcPos));
                self.source.truncate(mark);
                return self.error_value(Error::Syntax { error, at });
            }
        };

        if let Err(err) = self.heap.reserve_ast(self.ast.encoded_bytes() - ast_bytes) {
            self.ast.truncate(ast_mark);
            self.source.truncate(mark);
            let err = match err {
                ArenaError::AstOverflow { requested, available } => {
                    Error::ProgramTooLarge { requested, available }
                }
                other => Error::Arena(other),
            };
            return self.error_value(err);
        }

        let mut result = Value::Nothing;
        for root in roots {
            self.release(result);
            result = self.eval_node(root);
            if result.is_error() {
                break;
            }
        }

        scx_log::debug!(
            "evaluation finished with a {} value, {} of {} arena bytes in use",
            result.type_name(),
            self.heap.stats().used,
            self.heap.capacity()
        );
        result
    }

    /// Discards all objects, the program and every binding. Userdata
    /// finalizers run for objects that were still live.
    pub fn reset(&mut self) {
        // The arena reset reclaims binding names and values wholesale.
        self.scopes.clear();
        for object in self.heap.reset() {
            if let Object::UserData(data) = object {
                data.finalize();
            }
        }
        self.ast.clear();
        self.source.clear();
        self.depth = 0;
    }

    /// Arena usage statistics.
    #[must_use]
    pub fn usage(&self) -> ArenaStats {
        self.heap.stats()
    }

    /// Source text of the current program.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of frames on the scope stack, global included.
    #[must_use]
    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    /// Names and values bound in frame `frame` (0 is global).
    ///
    /// The values are not duplicated; they stay valid while the bindings
    /// exist.
    #[must_use]
    pub fn frame_bindings(&self, frame: usize) -> Option<Vec<(String, Value)>> {
        let frame = self.scopes.frame(frame)?;
        Some(
            frame
                .bindings()
                .iter()
                .map(|binding| {
                    let name = match self.heap.get(binding.name) {
                        Some(Object::Str(name)) => name.clone(),
                        _ => String::new(),
                    };
                    (name, binding.value)
                })
                .collect(),
        )
    }

    // ===== Reference counting =====

    /// Adds an alias to a heap value and returns it. Scalars are returned
    /// unchanged.
    pub fn dup(&mut self, value: Value) -> Value {
        if let Some(handle) = value.handle()
            && let Err(err) = self.heap.retain(handle)
        {
            scx_log::warn!("dup of a {} value: {}", value.type_name(), err);
        }
        value
    }

    /// Drops an alias. Objects whose count reaches zero are freed together
    /// with everything they own; userdata finalizers run at that point.
    pub fn release(&mut self, value: Value) {
        if value.handle().is_none() {
            return;
        }

        let mut pending = vec![value];
        while let Some(value) = pending.pop() {
            let Some(handle) = value.handle() else {
                continue;
            };
            match self.heap.release(handle) {
                Ok(Some(Object::Cell(cell))) => {
                    // Popped in reverse: `current` is released before `next`.
                    pending.push(cell.next);
                    pending.push(cell.current);
                }
                Ok(Some(Object::UserData(data))) => data.finalize(),
                Ok(Some(Object::Str(_)) | None) => {}
                Err(err) => {
                    scx_log::warn!("release of a {} value: {}", value.type_name(), err);
                }
            }
        }
    }

    // ===== Allocation =====

    pub(crate) fn alloc_object(&mut self, object: Object) -> Handle {
        let size = object.size();
        self.heap.alloc(size, object)
    }

    /// Allocates a string value.
    pub fn alloc_string(&mut self, text: &str) -> Value {
        Value::Str(self.alloc_object(Object::Str(text.to_owned())))
    }

    /// Allocates a userdata value. `finalizer` receives the data when the
    /// last alias is released, the context is reset, or the context is
    /// dropped.
    ///
    /// ```
    /// use scx::Context;
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// let closed = Rc::new(Cell::new(false));
    /// let flag = Rc::clone(&closed);
    ///
    /// let mut ctx = Context::new();
    /// let file = ctx.alloc_userdata(3_i32, move |_fd| flag.set(true));
    /// assert_eq!(ctx.userdata::<i32>(file), Some(&3));
    ///
    /// ctx.release(file);
    /// assert!(closed.get());
    /// ```
    pub fn alloc_userdata<T: 'static>(
        &mut self,
        data: T,
        finalizer: impl FnOnce(T) + 'static,
    ) -> Value {
        Value::UserData(self.alloc_object(Object::UserData(UserData::new(data, finalizer))))
    }

    /// Allocates a list cell.
    pub(crate) fn cons(&mut self, current: Value, next: Value) -> Value {
        Value::List(self.alloc_object(Object::Cell(Cell { current, next })))
    }

    /// Allocates an empty list.
    pub(crate) fn empty_list(&mut self) -> Value {
        Value::List(self.alloc_object(Object::Cell(Cell::TERMINAL)))
    }

    /// Allocates a binding name from the identifier at `pos`.
    pub(crate) fn alloc_ident(&mut self, pos: SrcPos) -> Handle {
        let name = literal::ident_text(&self.source, pos).to_owned();
        self.alloc_object(Object::Str(name))
    }

    /// Creates an error value carrying `err`'s message.
    pub fn error_value(&mut self, err: Error) -> Value {
        scx_log::debug!("error value: {}", err);
        let message = err.to_string();
        Value::Error(self.alloc_object(Object::Str(message)))
    }

    // ===== Inspection =====

    pub(crate) fn object(&self, handle: Handle) -> Result<&Object> {
        self.heap.get(handle).ok_or(Error::Arena(ArenaError::StaleHandle {
            slot: handle.slot(),
            generation: handle.generation(),
        }))
    }

    /// The cell behind a list value.
    pub(crate) fn cell(&self, handle: Handle) -> Result<Cell> {
        match self.object(handle)? {
            Object::Cell(cell) => Ok(*cell),
            _ => Err(Error::Type { op: "list", expected: "a list cell", found: "object" }),
        }
    }

    /// Contents of a string value.
    #[must_use]
    pub fn string(&self, value: Value) -> Option<&str> {
        match value {
            Value::Str(handle) => match self.heap.get(handle)? {
                Object::Str(text) => Some(text),
                _ => None,
            },
            _ => None,
        }
    }

    /// Message of an error value.
    #[must_use]
    pub fn error_message(&self, value: Value) -> Option<&str> {
        match value {
            Value::Error(handle) => match self.heap.get(handle)? {
                Object::Str(text) => Some(text),
                _ => None,
            },
            _ => None,
        }
    }

    /// Host data of a userdata value, if it has type `T`.
    #[must_use]
    pub fn userdata<T: 'static>(&self, value: Value) -> Option<&T> {
        match value {
            Value::UserData(handle) => match self.heap.get(handle)? {
                Object::UserData(data) => data.downcast_ref(),
                _ => None,
            },
            _ => None,
        }
    }

    /// Elements of a list value. An improper tail counts as the final
    /// element. The elements are not duplicated.
    #[must_use]
    pub fn list_items(&self, value: Value) -> Option<Vec<Value>> {
        let Value::List(mut handle) = value else {
            return None;
        };

        let mut items = Vec::new();
        loop {
            let cell = self.cell(handle).ok()?;
            if cell.is_terminal() {
                break;
            }
            items.push(cell.current);
            match cell.next {
                Value::List(next) => handle = next,
                Value::Nothing => break,
                tail => {
                    items.push(tail);
                    break;
                }
            }
        }
        Some(items)
    }

    /// Renders a value for humans.
    ///
    /// ```
    /// use scx::{Context, Value};
    ///
    /// let mut ctx = Context::new();
    /// assert_eq!(ctx.display(Value::Nothing), "nil");
    /// assert_eq!(ctx.display(Value::Real(3.0)), "3.0");
    ///
    /// let list = ctx.evaluate("(list 1 \"two\" (list #t 2.5))");
    /// assert_eq!(ctx.display(list), "(1 \"two\" (#t 2.5))");
    /// ```
    #[must_use]
    pub fn display(&self, value: Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value);
        out
    }

    fn write_value(&self, out: &mut String, value: Value) {
        match value {
            Value::Nothing => out.push_str("nil"),
            Value::Int(n) => {
                let _ = write!(out, "{n}");
            }
            Value::Real(x) if x.is_finite() && x.fract() == 0.0 => {
                let _ = write!(out, "{x:.1}");
            }
            Value::Real(x) => {
                let _ = write!(out, "{x}");
            }
            Value::Bool(b) => out.push_str(if b { "#t" } else { "#f" }),
            Value::Str(_) => match self.string(value) {
                Some(text) => {
                    let _ = write!(out, "\"{text}\"");
                }
                None => out.push_str("<stale>"),
            },
            Value::List(_) => match self.list_items(value) {
                Some(items) => {
                    out.push('(');
                    for (index, item) in items.into_iter().enumerate() {
                        if index > 0 {
                            out.push(' ');
                        }
                        self.write_value(out, item);
                    }
                    out.push(')');
                }
                None => out.push_str("<stale>"),
            },
            Value::Lambda(lambda) => {
                let _ = write!(out, "<lambda/{}>", lambda.arity);
            }
            Value::Error(_) => {
                let _ = write!(out, "error: {}", self.error_message(value).unwrap_or("<stale>"));
            }
            Value::Thunk(_) => out.push_str("<thunk>"),
            Value::UserData(_) => out.push_str("<userdata>"),
        }
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        for object in self.heap.reset() {
            if let Object::UserData(data) = object {
                data.finalize();
            }
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("usage", &self.heap.stats())
            .field("scope_depth", &self.scopes.depth())
            .field("extensions", &self.extensions.len())
            .finish()
    }
}
