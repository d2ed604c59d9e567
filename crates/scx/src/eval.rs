//! Tree-walking evaluator.
//!
//! Evaluation walks the flattened AST by node id. For an expression the
//! operator name is resolved against the builtins, then the host
//! extensions, then the scope stack (which must hold a lambda). The arity is
//! checked before any argument is touched.
//!
//! Eager operators get their arguments evaluated left to right; the first
//! error value stops evaluation, the arguments evaluated so far are
//! released, and the error becomes the result of the whole expression. Lazy
//! operators get one [`Value::Thunk`] per argument instead, each naming the
//! argument's subtree, and force them as they see fit.
//!
//! Lambda calls push a frame, bind the parameters by position, evaluate the
//! body and pop the frame again. Nothing is captured at creation time.

use crate::builtins::{self, Arity, NativeFn};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::value::{Lambda, Value};
use scx_syntax::{AtomKind, Node, NodeId, SrcPos, literal};

enum Operator {
    Native {
        name: &'static str,
        lazy: bool,
        arity: Option<Arity>,
        func: NativeFn,
    },
    Lambda(Lambda),
}

impl Context {
    /// Evaluates the subtree rooted at `id`. Errors come back as error
    /// values.
    pub(crate) fn eval_node(&mut self, id: NodeId) -> Value {
        let limit = self.config().max_depth;
        if self.depth >= limit {
            return self.error_value(Error::DepthExceeded { limit });
        }

        self.depth += 1;
        let result = self.eval_inner(id);
        self.depth -= 1;

        match result {
            Ok(value) => value,
            Err(err) => self.error_value(err),
        }
    }

    /// Evaluates a lazy argument. Values that are not thunks are duplicated
    /// and returned as they are.
    pub fn force(&mut self, value: Value) -> Value {
        match value {
            Value::Thunk(id) => self.eval_node(id),
            other => self.dup(other),
        }
    }

    fn eval_inner(&mut self, id: NodeId) -> Result<Value> {
        match self.ast.get(id).copied() {
            Some(Node::Atom { kind, pos }) => self.eval_atom(kind, pos),
            Some(Node::Expr { ident, .. }) => self.eval_expr(id, ident),
            None => Err(Error::InvalidForm {
                form: "expression",
                reason: "it is not part of the current program",
            }),
        }
    }

    fn eval_atom(&mut self, kind: AtomKind, pos: SrcPos) -> Result<Value> {
        match kind {
            AtomKind::Int => literal::parse_int(&self.source, pos)
                .map(Value::Int)
                .ok_or_else(|| Error::InvalidLiteral {
                    text: literal::number_text(&self.source, pos).to_owned(),
                }),
            AtomKind::Real => literal::parse_real(&self.source, pos)
                .map(Value::Real)
                .ok_or_else(|| Error::InvalidLiteral {
                    text: literal::number_text(&self.source, pos).to_owned(),
                }),
            AtomKind::Bool => Ok(Value::Bool(literal::bool_literal(&self.source, pos))),
            AtomKind::Str => {
                let text = literal::string_literal(&self.source, pos).to_owned();
                Ok(self.alloc_string(&text))
            }
            AtomKind::Ident => self.lookup(pos),
        }
    }

    fn lookup(&mut self, pos: SrcPos) -> Result<Value> {
        let name = literal::ident_text(&self.source, pos);
        let Some(value) = self
            .scopes
            .find(&self.heap, name)
            .and_then(|slot| self.scopes.get(slot))
            .map(|binding| binding.value)
        else {
            return Err(Error::UnboundIdentifier { name: name.to_owned() });
        };
        Ok(self.dup(value))
    }

    fn resolve(&self, ident: SrcPos) -> Result<Operator> {
        let name = literal::ident_text(&self.source, ident);

        if let Some(builtin) = builtins::lookup(name) {
            return Ok(Operator::Native {
                name: builtin.name,
                lazy: builtin.lazy,
                arity: Some(builtin.arity),
                func: builtin.func,
            });
        }

        if let Some(extension) = self.extensions().iter().find(|ext| ext.name == name) {
            return Ok(Operator::Native {
                name: extension.name,
                lazy: extension.lazy,
                arity: None,
                func: extension.func,
            });
        }

        match self
            .scopes
            .find(&self.heap, name)
            .and_then(|slot| self.scopes.get(slot))
            .map(|binding| binding.value)
        {
            Some(Value::Lambda(lambda)) => Ok(Operator::Lambda(lambda)),
            Some(other) => Err(Error::NotCallable {
                name: name.to_owned(),
                found: other.type_name(),
            }),
            None => Err(Error::UnknownOperator { name: name.to_owned() }),
        }
    }

    fn eval_expr(&mut self, id: NodeId, ident: SrcPos) -> Result<Value> {
        let operator = self.resolve(ident)?;
        let children: Vec<NodeId> = self.ast.children(id).collect();

        match operator {
            Operator::Native { name, lazy, arity, func } => {
                if let Some(arity) = arity
                    && !arity.accepts(children.len())
                {
                    return Err(Error::Arity {
                        name: name.to_owned(),
                        expected: arity,
                        got: children.len(),
                    });
                }

                scx_log::trace!(
                    "dispatch '{}' with {} {} arguments",
                    name,
                    children.len(),
                    if lazy { "lazy" } else { "eager" }
                );

                let args = if lazy {
                    children.iter().map(|&child| Value::Thunk(child)).collect()
                } else {
                    match self.eval_args(&children) {
                        Ok(args) => args,
                        Err(error) => return Ok(error),
                    }
                };

                let result = func(self, &args);
                for arg in args {
                    self.release(arg);
                }
                result
            }
            Operator::Lambda(lambda) => {
                if children.len() != lambda.arity as usize {
                    return Err(Error::Arity {
                        name: literal::ident_text(&self.source, ident).to_owned(),
                        expected: Arity::Exact(lambda.arity as usize),
                        got: children.len(),
                    });
                }

                match self.eval_args(&children) {
                    Ok(args) => {
                        let name = literal::ident_text(&self.source, ident).to_owned();
                        self.call_lambda(&name, lambda, args)
                    }
                    Err(error) => Ok(error),
                }
            }
        }
    }

    /// Evaluates arguments left to right, stopping at the first error value.
    fn eval_args(&mut self, children: &[NodeId]) -> std::result::Result<Vec<Value>, Value> {
        let mut args = Vec::with_capacity(children.len());
        for &child in children {
            let value = self.eval_node(child);
            if value.is_error() {
                for arg in args {
                    self.release(arg);
                }
                return Err(value);
            }
            args.push(value);
        }
        Ok(args)
    }

    /// Calls `lambda` with owned arguments in a fresh frame.
    pub(crate) fn call_lambda(
        &mut self,
        name: &str,
        lambda: Lambda,
        args: Vec<Value>,
    ) -> Result<Value> {
        let params = if args.len() == lambda.arity as usize {
            match lambda.params {
                Some(params) => self.param_positions(params),
                None => Ok(Vec::new()),
            }
        } else {
            Err(Error::Arity {
                name: name.to_owned(),
                expected: Arity::Exact(lambda.arity as usize),
                got: args.len(),
            })
        };

        let params = match params {
            Ok(params) => params,
            Err(err) => {
                for arg in args {
                    self.release(arg);
                }
                return Err(err);
            }
        };

        scx_log::trace!("calling '{}' with {} arguments", name, args.len());
        self.scopes.push();
        let frame = self.scopes.top();
        for (pos, value) in params.into_iter().zip(args) {
            let name = self.alloc_ident(pos);
            self.scopes.insert(frame, name, value);
        }

        let result = self.eval_node(lambda.body);
        self.pop_frame();
        Ok(result)
    }

    /// Source offsets of the parameter names in a lambda's parameter node.
    pub(crate) fn param_positions(&self, params: NodeId) -> Result<Vec<SrcPos>> {
        let not_identifiers = Error::InvalidForm {
            form: "lambda",
            reason: "parameters must be identifiers",
        };

        match self.ast.get(params).copied() {
            Some(Node::Atom { kind: AtomKind::Ident, pos }) => Ok(vec![pos]),
            Some(Node::Expr { ident, .. }) => {
                let mut names = vec![ident];
                for child in self.ast.children(params) {
                    match self.ast.get(child).copied() {
                        Some(Node::Atom { kind: AtomKind::Ident, pos }) => names.push(pos),
                        _ => return Err(not_identifiers),
                    }
                }
                Ok(names)
            }
            _ => Err(not_identifiers),
        }
    }

    /// Pops the innermost frame and releases its bindings.
    pub(crate) fn pop_frame(&mut self) {
        if let Some(frame) = self.scopes.pop() {
            for binding in frame.into_bindings() {
                self.release(Value::Str(binding.name));
                self.release(binding.value);
            }
        }
    }

    /// The node behind a lazy argument.
    pub(crate) fn thunk_node(value: Value, form: &'static str) -> Result<NodeId> {
        match value {
            Value::Thunk(id) => Ok(id),
            _ => Err(Error::InvalidForm { form, reason: "expected an unevaluated argument" }),
        }
    }

    /// The identifier behind a lazy argument.
    pub(crate) fn thunk_ident(&self, value: Value, form: &'static str) -> Result<SrcPos> {
        let id = Self::thunk_node(value, form)?;
        match self.ast.get(id).copied() {
            Some(Node::Atom { kind: AtomKind::Ident, pos }) => Ok(pos),
            _ => Err(Error::InvalidForm { form, reason: "expected an identifier" }),
        }
    }

    /// Binds into the global frame, replacing an existing global binding.
    /// `value` is duplicated.
    pub(crate) fn define_global(&mut self, pos: SrcPos, value: Value) {
        let name = literal::ident_text(&self.source, pos);
        let slot = self.scopes.find_in(0, &self.heap, name);
        let value = self.dup(value);

        match slot {
            Some(slot) => {
                if let Some(old) = self.scopes.replace(slot, value) {
                    self.release(old);
                }
            }
            None => {
                let name = self.alloc_ident(pos);
                self.scopes.insert(0, name, value);
            }
        }
    }

    /// Updates the nearest existing binding, or creates one in the
    /// innermost frame. `value` is duplicated.
    pub(crate) fn assign(&mut self, pos: SrcPos, value: Value) {
        let name = literal::ident_text(&self.source, pos);
        let slot = self.scopes.find(&self.heap, name);
        let value = self.dup(value);

        match slot {
            Some(slot) => {
                if let Some(old) = self.scopes.replace(slot, value) {
                    self.release(old);
                }
            }
            None => {
                let name = self.alloc_ident(pos);
                let frame = self.scopes.top();
                self.scopes.insert(frame, name, value);
            }
        }
    }

    /// Creates a binding in the innermost frame, taking ownership of
    /// `value`.
    pub(crate) fn bind_local(&mut self, pos: SrcPos, value: Value) {
        let name = self.alloc_ident(pos);
        let frame = self.scopes.top();
        self.scopes.insert(frame, name, value);
    }
}
