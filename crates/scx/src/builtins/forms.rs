//! Special forms, sequencing, logic and equality.
//!
//! The lazy forms receive thunks and force them through
//! [`Context::force`]; an error value produced while forcing is returned as
//! the form's result.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::value::{Lambda, Value};

/// `(define name value)`
pub(super) fn define(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let pos = ctx.thunk_ident(args[0], "define")?;
    let value = ctx.force(args[1]);
    if !value.is_error() {
        ctx.define_global(pos, value);
    }
    Ok(value)
}

/// `(let name value)` assigns; `(let name value body...)` opens a scope.
pub(super) fn let_(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let pos = ctx.thunk_ident(args[0], "let")?;
    let value = ctx.force(args[1]);
    if value.is_error() {
        return Ok(value);
    }

    let body = &args[2..];
    if body.is_empty() {
        ctx.assign(pos, value);
        return Ok(value);
    }

    ctx.scopes.push();
    ctx.bind_local(pos, value);

    let mut result = Value::Nothing;
    for &expr in body {
        ctx.release(result);
        result = ctx.force(expr);
        if result.is_error() {
            break;
        }
    }

    ctx.pop_frame();
    Ok(result)
}

/// `(set! name value)`
pub(super) fn set(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let pos = ctx.thunk_ident(args[0], "set!")?;
    let value = ctx.force(args[1]);
    if !value.is_error() {
        ctx.assign(pos, value);
    }
    Ok(value)
}

/// `(lambda body)`, `(lambda x body)` or `(lambda (x y ...) body)`
pub(super) fn lambda(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let (params, body) = match args {
        [body] => (None, *body),
        [params, body] => (Some(Context::thunk_node(*params, "lambda")?), *body),
        _ => {
            return Err(Error::InvalidForm {
                form: "lambda",
                reason: "expected parameters and a body",
            });
        }
    };

    let body = Context::thunk_node(body, "lambda")?;
    let arity = match params {
        Some(params) => u16::try_from(ctx.param_positions(params)?.len()).map_err(|_| {
            Error::InvalidForm { form: "lambda", reason: "too many parameters" }
        })?,
        None => 0,
    };

    Ok(Value::Lambda(Lambda { arity, params, body }))
}

/// `(if pred branch ... [else])`, also registered as `cond`.
pub(super) fn cond(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let mut pairs = args.chunks_exact(2);
    for pair in pairs.by_ref() {
        let predicate = ctx.force(pair[0]);
        if predicate.is_error() {
            return Ok(predicate);
        }

        let taken = predicate.is_true();
        ctx.release(predicate);
        if taken {
            return Ok(ctx.force(pair[1]));
        }
    }

    match pairs.remainder() {
        [otherwise] => Ok(ctx.force(*otherwise)),
        _ => Ok(Value::Nothing),
    }
}

/// `(while pred body...)`
pub(super) fn while_(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let [predicate, body @ ..] = args else {
        return Ok(Value::Nothing);
    };

    let mut result = Value::Nothing;
    loop {
        let test = ctx.force(*predicate);
        if test.is_error() {
            ctx.release(result);
            return Ok(test);
        }

        let again = test.is_true();
        ctx.release(test);
        if !again {
            return Ok(result);
        }

        for &expr in body {
            ctx.release(result);
            result = ctx.force(expr);
            if result.is_error() {
                return Ok(result);
            }
        }
    }
}

/// `(begin a b ...)` returns the last argument.
pub(super) fn begin(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    match args.last() {
        Some(&last) => Ok(ctx.dup(last)),
        None => Ok(Value::Nothing),
    }
}

/// `(call f args...)`
pub(super) fn call(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let Value::Lambda(lambda) = args[0] else {
        return Err(Error::Type {
            op: "call",
            expected: "a lambda",
            found: args[0].type_name(),
        });
    };

    let rest = args[1..].iter().map(|&arg| ctx.dup(arg)).collect();
    ctx.call_lambda("call", lambda, rest)
}

/// `(error msg...)`
pub(super) fn error(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    if args.is_empty() {
        return Err(Error::user("error"));
    }

    let parts: Vec<String> = args
        .iter()
        .map(|&arg| ctx.string(arg).map_or_else(|| ctx.display(arg), str::to_owned))
        .collect();
    Err(Error::user(parts.join(" ")))
}

pub(super) fn not(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    match args[0] {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        other => Err(Error::Type { op: "not", expected: "a boolean", found: other.type_name() }),
    }
}

/// Shallow identity: scalars by value, heap values by handle.
pub(super) fn eq(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    Ok(Value::Bool(args[0] == args[1]))
}

pub(super) fn equal(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    Ok(Value::Bool(structurally_equal(ctx, args[0], args[1])))
}

fn structurally_equal(ctx: &Context, a: Value, b: Value) -> bool {
    match (a, b) {
        (Value::Str(_), Value::Str(_)) => ctx.string(a) == ctx.string(b),
        (Value::Error(_), Value::Error(_)) => ctx.error_message(a) == ctx.error_message(b),
        (Value::List(_), Value::List(_)) => match (ctx.list_items(a), ctx.list_items(b)) {
            (Some(left), Some(right)) => {
                left.len() == right.len()
                    && left
                        .iter()
                        .zip(&right)
                        .all(|(&x, &y)| structurally_equal(ctx, x, y))
            }
            _ => false,
        },
        _ => a == b,
    }
}
