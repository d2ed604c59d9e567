//! List and length builtins.
//!
//! Lists are persistent: every builtin builds fresh cells and never mutates
//! an existing one. Tails are shared by reference count where a builtin
//! returns or reuses an existing list (`cdr`, `cons`, the last argument of
//! `append`).

use crate::context::Context;
use crate::error::{Error, Result};
use crate::value::{Cell, Value};
use scx_mem::{ArenaError, Handle};

fn stale(handle: Handle) -> Error {
    Error::Arena(ArenaError::StaleHandle {
        slot: handle.slot(),
        generation: handle.generation(),
    })
}

fn list_cell(ctx: &Context, op: &'static str, value: Value) -> Result<Cell> {
    match value {
        Value::List(handle) => ctx.cell(handle),
        other => Err(Error::Type { op, expected: "a list", found: other.type_name() }),
    }
}

/// `(len x)`: characters of a string or elements of a list.
pub(super) fn len(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let count = match args[0] {
        Value::Str(handle) => ctx
            .string(args[0])
            .map(|text| text.chars().count())
            .ok_or_else(|| stale(handle))?,
        Value::List(handle) => ctx
            .list_items(args[0])
            .map(|items| items.len())
            .ok_or_else(|| stale(handle))?,
        other => {
            return Err(Error::Type {
                op: "len",
                expected: "a string or a list",
                found: other.type_name(),
            });
        }
    };

    i64::try_from(count).map(Value::Int).map_err(|_| Error::Overflow { op: "len" })
}

/// `(list a b ...)`
pub(super) fn list(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let mut tail = ctx.empty_list();
    for &item in args.iter().rev() {
        let current = ctx.dup(item);
        tail = ctx.cons(current, tail);
    }
    Ok(tail)
}

/// `(cons a b)`. Two nils would build the empty-list terminator, so that
/// pair is rejected.
pub(super) fn cons(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    if (Cell { current: args[0], next: args[1] }).is_terminal() {
        return Err(Error::InvalidForm {
            form: "cons",
            reason: "a pair of two nils is indistinguishable from the empty list",
        });
    }

    let current = ctx.dup(args[0]);
    let next = ctx.dup(args[1]);
    Ok(ctx.cons(current, next))
}

/// `(car xs)`
pub(super) fn car(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let cell = list_cell(ctx, "car", args[0])?;
    if cell.is_terminal() {
        return Err(Error::EmptyList { op: "car" });
    }
    Ok(ctx.dup(cell.current))
}

/// `(cdr xs)`
pub(super) fn cdr(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let cell = list_cell(ctx, "cdr", args[0])?;
    if cell.is_terminal() {
        return Err(Error::EmptyList { op: "cdr" });
    }
    Ok(ctx.dup(cell.next))
}

/// `(append xs ys ... tail)`: copies the elements of every argument but the
/// last, which becomes the tail of the result.
pub(super) fn append(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let Some((&last, init)) = args.split_last() else {
        return Ok(ctx.empty_list());
    };

    let mut elements = Vec::new();
    for &arg in init {
        match ctx.list_items(arg) {
            Some(items) => elements.extend(items),
            None => {
                return Err(Error::Type {
                    op: "append",
                    expected: "a list",
                    found: arg.type_name(),
                });
            }
        }
    }

    let mut tail = ctx.dup(last);
    for &item in elements.iter().rev() {
        let current = ctx.dup(item);
        tail = ctx.cons(current, tail);
    }
    Ok(tail)
}
