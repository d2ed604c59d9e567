// Integration tests for host extensions and userdata finalizers.

mod common;

use common::persistent_context;
use scx::{Context, Error, Extension, Result, Value};
use std::cell::Cell;

thread_local! {
    static CLOSED: Cell<usize> = const { Cell::new(0) };
}

fn closed() -> usize {
    CLOSED.with(Cell::get)
}

/// Finalizer calls since `base`.
fn closed_since(base: usize) -> usize {
    closed() - base
}

fn twice(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    match args {
        [Value::Int(n)] => Ok(Value::Int(n * 2)),
        _ => Err(Error::user("twice expects one integer")),
    }
}

fn unless(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let [predicate, body] = args else {
        return Err(Error::user("unless expects a predicate and a body"));
    };

    let test = ctx.force(*predicate);
    if test.is_error() {
        return Ok(test);
    }
    let skip = test.is_true();
    ctx.release(test);

    if skip { Ok(Value::Nothing) } else { Ok(ctx.force(*body)) }
}

fn open(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    match args {
        [Value::Int(fd)] => Ok(ctx.alloc_userdata(*fd, |_fd| {
            CLOSED.with(|count| count.set(count.get() + 1));
        })),
        _ => Err(Error::user("open expects a descriptor")),
    }
}

fn fd(ctx: &mut Context, args: &[Value]) -> Result<Value> {
    args.first()
        .and_then(|&value| ctx.userdata::<i64>(value))
        .map(|&fd| Value::Int(fd))
        .ok_or_else(|| Error::user("not a file"))
}

fn host_context() -> Context {
    let mut ctx = Context::new();
    ctx.set_extensions([
        Extension::eager("twice", twice),
        Extension::lazy("unless", unless),
        Extension::eager("open", open),
        Extension::eager("fd", fd),
    ]);
    ctx
}

#[test]
fn test_eager_extension() {
    let mut ctx = host_context();
    assert_eq!(ctx.evaluate("(twice (+ 1 2))"), Value::Int(6));

    let err = ctx.evaluate("(twice \"x\")");
    assert_eq!(ctx.error_message(err), Some("twice expects one integer"));
}

#[test]
fn test_lazy_extension() {
    let mut ctx = host_context();
    assert_eq!(ctx.evaluate("(unless #t (error \"no\"))"), Value::Nothing);
    assert_eq!(ctx.evaluate("(unless #f 5)"), Value::Int(5));
}

#[test]
fn test_builtins_take_precedence() {
    let mut ctx = host_context();
    ctx.register(Extension::eager("car", twice));
    assert_eq!(ctx.evaluate("(car (list 1))"), Value::Int(1));
}

#[test]
fn test_extensions_shadow_lambdas() {
    let mut ctx = host_context();
    assert_eq!(
        ctx.evaluate("(define twice (lambda n n)) (twice 4)"),
        Value::Int(8)
    );
}

#[test]
fn test_set_extensions_replaces() {
    let mut ctx = host_context();
    ctx.set_extensions([Extension::eager("double", twice)]);
    assert_eq!(ctx.extensions().len(), 1);

    assert_eq!(ctx.evaluate("(double 2)"), Value::Int(4));
    let err = ctx.evaluate("(twice 2)");
    assert_eq!(ctx.error_message(err), Some("unknown operator 'twice'"));
}

#[test]
fn test_userdata_finalized_on_last_release() {
    let base = closed();
    let mut ctx = host_context();
    assert_eq!(ctx.evaluate("(fd (open 7))"), Value::Int(7));
    assert_eq!(closed_since(base), 1);

    let err = ctx.evaluate("(fd 5)");
    assert_eq!(ctx.error_message(err), Some("not a file"));
}

#[test]
fn test_userdata_released_by_host() {
    let base = closed();
    let mut ctx = persistent_context();
    ctx.register(Extension::eager("open", open));

    let file = ctx.evaluate("(open 3)");
    assert_eq!(ctx.userdata::<i64>(file), Some(&3));
    assert_eq!(ctx.userdata::<u8>(file), None);
    assert_eq!(closed_since(base), 0);

    ctx.release(file);
    assert_eq!(closed_since(base), 1);
}

#[test]
fn test_userdata_finalized_on_reset_and_drop() {
    let base = closed();
    let mut ctx = host_context();
    ctx.evaluate("(define f (open 3))");
    assert_eq!(closed_since(base), 0);

    ctx.reset();
    assert_eq!(closed_since(base), 1);

    ctx.evaluate("(define g (list (open 4) (open 5)))");
    drop(ctx);
    assert_eq!(closed_since(base), 3);
}
