// Integration tests for the special forms: conditionals, bindings, lambdas
// and loops.

mod common;

use common::{eval, eval_error, global_names, persistent_context};
use scx::{Context, Value};

#[test]
fn test_if_is_lazy() {
    assert_eq!(eval("(if #f (error \"boom\") 42)"), Value::Int(42));
    assert_eq!(eval("(if #t 1 (error \"boom\"))"), Value::Int(1));
    assert_eq!(eval("(if #f 1)"), Value::Nothing);
}

#[test]
fn test_cond_pairs() {
    assert_eq!(eval("(cond #f 1 #t 2 3)"), Value::Int(2));
    assert_eq!(eval("(cond #f 1 #f 2 3)"), Value::Int(3));
    assert_eq!(eval("(cond (< 2 1) 1 (> 2 1) 2)"), Value::Int(2));
}

#[test]
fn test_non_boolean_predicate_is_not_taken() {
    assert_eq!(eval("(if 5 1 2)"), Value::Int(2));
}

#[test]
fn test_error_in_predicate_propagates() {
    assert_eq!(eval_error("(if (error \"bad\") 1 2)").as_deref(), Some("bad"));
}

#[test]
fn test_define_returns_value() {
    assert_eq!(eval("(define x 5)"), Value::Int(5));
    assert_eq!(eval("(define x 5) (define x 6) (+ x 0)"), Value::Int(6));
}

#[test]
fn test_define_replaces_global() {
    let mut ctx = Context::new();
    ctx.evaluate("(define x 1) (define x 2)");
    assert_eq!(global_names(&ctx), vec!["x".to_owned()]);
}

#[test]
fn test_let_assigns_in_place() {
    let mut ctx = Context::new();
    let result = ctx.evaluate("(define x 1) (let x 2) (+ x 0)");

    assert_eq!(result, Value::Int(2));
    assert_eq!(global_names(&ctx), vec!["x".to_owned()]);
}

#[test]
fn test_let_creates_then_mutates() {
    let mut ctx = Context::new();
    let result = ctx.evaluate("(let y 1) (let y 2) (+ y 0)");

    assert_eq!(result, Value::Int(2));
    assert_eq!(global_names(&ctx), vec!["y".to_owned()]);
}

#[test]
fn test_let_block_scope() {
    let mut ctx = Context::new();
    let result = ctx.evaluate("(define x 1) (let x 10 (+ x 1))");
    assert_eq!(result, Value::Int(11));
    assert_eq!(ctx.scope_depth(), 1);

    assert_eq!(
        ctx.evaluate("(define x 1) (let x 10 (+ x 1)) (+ x 0)"),
        Value::Int(1)
    );
    assert!(ctx.evaluate("(let y 3 (+ y 1)) (+ y 0)").is_error());
}

#[test]
fn test_set() {
    assert_eq!(eval("(define n 0) (set! n 5) (+ n 0)"), Value::Int(5));
}

#[test]
fn test_lambda_call() {
    assert_eq!(
        eval("(define add (lambda (a b) (+ a b))) (add 2 3)"),
        Value::Int(5)
    );
    assert_eq!(eval("(define sq (lambda x (* x x))) (sq 9)"), Value::Int(81));
    assert_eq!(eval("(define answer (lambda 42)) (answer)"), Value::Int(42));
}

#[test]
fn test_lambda_arity() {
    assert_eq!(
        eval_error("(define add (lambda (a b) (+ a b))) (add 1)").as_deref(),
        Some("wrong number of arguments to 'add': expected exactly 2, got 1")
    );
    assert_eq!(
        eval_error("(call (lambda x x) 1 2)").as_deref(),
        Some("wrong number of arguments to 'call': expected exactly 1, got 2")
    );
}

#[test]
fn test_invalid_lambda_params() {
    assert_eq!(
        eval_error("(lambda (a 1) a)").as_deref(),
        Some("malformed 'lambda': parameters must be identifiers")
    );
}

#[test]
fn test_calling_a_non_lambda() {
    assert_eq!(
        eval_error("(define x 1) (x 2)").as_deref(),
        Some("'x' is bound to a integer, not a lambda")
    );
}

#[test]
fn test_recursion() {
    let program = "
        (define fib (lambda n
            (if (< n 2) n (+ (fib (- n 1)) (fib (- n 2))))))
        (fib 10)";
    assert_eq!(eval(program), Value::Int(55));
}

#[test]
fn test_dynamic_scope() {
    let program = "
        (define gety (lambda y))
        (define caller (lambda y (gety)))
        (caller 7)";
    assert_eq!(eval(program), Value::Int(7));
    assert!(eval("(define gety (lambda y)) (gety)").is_error());
}

#[test]
fn test_frames_pop_after_calls() {
    let mut ctx = Context::new();
    ctx.evaluate("(define f (lambda a (+ a 1))) (f 1)");
    assert_eq!(ctx.scope_depth(), 1);

    ctx.evaluate("(define f (lambda a (car a))) (f 1)");
    assert_eq!(ctx.scope_depth(), 1);
}

#[test]
fn test_while() {
    let program = "
        (define i 0)
        (define total 0)
        (while (< i 5)
            (set! total (+ total i))
            (set! i (+ i 1)))
        (+ total 0)";
    assert_eq!(eval(program), Value::Int(10));
    assert_eq!(eval("(while #f 1)"), Value::Nothing);
}

#[test]
fn test_call_and_begin() {
    assert_eq!(eval("(call (lambda (a b) (- a b)) 10 4)"), Value::Int(6));
    assert_eq!(eval("(begin 1 2 3)"), Value::Int(3));
    assert_eq!(eval("(begin)"), Value::Nothing);
}

#[test]
fn test_error_builtin() {
    assert_eq!(eval_error("(error \"disk\" 42)").as_deref(), Some("disk 42"));
    assert_eq!(eval_error("(error)").as_deref(), Some("error"));
}

#[test]
fn test_equality() {
    assert_eq!(eval("(eq 1 1)"), Value::Bool(true));
    assert_eq!(eval("(eq (list 1 2) (list 1 2))"), Value::Bool(false));
    assert_eq!(eval("(equal (list 1 2) (list 1 2))"), Value::Bool(true));
    assert_eq!(eval("(equal (list 1 2) (list 1 3))"), Value::Bool(false));
    assert_eq!(eval("(equal \"a\" \"a\")"), Value::Bool(true));
    assert_eq!(eval("(define xs (list 1)) (eq xs xs)"), Value::Bool(true));
}

#[test]
fn test_globals_persist_when_configured() {
    let mut ctx = persistent_context();
    ctx.evaluate("(define x 41)");
    assert_eq!(ctx.evaluate("(+ x 1)"), Value::Int(42));

    let mut fresh = Context::new();
    fresh.evaluate("(define x 41)");
    assert!(fresh.evaluate("(+ x 1)").is_error());
}
