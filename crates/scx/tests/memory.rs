// Integration tests for arena accounting: release, reuse and program
// reservations.

mod common;

use common::{ctx_with, persistent_context};
use scx::{Config, Context, Value};

fn churn(iterations: usize) -> String {
    format!(
        "(define i 0)
         (while (< i {iterations})
             (list 1 2 3)
             (set! i (+ i 1)))"
    )
}

#[test]
fn test_release_frees_every_cell() {
    let mut ctx = persistent_context();
    let before = ctx.usage().live_objects;

    let list = ctx.evaluate("(list 1 2 3)");
    // Three cells and the terminator.
    assert_eq!(ctx.usage().live_objects, before + 4);

    ctx.release(list);
    assert_eq!(ctx.usage().live_objects, before);
    assert_eq!(ctx.usage().free_slots, 4);
}

#[test]
fn test_freed_cells_are_reused() {
    let mut once = Context::new();
    once.evaluate(&churn(1));
    let high_water = once.usage().object_bytes;

    let mut many = Context::new();
    many.evaluate(&churn(200));
    let stats = many.usage();

    assert_eq!(stats.object_bytes, high_water);
    assert!(stats.reuses >= 4 * 199, "{stats:?}");
}

#[test]
fn test_dup_keeps_values_alive() {
    let mut ctx = persistent_context();
    let text = ctx.evaluate("(begin \"kept\")");

    let alias = ctx.dup(text);
    ctx.release(text);
    assert_eq!(ctx.string(alias), Some("kept"));

    ctx.release(alias);
    assert_eq!(ctx.string(alias), None);
}

#[test]
fn test_reset_reclaims_everything() {
    let mut ctx = persistent_context();
    ctx.evaluate("(define xs (list 1 2 3))");
    assert!(ctx.usage().used > 0);

    ctx.reset();
    let stats = ctx.usage();
    assert_eq!(stats.used, 0);
    assert_eq!(stats.live_objects, 0);
    assert_eq!(ctx.scope_depth(), 1);
    assert!(ctx.evaluate("(+ (length xs) 0)").is_error());
}

#[test]
fn test_program_reserves_ast_bytes() {
    let mut ctx = Context::new();
    ctx.evaluate("(+ 1 2)");
    // One expression node and two atoms.
    assert_eq!(ctx.usage().ast_bytes, 7 + 3 + 3);
}

#[test]
fn test_program_too_large() {
    let mut ctx = ctx_with(Config::default().with_heap_size(96));
    let atoms: Vec<String> = (0..40).map(|n| n.to_string()).collect();
    let result = ctx.evaluate(&format!("(+ {})", atoms.join(" ")));

    let message = ctx.error_message(result).unwrap_or_default();
    assert!(message.starts_with("program too large"), "{message}");
}

#[test]
fn test_failed_parse_leaves_session_untouched() {
    let mut ctx = persistent_context();
    ctx.evaluate("(define x 41)");
    let source = ctx.source().to_owned();
    let ast_bytes = ctx.usage().ast_bytes;

    let err = ctx.evaluate("(+ x");
    assert!(err.is_error());
    ctx.release(err);

    assert_eq!(ctx.source(), source);
    assert_eq!(ctx.usage().ast_bytes, ast_bytes);
    assert_eq!(ctx.evaluate("(+ x 1)"), Value::Int(42));
}
