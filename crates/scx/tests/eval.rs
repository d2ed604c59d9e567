// Integration tests for evaluation: literals, the numeric tower, error
// values and multi-form programs.

mod common;

use common::{ctx_with, eval, eval_display, eval_error, global_names};
use scx::{Config, Context, Value};

#[test]
fn test_nested_arithmetic() {
    assert_eq!(eval("(+ 1 (+ 1 (+ 2 3)))"), Value::Int(7));
    assert_eq!(eval("(- 10 3 2)"), Value::Int(5));
    assert_eq!(eval("(* 2 3 4)"), Value::Int(24));
    assert_eq!(eval("(+)"), Value::Int(0));
    assert_eq!(eval("(- 5)"), Value::Int(5));
}

#[test]
fn test_numeric_tower() {
    assert_eq!(eval("(+ 1 2.0)"), Value::Real(3.0));
    assert_eq!(eval("(* 2 0.5)"), Value::Real(1.0));
    assert_eq!(eval("(- 1.5 0.5)"), Value::Real(1.0));
    assert_eq!(eval("(/ 4 2)"), Value::Int(2));
    assert_eq!(eval("(/ 7 2)"), Value::Real(3.5));
    assert_eq!(eval("(/ 12 2 3)"), Value::Int(2));
    assert_eq!(eval_display("(+ 1.5 1.5)"), "3.0");
}

#[test]
fn test_division_by_zero() {
    assert_eq!(eval_error("(/ 1 0)").as_deref(), Some("division by zero"));
    assert_eq!(eval_error("(/ 1.0 0.0)").as_deref(), Some("division by zero"));
}

#[test]
fn test_integer_overflow_is_an_error() {
    assert_eq!(
        eval_error("(+ 9223372036854775807 1)").as_deref(),
        Some("integer overflow in '+'")
    );
    assert_eq!(
        eval_error("(* 9223372036854775807 2)").as_deref(),
        Some("integer overflow in '*'")
    );
}

#[test]
fn test_comparisons() {
    assert_eq!(eval("(< 1 2 3)"), Value::Bool(true));
    assert_eq!(eval("(< 1 3 2)"), Value::Bool(false));
    assert_eq!(eval("(<= 2 2 3)"), Value::Bool(true));
    assert_eq!(eval("(> 3 2.5)"), Value::Bool(true));
    assert_eq!(eval("(>= 1 2)"), Value::Bool(false));
    assert_eq!(eval("(= 1 1.0)"), Value::Bool(true));
}

#[test]
fn test_derived_numeric() {
    assert_eq!(eval("(abs -3)"), Value::Int(3));
    assert_eq!(eval("(abs -2.5)"), Value::Real(2.5));
    assert_eq!(eval("(sqrt 16)"), Value::Int(4));
    assert_eq!(eval("(expt 2 10)"), Value::Int(1024));
    assert_eq!(eval("(mean 1 2 3 4)"), Value::Real(2.5));
    assert_eq!(
        eval_error("(sqrt -1)").as_deref(),
        Some("'sqrt' is undefined for -1")
    );
}

#[test]
fn test_type_errors() {
    assert_eq!(
        eval_error("(+ 1 \"two\")").as_deref(),
        Some("'+' expects a number, got string")
    );
    assert_eq!(
        eval_error("(not 1)").as_deref(),
        Some("'not' expects a boolean, got integer")
    );
}

#[test]
fn test_string_length_counts_characters() {
    assert_eq!(eval("(len \"Hello World!\")"), Value::Int(12));
    assert_eq!(eval("(len \"h\u{e9}llo\")"), Value::Int(5));
    assert_eq!(eval("(len \"\")"), Value::Int(0));
}

#[test]
fn test_unbound_and_unknown_names() {
    assert_eq!(
        eval_error("(+ x 1)").as_deref(),
        Some("unbound identifier 'x'")
    );
    assert_eq!(
        eval_error("(frob 1)").as_deref(),
        Some("unknown operator 'frob'")
    );
}

#[test]
fn test_arity_checked_before_arguments() {
    assert_eq!(
        eval_error("(car 1 2)").as_deref(),
        Some("wrong number of arguments to 'car': expected exactly 1, got 2")
    );
    // The argument would raise "boom" if it were evaluated.
    assert_eq!(
        eval_error("(car (error \"boom\") 2)").as_deref(),
        Some("wrong number of arguments to 'car': expected exactly 1, got 2")
    );
}

#[test]
fn test_first_error_argument_wins() {
    assert_eq!(
        eval_error("(+ 1 (error \"first\") (error \"second\"))").as_deref(),
        Some("first")
    );
}

#[test]
fn test_program_returns_last_form() {
    assert_eq!(eval("(define x 2) (* x 21)"), Value::Int(42));
}

#[test]
fn test_error_stops_program() {
    let mut ctx = Context::new();
    let result = ctx.evaluate("(define x 1) (car 5) (define y 2)");

    assert!(result.is_error());
    assert_eq!(global_names(&ctx), vec!["x".to_owned()]);
}

#[test]
fn test_syntax_errors() {
    let unclosed = eval_error("(+ 1 2").unwrap_or_default();
    assert!(unclosed.starts_with("syntax error at 1:"), "{unclosed}");
    assert!(unclosed.contains("missing ')'"), "{unclosed}");

    let bad_hash = eval_error("(not #x)").unwrap_or_default();
    assert!(bad_hash.contains("expected #t or #f"), "{bad_hash}");

    let second_line = eval_error("(+ 1 2)\n(\"str\")").unwrap_or_default();
    assert!(second_line.starts_with("syntax error at 2:"), "{second_line}");

    assert!(eval_error("").is_some());
    assert!(eval_error("42").is_some());
}

#[test]
fn test_depth_limit() {
    let mut ctx = ctx_with(Config::default().with_max_depth(8));
    let result = ctx.evaluate("(+ 1 (+ 1 (+ 1 (+ 1 (+ 1 (+ 1 (+ 1 (+ 1 (+ 1 1)))))))))");

    assert_eq!(
        ctx.error_message(result),
        Some("evaluation nested deeper than 8 levels")
    );
    assert_eq!(ctx.evaluate("(+ 1 (+ 1 1))"), Value::Int(3));
}

#[test]
fn test_deeply_nested_source_is_an_error() {
    let depth = 15_000;
    let source = format!("{}1{}", "(+ ".repeat(depth), ")".repeat(depth));

    let mut ctx = Context::new();
    let result = ctx.evaluate(&source);
    let message = ctx.error_message(result).unwrap_or_default().to_owned();
    assert!(message.starts_with("syntax error at 1:"), "{message}");
    assert!(message.contains("nested deeper than 1024 levels"), "{message}");

    assert_eq!(ctx.evaluate("(+ 1 1)"), Value::Int(2));
}

#[test]
fn test_display() {
    assert_eq!(eval_display("(not #f)"), "#t");
    assert_eq!(eval_display("(begin \"hi\")"), "\"hi\"");
    assert_eq!(eval_display("(lambda (a b) (+ a b))"), "<lambda/2>");
    assert_eq!(eval_display("(error \"bad\" 1)"), "error: bad 1");
    assert_eq!(eval_display("(if #f 1)"), "nil");
}
