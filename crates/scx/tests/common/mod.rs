// Common test utilities for integration tests
//
// Helpers that evaluate a program in a fresh context and render the result.

#![allow(dead_code)]

use scx::{Config, Context, Value};

/// Evaluates `source` in a fresh default context.
pub fn eval(source: &str) -> Value {
    let mut ctx = Context::new();
    ctx.evaluate(source)
}

/// Evaluates `source` in a fresh default context and renders the result.
pub fn eval_display(source: &str) -> String {
    let mut ctx = Context::new();
    let value = ctx.evaluate(source);
    ctx.display(value)
}

/// Evaluates `source` and returns the error message, if the result is an
/// error value.
pub fn eval_error(source: &str) -> Option<String> {
    let mut ctx = Context::new();
    let value = ctx.evaluate(source);
    ctx.error_message(value).map(str::to_owned)
}

/// A context that keeps its globals between evaluations.
pub fn persistent_context() -> Context {
    Context::with_config(Config::default().with_persist_globals(true))
}

/// A context with the given configuration.
pub fn ctx_with(config: Config) -> Context {
    Context::with_config(config)
}

/// Names bound in the global frame, in creation order.
pub fn global_names(ctx: &Context) -> Vec<String> {
    ctx.frame_bindings(0)
        .unwrap_or_default()
        .into_iter()
        .map(|(name, _)| name)
        .collect()
}
