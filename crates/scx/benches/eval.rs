// End-to-end evaluation benchmarks
//
// These benchmarks run whole programs through a context: parsing, arena
// allocation, dispatch and lambda calls together.

use criterion::{Bencher, Criterion, black_box, criterion_group, criterion_main};
use scx::{Config, Context, Extension, Result, Value};

const FIB: &str = "
(define fib (lambda n
  (if (< n 2)
      n
      (+ (fib (- n 1)) (fib (- n 2))))))
(fib 15)";

const LIST_CHURN: &str = "
(define i 0)
(define xs (list))
(while (< i 100)
  (define xs (cons i xs))
  (set! i (+ i 1)))
(length (append xs (list 1 2 3)))";

const ARITHMETIC: &str = "(+ 1 (* 2 3) (- 10 4) (/ 9 3) (mean 1 2 3 4) (sqrt 16))";

fn identity(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    Ok(args.first().copied().unwrap_or_default())
}

/// Recursive lambda calls with dynamic scope lookups.
fn bench_fib(c: &mut Criterion) {
    let mut ctx = Context::new();
    c.bench_function("eval_fib_15", |b: &mut Bencher| {
        b.iter(|| ctx.evaluate(black_box(FIB)))
    });
}

/// Cell allocation and release through the free-slot table.
fn bench_list_churn(c: &mut Criterion) {
    let mut ctx = Context::new();
    c.bench_function("eval_list_churn", |b: &mut Bencher| {
        b.iter(|| ctx.evaluate(black_box(LIST_CHURN)))
    });
}

/// Builtin dispatch through the name index.
fn bench_arithmetic(c: &mut Criterion) {
    let mut ctx = Context::new();
    c.bench_function("eval_arithmetic", |b: &mut Bencher| {
        b.iter(|| ctx.evaluate(black_box(ARITHMETIC)))
    });
}

/// Extension lookup after the builtin miss.
fn bench_extension_call(c: &mut Criterion) {
    let mut ctx = Context::with_config(Config::default());
    ctx.register(Extension::eager("identity", identity));
    c.bench_function("eval_extension_call", |b: &mut Bencher| {
        b.iter(|| ctx.evaluate(black_box("(identity (identity (identity 42)))")))
    });
}

criterion_group!(
    benches,
    bench_fib,
    bench_list_churn,
    bench_arithmetic,
    bench_extension_call
);
criterion_main!(benches);
