// Arena exhaustion is fatal. The default policy aborts the process, so that
// case runs in a child copy of this test binary.

mod common;

use common::ctx_with;
use scx::{Config, Exhaustion};
use std::process::{Command, Stdio};

const CHILD_ENV: &str = "SCX_EXHAUST_CHILD";
const GROWING_LIST: &str = "(define xs (list)) (while #t (define xs (cons 1 xs)))";

#[test]
fn test_exhaustion_aborts_process() {
    if std::env::var_os(CHILD_ENV).is_some() {
        let mut ctx = ctx_with(Config::default().with_heap_size(1024));
        ctx.evaluate(GROWING_LIST);
        // Reaching this line means the arena never ran out.
        std::process::exit(0);
    }

    let exe = std::env::current_exe().expect("test binary path");
    let status = Command::new(exe)
        .args(["test_exhaustion_aborts_process", "--exact", "--test-threads=1"])
        .env(CHILD_ENV, "1")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("failed to spawn child test process");

    assert!(!status.success(), "child exited with {status}");
}

#[test]
#[should_panic(expected = "arena exhausted")]
fn test_exhaustion_panics_when_configured() {
    let mut ctx = ctx_with(
        Config::default()
            .with_heap_size(1024)
            .with_exhaustion(Exhaustion::Panic),
    );
    ctx.evaluate(GROWING_LIST);
}

#[test]
fn test_bounded_program_fits() {
    let mut ctx = ctx_with(
        Config::default()
            .with_heap_size(1024)
            .with_exhaustion(Exhaustion::Panic),
    );
    let result = ctx.evaluate(
        "(define xs (list))
         (define i 0)
         (while (< i 10) (define xs (cons i xs)) (set! i (+ i 1)))
         (length xs)",
    );
    assert_eq!(result, scx::Value::Int(10));
}
