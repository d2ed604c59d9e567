//! `scx` command-line runner
//!
//! - `scx FILE` - evaluate a program file
//! - `scx -` or `scx` with piped input - evaluate standard input
//! - `scx -e EXPR` - evaluate an expression given on the command line
//! - `scx --repl` - read-eval-print loop with persistent globals
//!
//! The result of the last form is printed unless it is `nil`. An error
//! result is printed to stderr and the process exits with status 1.
//!
//! Logging goes to stderr; the level comes from `--log-level` or the
//! `SCX_LOG` environment variable.

use anyhow::{Context as _, Result};
use clap::Parser;
use scx::{Config, Context, Extension, Value};
use scx_log::Level;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "scx")]
#[command(about = "Evaluate scx programs", long_about = None)]
#[command(version)]
struct Cli {
    /// Program file, or `-` for standard input
    file: Option<PathBuf>,

    /// Evaluate an expression instead of a file
    #[arg(short, long, conflicts_with_all = ["file", "repl"])]
    eval: Option<String>,

    /// Start an interactive session
    #[arg(long, conflicts_with = "file")]
    repl: bool,

    /// Arena capacity in bytes (at most 65535)
    #[arg(long, env = "SCX_HEAP_SIZE", default_value_t = scx::DEFAULT_HEAP_SIZE)]
    heap_size: usize,

    /// Maximum expression nesting during evaluation
    #[arg(long, default_value_t = scx::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log level (error, warn, info, debug, trace); overrides SCX_LOG
    #[arg(long)]
    log_level: Option<Level>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.log_level {
        Some(level) => scx_log::set_level(level),
        None => {
            scx_log::init_from_env("SCX_LOG");
        }
    }

    let config = Config::default()
        .with_heap_size(cli.heap_size)
        .with_max_depth(cli.max_depth)
        .with_persist_globals(cli.repl);

    let mut ctx = Context::with_config(config);
    ctx.register(Extension::eager("print", print));

    if cli.repl {
        repl(&mut ctx)?;
        return Ok(ExitCode::SUCCESS);
    }

    let source = match (&cli.eval, &cli.file) {
        (Some(expr), _) => expr.clone(),
        (None, Some(path)) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("failed to read standard input")?;
            source
        }
    };

    let result = ctx.evaluate(&source);
    Ok(report(&ctx, result))
}

/// Prints a result and maps it to an exit status.
fn report(ctx: &Context, result: Value) -> ExitCode {
    match result {
        Value::Error(_) => {
            eprintln!("error: {}", ctx.error_message(result).unwrap_or("unknown"));
            ExitCode::FAILURE
        }
        Value::Nothing => ExitCode::SUCCESS,
        _ => {
            println!("{}", ctx.display(result));
            ExitCode::SUCCESS
        }
    }
}

fn repl(ctx: &mut Context) -> Result<()> {
    let interactive = io::stdin().is_terminal();
    let mut stdout = io::stdout();
    let mut buffer = String::new();

    let prompt = |stdout: &mut io::Stdout, continued: bool| -> io::Result<()> {
        if interactive {
            write!(stdout, "{}", if continued { "... " } else { "scx> " })?;
            stdout.flush()?;
        }
        Ok(())
    };

    prompt(&mut stdout, false)?;
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read standard input")?;
        buffer.push_str(&line);
        buffer.push('\n');

        if open_parens(&buffer) > 0 {
            prompt(&mut stdout, true)?;
            continue;
        }

        if !buffer.trim().is_empty() {
            let result = ctx.evaluate(&buffer);
            report(ctx, result);
            ctx.release(result);
        }
        buffer.clear();
        prompt(&mut stdout, false)?;
    }

    if !buffer.trim().is_empty() {
        let result = ctx.evaluate(&buffer);
        report(ctx, result);
        ctx.release(result);
    }
    Ok(())
}

/// Unclosed parentheses in `source`, ignoring strings and comments.
fn open_parens(source: &str) -> isize {
    let mut depth = 0;
    let mut in_string = false;
    let mut in_comment = false;

    for ch in source.chars() {
        match ch {
            '\n' => in_comment = false,
            _ if in_comment => {}
            '"' => in_string = !in_string,
            _ if in_string => {}
            ';' => in_comment = true,
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth
}

/// `(print a b ...)`: writes its arguments to stdout, strings unquoted.
fn print(ctx: &mut Context, args: &[Value]) -> scx::Result<Value> {
    let parts: Vec<String> = args
        .iter()
        .map(|&arg| ctx.string(arg).map_or_else(|| ctx.display(arg), str::to_owned))
        .collect();
    println!("{}", parts.join(" "));
    Ok(Value::Nothing)
}
