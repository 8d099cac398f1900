//! Command line interface of the `rlox` tree-walk interpreter
//!
//! The driver owns error reporting: each pipeline phase hands back its
//! collected errors and the driver prints them in the diagnostic format and
//! gates execution.

pub use anyhow::Result;
use anyhow::{anyhow, Context};
use log::debug;

use std::{
    env, fs,
    io::{self, BufRead, Write},
};

use crate::{
    analyzer::resolver::Resolver,
    ast::PrettyPrint,
    lexer::{parser::Parser, scanner::Scanner, token::Token},
    runtime::{Interpreter, RuntimeError},
};

pub const EXIT_OK: i32 = 0;
pub const EXIT_USAGE: i32 = 100;
pub const EXIT_FILE_NOT_FOUND: i32 = 101;
pub const EXIT_STATIC_ERROR: i32 = 110;
pub const EXIT_RUNTIME_ERROR: i32 = 111;

// --------------------------------------------------------------------------------
// API

/// Reads argv: one argument runs a file, none starts the REPL
pub fn parse() -> Result<Cli> {
    let mut args = env::args().skip(1);
    let run_file = args.next();
    if args.next().is_some() {
        return Err(anyhow!("Usage: rlox [script]"));
    }
    Ok(Cli { run_file })
}

pub struct Cli {
    pub run_file: Option<String>,
}

impl Cli {
    pub fn run(&self) -> i32 {
        match self.run_file {
            Some(ref file) => self::run_file(file),
            None => self::run_repl(),
        }
    }
}

/// What failed in one pipeline run; mapped onto an exit code by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunError {
    /// Scan, parse or resolve reported at least one error; nothing ran
    Static,
    Runtime,
}

// --------------------------------------------------------------------------------
// Running

pub fn run_file(path: &str) -> i32 {
    let src = match fs::read_to_string(path) {
        Ok(src) => src,
        Err(_) => {
            println!("File not found: {}", path);
            return EXIT_FILE_NOT_FOUND;
        }
    };

    let mut interpreter = Interpreter::new();
    match self::run_string(&src, &mut interpreter) {
        Ok(()) => EXIT_OK,
        Err(RunError::Static) => EXIT_STATIC_ERROR,
        Err(RunError::Runtime) => EXIT_RUNTIME_ERROR,
    }
}

/// One full pipeline pass: scan, parse, resolve, interpret. Execution is
/// gated off when any static error was reported.
pub fn run_string(
    source: &str,
    interpreter: &mut Interpreter,
) -> std::result::Result<(), RunError> {
    let (tks, scan_errors) = Scanner::new(source).scan();

    debug!("===== tokens =====");
    for tk in tks.iter() {
        debug!("{:?}", tk);
    }

    let mut had_error = !scan_errors.is_empty();
    for why in scan_errors.iter() {
        self::report(why.line(), "", &why.to_string());
    }

    let (stmts, parse_errors) = Parser::new(&tks).parse();

    debug!("===== ast =====");
    for (i, stmt) in stmts.iter().enumerate() {
        debug!("{} {}", i, stmt.pretty_print());
    }

    had_error |= !parse_errors.is_empty();
    for why in parse_errors.iter() {
        self::report_at(&why.token, &why.to_string());
    }

    let resolve_errors = Resolver::new(&mut interpreter.locals).resolve(&stmts);
    had_error |= !resolve_errors.is_empty();
    for why in resolve_errors.iter() {
        self::report_at(&why.token, &why.to_string());
    }

    if had_error {
        return Err(RunError::Static);
    }

    if let Err(why) = interpreter.interpret(&stmts) {
        self::report_runtime(&why);
        return Err(RunError::Runtime);
    }

    Ok(())
}

// --------------------------------------------------------------------------------
// REPL

pub fn run_repl() -> i32 {
    match self::repl_loop() {
        Ok(()) => EXIT_OK,
        Err(why) => {
            eprintln!("{:?}", why);
            1
        }
    }
}

fn repl_loop() -> Result<()> {
    println!("rlox REPL (empty line to quit)");
    let prompt = ">>> ";

    let input = io::stdin();
    let mut input = input.lock();
    let mut line = String::new();

    let mut interpreter = Interpreter::new();
    loop {
        print!("{}", prompt);
        io::stdout().flush().context("error when flushing stdout")?;

        line.clear();
        let n = input
            .read_line(&mut line)
            .context("error when reading stdin")?;
        let line = line.trim_end_matches(|c| c == '\n' || c == '\r');
        if n == 0 || line.is_empty() {
            break;
        }

        // each run reports its own errors; nothing latches across lines
        let _ = self::run_string(line, &mut interpreter);
    }

    Ok(())
}

// --------------------------------------------------------------------------------
// Diagnostics

/// `[line N] Error<where>: <msg>`
fn report(line: usize, location: &str, msg: &str) {
    eprintln!("[line {}] Error{}: {}", line, location, msg);
}

fn report_at(token: &Token, msg: &str) {
    if token.is_eof() {
        self::report(token.line, " at end", msg);
    } else {
        self::report(token.line, &format!(" at '{}'", token.lexeme), msg);
    }
}

fn report_runtime(why: &RuntimeError) {
    eprintln!(
        "[line {}] Error at {}: {}",
        why.token.line, why.token.lexeme, why.kind
    );
}
