//! One interpreter session: the glue that runs source text through
//! scan → parse → resolve → interpret and keeps the error flags the driver
//! maps to exit codes.
//!
//! A later stage never starts if an earlier one reported anything.  Global
//! bindings live in the session's interpreter and persist across `run`
//! calls; the error flags do not (see [`Lox::reset_errors`]).

use std::io::Write;

use log::{debug, info};

use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::report::{Reporter, StderrReporter};
use crate::resolver::Resolver;
use crate::scanner::scan_tokens;

pub struct Lox<R: Reporter = StderrReporter> {
    interpreter: Interpreter,
    reporter: R,
    had_error: bool,
    had_runtime_error: bool,
}

impl Default for Lox<StderrReporter> {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox<StderrReporter> {
    /// Session printing to stdout and reporting to stderr.
    pub fn new() -> Self {
        Self::with_parts(Interpreter::new(), StderrReporter)
    }
}

impl<R: Reporter> Lox<R> {
    pub fn with_parts(interpreter: Interpreter, reporter: R) -> Self {
        Self {
            interpreter,
            reporter,
            had_error: false,
            had_runtime_error: false,
        }
    }

    /// Session printing to `output` and reporting through `reporter`.
    pub fn with_output(output: Box<dyn Write>, reporter: R) -> Self {
        Self::with_parts(Interpreter::with_output(output), reporter)
    }

    /// A scan, parse or resolve error was reported.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    /// Execution stopped on a runtime error.
    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Clear both flags, keeping every global binding.
    pub fn reset_errors(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn run(&mut self, source: &str) {
        info!("Running {} bytes of source", source.len());

        let (tokens, lex_errors) = scan_tokens(source);
        self.report_all(&lex_errors);

        let (statements, parse_errors) = Parser::new(&tokens).parse();
        self.report_all(&parse_errors);

        if self.had_error {
            debug!("Skipping resolve: syntax errors present");
            return;
        }

        let resolve_errors: Vec<LoxError> =
            Resolver::new(&mut self.interpreter).resolve(&statements);
        self.report_all(&resolve_errors);

        if self.had_error {
            debug!("Skipping execution: resolve errors present");
            return;
        }

        if let Err(e) = self.interpreter.interpret(&statements) {
            self.had_runtime_error = e.is_runtime();
            self.had_error |= !e.is_runtime();
            self.reporter.report(&e);
        }
    }

    fn report_all(&mut self, errors: &[LoxError]) {
        for e in errors {
            self.had_error = true;
            self.reporter.report(e);
        }
    }
}
