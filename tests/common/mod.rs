#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::report::CollectingReporter;
use rox::Lox;

/// `Write` sink whose contents stay readable after it is boxed away.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("output is UTF-8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Result of one `Lox::run`.
pub struct Outcome {
    pub stdout: String,
    pub diagnostics: Vec<String>,
    pub had_error: bool,
    pub had_runtime_error: bool,
}

impl Outcome {
    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }
}

pub fn session() -> (Lox<CollectingReporter>, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let lox = Lox::with_output(Box::new(buffer.clone()), CollectingReporter::default());
    (lox, buffer)
}

pub fn run(source: &str) -> Outcome {
    let (mut lox, buffer) = session();
    lox.run(source);

    Outcome {
        stdout: buffer.contents(),
        diagnostics: lox.reporter().messages.clone(),
        had_error: lox.had_error(),
        had_runtime_error: lox.had_runtime_error(),
    }
}

/// Runs `source` and asserts it finished cleanly, returning printed lines.
pub fn run_ok(source: &str) -> Vec<String> {
    let outcome = run(source);

    assert!(
        !outcome.had_error && !outcome.had_runtime_error,
        "unexpected diagnostics: {:?}",
        outcome.diagnostics
    );

    outcome.stdout.lines().map(str::to_string).collect()
}
