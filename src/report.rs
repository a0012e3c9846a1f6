//! Diagnostic sinks.  Passes never print; they hand their errors to a
//! [`Reporter`] chosen by the embedder.

use log::debug;

use crate::error::LoxError;

pub trait Reporter {
    fn report(&mut self, error: &LoxError);
}

/// Writes every diagnostic to standard error.
#[derive(Debug, Default)]
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn report(&mut self, error: &LoxError) {
        debug!("Reporting: {}", error);
        eprintln!("{}", error);
    }
}

/// Keeps rendered diagnostics in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub messages: Vec<String>,
}

impl Reporter for CollectingReporter {
    fn report(&mut self, error: &LoxError) {
        self.messages.push(error.to_string());
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, error: &LoxError) {
        (**self).report(error)
    }
}
