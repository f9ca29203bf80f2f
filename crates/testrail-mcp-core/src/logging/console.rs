//! Console logger

use std::sync::atomic::{AtomicBool, Ordering};

use super::traits::Logger;

/// Default prefix, matching the extension's output channel name
pub const DEFAULT_PREFIX: &str = "[TestRail MCP]";

/// Writes to stderr so stdout stays free for command output
///
/// Debug lines are only printed once `set_verbose(true)` is called.
#[derive(Debug)]
pub struct ConsoleLogger {
    prefix: String,
    verbose: AtomicBool,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            verbose: AtomicBool::new(false),
        }
    }

    pub fn set_verbose(&self, verbose: bool) {
        self.verbose.store(verbose, Ordering::Relaxed);
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    fn line(&self, level: &str, message: &str) -> String {
        format!("{} {}: {}", self.prefix, level, message)
    }
}

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str) {
        if self.is_verbose() {
            eprintln!("{}", self.line("DEBUG", message));
        }
    }

    fn info(&self, message: &str) {
        eprintln!("{}", self.line("INFO", message));
    }

    fn warn(&self, message: &str) {
        eprintln!("{}", self.line("WARN", message));
    }

    fn error(&self, message: &str) {
        eprintln!("{}", self.line("ERROR", message));
    }
}
