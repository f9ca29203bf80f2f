//! Recording logger

use parking_lot::Mutex;

use super::traits::Logger;

/// Keeps every line as `"LEVEL message"`
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Whether any recorded line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(needle))
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }

    fn push(&self, level: &str, message: &str) {
        self.lines.lock().push(format!("{} {}", level, message));
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str) {
        self.push("DEBUG", message);
    }

    fn info(&self, message: &str) {
        self.push("INFO", message);
    }

    fn warn(&self, message: &str) {
        self.push("WARN", message);
    }

    fn error(&self, message: &str) {
        self.push("ERROR", message);
    }
}
