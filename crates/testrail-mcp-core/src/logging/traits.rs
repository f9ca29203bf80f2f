//! Logger trait definition

use std::sync::Arc;

/// Logger abstraction so the host decides where messages go
///
/// Implementations:
/// - `NoOpLogger`: silent
/// - `ConsoleLogger`: stderr, used by the CLI
/// - `MemoryLogger`: records lines, used by tests
/// - VS Code adapter: the extension's output channel (via the napi bridge)
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);

    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);
}

/// Type alias for an Arc-wrapped logger
pub type SharedLogger = Arc<dyn Logger>;

/// A logger that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl NoOpLogger {
    pub fn new() -> Self {
        Self
    }

    /// Convenience for components that require a `SharedLogger`
    pub fn shared() -> SharedLogger {
        Arc::new(Self)
    }
}

impl Logger for NoOpLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// Prefixes every message with a component tag such as `[McpClient]`
#[derive(Clone)]
pub struct TaggedLogger {
    inner: SharedLogger,
    tag: &'static str,
}

impl TaggedLogger {
    pub fn new(inner: SharedLogger, tag: &'static str) -> Self {
        Self { inner, tag }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    fn tagged(&self, message: &str) -> String {
        format!("[{}] {}", self.tag, message)
    }
}

impl Logger for TaggedLogger {
    fn debug(&self, message: &str) {
        self.inner.debug(&self.tagged(message));
    }

    fn info(&self, message: &str) {
        self.inner.info(&self.tagged(message));
    }

    fn warn(&self, message: &str) {
        self.inner.warn(&self.tagged(message));
    }

    fn error(&self, message: &str) {
        self.inner.error(&self.tagged(message));
    }
}

/// Convenience macros for logging with format arguments
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(&format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLogger;

    #[test]
    fn test_tagged_logger_prefixes() {
        let memory = Arc::new(MemoryLogger::new());
        let logger = TaggedLogger::new(memory.clone(), "McpClient");

        logger.info("Connecting");
        log_error!(logger, "exit code {}", 2);

        assert_eq!(
            memory.lines(),
            vec![
                "INFO [McpClient] Connecting".to_string(),
                "ERROR [McpClient] exit code 2".to_string(),
            ]
        );
    }

    #[test]
    fn test_noop_logger() {
        let logger = NoOpLogger::shared();
        logger.debug("ignored");
        logger.error("ignored");
    }
}
