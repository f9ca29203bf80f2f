//! Global debug log file
//!
//! For code with no `Logger` in scope (secret stores, the napi bindings).
//! Inside the VS Code extension host stderr is not visible, so this is the
//! only trace those paths leave.
//!
//! Disabled unless `TESTRAIL_MCP_DEBUG` is `1` or `true`. The minimum level
//! comes from `TESTRAIL_MCP_LOG_LEVEL` (`debug`, `info`, `warn`, `error`).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::SystemTime;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

const LOG_FILE_NAME: &str = "testrail-mcp-debug.log";
const ENV_DEBUG: &str = "TESTRAIL_MCP_DEBUG";
const ENV_LOG_LEVEL: &str = "TESTRAIL_MCP_LOG_LEVEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a level name, case-insensitive
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO ",
            LogLevel::Warn => "WARN ",
            LogLevel::Error => "ERROR",
        }
    }
}

struct Sink {
    file: Option<File>,
    min_level: LogLevel,
    enabled: bool,
}

/// `1` or `true` (any case) switches the log on
fn debug_flag(value: Option<&str>) -> bool {
    matches!(value, Some(v) if v == "1" || v.eq_ignore_ascii_case("true"))
}

impl Sink {
    fn from_env() -> Self {
        let enabled = debug_flag(std::env::var(ENV_DEBUG).ok().as_deref());
        let min_level = std::env::var(ENV_LOG_LEVEL)
            .ok()
            .and_then(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Debug);
        let file = if enabled { open_log_file() } else { None };

        Self {
            file,
            min_level,
            enabled,
        }
    }

    fn write(&mut self, level: LogLevel, module: &str, message: &str) {
        if !self.enabled || level < self.min_level {
            return;
        }
        if let Some(file) = self.file.as_mut() {
            // Write failures are not reportable from here
            let _ = writeln!(
                file,
                "[{}] [{}] [{}] {}",
                timestamp(),
                level.label(),
                module,
                message
            );
            let _ = file.flush();
        }
    }
}

fn open_log_file() -> Option<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path())
        .ok()
}

/// `HH:MM:SS.mmm` (UTC)
fn timestamp() -> String {
    match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
        Ok(elapsed) => {
            let secs = elapsed.as_secs();
            format!(
                "{:02}:{:02}:{:02}.{:03}",
                (secs % 86_400) / 3_600,
                (secs % 3_600) / 60,
                secs % 60,
                elapsed.subsec_millis()
            )
        }
        Err(_) => "--:--:--.---".to_string(),
    }
}

static SINK: Lazy<Mutex<Sink>> = Lazy::new(|| Mutex::new(Sink::from_env()));

pub fn log(level: LogLevel, module: &str, message: &str) {
    SINK.lock().write(level, module, message);
}

pub fn debug(module: &str, message: &str) {
    log(LogLevel::Debug, module, message);
}

pub fn info(module: &str, message: &str) {
    log(LogLevel::Info, module, message);
}

pub fn warn(module: &str, message: &str) {
    log(LogLevel::Warn, module, message);
}

pub fn error(module: &str, message: &str) {
    log(LogLevel::Error, module, message);
}

/// Whether the debug log is switched on for this process
pub fn is_enabled() -> bool {
    SINK.lock().enabled
}

pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}
