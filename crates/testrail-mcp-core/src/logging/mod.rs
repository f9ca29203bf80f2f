//! Logging abstractions
//!
//! Components take a `SharedLogger` and tag their messages with
//! `TaggedLogger`; the host picks the sink. `file_logger` is a process-wide
//! fallback for code that has no logger instance.

mod traits;
mod console;
mod memory;
pub mod file_logger;

pub use traits::{Logger, NoOpLogger, SharedLogger, TaggedLogger};
pub use console::{ConsoleLogger, DEFAULT_PREFIX};
pub use memory::MemoryLogger;
pub use file_logger::{log_file_path, LogLevel};
