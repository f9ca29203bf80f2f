//! Shared types for the bridge
//!
//! Settings and the resolved worker configuration, connection status, and
//! the tool/result shapes exchanged with the worker.

mod cancellation;
mod settings;
mod status;
mod tool;

pub use cancellation::CancellationToken;
pub use settings::{WorkerConfig, WorkerSettings, DEFAULT_WORKER_PACKAGE, DEFAULT_WORKER_PATH};
pub use status::ConnectionStatus;
pub use tool::{ContentKind, InvocationResult, ToolDescriptor};
