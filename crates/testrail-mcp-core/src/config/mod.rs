//! Worker settings sources
//!
//! - `MemorySettingsProvider`: in-memory
//! - `FileSettingsProvider`: YAML file (user/workspace level)

mod traits;
mod memory;
mod file;

pub use traits::{SettingsProvider, ConfigError, ConfigResult};
pub use memory::MemorySettingsProvider;
pub use file::{FileSettingsProvider, ConfigLevel};
