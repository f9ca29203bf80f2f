//! TestRail MCP command-line host
//!
//! Runs the same bridge the editor extension uses, with terminal prompts
//! in place of input boxes and stderr in place of the output channel.

pub mod handlers;
pub mod parser;
pub mod prompt;

pub use parser::{Cli, Commands};
