//! Terminal prompts for the credential flow

use async_trait::async_trait;
use console::Term;

use testrail_mcp_core::credentials::{PromptRequest, Prompter};

/// Prompts on stderr, re-asking until the input validates
///
/// An empty line or a read error counts as dismissing the prompt.
pub struct TerminalPrompter {
    term: Term,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn ask(&self, request: &PromptRequest) -> Option<String> {
        loop {
            let label = format!("{} ({}): ", request.message, request.placeholder);
            self.term.write_str(&label).ok()?;

            let line = if request.password {
                self.term.read_secure_line()
            } else {
                self.term.read_line()
            }
            .ok()?;
            let value = line.trim().to_string();

            if value.is_empty() {
                return None;
            }
            match (request.validate)(&value) {
                Ok(()) => return Some(value),
                Err(message) => {
                    self.term.write_line(message).ok()?;
                }
            }
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn prompt(&self, request: &PromptRequest) -> Option<String> {
        let term = self.term.clone();
        let request = *request;
        // Terminal reads block; keep them off the runtime's worker threads
        tokio::task::spawn_blocking(move || TerminalPrompter { term }.ask(&request))
            .await
            .ok()
            .flatten()
    }
}
