//! Scripted worker for unit tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use tokio::sync::Notify;

use super::worker::{McpError, McpResult, WorkerLauncher, WorkerSession};
use crate::types::{ToolDescriptor, WorkerConfig};

#[derive(Default)]
struct Script {
    tools: Vec<ToolDescriptor>,
    launch_error: Option<String>,
    list_error: Option<String>,
    close_error: Option<String>,
    responses: HashMap<String, Result<Value, String>>,
    calls: Vec<(String, Map<String, Value>)>,
    launches: usize,
    closes: usize,
    last_config: Option<WorkerConfig>,
}

/// Launcher whose sessions answer from a script and record every call
#[derive(Clone, Default)]
pub(crate) struct ScriptedLauncher {
    script: Arc<Mutex<Script>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedLauncher {
    pub fn with_tools(names: &[&str]) -> Self {
        let launcher = Self::default();
        launcher.script.lock().tools = names
            .iter()
            .map(|name| ToolDescriptor::new(*name, format!("{} tool", name)))
            .collect();
        launcher
    }

    /// Hold every launch until `release` is called
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn fail_launch(&self, message: &str) {
        self.script.lock().launch_error = Some(message.to_string());
    }

    pub fn fail_list_tools(&self, message: &str) {
        self.script.lock().list_error = Some(message.to_string());
    }

    pub fn fail_close(&self, message: &str) {
        self.script.lock().close_error = Some(message.to_string());
    }

    pub fn respond(&self, tool: &str, result: Value) {
        self.script.lock().responses.insert(tool.to_string(), Ok(result));
    }

    pub fn respond_text(&self, tool: &str, text: &str) {
        self.respond(tool, json!({ "content": [{ "type": "text", "text": text }] }));
    }

    pub fn fail_call(&self, tool: &str, message: &str) {
        self.script
            .lock()
            .responses
            .insert(tool.to_string(), Err(message.to_string()));
    }

    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.script.lock().calls.clone()
    }

    pub fn launches(&self) -> usize {
        self.script.lock().launches
    }

    pub fn closes(&self) -> usize {
        self.script.lock().closes
    }

    pub fn last_config(&self) -> Option<WorkerConfig> {
        self.script.lock().last_config.clone()
    }
}

#[async_trait]
impl WorkerLauncher for ScriptedLauncher {
    async fn launch(&self, config: &WorkerConfig) -> McpResult<Box<dyn WorkerSession>> {
        {
            let mut script = self.script.lock();
            script.launches += 1;
            script.last_config = Some(config.clone());
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let launch_error = self.script.lock().launch_error.clone();
        if let Some(message) = launch_error {
            return Err(McpError::Spawn(message));
        }
        Ok(Box::new(ScriptedSession {
            script: self.script.clone(),
        }))
    }
}

struct ScriptedSession {
    script: Arc<Mutex<Script>>,
}

#[async_trait]
impl WorkerSession for ScriptedSession {
    async fn list_tools(&self) -> McpResult<Vec<ToolDescriptor>> {
        let script = self.script.lock();
        match &script.list_error {
            Some(message) => Err(McpError::Protocol(message.clone())),
            None => Ok(script.tools.clone()),
        }
    }

    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> McpResult<Value> {
        let mut script = self.script.lock();
        script.calls.push((name.to_string(), arguments));
        match script.responses.get(name) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(McpError::ToolCallFailed(message.clone())),
            None => Ok(json!({ "content": [{ "type": "text", "text": "ok" }] })),
        }
    }

    async fn close(self: Box<Self>) -> McpResult<()> {
        let mut script = self.script.lock();
        script.closes += 1;
        match &script.close_error {
            Some(message) => Err(McpError::Protocol(message.clone())),
            None => Ok(()),
        }
    }
}
