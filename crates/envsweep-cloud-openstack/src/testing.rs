//! Scripted command runner for unit tests

use crate::error::Result;
use crate::openstack::{CommandOutput, CommandRunner};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Answers commands from a fixed script keyed by the joined argument list
#[derive(Default)]
pub struct ScriptedRunner {
    responses: HashMap<String, CommandOutput>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, args: &str, stdout: &str) -> Self {
        self.responses
            .insert(args.to_string(), CommandOutput::ok(stdout));
        self
    }

    pub fn fail(mut self, args: &str, stderr: &str) -> Self {
        self.responses
            .insert(args.to_string(), CommandOutput::failed(stderr));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, _program: &str, args: &[String]) -> Result<CommandOutput> {
        let key = args.join(" ");
        self.calls.lock().unwrap().push(key.clone());
        Ok(self
            .responses
            .get(&key)
            .cloned()
            .unwrap_or_else(|| CommandOutput::failed(format!("unscripted command: {}", key))))
    }
}
