//! Tool Registry
//!
//! Maps participant names to the tools they may call. A tool may be
//! registered for several participants; lookups never cross participants.

use super::AgentTool;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Default, Clone)]
pub struct ToolRegistry {
    by_participant: HashMap<String, Vec<Arc<dyn AgentTool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `tool` to each of `participants`; a tool with the same name
    /// already granted to a participant is replaced.
    pub fn register<S: AsRef<str>>(mut self, participants: &[S], tool: Arc<dyn AgentTool>) -> Self {
        for participant in participants {
            let participant = participant.as_ref();
            debug!(tool = tool.name(), participant, "Registered tool");
            let tools = self.by_participant.entry(participant.to_string()).or_default();
            tools.retain(|t| t.name() != tool.name());
            tools.push(Arc::clone(&tool));
        }
        self
    }

    pub fn tools_for(&self, participant: &str) -> &[Arc<dyn AgentTool>] {
        self.by_participant
            .get(participant)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn find(&self, participant: &str, tool_name: &str) -> Option<&Arc<dyn AgentTool>> {
        self.tools_for(participant)
            .iter()
            .find(|t| t.name() == tool_name)
    }

    pub fn is_empty(&self) -> bool {
        self.by_participant.is_empty()
    }
}
