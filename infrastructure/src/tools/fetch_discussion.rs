//! fetch_discussion tool: read a finished session's transcript

use super::AgentTool;
use async_trait::async_trait;
use boardroom_application::{AgentError, SessionStore};
use boardroom_domain::util::ellipsize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Tool name constant
pub const FETCH_DISCUSSION: &str = "fetch_discussion";

/// Default per-turn cap when rendering
const DEFAULT_TURN_CHARS: usize = 1500;

/// Default cap for the whole output (40 KB)
const DEFAULT_MAX_CHARS: usize = 40 * 1024;

/// Looks a session up in the [`SessionStore`] and returns its transcript.
pub struct FetchDiscussionTool {
    store: Arc<dyn SessionStore>,
    max_turn_chars: usize,
    max_chars: usize,
}

impl FetchDiscussionTool {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            max_turn_chars: DEFAULT_TURN_CHARS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }

    pub fn with_limits(mut self, max_turn_chars: usize, max_chars: usize) -> Self {
        self.max_turn_chars = max_turn_chars;
        self.max_chars = max_chars;
        self
    }

    fn failed(message: impl Into<String>) -> AgentError {
        AgentError::ToolFailed {
            tool: FETCH_DISCUSSION.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl AgentTool for FetchDiscussionTool {
    fn name(&self) -> &str {
        FETCH_DISCUSSION
    }

    fn description(&self) -> &str {
        "Fetch the full discussion of a finished session by its session id."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "session_id": {
                    "type": "string",
                    "description": "Session id of the discussion, e.g. house-1"
                }
            },
            "required": ["session_id"]
        })
    }

    async fn call(&self, arguments: &Value) -> Result<String, AgentError> {
        let session_id = arguments
            .get("session_id")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Self::failed("missing 'session_id' argument"))?;

        let result = self
            .store
            .fetch(session_id)
            .await
            .map_err(|e| Self::failed(e.to_string()))?
            .ok_or_else(|| Self::failed(format!("no session with id '{session_id}'")))?;

        let text = format!(
            "Session {} ({}, {} turns)\n\n{}",
            result.session_id,
            result.reason.display_name(),
            result.turn_count(),
            result.transcript.render(self.max_turn_chars)
        );
        Ok(ellipsize(&text, self.max_chars))
    }
}
