//! Tools offered to participants during a turn
//!
//! Each [`AgentTool`] is registered for the participants allowed to call it.
//! `submit_proposal` is not an `AgentTool`: the reasoning adapter adds it for
//! voting participants in the final poll and turns the call into a
//! [`Proposal`](boardroom_domain::Proposal).

mod fetch_discussion;
mod registry;
pub mod submit_proposal;

pub use fetch_discussion::{FETCH_DISCUSSION, FetchDiscussionTool};
pub use registry::ToolRegistry;

use async_trait::async_trait;
use boardroom_application::AgentError;
use serde_json::Value;

/// A function the model may call while producing a turn.
#[async_trait]
pub trait AgentTool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema of the arguments object.
    fn parameters(&self) -> Value;

    /// Run the tool; the returned text is shown to the model.
    async fn call(&self, arguments: &Value) -> Result<String, AgentError>;
}
