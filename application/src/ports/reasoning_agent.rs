//! Reasoning agent port
//!
//! The external capability that, given the transcript so far, produces the
//! next turn for one participant. The orchestrator treats it as opaque.

use async_trait::async_trait;
use boardroom_domain::{
    Participant, Phase, Proposal, ProposalKind, ToolInvocation, Transcript, Turn,
};
use std::time::Duration;
use thiserror::Error;

/// Errors a reasoning agent can report for one turn
#[derive(Error, Debug, Clone)]
pub enum AgentError {
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Tool {tool} failed: {message}")]
    ToolFailed { tool: String, message: String },
}

/// Everything the agent needs to produce one turn
#[derive(Debug, Clone, Copy)]
pub struct TurnRequest<'a> {
    pub session_id: &'a str,
    pub speaker: &'a Participant,
    pub phase: Phase,
    pub transcript: &'a Transcript,
    /// Phase-specific instruction for this turn
    pub instructions: &'a str,
    /// Meaning of any proposal the speaker submits
    pub proposal_kind: ProposalKind,
}

/// The agent's answer for one turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentReply {
    pub content: String,
    /// Structured proposal, supplied through a tool call
    pub proposal: Option<Proposal>,
    pub tool_invocations: Vec<ToolInvocation>,
}

impl AgentReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_proposal(mut self, proposal: Proposal) -> Self {
        self.proposal = Some(proposal);
        self
    }

    pub fn with_tool_invocations(mut self, invocations: Vec<ToolInvocation>) -> Self {
        self.tool_invocations = invocations;
        self
    }
}

/// Reasoning capability behind every participant
///
/// Implementations live in the infrastructure layer.
#[async_trait]
pub trait ReasoningAgent: Send + Sync {
    /// Produce the next turn for `request.speaker`.
    async fn respond(&self, request: TurnRequest<'_>) -> Result<AgentReply, AgentError>;

    /// Ask a stand-alone participant for free text about `prompt`.
    ///
    /// Default implementation wraps the prompt in a one-turn transcript and
    /// calls [`respond`](Self::respond).
    async fn summarize(&self, summarizer: &Participant, prompt: &str) -> Result<String, AgentError> {
        let mut transcript = Transcript::new();
        transcript
            .append(Turn::seed(prompt))
            .map_err(|e| AgentError::MalformedResponse(e.to_string()))?;
        let reply = self
            .respond(TurnRequest {
                session_id: "summary",
                speaker: summarizer,
                phase: Phase::Concluded,
                transcript: &transcript,
                instructions: "Write the summary now.",
                proposal_kind: ProposalKind::default(),
            })
            .await?;
        Ok(reply.content)
    }
}
