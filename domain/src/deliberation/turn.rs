//! Turn value objects - one immutable unit of discussion output

use super::phase::Phase;
use crate::participant::{Participant, Role};
use crate::util::current_timestamp;
use serde::{Deserialize, Serialize};

/// Speaker name used for the seeded task turn.
pub const TASK_SPEAKER: &str = "user";

/// Structured numeric proposal attached to a turn
///
/// For investment houses `value` is the allocation percentage of the
/// budget; judging panels use it as a verdict code (winning house number,
/// `0` for a tie). Proposals are supplied through the reasoning provider's
/// structured tool call, never scraped from prose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl Proposal {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            rationale: None,
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    /// A finite value in `0..=100`.
    pub fn is_well_formed(&self) -> bool {
        self.value.is_finite() && (0.0..=100.0).contains(&self.value)
    }

    /// Exact numeric agreement; no tolerance band.
    pub fn agrees_with(&self, other: &Proposal) -> bool {
        self.value == other.value
    }
}

/// What the number in a [`Proposal`] means for a given roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    /// Percentage of the budget to invest, `0..=100`
    #[default]
    Allocation,
    /// Number of the better house, `0` for a tie
    Verdict,
}

impl ProposalKind {
    /// Argument name of the value in the structured proposal call.
    pub fn argument(&self) -> &'static str {
        match self {
            ProposalKind::Allocation => "percent",
            ProposalKind::Verdict => "house",
        }
    }

    /// What the participant is asked to supply.
    pub fn request(&self) -> &'static str {
        match self {
            ProposalKind::Allocation => "the percentage of the budget (0-100) you propose to invest",
            ProposalKind::Verdict => {
                "the number of the house that did better (1 or 2), or 0 for a tie"
            }
        }
    }

    /// Human-readable value, e.g. `20%` or `house 2`.
    pub fn describe(&self, value: f64) -> String {
        match self {
            ProposalKind::Allocation => format!("{value}%"),
            ProposalKind::Verdict if value == 0.0 => "a tie".to_string(),
            ProposalKind::Verdict => format!("house {value}"),
        }
    }
}

/// Record of one external tool call made while producing a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
    pub output: String,
    pub succeeded: bool,
}

impl ToolInvocation {
    pub fn success(
        name: impl Into<String>,
        arguments: serde_json::Value,
        output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            arguments,
            output: output.into(),
            succeeded: true,
        }
    }

    pub fn failure(
        name: impl Into<String>,
        arguments: serde_json::Value,
        error: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            arguments,
            output: error.into(),
            succeeded: false,
        }
    }
}

/// How a turn came to be
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnStatus {
    /// The reasoning provider answered normally
    Completed,
    /// The provider failed even after a retry; content is a placeholder
    Degraded { error: String },
}

/// One produced message (Value Object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub sequence: u64,
    pub speaker: String,
    /// `None` only for the seeded task turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub phase: Phase,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal: Option<Proposal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_invocations: Vec<ToolInvocation>,
    pub status: TurnStatus,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl Turn {
    /// Turn produced by a participant.
    pub fn new(
        sequence: u64,
        speaker: &Participant,
        phase: Phase,
        content: impl Into<String>,
    ) -> Self {
        Self {
            sequence,
            speaker: speaker.name().to_string(),
            role: Some(speaker.role()),
            phase,
            content: content.into(),
            proposal: None,
            tool_invocations: Vec::new(),
            status: TurnStatus::Completed,
            timestamp: current_timestamp(),
        }
    }

    /// Turn 0: the task description that opens every session.
    pub fn seed(task: impl Into<String>) -> Self {
        Self {
            sequence: 0,
            speaker: TASK_SPEAKER.to_string(),
            role: None,
            phase: Phase::Opening,
            content: task.into(),
            proposal: None,
            tool_invocations: Vec::new(),
            status: TurnStatus::Completed,
            timestamp: current_timestamp(),
        }
    }

    /// Placeholder turn recorded when the provider gave no usable answer.
    pub fn degraded(
        sequence: u64,
        speaker: &Participant,
        phase: Phase,
        error: impl Into<String>,
    ) -> Self {
        let error = error.into();
        let mut turn = Self::new(
            sequence,
            speaker,
            phase,
            format!("(no response from {}: {})", speaker.name(), error),
        );
        turn.status = TurnStatus::Degraded { error };
        turn
    }

    pub fn with_proposal(mut self, proposal: Proposal) -> Self {
        self.proposal = Some(proposal);
        self
    }

    pub fn with_tool_invocations(mut self, invocations: Vec<ToolInvocation>) -> Self {
        self.tool_invocations = invocations;
        self
    }

    pub fn is_seed(&self) -> bool {
        self.role.is_none()
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.status, TurnStatus::Degraded { .. })
    }

    /// The proposal, if present and well formed.
    pub fn valid_proposal(&self) -> Option<&Proposal> {
        self.proposal.as_ref().filter(|p| p.is_well_formed())
    }

    pub fn contains(&self, token: &str) -> bool {
        !token.is_empty() && self.content.contains(token)
    }
}
