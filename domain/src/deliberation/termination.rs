//! Termination detection

use super::session::Session;
use serde::{Deserialize, Serialize};

/// Why a session ended
///
/// Callers must branch on this value: only [`ConsensusReached`] means the
/// voting participants actually agreed.
///
/// [`ConsensusReached`]: TerminationReason::ConsensusReached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Every voting participant submitted the same value
    ConsensusReached,
    /// The sentinel token appeared before agreement
    Sentinel,
    /// The turn budget ran out
    BudgetExhausted,
    /// The wall-clock deadline expired without agreement
    NoConsensus,
    /// A voting participant never produced a usable proposal, or no speaker
    /// could be selected
    Stalled,
}

impl TerminationReason {
    pub fn as_str(&self) -> &str {
        match self {
            TerminationReason::ConsensusReached => "consensus_reached",
            TerminationReason::Sentinel => "sentinel",
            TerminationReason::BudgetExhausted => "budget_exhausted",
            TerminationReason::NoConsensus => "no_consensus",
            TerminationReason::Stalled => "stalled",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            TerminationReason::ConsensusReached => "Consensus reached",
            TerminationReason::Sentinel => "Stopped by sentinel",
            TerminationReason::BudgetExhausted => "Turn budget exhausted",
            TerminationReason::NoConsensus => "No consensus before deadline",
            TerminationReason::Stalled => "Stalled",
        }
    }

    pub fn is_agreement(&self) -> bool {
        matches!(self, TerminationReason::ConsensusReached)
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decides whether the orchestrator loop must stop.
///
/// Checked after the phase machine has advanced, so agreement detected by
/// the consensus tracker always wins over a budget cutoff on the same turn.
#[derive(Debug, Clone)]
pub struct TerminationDetector {
    sentinel: String,
    turn_budget: u64,
}

impl TerminationDetector {
    pub fn new(sentinel: impl Into<String>, turn_budget: u64) -> Self {
        Self {
            sentinel: sentinel.into(),
            turn_budget,
        }
    }

    pub fn for_session(session: &Session) -> Self {
        let policy = session.policy();
        Self::new(policy.sentinel.clone(), policy.turn_budget)
    }

    pub fn should_stop(&self, session: &Session) -> Option<TerminationReason> {
        if session.phase().is_terminal() {
            return session.conclusion();
        }

        let transcript = session.transcript();
        if let Some(last) = transcript.last()
            && !last.is_seed()
            && last.contains(&self.sentinel)
        {
            return Some(if session.consensus().agreed {
                TerminationReason::ConsensusReached
            } else {
                TerminationReason::Sentinel
            });
        }

        let last_sequence = transcript.last().map(|t| t.sequence).unwrap_or(0);
        if last_sequence >= self.turn_budget {
            return Some(TerminationReason::BudgetExhausted);
        }

        None
    }
}
