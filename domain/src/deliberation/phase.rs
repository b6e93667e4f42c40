//! Phase state machine
//!
//! ```text
//! Opening ──(opening order exhausted)──▶ Debate
//! Debate ──(mediator directive | idle debate | selection exhausted)──▶ FinalPoll
//! FinalPoll ──(no agreement yet)──▶ FinalPoll
//! any non-terminal ──(consensus | stall | sentinel | budget | deadline)──▶ Concluded
//! ```
//!
//! `Concluded` is terminal. Every transition is recorded with the sequence
//! number at which it happened, so a finished session can be replayed.

use super::termination::TerminationReason;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Phase of a deliberation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Fixed-order presentations, one per participant in the opening order
    Opening,
    /// Free debate driven by the speaker selection rules
    Debate,
    /// Every voting participant submits a final proposal
    FinalPoll,
    /// Terminal; no further turns are accepted
    Concluded,
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Opening => "opening",
            Phase::Debate => "debate",
            Phase::FinalPoll => "final_poll",
            Phase::Concluded => "concluded",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Phase::Opening => "Opening Statements",
            Phase::Debate => "Debate",
            Phase::FinalPoll => "Final Poll",
            Phase::Concluded => "Concluded",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Concluded)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Why a phase transition happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "trigger", content = "reason", rename_all = "snake_case")]
pub enum TransitionTrigger {
    /// Every participant in the opening order has spoken
    OpeningComplete,
    /// The mediator asked for final decisions
    MediatorDirective,
    /// Too many debate turns passed without a new proposal
    DebateIdle,
    /// Speaker selection kept failing; the poll is forced
    SelectionExhausted,
    /// The session ended
    Concluded(TerminationReason),
}

impl TransitionTrigger {
    /// Phase this trigger leads to.
    pub fn target(&self) -> Phase {
        match self {
            TransitionTrigger::OpeningComplete => Phase::Debate,
            TransitionTrigger::MediatorDirective
            | TransitionTrigger::DebateIdle
            | TransitionTrigger::SelectionExhausted => Phase::FinalPoll,
            TransitionTrigger::Concluded(_) => Phase::Concluded,
        }
    }
}

/// A single recorded phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: Phase,
    pub to: Phase,
    /// First sequence number that belongs to the new phase
    pub at_sequence: u64,
    pub trigger: TransitionTrigger,
}

/// Observations the machine needs to decide on the next transition.
///
/// Computed by the session from its transcript, registry and consensus
/// state after every appended turn.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseSignals {
    pub opening_exhausted: bool,
    pub mediator_directive: bool,
    pub idle_debate_turns: usize,
    pub consensus_agreed: bool,
    pub stalled: bool,
}

fn is_legal_transition(from: Phase, to: Phase) -> bool {
    if to == Phase::Concluded && !from.is_terminal() {
        return true;
    }
    matches!(
        (from, to),
        (Phase::Opening, Phase::Debate) | (Phase::Debate, Phase::FinalPoll)
    )
}

/// Tracks the current phase and the full transition history.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseMachine {
    current: Phase,
    entered_at: u64,
    history: Vec<PhaseTransition>,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self {
            current: Phase::Opening,
            entered_at: 0,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> Phase {
        self.current
    }

    /// Sequence number at which the current phase started.
    pub fn entered_at(&self) -> u64 {
        self.entered_at
    }

    pub fn history(&self) -> &[PhaseTransition] {
        &self.history
    }

    /// Termination reason recorded by the concluding transition.
    pub fn conclusion(&self) -> Option<TerminationReason> {
        self.history.iter().rev().find_map(|t| match t.trigger {
            TransitionTrigger::Concluded(reason) => Some(reason),
            _ => None,
        })
    }

    /// Decide the next transition, if any, from the current observations.
    ///
    /// `idle_limit` is the number of proposal-free debate turns after which
    /// the poll starts on its own.
    pub fn next_transition(
        &self,
        signals: &PhaseSignals,
        idle_limit: usize,
    ) -> Option<TransitionTrigger> {
        match self.current {
            Phase::Opening if signals.opening_exhausted => Some(TransitionTrigger::OpeningComplete),
            Phase::Opening => None,
            Phase::Debate if signals.mediator_directive => {
                Some(TransitionTrigger::MediatorDirective)
            }
            Phase::Debate if idle_limit > 0 && signals.idle_debate_turns >= idle_limit => {
                Some(TransitionTrigger::DebateIdle)
            }
            Phase::Debate => None,
            Phase::FinalPoll if signals.consensus_agreed => Some(TransitionTrigger::Concluded(
                TerminationReason::ConsensusReached,
            )),
            Phase::FinalPoll if signals.stalled => {
                Some(TransitionTrigger::Concluded(TerminationReason::Stalled))
            }
            Phase::FinalPoll | Phase::Concluded => None,
        }
    }

    /// Apply a transition starting at `at_sequence`.
    pub fn advance(
        &mut self,
        trigger: TransitionTrigger,
        at_sequence: u64,
    ) -> Result<PhaseTransition, DomainError> {
        let to = trigger.target();
        if !is_legal_transition(self.current, to) {
            return Err(DomainError::IllegalTransition {
                from: self.current.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }

        let transition = PhaseTransition {
            from: self.current,
            to,
            at_sequence,
            trigger,
        };
        self.current = to;
        self.entered_at = at_sequence;
        self.history.push(transition);
        Ok(transition)
    }
}
