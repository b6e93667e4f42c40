//! Session result - the final record of a concluded deliberation

use super::consensus::VoterProposal;
use super::phase::PhaseTransition;
use super::termination::TerminationReason;
use super::transcript::Transcript;
use crate::participant::Participant;
use crate::util::ellipsize;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Outcome of one session, handed to the persistence sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub session_id: String,
    pub task: String,
    pub participants: Vec<Participant>,
    pub reason: TerminationReason,
    /// Present only when `reason` is `ConsensusReached`
    pub agreed_value: Option<f64>,
    /// Last usable final-poll proposal per voting participant
    pub final_proposals: Vec<VoterProposal>,
    pub phase_history: Vec<PhaseTransition>,
    pub transcript: Transcript,
}

impl SessionResult {
    pub fn is_agreement(&self) -> bool {
        self.reason.is_agreement()
    }

    /// Number of turns produced by participants (the seed is excluded).
    pub fn turn_count(&self) -> usize {
        self.transcript.len().saturating_sub(1)
    }

    pub fn degraded_turns(&self) -> usize {
        self.transcript.iter().filter(|t| t.is_degraded()).count()
    }

    /// Deterministic plain-text summary.
    ///
    /// Used where a prose summary is unavailable, e.g. in a judging task.
    pub fn digest(&self, max_turn_chars: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Session {} ended: {} after {} turns.",
            self.session_id,
            self.reason.display_name(),
            self.turn_count()
        );
        match self.agreed_value {
            Some(value) => {
                let _ = writeln!(out, "Agreed value: {value}");
            }
            None => {
                let _ = writeln!(out, "No agreed value.");
            }
        }

        if !self.final_proposals.is_empty() {
            let _ = writeln!(out, "Final proposals:");
            for entry in &self.final_proposals {
                match &entry.proposal {
                    Some(p) => {
                        let _ = write!(out, "- {}: {}", entry.participant, p.value);
                        if let Some(rationale) = &p.rationale {
                            let _ = write!(out, " ({})", ellipsize(rationale, max_turn_chars));
                        }
                        out.push('\n');
                    }
                    None => {
                        let _ = writeln!(out, "- {}: none", entry.participant);
                    }
                }
            }
        }

        let closing: Vec<_> = self
            .transcript
            .iter()
            .rev()
            .filter(|t| !t.is_seed() && !t.is_degraded())
            .take(3)
            .collect();
        if !closing.is_empty() {
            let _ = writeln!(out, "Closing remarks:");
            for turn in closing.into_iter().rev() {
                let _ = writeln!(
                    out,
                    "- {}: {}",
                    turn.speaker,
                    ellipsize(turn.content.trim(), max_turn_chars)
                );
            }
        }
        out
    }
}
