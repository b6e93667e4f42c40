//! Consensus tracking over the final-poll window
//!
//! Consensus is derived, never stored: every call recomputes it from the
//! transcript, so it cannot drift from what was actually said.

use super::transcript::Transcript;
use super::turn::{Proposal, Turn};
use crate::participant::ParticipantRegistry;
use serde::{Deserialize, Serialize};

/// Latest usable proposal of one voting participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoterProposal {
    pub participant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal: Option<Proposal>,
}

/// Snapshot of agreement among the voting set
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConsensusState {
    /// One entry per voting participant, in registry order
    pub proposals: Vec<VoterProposal>,
    pub agreed: bool,
    pub agreed_value: Option<f64>,
}

impl ConsensusState {
    /// Voting participants without a usable proposal.
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.proposals
            .iter()
            .filter(|p| p.proposal.is_none())
            .map(|p| p.participant.as_str())
    }

    /// Distinct proposed values, in first-seen order.
    pub fn distinct_values(&self) -> Vec<f64> {
        let mut values: Vec<f64> = Vec::new();
        for value in self.proposals.iter().filter_map(|p| p.proposal.as_ref()).map(|p| p.value) {
            if !values.contains(&value) {
                values.push(value);
            }
        }
        values
    }
}

/// Pure functions from transcript + registry to [`ConsensusState`].
pub struct ConsensusTracker;

impl ConsensusTracker {
    /// Consensus for the final-poll window starting at `final_poll_start`.
    ///
    /// Without a final-poll window nobody has voted yet, so the state is
    /// never agreed.
    pub fn update(
        transcript: &Transcript,
        registry: &ParticipantRegistry,
        final_poll_start: Option<u64>,
    ) -> ConsensusState {
        match final_poll_start {
            Some(start) => Self::from_turns(transcript.since(start), registry),
            None => Self::from_turns(&[], registry),
        }
    }

    /// Consensus over an arbitrary slice of turns.
    ///
    /// Each voter's last well-formed proposal in `turns` counts; malformed
    /// proposals are ignored rather than treated as agreement.
    pub fn from_turns(turns: &[Turn], registry: &ParticipantRegistry) -> ConsensusState {
        let proposals: Vec<VoterProposal> = registry
            .voting_set()
            .into_iter()
            .map(|voter| VoterProposal {
                participant: voter.name().to_string(),
                proposal: turns
                    .iter()
                    .rev()
                    .filter(|t| t.speaker == voter.name())
                    .find_map(|t| t.valid_proposal())
                    .cloned(),
            })
            .collect();

        let mut values = proposals.iter().map(|p| p.proposal.as_ref());
        let first = values.next().flatten();
        let agreed = match first {
            Some(first) => values.all(|p| p.is_some_and(|p| p.agrees_with(first))),
            None => false,
        };
        let agreed_value = if agreed { first.map(|p| p.value) } else { None };

        ConsensusState {
            proposals,
            agreed,
            agreed_value,
        }
    }

    /// First voting participant (registry order) that has been prompted at
    /// least `stall_prompts` times in `turns` without a usable proposal.
    ///
    /// Degraded turns count as prompts.
    pub fn stalled_participant<'a>(
        turns: &[Turn],
        registry: &'a ParticipantRegistry,
        stall_prompts: usize,
    ) -> Option<&'a str> {
        registry
            .voting_set()
            .into_iter()
            .find(|voter| {
                let mut prompts = 0;
                for turn in turns.iter().filter(|t| t.speaker == voter.name()) {
                    if turn.valid_proposal().is_some() {
                        return false;
                    }
                    prompts += 1;
                }
                prompts >= stall_prompts
            })
            .map(|voter| voter.name())
    }
}
