//! Transcript - append-only ordered log of turns

use super::phase::Phase;
use super::turn::Turn;
use crate::core::error::DomainError;
use crate::util::ellipsize;
use serde::{Deserialize, Serialize};

/// Ordered sequence of turns for one session (Entity)
///
/// The single source of truth for speaker selection, consensus and
/// termination. Turns can only be appended, with sequence numbers that
/// start at 0 and increase by exactly one; existing turns are never
/// exposed mutably.
///
/// Deserialization re-validates the ordering, so a persisted transcript
/// read back from disk carries the same guarantee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Turn>", into = "Vec<Turn>")]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Sequence number the next appended turn must carry.
    pub fn next_sequence(&self) -> u64 {
        self.turns.len() as u64
    }

    pub fn append(&mut self, turn: Turn) -> Result<&Turn, DomainError> {
        let expected = self.next_sequence();
        if turn.sequence != expected {
            return Err(DomainError::SequenceOutOfOrder {
                expected,
                got: turn.sequence,
            });
        }
        self.turns.push(turn);
        Ok(&self.turns[self.turns.len() - 1])
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn get(&self, sequence: u64) -> Option<&Turn> {
        self.turns.get(usize::try_from(sequence).ok()?)
    }

    /// Turns with a sequence number of at least `sequence`.
    pub fn since(&self, sequence: u64) -> &[Turn] {
        let start = usize::try_from(sequence)
            .unwrap_or(usize::MAX)
            .min(self.turns.len());
        &self.turns[start..]
    }

    /// Turns recorded during `phase`, in order.
    pub fn in_phase(&self, phase: Phase) -> impl Iterator<Item = &Turn> {
        self.turns.iter().filter(move |t| t.phase == phase)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The seeded task description (turn 0).
    pub fn task(&self) -> Option<&str> {
        self.turns
            .first()
            .filter(|t| t.is_seed())
            .map(|t| t.content.as_str())
    }

    /// Plain-text rendering, one `[speaker]: content` block per turn.
    ///
    /// Each turn's content is capped at `max_turn_chars` bytes.
    pub fn render(&self, max_turn_chars: usize) -> String {
        self.turns
            .iter()
            .map(|t| format!("[{}]: {}", t.speaker, ellipsize(t.content.trim(), max_turn_chars)))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl TryFrom<Vec<Turn>> for Transcript {
    type Error = DomainError;

    fn try_from(turns: Vec<Turn>) -> Result<Self, Self::Error> {
        let mut transcript = Transcript::new();
        for turn in turns {
            transcript.append(turn)?;
        }
        Ok(transcript)
    }
}

impl From<Transcript> for Vec<Turn> {
    fn from(transcript: Transcript) -> Self {
        transcript.turns
    }
}
