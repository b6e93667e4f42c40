//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// These are raised while assembling a session (roster validation, policy
/// validation) or when an invariant of the transcript / phase machine would
/// be broken. Ordinary deliberation outcomes are never errors; see
/// [`TerminationReason`](crate::deliberation::termination::TerminationReason).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Roster has no participants")]
    EmptyRoster,

    #[error("Duplicate participant name: {0}")]
    DuplicateParticipant(String),

    #[error("Roster has no voting participants")]
    EmptyVotingSet,

    #[error("Roster has more than one mediator: {0} and {1}")]
    MultipleMediators(String, String),

    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Invalid deliberation policy: {0}")]
    InvalidPolicy(String),

    #[error("Turn sequence out of order: expected {expected}, got {got}")]
    SequenceOutOfOrder { expected: u64, got: u64 },

    #[error("Session {0} is concluded and accepts no further turns")]
    SessionConcluded(String),

    #[error("Session {0} has not concluded yet")]
    SessionNotConcluded(String),

    #[error("Illegal phase transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },
}
