//! Domain layer for boardroom
//!
//! This crate contains the core deliberation rules, entities, and value
//! objects. It has no dependencies on infrastructure or presentation
//! concerns, and nothing in it performs I/O.
//!
//! # Core Concepts
//!
//! ## Deliberation
//!
//! A fixed roster of participants exchanges turns until every voting
//! participant proposes the same number, or a limit ends the session:
//!
//! - **Opening**: each participant in the opening order speaks once
//! - **Debate**: rule-based speaker selection, mediator arbitration
//! - **Final Poll**: voters submit structured proposals until they agree
//!
//! ## Termination
//!
//! Every session ends with a [`TerminationReason`]; only
//! `ConsensusReached` carries an agreed value.

pub mod config;
pub mod core;
pub mod deliberation;
pub mod participant;
pub mod prompt;
pub mod roster;
pub mod util;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::error::DomainError;
pub use deliberation::{
    ConsensusState, ConsensusTracker, DeliberationPolicy, Phase, PhaseMachine, PhaseTransition,
    Proposal, ProposalKind, SelectionError, SelectionRule, Session, SessionResult, SpeakerSelector,
    TerminationDetector, TerminationReason, ToolInvocation, Transcript, TransitionTrigger, Turn,
    TurnStatus, VoterProposal,
};
pub use participant::{Participant, ParticipantRegistry, Role};
pub use prompt::{PromptTemplate, SUBMIT_PROPOSAL_TOOL};
