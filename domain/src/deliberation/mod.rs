//! Deliberation domain
//!
//! The rules that drive a multi-party discussion to a decision:
//!
//! - [`Transcript`]: append-only, strictly ordered log of [`Turn`]s
//! - [`PhaseMachine`]: Opening → Debate → FinalPoll → Concluded
//! - [`ConsensusTracker`]: agreement among the voting set, derived from the transcript
//! - [`SpeakerSelector`]: who speaks next
//! - [`TerminationDetector`]: when the loop must stop, and why
//! - [`Session`]: aggregate owning all of the above for one deliberation
//!
//! Everything here is synchronous and free of I/O; the orchestrator loop in
//! the application layer drives it.

pub mod consensus;
pub mod phase;
pub mod policy;
pub mod result;
pub mod selector;
pub mod session;
pub mod termination;
pub mod transcript;
pub mod turn;

pub use consensus::{ConsensusState, ConsensusTracker, VoterProposal};
pub use phase::{Phase, PhaseMachine, PhaseSignals, PhaseTransition, TransitionTrigger};
pub use policy::{DEFAULT_SENTINEL, DeliberationPolicy};
pub use result::SessionResult;
pub use selector::{Selection, SelectionError, SelectionRule, SpeakerSelector};
pub use session::Session;
pub use termination::{TerminationDetector, TerminationReason};
pub use transcript::Transcript;
pub use turn::{Proposal, ProposalKind, TASK_SPEAKER, ToolInvocation, Turn, TurnStatus};
