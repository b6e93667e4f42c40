//! Application layer for boardroom
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::DeliberationParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    presentation::{NoPresentation, PresentationSink},
    reasoning_agent::{AgentError, AgentReply, ReasoningAgent, TurnRequest},
    session_store::{SessionStore, StoreError},
};
pub use use_cases::run_comparison::{
    ComparisonResult, HouseOutcome, RunComparisonError, RunComparisonInput, RunComparisonUseCase,
    SummarySource, Verdict,
};
pub use use_cases::run_deliberation::{
    RunDeliberationError, RunDeliberationInput, RunDeliberationUseCase,
};
