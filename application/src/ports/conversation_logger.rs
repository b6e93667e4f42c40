//! Port for structured conversation logging.
//!
//! Separate from `tracing`: tracing carries human-readable diagnostics,
//! while this port records every deliberation event in a machine-readable
//! form (one JSON object per event).

use serde_json::Value;

/// Event type names written by the deliberation loop.
pub mod events {
    pub const SESSION_STARTED: &str = "session_started";
    pub const SPEAKER_SELECTED: &str = "speaker_selected";
    pub const TURN: &str = "turn";
    pub const PHASE_TRANSITION: &str = "phase_transition";
    pub const TURN_RETRY: &str = "turn_retry";
    pub const SELECTION_FALLBACK: &str = "selection_fallback";
    pub const SESSION_CONCLUDED: &str = "session_concluded";
}

/// A structured deliberation event.
pub struct ConversationEvent {
    /// Event type identifier, one of [`events`].
    pub event_type: &'static str,
    /// Event-specific fields.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Sink for conversation events.
///
/// `log` is synchronous and infallible: a failing log must never disturb
/// the deliberation.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
