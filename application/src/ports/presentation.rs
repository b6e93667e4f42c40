//! Presentation sink port
//!
//! Receives every appended turn as the loop runs. Calls are fire-and-forget:
//! implementations must return quickly and never fail the loop.

use boardroom_domain::{Participant, ParticipantRegistry, Phase, PhaseTransition, SessionResult, Turn};

/// Callback for live session output
///
/// Implementations live in the presentation layer (console, progress bars,
/// web UI). Several sessions may share one sink, so every hook carries the
/// session id.
pub trait PresentationSink: Send + Sync {
    /// Called once per appended turn, before the next speaker is selected
    fn emit(&self, session_id: &str, turn: &Turn);

    fn on_session_start(&self, _session_id: &str, _registry: &ParticipantRegistry) {}

    fn on_speaker_selected(&self, _session_id: &str, _speaker: &Participant, _phase: Phase) {}

    fn on_phase_transition(&self, _session_id: &str, _transition: &PhaseTransition) {}

    fn on_session_end(&self, _result: &SessionResult) {}
}

/// No-op sink for tests and quiet runs
pub struct NoPresentation;

impl PresentationSink for NoPresentation {
    fn emit(&self, _session_id: &str, _turn: &Turn) {}
}
