//! Deliberation loop parameters.
//!
//! [`DeliberationParams`] groups the runtime limits of the orchestrator
//! loop in [`RunDeliberationUseCase`](crate::use_cases::run_deliberation::RunDeliberationUseCase).
//! Turn-taking rules live in the domain's `DeliberationPolicy`; these are
//! application concerns (timeouts, retries, wall clock).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime limits for one deliberation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliberationParams {
    /// Timeout for a single reasoning call.
    pub turn_timeout: Duration,
    /// Extra attempts for the same speaker after a failed or timed-out call.
    pub turn_retries: usize,
    /// Wall-clock limit for the whole session; expiry concludes with `NoConsensus`.
    pub session_deadline: Option<Duration>,
    /// Timeout for a summary request in the comparison workflow.
    pub summary_timeout: Duration,
}

impl Default for DeliberationParams {
    fn default() -> Self {
        Self {
            turn_timeout: Duration::from_secs(600),
            turn_retries: 1,
            session_deadline: None,
            summary_timeout: Duration::from_secs(120),
        }
    }
}

impl DeliberationParams {
    // ==================== Builder Methods ====================

    pub fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout = timeout;
        self
    }

    pub fn with_turn_retries(mut self, retries: usize) -> Self {
        self.turn_retries = retries;
        self
    }

    pub fn with_session_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.session_deadline = deadline;
        self
    }

    pub fn with_summary_timeout(mut self, timeout: Duration) -> Self {
        self.summary_timeout = timeout;
        self
    }

    /// Total attempts per turn (first call plus retries).
    pub fn attempts_per_turn(&self) -> usize {
        self.turn_retries + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = DeliberationParams::default();
        assert_eq!(params.turn_timeout, Duration::from_secs(600));
        assert_eq!(params.turn_retries, 1);
        assert_eq!(params.attempts_per_turn(), 2);
        assert!(params.session_deadline.is_none());
    }

    #[test]
    fn test_builder() {
        let params = DeliberationParams::default()
            .with_turn_timeout(Duration::from_secs(5))
            .with_turn_retries(0)
            .with_session_deadline(Some(Duration::from_secs(60)));

        assert_eq!(params.turn_timeout, Duration::from_secs(5));
        assert_eq!(params.attempts_per_turn(), 1);
        assert_eq!(params.session_deadline, Some(Duration::from_secs(60)));
    }
}
