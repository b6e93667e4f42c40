//! Deliberation policy - the tunable limits of a session

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Default reserved token whose presence ends a session.
pub const DEFAULT_SENTINEL: &str = "TERMINATE";

/// Tunable rules for one deliberation (Value Object)
///
/// # Example
///
/// ```
/// use boardroom_domain::deliberation::DeliberationPolicy;
///
/// let policy = DeliberationPolicy::default()
///     .with_turn_budget(20)
///     .with_stall_prompts(2);
///
/// assert!(policy.validate().is_ok());
/// assert_eq!(policy.sentinel, "TERMINATE");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliberationPolicy {
    /// Highest sequence number a session may reach (turn 0 is the task)
    pub turn_budget: u64,
    /// Reserved text marker that forces termination
    pub sentinel: String,
    /// Consecutive conflicting exchanges between the same pair before the
    /// mediator may step in
    pub deadlock_exchanges: usize,
    /// Debate turns without a new proposal before the poll starts on its
    /// own (0 disables)
    pub idle_debate_turns: usize,
    /// Poll prompts a voter may answer without a usable proposal before the
    /// session is declared stalled
    pub stall_prompts: usize,
    /// Consecutive selection failures tolerated before giving up
    pub selection_retry_limit: usize,
    /// Phrases in a mediator turn that open the final poll
    pub final_poll_directives: Vec<String>,
}

impl Default for DeliberationPolicy {
    fn default() -> Self {
        Self {
            turn_budget: 30,
            sentinel: DEFAULT_SENTINEL.to_string(),
            deadlock_exchanges: 2,
            idle_debate_turns: 6,
            stall_prompts: 3,
            selection_retry_limit: 3,
            final_poll_directives: vec![
                "FINAL DECISION".to_string(),
                "FINAL VOTE".to_string(),
                "FINAL POLL".to_string(),
            ],
        }
    }
}

impl DeliberationPolicy {
    // ==================== Builder Methods ====================

    pub fn with_turn_budget(mut self, budget: u64) -> Self {
        self.turn_budget = budget;
        self
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    pub fn with_deadlock_exchanges(mut self, exchanges: usize) -> Self {
        self.deadlock_exchanges = exchanges;
        self
    }

    pub fn with_idle_debate_turns(mut self, turns: usize) -> Self {
        self.idle_debate_turns = turns;
        self
    }

    pub fn with_stall_prompts(mut self, prompts: usize) -> Self {
        self.stall_prompts = prompts;
        self
    }

    pub fn with_selection_retry_limit(mut self, limit: usize) -> Self {
        self.selection_retry_limit = limit;
        self
    }

    pub fn with_final_poll_directives(
        mut self,
        directives: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.final_poll_directives = directives.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `content` asks for final decisions.
    pub fn is_final_poll_directive(&self, content: &str) -> bool {
        let upper = content.to_uppercase();
        self.final_poll_directives
            .iter()
            .any(|d| !d.is_empty() && upper.contains(&d.to_uppercase()))
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.turn_budget == 0 {
            return Err(DomainError::InvalidPolicy(
                "turn_budget must be at least 1".to_string(),
            ));
        }
        if self.sentinel.trim().is_empty() {
            return Err(DomainError::InvalidPolicy(
                "sentinel must not be blank".to_string(),
            ));
        }
        if self.stall_prompts == 0 {
            return Err(DomainError::InvalidPolicy(
                "stall_prompts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let policy = DeliberationPolicy::default();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.turn_budget, 30);
        assert_eq!(policy.deadlock_exchanges, 2);
    }

    #[test]
    fn test_directive_detection_is_case_insensitive() {
        let policy = DeliberationPolicy::default();
        assert!(policy.is_final_poll_directive("Everyone, give your final decision now."));
        assert!(!policy.is_final_poll_directive("Let's keep debating."));
    }

    #[test]
    fn test_validate_rejects_zero_budget_and_blank_sentinel() {
        assert!(
            DeliberationPolicy::default()
                .with_turn_budget(0)
                .validate()
                .is_err()
        );
        assert!(
            DeliberationPolicy::default()
                .with_sentinel("  ")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let policy: DeliberationPolicy =
            serde_json::from_str(r#"{"turn_budget": 12}"#).unwrap();
        assert_eq!(policy.turn_budget, 12);
        assert_eq!(policy.sentinel, DEFAULT_SENTINEL);
    }
}
