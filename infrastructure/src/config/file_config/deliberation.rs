//! Deliberation configuration from TOML (`[deliberation]` section)

use boardroom_application::DeliberationParams;
use boardroom_domain::DeliberationPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw deliberation configuration from TOML
///
/// Covers both the turn-taking policy and the loop's runtime limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDeliberationConfig {
    pub turn_budget: u64,
    pub sentinel: String,
    pub deadlock_exchanges: usize,
    pub idle_debate_turns: usize,
    pub stall_prompts: usize,
    pub selection_retry_limit: usize,
    pub final_poll_directives: Vec<String>,
    /// Per-turn timeout for the reasoning provider, in seconds
    pub turn_timeout_secs: u64,
    pub turn_retries: usize,
    /// Wall-clock limit per session, in seconds
    pub session_deadline_secs: Option<u64>,
    pub summary_timeout_secs: u64,
    /// Ask the summarizer for prose summaries before judging
    pub summarize: bool,
}

impl Default for FileDeliberationConfig {
    fn default() -> Self {
        let policy = DeliberationPolicy::default();
        let params = DeliberationParams::default();
        Self {
            turn_budget: policy.turn_budget,
            sentinel: policy.sentinel,
            deadlock_exchanges: policy.deadlock_exchanges,
            idle_debate_turns: policy.idle_debate_turns,
            stall_prompts: policy.stall_prompts,
            selection_retry_limit: policy.selection_retry_limit,
            final_poll_directives: policy.final_poll_directives,
            turn_timeout_secs: params.turn_timeout.as_secs(),
            turn_retries: params.turn_retries,
            session_deadline_secs: params.session_deadline.map(|d| d.as_secs()),
            summary_timeout_secs: params.summary_timeout.as_secs(),
            summarize: true,
        }
    }
}

impl FileDeliberationConfig {
    pub fn to_policy(&self) -> DeliberationPolicy {
        DeliberationPolicy::default()
            .with_turn_budget(self.turn_budget)
            .with_sentinel(self.sentinel.clone())
            .with_deadlock_exchanges(self.deadlock_exchanges)
            .with_idle_debate_turns(self.idle_debate_turns)
            .with_stall_prompts(self.stall_prompts)
            .with_selection_retry_limit(self.selection_retry_limit)
            .with_final_poll_directives(self.final_poll_directives.clone())
    }

    pub fn to_params(&self) -> DeliberationParams {
        DeliberationParams::default()
            .with_turn_timeout(Duration::from_secs(self.turn_timeout_secs))
            .with_turn_retries(self.turn_retries)
            .with_session_deadline(self.session_deadline_secs.map(Duration::from_secs))
            .with_summary_timeout(Duration::from_secs(self.summary_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_domain() {
        let config = FileDeliberationConfig::default();
        assert_eq!(config.to_policy(), DeliberationPolicy::default());
        assert_eq!(config.to_params(), DeliberationParams::default());
    }

    #[test]
    fn test_partial_section() {
        let config: FileDeliberationConfig = toml::from_str(
            r#"
turn_budget = 12
turn_timeout_secs = 30
session_deadline_secs = 900
"#,
        )
        .unwrap();

        let policy = config.to_policy();
        assert_eq!(policy.turn_budget, 12);
        assert_eq!(policy.sentinel, "TERMINATE");

        let params = config.to_params();
        assert_eq!(params.turn_timeout, Duration::from_secs(30));
        assert_eq!(params.session_deadline, Some(Duration::from_secs(900)));
    }
}
