//! Run Comparison use case
//!
//! Runs two investment houses on the same task, then lets a judging panel
//! decide which house did better:
//!
//! ```text
//! house-1 ──┐
//!           ├─▶ summaries ─▶ judging session ─▶ ComparisonResult
//! house-2 ──┘
//! ```
//!
//! The houses run as separate tasks and share nothing but the agent. Each
//! finished session goes to the configured `SessionStore` before judging
//! starts, so judges can look transcripts up by session id.

use crate::ports::reasoning_agent::ReasoningAgent;
use crate::use_cases::run_deliberation::{
    RunDeliberationError, RunDeliberationInput, RunDeliberationUseCase,
};
use boardroom_domain::{
    DeliberationPolicy, DomainError, ParticipantRegistry, PromptTemplate, SessionResult, roster,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Per-turn cap when rendering a transcript for the summarizer.
const SUMMARY_TURN_CHARS: usize = 2000;
/// Per-turn cap for the deterministic digest fallback.
const DIGEST_TURN_CHARS: usize = 400;

/// Errors that can occur during a comparison
#[derive(Error, Debug)]
pub enum RunComparisonError {
    #[error("Invalid roster: {0}")]
    Roster(#[from] DomainError),

    #[error("House {session_id} failed: {source}")]
    House {
        session_id: String,
        #[source]
        source: RunDeliberationError,
    },

    #[error("Judging failed: {0}")]
    Judging(#[source] RunDeliberationError),

    #[error("House task failed: {0}")]
    TaskFailed(String),
}

/// Input for the RunComparison use case
#[derive(Debug, Clone)]
pub struct RunComparisonInput {
    pub symbols: Vec<String>,
    pub budget: f64,
    /// Houses decide with data up to this year
    pub start_year: i32,
    /// Judges evaluate with data up to this year
    pub end_year: i32,
    /// Reference prices quoted in the house task
    pub prices: Vec<(String, f64)>,
    pub house_ids: [String; 2],
    pub judging_id: String,
    pub house_policy: DeliberationPolicy,
    pub judging_policy: DeliberationPolicy,
    /// Roster override; defaults to [`roster::investment_house`]
    pub house_roster: Option<ParticipantRegistry>,
    /// Roster override; defaults to [`roster::judging_panel`]
    pub judging_roster: Option<ParticipantRegistry>,
    /// Ask the summarizer for prose summaries before judging
    pub summarize: bool,
}

impl RunComparisonInput {
    pub fn new(symbols: Vec<String>, budget: f64, start_year: i32, end_year: i32) -> Self {
        Self {
            symbols,
            budget,
            start_year,
            end_year,
            prices: Vec::new(),
            house_ids: ["house-1".to_string(), "house-2".to_string()],
            judging_id: "judging".to_string(),
            house_policy: DeliberationPolicy::default(),
            judging_policy: DeliberationPolicy::default(),
            house_roster: None,
            judging_roster: None,
            summarize: true,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_prices(mut self, prices: Vec<(String, f64)>) -> Self {
        self.prices = prices;
        self
    }

    pub fn with_session_ids(
        mut self,
        house_ids: [String; 2],
        judging_id: impl Into<String>,
    ) -> Self {
        self.house_ids = house_ids;
        self.judging_id = judging_id.into();
        self
    }

    pub fn with_house_policy(mut self, policy: DeliberationPolicy) -> Self {
        self.house_policy = policy;
        self
    }

    pub fn with_judging_policy(mut self, policy: DeliberationPolicy) -> Self {
        self.judging_policy = policy;
        self
    }

    pub fn with_house_roster(mut self, registry: ParticipantRegistry) -> Self {
        self.house_roster = Some(registry);
        self
    }

    pub fn with_judging_roster(mut self, registry: ParticipantRegistry) -> Self {
        self.judging_roster = Some(registry);
        self
    }

    pub fn with_summaries(mut self, summarize: bool) -> Self {
        self.summarize = summarize;
        self
    }
}

/// Where a house summary came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    /// Prose written by the summarizer participant
    Agent,
    /// Deterministic digest of the session result
    Digest,
}

/// One house's session together with the summary shown to the judges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseOutcome {
    pub result: SessionResult,
    pub summary: String,
    pub summary_source: SummarySource,
}

/// The judges' decision, read from the judging session's agreed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "house")]
pub enum Verdict {
    /// 1-based house number
    House(usize),
    Tie,
    /// Judges did not agree, or agreed on a value that names no house
    Undecided,
}

impl Verdict {
    pub fn from_agreed_value(value: Option<f64>, houses: usize) -> Self {
        match value {
            Some(v) if v == 0.0 => Verdict::Tie,
            Some(v) if v.fract() == 0.0 && v >= 1.0 && v <= houses as f64 => {
                Verdict::House(v as usize)
            }
            _ => Verdict::Undecided,
        }
    }
}

/// Output of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub houses: Vec<HouseOutcome>,
    pub judging: SessionResult,
    pub verdict: Verdict,
}

impl ComparisonResult {
    /// Session id of the winning house, if there is one.
    pub fn winner(&self) -> Option<&str> {
        match self.verdict {
            Verdict::House(n) => self
                .houses
                .get(n - 1)
                .map(|h| h.result.session_id.as_str()),
            _ => None,
        }
    }
}

/// Use case for comparing two investment houses
pub struct RunComparisonUseCase<A: ReasoningAgent + 'static> {
    deliberation: RunDeliberationUseCase<A>,
}

impl<A: ReasoningAgent + 'static> RunComparisonUseCase<A> {
    /// Build on a configured deliberation use case; its store, sinks and
    /// params apply to every session of the comparison.
    pub fn new(deliberation: RunDeliberationUseCase<A>) -> Self {
        Self { deliberation }
    }

    pub async fn execute(
        &self,
        input: RunComparisonInput,
    ) -> Result<ComparisonResult, RunComparisonError> {
        let house_roster = match input.house_roster.clone() {
            Some(registry) => registry,
            None => roster::investment_house()?,
        };
        let judging_roster = match input.judging_roster.clone() {
            Some(registry) => registry,
            None => roster::judging_panel(input.start_year, input.end_year)?,
        };

        let task = PromptTemplate::investment_task(
            &input.symbols,
            input.budget,
            input.start_year,
            &input.prices,
        );
        info!(
            "Starting comparison of {} and {} on {}",
            input.house_ids[0],
            input.house_ids[1],
            input.symbols.join(", ")
        );

        let results = self
            .run_houses(&input, house_roster, task)
            .await?;

        let houses = if input.summarize {
            join_all(results.into_iter().map(|r| self.summarize(r))).await
        } else {
            results.into_iter().map(Self::digest_outcome).collect()
        };

        let pairs: Vec<(String, String)> = houses
            .iter()
            .map(|h| (h.result.session_id.clone(), h.summary.clone()))
            .collect();
        let judging_task = PromptTemplate::judging_task(
            &pairs,
            &input.symbols,
            input.budget,
            input.start_year,
            input.end_year,
        );

        info!("Houses finished, starting judging session {}", input.judging_id);
        let judging = self
            .deliberation
            .execute(
                RunDeliberationInput::new(input.judging_id.clone(), judging_roster, judging_task)
                    .with_policy(input.judging_policy.clone()),
            )
            .await
            .map_err(RunComparisonError::Judging)?;

        let verdict = Verdict::from_agreed_value(judging.agreed_value, houses.len());
        info!("Comparison verdict: {:?}", verdict);

        Ok(ComparisonResult {
            houses,
            judging,
            verdict,
        })
    }

    /// Run both houses concurrently, returning results in house order.
    async fn run_houses(
        &self,
        input: &RunComparisonInput,
        registry: ParticipantRegistry,
        task: String,
    ) -> Result<Vec<SessionResult>, RunComparisonError> {
        let mut join_set = JoinSet::new();

        for (index, session_id) in input.house_ids.iter().enumerate() {
            let use_case = self.deliberation.clone();
            let house_input =
                RunDeliberationInput::new(session_id.clone(), registry.clone(), task.clone())
                    .with_policy(input.house_policy.clone());

            join_set.spawn(async move {
                let result = use_case.execute(house_input).await;
                (index, result)
            });
        }

        let mut slots: Vec<Option<SessionResult>> = vec![None; input.house_ids.len()];
        while let Some(joined) = join_set.join_next().await {
            let (index, result) =
                joined.map_err(|e| RunComparisonError::TaskFailed(e.to_string()))?;
            let result = result.map_err(|source| RunComparisonError::House {
                session_id: input.house_ids[index].clone(),
                source,
            })?;
            slots[index] = Some(result);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    RunComparisonError::TaskFailed(format!(
                        "{} produced no result",
                        input.house_ids[index]
                    ))
                })
            })
            .collect()
    }

    async fn summarize(&self, result: SessionResult) -> HouseOutcome {
        let summarizer = roster::summarizer();
        let prompt = PromptTemplate::summary_request(&result.transcript.render(SUMMARY_TURN_CHARS));
        let timeout = self.deliberation.params().summary_timeout;

        let outcome = tokio::time::timeout(
            timeout,
            self.deliberation.agent().summarize(&summarizer, &prompt),
        )
        .await;

        match outcome {
            Ok(Ok(summary)) if !summary.trim().is_empty() => HouseOutcome {
                result,
                summary,
                summary_source: SummarySource::Agent,
            },
            Ok(Ok(_)) => {
                warn!("Empty summary for {}, using digest", result.session_id);
                Self::digest_outcome(result)
            }
            Ok(Err(e)) => {
                warn!("Summary failed for {}: {}, using digest", result.session_id, e);
                Self::digest_outcome(result)
            }
            Err(_) => {
                warn!(
                    "Summary timed out for {} after {:?}, using digest",
                    result.session_id, timeout
                );
                Self::digest_outcome(result)
            }
        }
    }

    fn digest_outcome(result: SessionResult) -> HouseOutcome {
        HouseOutcome {
            summary: result.digest(DIGEST_TURN_CHARS),
            result,
            summary_source: SummarySource::Digest,
        }
    }
}
