//! Run Deliberation use case
//!
//! The orchestrator loop. One turn is in flight at a time:
//!
//! ```text
//! seed task (turn 0)
//! loop {
//!     advance phase machine
//!     stop?  (concluded | sentinel | budget | deadline)
//!     select speaker (fallbacks on selection failure)
//!     dispatch to reasoning agent (timeout, retry, degrade)
//!     append turn, emit to presentation sink
//! }
//! persist result
//! ```

use crate::config::DeliberationParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, events,
};
use crate::ports::presentation::{NoPresentation, PresentationSink};
use crate::ports::reasoning_agent::{AgentError, AgentReply, ReasoningAgent, TurnRequest};
use crate::ports::session_store::SessionStore;
use boardroom_domain::{
    DeliberationPolicy, DomainError, Participant, ParticipantRegistry, Phase, PhaseTransition,
    PromptTemplate, SelectionError, Session, SessionResult, SpeakerSelector, TerminationDetector,
    TerminationReason, Turn,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that abort a deliberation
///
/// Ordinary endings (budget, stall, sentinel, ...) are not errors; they are
/// reported through [`SessionResult::reason`].
#[derive(Error, Debug)]
pub enum RunDeliberationError {
    #[error("Invalid session: {0}")]
    InvalidSession(#[from] DomainError),

    #[error("Deliberation cancelled")]
    Cancelled,
}

/// Recovery step after a failed speaker selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectionFallback {
    /// Give the turn to the mediator
    Mediator,
    /// Leave the debate and open the final poll
    ForceFinalPoll,
    /// Conclude as stalled
    Stall,
}

impl SelectionFallback {
    /// The mediator is tried while `failures` stays within the retry limit
    /// and it did not take the previous turn.
    fn choose(phase: Phase, mediator_available: bool, failures: usize, retry_limit: usize) -> Self {
        if mediator_available && failures <= retry_limit {
            SelectionFallback::Mediator
        } else if phase == Phase::Debate {
            SelectionFallback::ForceFinalPoll
        } else {
            SelectionFallback::Stall
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            SelectionFallback::Mediator => "mediator",
            SelectionFallback::ForceFinalPoll => "force_final_poll",
            SelectionFallback::Stall => "stall",
        }
    }
}

/// Input for the RunDeliberation use case
#[derive(Debug, Clone)]
pub struct RunDeliberationInput {
    pub session_id: String,
    pub registry: ParticipantRegistry,
    pub policy: DeliberationPolicy,
    /// Task description seeded as turn 0
    pub task: String,
}

impl RunDeliberationInput {
    pub fn new(
        session_id: impl Into<String>,
        registry: ParticipantRegistry,
        task: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            registry,
            policy: DeliberationPolicy::default(),
            task: task.into(),
        }
    }

    pub fn with_policy(mut self, policy: DeliberationPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Use case for running one deliberation to its conclusion
pub struct RunDeliberationUseCase<A: ReasoningAgent + 'static> {
    agent: Arc<A>,
    params: DeliberationParams,
    store: Option<Arc<dyn SessionStore>>,
    presentation: Arc<dyn PresentationSink>,
    conversation_logger: Arc<dyn ConversationLogger>,
    cancellation: CancellationToken,
}

impl<A: ReasoningAgent + 'static> Clone for RunDeliberationUseCase<A> {
    fn clone(&self) -> Self {
        Self {
            agent: Arc::clone(&self.agent),
            params: self.params.clone(),
            store: self.store.clone(),
            presentation: Arc::clone(&self.presentation),
            conversation_logger: Arc::clone(&self.conversation_logger),
            cancellation: self.cancellation.clone(),
        }
    }
}

impl<A: ReasoningAgent + 'static> RunDeliberationUseCase<A> {
    pub fn new(agent: Arc<A>) -> Self {
        Self {
            agent,
            params: DeliberationParams::default(),
            store: None,
            presentation: Arc::new(NoPresentation),
            conversation_logger: Arc::new(NoConversationLogger),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_params(mut self, params: DeliberationParams) -> Self {
        self.params = params;
        self
    }

    /// Persist every concluded session to `store`.
    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_presentation(mut self, presentation: Arc<dyn PresentationSink>) -> Self {
        self.presentation = presentation;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn agent(&self) -> &Arc<A> {
        &self.agent
    }

    pub fn params(&self) -> &DeliberationParams {
        &self.params
    }

    /// Run the session until it concludes.
    pub async fn execute(
        &self,
        input: RunDeliberationInput,
    ) -> Result<SessionResult, RunDeliberationError> {
        let RunDeliberationInput {
            session_id,
            registry,
            policy,
            task,
        } = input;
        let mut session = Session::new(session_id.clone(), registry, policy, task)?;
        let detector = TerminationDetector::for_session(&session);
        let deadline = self.params.session_deadline.map(|d| Instant::now() + d);
        let mut selection_failures = 0;

        info!(
            "Starting deliberation {} with {} participants (budget {})",
            session_id,
            session.registry().len(),
            session.policy().turn_budget
        );
        self.presentation
            .on_session_start(&session_id, session.registry());
        let roster: Vec<_> = session
            .registry()
            .participants()
            .iter()
            .map(|p| json!({ "name": p.name(), "role": p.role().as_str(), "voting": p.is_voting() }))
            .collect();
        self.conversation_logger.log(ConversationEvent::new(
            events::SESSION_STARTED,
            json!({
                "session_id": session_id,
                "participants": roster,
                "turn_budget": session.policy().turn_budget,
                "task": session.task(),
            }),
        ));

        loop {
            if self.cancellation.is_cancelled() {
                warn!("Deliberation {} cancelled", session_id);
                return Err(RunDeliberationError::Cancelled);
            }

            let transitions = session.advance()?;
            self.report_transitions(&session_id, &transitions);

            if let Some(reason) = detector.should_stop(&session) {
                if !session.is_concluded() {
                    let transition = session.conclude(reason)?;
                    self.report_transitions(&session_id, &[transition]);
                }
                break;
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!("Deliberation {} hit its deadline", session_id);
                let transition = session.conclude(TerminationReason::NoConsensus)?;
                self.report_transitions(&session_id, &[transition]);
                break;
            }

            let Some(speaker) = self.next_speaker(&mut session, &mut selection_failures)? else {
                continue;
            };

            let turn = self.take_turn(&session, &speaker).await?;
            let turn = session.append(turn)?;
            self.presentation.emit(&session_id, turn);
            self.conversation_logger.log(ConversationEvent::new(
                events::TURN,
                json!({
                    "session_id": session_id,
                    "sequence": turn.sequence,
                    "speaker": turn.speaker,
                    "phase": turn.phase.as_str(),
                    "content": turn.content,
                    "proposal": turn.proposal.as_ref().map(|p| p.value),
                    "tool_calls": turn.tool_invocations.len(),
                    "degraded": turn.is_degraded(),
                }),
            ));
        }

        let result = session.into_result()?;
        info!(
            "Deliberation {} concluded: {} after {} turns",
            result.session_id,
            result.reason,
            result.turn_count()
        );

        self.persist(&result).await;
        self.presentation.on_session_end(&result);
        self.conversation_logger.log(ConversationEvent::new(
            events::SESSION_CONCLUDED,
            json!({
                "session_id": result.session_id,
                "reason": result.reason.as_str(),
                "agreed_value": result.agreed_value,
                "turns": result.turn_count(),
                "degraded_turns": result.degraded_turns(),
            }),
        ));

        Ok(result)
    }

    /// Select the next speaker, applying the selection-failure fallbacks.
    ///
    /// `Ok(None)` means no turn should be taken this iteration because a
    /// fallback changed the phase instead.
    fn next_speaker(
        &self,
        session: &mut Session,
        failures: &mut usize,
    ) -> Result<Option<Participant>, RunDeliberationError> {
        let error = match SpeakerSelector::select_with_rule(session) {
            Ok(selection) => {
                *failures = 0;
                let speaker = selection.participant;
                debug!(
                    "Selected {} ({}) in {}",
                    speaker.name(),
                    selection.rule.as_str(),
                    session.phase().as_str()
                );
                self.presentation
                    .on_speaker_selected(session.id(), speaker, session.phase());
                self.conversation_logger.log(ConversationEvent::new(
                    events::SPEAKER_SELECTED,
                    json!({
                        "session_id": session.id(),
                        "speaker": speaker.name(),
                        "rule": selection.rule.as_str(),
                        "phase": session.phase().as_str(),
                        "sequence": session.next_sequence(),
                    }),
                ));
                return Ok(Some(speaker.clone()));
            }
            Err(SelectionError::SessionConcluded) => return Ok(None),
            Err(e) => e,
        };

        *failures += 1;
        warn!(
            "Speaker selection failed in {} ({}), failure {}",
            session.id(),
            error,
            failures
        );

        let last_speaker = session.transcript().last().map(|t| t.speaker.clone());
        let mediator = session
            .registry()
            .mediator()
            .filter(|m| Some(m.name()) != last_speaker.as_deref())
            .cloned();

        let fallback = SelectionFallback::choose(
            session.phase(),
            mediator.is_some(),
            *failures,
            session.policy().selection_retry_limit,
        );
        self.conversation_logger.log(ConversationEvent::new(
            events::SELECTION_FALLBACK,
            json!({
                "session_id": session.id(),
                "error": error.to_string(),
                "failures": *failures,
                "action": fallback.as_str(),
            }),
        ));

        let transition = match fallback {
            SelectionFallback::Mediator => return Ok(mediator),
            SelectionFallback::ForceFinalPoll => {
                *failures = 0;
                session.force_final_poll()?
            }
            SelectionFallback::Stall => session.conclude(TerminationReason::Stalled)?,
        };
        let session_id = session.id().to_string();
        self.report_transitions(&session_id, &[transition]);
        Ok(None)
    }

    /// Dispatch one turn, with timeout and retry; degrade on repeated failure.
    async fn take_turn(
        &self,
        session: &Session,
        speaker: &Participant,
    ) -> Result<Turn, RunDeliberationError> {
        let sequence = session.next_sequence();
        let phase = session.phase();
        let proposal_kind = session.registry().proposal_kind();
        let instructions = PromptTemplate::turn_instructions(
            speaker,
            phase,
            &session.policy().sentinel,
            proposal_kind,
        );
        let request = TurnRequest {
            session_id: session.id(),
            speaker,
            phase,
            transcript: session.transcript(),
            instructions: &instructions,
            proposal_kind,
        };

        let attempts = self.params.attempts_per_turn();
        let mut last_error = None;
        for attempt in 1..=attempts {
            let outcome = tokio::select! {
                _ = self.cancellation.cancelled() => return Err(RunDeliberationError::Cancelled),
                outcome = tokio::time::timeout(self.params.turn_timeout, self.agent.respond(request)) => outcome,
            };

            let error = match outcome {
                Ok(Ok(reply)) => return Ok(Self::build_turn(sequence, speaker, phase, reply)),
                Ok(Err(e)) => e,
                Err(_) => AgentError::Timeout(self.params.turn_timeout),
            };

            warn!(
                "{} failed on turn {} (attempt {}/{}): {}",
                speaker.name(),
                sequence,
                attempt,
                attempts,
                error
            );
            self.conversation_logger.log(ConversationEvent::new(
                events::TURN_RETRY,
                json!({
                    "session_id": session.id(),
                    "speaker": speaker.name(),
                    "sequence": sequence,
                    "attempt": attempt,
                    "error": error.to_string(),
                }),
            ));
            last_error = Some(error);
        }

        let error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts made".to_string());
        Ok(Turn::degraded(sequence, speaker, phase, error))
    }

    fn build_turn(sequence: u64, speaker: &Participant, phase: Phase, reply: AgentReply) -> Turn {
        let mut turn = Turn::new(sequence, speaker, phase, reply.content)
            .with_tool_invocations(reply.tool_invocations);
        if let Some(proposal) = reply.proposal {
            if !proposal.is_well_formed() {
                warn!(
                    "{} submitted a malformed proposal: {}",
                    speaker.name(),
                    proposal.value
                );
            }
            turn = turn.with_proposal(proposal);
        }
        turn
    }

    fn report_transitions(&self, session_id: &str, transitions: &[PhaseTransition]) {
        for transition in transitions {
            info!(
                "Deliberation {}: {} -> {} at turn {}",
                session_id,
                transition.from.as_str(),
                transition.to.as_str(),
                transition.at_sequence
            );
            self.presentation
                .on_phase_transition(session_id, transition);
            self.conversation_logger.log(ConversationEvent::new(
                events::PHASE_TRANSITION,
                json!({
                    "session_id": session_id,
                    "from": transition.from.as_str(),
                    "to": transition.to.as_str(),
                    "at_sequence": transition.at_sequence,
                    "trigger": serde_json::to_value(transition.trigger).unwrap_or_default(),
                }),
            ));
        }
    }

    async fn persist(&self, result: &SessionResult) {
        let Some(store) = &self.store else {
            return;
        };
        match store.save(result).await {
            Ok(()) => debug!("Persisted session {}", result.session_id),
            Err(e) => warn!("Failed to persist session {}: {}", result.session_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::session_store::SessionStore;
    use crate::use_cases::test_support::{MemoryStore, RecordingLogger, Scripted, ScriptedAgent};
    use boardroom_domain::{Proposal, Role, TransitionTrigger};
    use std::time::Duration;

    fn panel() -> ParticipantRegistry {
        ParticipantRegistry::new(vec![
            Participant::new("Alpha", Role::Voter).voting(),
            Participant::new("Beta", Role::Voter).voting(),
            Participant::new("Gamma", Role::Voter).voting(),
            Participant::new("Manager", Role::Mediator),
        ])
        .unwrap()
    }

    /// Manager asks for final decisions once the debate round is over;
    /// voters propose `value_of(name)` during the final poll.
    fn polling_agent(value_of: fn(&str) -> Option<f64>) -> ScriptedAgent {
        ScriptedAgent::new(move |req| match req.phase {
            Phase::Debate if req.speaker.is_mediator() => {
                Scripted::text("We have heard everyone. Please give your FINAL DECISION.")
            }
            Phase::FinalPoll => match value_of(req.speaker.name()) {
                Some(v) => Scripted::Reply(
                    AgentReply::text(format!("I propose {v} percent.")).with_proposal(Proposal::new(v)),
                ),
                None => Scripted::text("I cannot commit to a number."),
            },
            _ => Scripted::text("My analysis is complete."),
        })
    }

    fn input(budget: u64) -> RunDeliberationInput {
        RunDeliberationInput::new("house-1", panel(), "Decide the allocation for XYZ.")
            .with_policy(DeliberationPolicy::default().with_turn_budget(budget))
    }

    #[tokio::test]
    async fn test_unanimous_poll_reaches_consensus() {
        let agent = Arc::new(polling_agent(|_| Some(20.0)));
        let use_case = RunDeliberationUseCase::new(agent);

        let result = use_case.execute(input(20)).await.unwrap();

        assert_eq!(result.reason, TerminationReason::ConsensusReached);
        assert_eq!(result.agreed_value, Some(20.0));
        assert!(result.transcript.last().unwrap().sequence < 20);
    }

    #[tokio::test]
    async fn test_persistent_disagreement_exhausts_budget() {
        let agent = Arc::new(polling_agent(|name| {
            Some(if name == "Gamma" { 15.0 } else { 20.0 })
        }));
        let use_case = RunDeliberationUseCase::new(agent);

        let result = use_case.execute(input(20)).await.unwrap();

        assert_eq!(result.reason, TerminationReason::BudgetExhausted);
        assert_eq!(result.agreed_value, None);
        assert_eq!(result.transcript.last().unwrap().sequence, 20);
    }

    #[tokio::test]
    async fn test_silent_voter_stalls_before_budget() {
        let agent = Arc::new(polling_agent(|name| {
            if name == "Gamma" { None } else { Some(20.0) }
        }));
        let use_case = RunDeliberationUseCase::new(agent);
        let input = input(30).with_policy(
            DeliberationPolicy::default()
                .with_turn_budget(30)
                .with_stall_prompts(3),
        );

        let result = use_case.execute(input).await.unwrap();

        assert_eq!(result.reason, TerminationReason::Stalled);
        assert!(result.transcript.last().unwrap().sequence < 30);
    }

    #[tokio::test]
    async fn test_opening_visits_order_then_sequences_are_strict() {
        let agent = Arc::new(polling_agent(|_| Some(20.0)));
        let use_case = RunDeliberationUseCase::new(Arc::clone(&agent));

        let result = use_case.execute(input(20)).await.unwrap();

        let opening: Vec<_> = result
            .transcript
            .in_phase(Phase::Opening)
            .filter(|t| !t.is_seed())
            .map(|t| t.speaker.as_str())
            .collect();
        assert_eq!(opening, vec!["Alpha", "Beta", "Gamma", "Manager"]);

        for (expected, turn) in result.transcript.iter().enumerate() {
            assert_eq!(turn.sequence, expected as u64);
        }
        assert_eq!(agent.calls().len(), result.turn_count());
    }

    #[tokio::test]
    async fn test_sentinel_stops_before_budget() {
        let agent = Arc::new(ScriptedAgent::new(|req| {
            if req.speaker.is_mediator() && req.phase == Phase::Debate {
                Scripted::text("That settles it. TERMINATE")
            } else {
                Scripted::text("Still thinking.")
            }
        }));
        let use_case = RunDeliberationUseCase::new(agent);

        let result = use_case.execute(input(30)).await.unwrap();

        assert_eq!(result.reason, TerminationReason::Sentinel);
        assert_eq!(result.agreed_value, None);
    }

    #[tokio::test]
    async fn test_restricted_responder_only_follows_allowed_roles() {
        let registry = ParticipantRegistry::new(vec![
            Participant::new("Alpha", Role::Opener).voting(),
            Participant::new("Beta", Role::Voter).voting(),
            Participant::new("Search", Role::Support).responds_only_to([Role::Voter]),
            Participant::new("Manager", Role::Mediator),
        ])
        .unwrap()
        .with_opening_order(&["Alpha", "Beta", "Manager"])
        .unwrap();
        let agent = Arc::new(ScriptedAgent::new(|req| match req.phase {
            Phase::FinalPoll => {
                Scripted::Reply(AgentReply::text("10").with_proposal(Proposal::new(10.0)))
            }
            _ => Scripted::text("Is there any recent news?"),
        }));
        let use_case = RunDeliberationUseCase::new(agent);

        let result = use_case
            .execute(RunDeliberationInput::new("h", registry, "task"))
            .await
            .unwrap();

        let turns = result.transcript.turns();
        let search_turns: Vec<_> = turns
            .windows(2)
            .filter(|w| w[1].speaker == "Search")
            .collect();
        assert!(!search_turns.is_empty());
        for pair in search_turns {
            assert_eq!(pair[0].role, Some(Role::Voter));
        }
        assert_eq!(result.reason, TerminationReason::ConsensusReached);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_retries_then_degrades() {
        let agent = Arc::new(polling_agent(|_| Some(20.0)));
        agent.push("Alpha", Scripted::Hang);
        agent.push("Alpha", Scripted::Hang);
        let logger = Arc::new(RecordingLogger::default());
        let use_case = RunDeliberationUseCase::new(Arc::clone(&agent))
            .with_params(DeliberationParams::default().with_turn_timeout(Duration::from_secs(5)))
            .with_conversation_logger(logger.clone());

        let result = use_case.execute(input(20)).await.unwrap();

        let first = result.transcript.get(1).unwrap();
        assert_eq!(first.speaker, "Alpha");
        assert!(first.is_degraded());
        assert_eq!(logger.count(events::TURN_RETRY), 2);
        assert_eq!(result.reason, TerminationReason::ConsensusReached);
    }

    #[tokio::test]
    async fn test_single_failure_is_retried_with_same_speaker() {
        let agent = Arc::new(polling_agent(|_| Some(20.0)));
        agent.push("Alpha", Scripted::Fail("connection reset".to_string()));
        let use_case = RunDeliberationUseCase::new(Arc::clone(&agent));

        let result = use_case.execute(input(20)).await.unwrap();

        let first = result.transcript.get(1).unwrap();
        assert_eq!(first.speaker, "Alpha");
        assert!(!first.is_degraded());
        let calls = agent.calls();
        assert_eq!(calls[0].0, "Alpha");
        assert_eq!(calls[1].0, "Alpha");
    }

    #[tokio::test]
    async fn test_selection_failure_forces_final_poll() {
        let registry = ParticipantRegistry::new(vec![
            Participant::new("Alpha", Role::Voter).voting(),
            Participant::new("Helper", Role::Support).responds_only_to([Role::Mediator]),
        ])
        .unwrap()
        .with_opening_order(&["Alpha"])
        .unwrap();
        let agent = Arc::new(polling_agent(|_| Some(30.0)));
        let use_case = RunDeliberationUseCase::new(agent);

        let result = use_case
            .execute(RunDeliberationInput::new("h", registry, "task"))
            .await
            .unwrap();

        assert!(
            result
                .phase_history
                .iter()
                .any(|t| t.trigger == TransitionTrigger::SelectionExhausted)
        );
        assert_eq!(result.reason, TerminationReason::ConsensusReached);
        assert_eq!(result.agreed_value, Some(30.0));
    }

    #[tokio::test]
    async fn test_selection_failure_hands_turn_to_mediator() {
        // Once Alpha has spoken nobody may follow: Helper only answers the
        // mediator, and Alpha's proposal settles the round.
        let registry = ParticipantRegistry::new(vec![
            Participant::new("Alpha", Role::Voter).voting(),
            Participant::new("Helper", Role::Support).responds_only_to([Role::Mediator]),
            Participant::new("Manager", Role::Mediator),
        ])
        .unwrap()
        .with_opening_order(&["Alpha", "Manager"])
        .unwrap();
        let agent = Arc::new(ScriptedAgent::new(|req| match req.phase {
            Phase::Debate if req.speaker.is_mediator() => {
                Scripted::text("Then let us hear your FINAL DECISION.")
            }
            Phase::Debate | Phase::FinalPoll if req.speaker.is_voting() => Scripted::Reply(
                AgentReply::text("I hold at thirty.").with_proposal(Proposal::new(30.0)),
            ),
            _ => Scripted::text("Ready."),
        }));
        let logger = Arc::new(RecordingLogger::default());
        let use_case =
            RunDeliberationUseCase::new(agent).with_conversation_logger(logger.clone());

        let result = use_case
            .execute(RunDeliberationInput::new("h", registry, "task"))
            .await
            .unwrap();

        let debate: Vec<_> = result
            .transcript
            .in_phase(Phase::Debate)
            .map(|t| t.speaker.as_str())
            .collect();
        assert_eq!(debate, vec!["Alpha", "Manager"]);
        assert_eq!(logger.count(events::SELECTION_FALLBACK), 1);
        assert!(
            result
                .phase_history
                .iter()
                .any(|t| t.trigger == TransitionTrigger::MediatorDirective)
        );
        assert!(
            !result
                .phase_history
                .iter()
                .any(|t| t.trigger == TransitionTrigger::SelectionExhausted)
        );
        assert_eq!(result.reason, TerminationReason::ConsensusReached);
        assert_eq!(result.agreed_value, Some(30.0));
    }

    #[test]
    fn test_selection_fallback_order() {
        use SelectionFallback::*;

        assert_eq!(SelectionFallback::choose(Phase::Debate, true, 1, 3), Mediator);
        assert_eq!(SelectionFallback::choose(Phase::Debate, true, 3, 3), Mediator);
        assert_eq!(SelectionFallback::choose(Phase::Debate, true, 4, 3), ForceFinalPoll);
        assert_eq!(SelectionFallback::choose(Phase::Debate, false, 1, 3), ForceFinalPoll);
        assert_eq!(SelectionFallback::choose(Phase::FinalPoll, true, 4, 3), Stall);
        assert_eq!(SelectionFallback::choose(Phase::Opening, false, 1, 3), Stall);
        assert_eq!(SelectionFallback::choose(Phase::FinalPoll, true, 2, 3), Mediator);
    }

    #[tokio::test]
    async fn test_expired_deadline_means_no_consensus() {
        let agent = Arc::new(polling_agent(|_| Some(20.0)));
        let use_case = RunDeliberationUseCase::new(agent)
            .with_params(DeliberationParams::default().with_session_deadline(Some(Duration::ZERO)));

        let result = use_case.execute(input(20)).await.unwrap();

        assert_eq!(result.reason, TerminationReason::NoConsensus);
        assert_eq!(result.turn_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let agent = Arc::new(polling_agent(|_| Some(20.0)));
        let token = CancellationToken::new();
        token.cancel();
        let use_case = RunDeliberationUseCase::new(agent).with_cancellation(token);

        let err = use_case.execute(input(20)).await.unwrap_err();
        assert!(matches!(err, RunDeliberationError::Cancelled));
    }

    #[tokio::test]
    async fn test_result_is_persisted_and_logged() {
        let agent = Arc::new(polling_agent(|_| Some(20.0)));
        let store = Arc::new(MemoryStore::default());
        let logger = Arc::new(RecordingLogger::default());
        let use_case = RunDeliberationUseCase::new(agent)
            .with_store(store.clone())
            .with_conversation_logger(logger.clone());

        let result = use_case.execute(input(20)).await.unwrap();

        assert_eq!(store.fetch("house-1").await.unwrap(), Some(result.clone()));
        assert_eq!(logger.count(events::SESSION_STARTED), 1);
        assert_eq!(logger.count(events::SESSION_CONCLUDED), 1);
        assert_eq!(logger.count(events::TURN), result.turn_count());
    }

    #[tokio::test]
    async fn test_invalid_policy_is_rejected() {
        let agent = Arc::new(polling_agent(|_| Some(20.0)));
        let use_case = RunDeliberationUseCase::new(agent);

        let err = use_case
            .execute(input(20).with_policy(DeliberationPolicy::default().with_turn_budget(0)))
            .await
            .unwrap_err();
        assert!(matches!(err, RunDeliberationError::InvalidSession(_)));
    }
}
