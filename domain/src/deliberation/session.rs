//! Session aggregate - one deliberation from seeded task to conclusion

use super::consensus::{ConsensusState, ConsensusTracker};
use super::phase::{Phase, PhaseMachine, PhaseSignals, PhaseTransition, TransitionTrigger};
use super::policy::DeliberationPolicy;
use super::result::SessionResult;
use super::termination::TerminationReason;
use super::transcript::Transcript;
use super::turn::Turn;
use crate::core::error::DomainError;
use crate::participant::ParticipantRegistry;

/// A single deliberation (Aggregate Root)
///
/// Owns the roster, the policy, the transcript and the phase machine. The
/// orchestrator passes it around explicitly; there is no ambient session
/// storage. A session is never resumed once concluded.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    registry: ParticipantRegistry,
    policy: DeliberationPolicy,
    transcript: Transcript,
    phase: PhaseMachine,
}

impl Session {
    /// Create a session and seed turn 0 with the task description.
    pub fn new(
        id: impl Into<String>,
        registry: ParticipantRegistry,
        policy: DeliberationPolicy,
        task: impl Into<String>,
    ) -> Result<Self, DomainError> {
        policy.validate()?;
        let mut transcript = Transcript::new();
        transcript.append(Turn::seed(task))?;
        Ok(Self {
            id: id.into(),
            registry,
            policy,
            transcript,
            phase: PhaseMachine::new(),
        })
    }

    // ==================== Accessors ====================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &DeliberationPolicy {
        &self.policy
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn phase(&self) -> Phase {
        self.phase.current()
    }

    pub fn phase_history(&self) -> &[PhaseTransition] {
        self.phase.history()
    }

    pub fn conclusion(&self) -> Option<TerminationReason> {
        self.phase.conclusion()
    }

    pub fn is_concluded(&self) -> bool {
        self.phase.current().is_terminal()
    }

    pub fn next_sequence(&self) -> u64 {
        self.transcript.next_sequence()
    }

    pub fn task(&self) -> &str {
        self.transcript.task().unwrap_or_default()
    }

    // ==================== Derived views ====================

    /// Turns recorded since the current phase started.
    pub fn phase_window(&self) -> &[Turn] {
        self.transcript.since(self.phase.entered_at())
    }

    /// Number of opening turns already taken.
    pub fn opening_cursor(&self) -> usize {
        self.transcript
            .in_phase(Phase::Opening)
            .filter(|t| !t.is_seed())
            .count()
    }

    /// Sequence number at which the final poll started, if it did.
    pub fn final_poll_start(&self) -> Option<u64> {
        self.phase
            .history()
            .iter()
            .find(|t| t.to == Phase::FinalPoll)
            .map(|t| t.at_sequence)
    }

    /// Turns of the current debate round.
    ///
    /// A round starts when the debate starts and restarts right after every
    /// mediator turn.
    pub fn debate_round(&self) -> &[Turn] {
        let phase_start = self.phase.entered_at();
        let after_mediator = self
            .registry
            .mediator()
            .and_then(|m| {
                self.transcript
                    .iter()
                    .rev()
                    .find(|t| t.speaker == m.name())
            })
            .map(|t| t.sequence + 1)
            .unwrap_or(0);
        self.transcript.since(phase_start.max(after_mediator))
    }

    /// Consensus over the final-poll window.
    pub fn consensus(&self) -> ConsensusState {
        ConsensusTracker::update(&self.transcript, &self.registry, self.final_poll_start())
    }

    /// Voting participant that exhausted its poll prompts without a usable
    /// proposal.
    pub fn stalled_participant(&self) -> Option<&str> {
        let start = self.final_poll_start()?;
        ConsensusTracker::stalled_participant(
            self.transcript.since(start),
            &self.registry,
            self.policy.stall_prompts,
        )
    }

    /// Observations for the phase machine.
    pub fn signals(&self) -> PhaseSignals {
        let phase = self.phase.current();
        let opening_exhausted = self.opening_cursor() >= self.registry.opening_order().len();

        let mediator_directive = phase == Phase::Debate
            && self.transcript.last().is_some_and(|t| {
                t.phase == Phase::Debate
                    && self.registry.get(&t.speaker).is_some_and(|p| p.is_mediator())
                    && self.policy.is_final_poll_directive(&t.content)
            });

        let idle_debate_turns = if phase == Phase::Debate {
            self.phase_window()
                .iter()
                .rev()
                .take_while(|t| t.valid_proposal().is_none())
                .count()
        } else {
            0
        };

        let (consensus_agreed, stalled) = if phase == Phase::FinalPoll {
            (self.consensus().agreed, self.stalled_participant().is_some())
        } else {
            (false, false)
        };

        PhaseSignals {
            opening_exhausted,
            mediator_directive,
            idle_debate_turns,
            consensus_agreed,
            stalled,
        }
    }

    // ==================== Mutations ====================

    pub fn append(&mut self, turn: Turn) -> Result<&Turn, DomainError> {
        if self.is_concluded() {
            return Err(DomainError::SessionConcluded(self.id.clone()));
        }
        self.transcript.append(turn)
    }

    /// Apply every transition the current observations call for.
    ///
    /// Returns the transitions taken, in order (usually zero or one).
    pub fn advance(&mut self) -> Result<Vec<PhaseTransition>, DomainError> {
        let mut taken = Vec::new();
        while let Some(trigger) = self
            .phase
            .next_transition(&self.signals(), self.policy.idle_debate_turns)
        {
            let at = self.transcript.next_sequence();
            taken.push(self.phase.advance(trigger, at)?);
        }
        Ok(taken)
    }

    /// Jump from debate straight to the final poll.
    pub fn force_final_poll(&mut self) -> Result<PhaseTransition, DomainError> {
        let at = self.transcript.next_sequence();
        self.phase.advance(TransitionTrigger::SelectionExhausted, at)
    }

    pub fn conclude(&mut self, reason: TerminationReason) -> Result<PhaseTransition, DomainError> {
        let at = self.transcript.next_sequence();
        self.phase.advance(TransitionTrigger::Concluded(reason), at)
    }

    /// Final record of a concluded session.
    pub fn into_result(self) -> Result<SessionResult, DomainError> {
        let reason = self
            .phase
            .conclusion()
            .ok_or_else(|| DomainError::SessionNotConcluded(self.id.clone()))?;
        let consensus = self.consensus();
        let agreed_value = if reason.is_agreement() {
            consensus.agreed_value
        } else {
            None
        };

        Ok(SessionResult {
            session_id: self.id,
            task: self.transcript.task().unwrap_or_default().to_string(),
            participants: self.registry.participants().to_vec(),
            reason,
            agreed_value,
            final_proposals: consensus.proposals,
            phase_history: self.phase.history().to_vec(),
            transcript: self.transcript,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deliberation::Proposal;
    use crate::participant::{Participant, Role};

    fn session(policy: DeliberationPolicy) -> Session {
        let registry = ParticipantRegistry::new(vec![
            Participant::new("A", Role::Voter).voting(),
            Participant::new("B", Role::Voter).voting(),
            Participant::new("Manager", Role::Mediator),
        ])
        .unwrap();
        Session::new("s1", registry, policy, "Decide an allocation").unwrap()
    }

    fn say(session: &mut Session, name: &str, content: &str, value: Option<f64>) {
        let speaker = session.registry().get(name).unwrap().clone();
        let mut turn = Turn::new(session.next_sequence(), &speaker, session.phase(), content);
        if let Some(v) = value {
            turn = turn.with_proposal(Proposal::new(v));
        }
        session.append(turn).unwrap();
        session.advance().unwrap();
    }

    fn open(session: &mut Session) {
        for name in ["A", "B", "Manager"] {
            say(session, name, "opening", None);
        }
    }

    #[test]
    fn test_new_seeds_task() {
        let session = session(DeliberationPolicy::default());
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.task(), "Decide an allocation");
        assert_eq!(session.phase(), Phase::Opening);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let registry =
            ParticipantRegistry::new(vec![Participant::new("A", Role::Voter).voting()]).unwrap();
        let policy = DeliberationPolicy::default().with_turn_budget(0);
        assert!(Session::new("s", registry, policy, "t").is_err());
    }

    #[test]
    fn test_opening_moves_to_debate() {
        let mut session = session(DeliberationPolicy::default());
        open(&mut session);
        assert_eq!(session.phase(), Phase::Debate);
        assert_eq!(session.phase_history()[0].at_sequence, 4);
    }

    #[test]
    fn test_idle_debate_opens_poll() {
        let mut session = session(DeliberationPolicy::default().with_idle_debate_turns(2));
        open(&mut session);
        say(&mut session, "A", "thinking", None);
        assert_eq!(session.phase(), Phase::Debate);
        say(&mut session, "B", "still thinking", None);
        assert_eq!(session.phase(), Phase::FinalPoll);
    }

    #[test]
    fn test_agreement_concludes_with_value() {
        let mut session = session(DeliberationPolicy::default());
        open(&mut session);
        say(&mut session, "Manager", "Please give your FINAL DECISION", None);
        say(&mut session, "A", "20", Some(20.0));
        assert_eq!(session.phase(), Phase::FinalPoll);
        say(&mut session, "B", "20", Some(20.0));
        assert_eq!(session.phase(), Phase::Concluded);

        let result = session.into_result().unwrap();
        assert_eq!(result.reason, TerminationReason::ConsensusReached);
        assert_eq!(result.agreed_value, Some(20.0));
    }

    #[test]
    fn test_debate_proposals_do_not_count_as_poll() {
        let mut session = session(DeliberationPolicy::default());
        open(&mut session);
        say(&mut session, "A", "20", Some(20.0));
        say(&mut session, "B", "20", Some(20.0));
        assert_eq!(session.phase(), Phase::Debate);
        assert!(!session.consensus().agreed);
    }

    #[test]
    fn test_stall_concludes() {
        let mut session = session(DeliberationPolicy::default().with_stall_prompts(2));
        open(&mut session);
        say(&mut session, "Manager", "FINAL VOTE now", None);
        say(&mut session, "A", "20", Some(20.0));
        say(&mut session, "B", "not sure", None);
        say(&mut session, "A", "20", Some(20.0));
        say(&mut session, "B", "still not sure", None);

        assert_eq!(session.conclusion(), Some(TerminationReason::Stalled));
    }

    #[test]
    fn test_concluded_rejects_turns_and_into_result_requires_conclusion() {
        let mut session = session(DeliberationPolicy::default());
        assert!(matches!(
            session.clone().into_result(),
            Err(DomainError::SessionNotConcluded(_))
        ));

        session.conclude(TerminationReason::BudgetExhausted).unwrap();
        let speaker = session.registry().get("A").unwrap().clone();
        let turn = Turn::new(session.next_sequence(), &speaker, Phase::Concluded, "late");
        assert!(matches!(
            session.append(turn),
            Err(DomainError::SessionConcluded(_))
        ));

        let result = session.into_result().unwrap();
        assert_eq!(result.reason, TerminationReason::BudgetExhausted);
        assert_eq!(result.agreed_value, None);
    }

    #[test]
    fn test_debate_round_restarts_after_mediator() {
        let mut session = session(DeliberationPolicy::default());
        open(&mut session);
        say(&mut session, "A", "point", None);
        assert_eq!(session.debate_round().len(), 1);
        say(&mut session, "Manager", "noted", None);
        assert!(session.debate_round().is_empty());
    }
}
