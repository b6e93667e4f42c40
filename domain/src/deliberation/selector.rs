//! Speaker selection
//!
//! Picks exactly one participant for the next turn. Opening and final-poll
//! selection are fixed rotations; debate selection applies these rules in
//! priority order:
//!
//! 1. A participant addressed by name in the latest turn (first mention
//!    wins). A question addressed to nobody goes to an eligible
//!    restricted responder.
//! 2. Restricted responders are only eligible when the previous speaker's
//!    role is in their `restricted_responders` set.
//! 3. The mediator is only eligible during a deadlock, or once every voting
//!    participant has spoken in the current round without agreement.
//! 4. Otherwise the first unrestricted participant (registry order) who has
//!    not spoken in the current round.
//!
//! The previous speaker is never picked twice in a row during debate.

use super::consensus::ConsensusTracker;
use super::phase::Phase;
use super::session::Session;
use super::turn::Turn;
use crate::participant::Participant;
use std::collections::HashSet;
use thiserror::Error;

/// Selection errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error("No eligible speaker during {phase}")]
    NoEligibleSpeaker { phase: Phase },

    #[error("Session is concluded")]
    SessionConcluded,
}

/// Why a debate speaker was picked; useful for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRule {
    Opening,
    Addressed,
    Question,
    Deadlock,
    NextInRound,
    Arbitration,
    LeastRecent,
    FinalPoll,
}

impl SelectionRule {
    pub fn as_str(&self) -> &str {
        match self {
            SelectionRule::Opening => "opening",
            SelectionRule::Addressed => "addressed",
            SelectionRule::Question => "question",
            SelectionRule::Deadlock => "deadlock",
            SelectionRule::NextInRound => "next_in_round",
            SelectionRule::Arbitration => "arbitration",
            SelectionRule::LeastRecent => "least_recent",
            SelectionRule::FinalPoll => "final_poll",
        }
    }
}

/// Chosen speaker together with the rule that chose it
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub participant: &'a Participant,
    pub rule: SelectionRule,
}

impl<'a> Selection<'a> {
    fn new(participant: &'a Participant, rule: SelectionRule) -> Self {
        Self { participant, rule }
    }
}

/// Deterministic rule-based speaker selector
pub struct SpeakerSelector;

impl SpeakerSelector {
    pub fn select(session: &Session) -> Result<&Participant, SelectionError> {
        Self::select_with_rule(session).map(|s| s.participant)
    }

    pub fn select_with_rule(session: &Session) -> Result<Selection<'_>, SelectionError> {
        match session.phase() {
            Phase::Opening => Self::select_opening(session),
            Phase::Debate => Self::select_debate(session),
            Phase::FinalPoll => Self::select_final_poll(session),
            Phase::Concluded => Err(SelectionError::SessionConcluded),
        }
    }

    /// Participants that may take the next debate turn, in registry order.
    pub fn debate_candidates(session: &Session) -> Vec<&Participant> {
        let mediator_allowed = Self::is_deadlocked(session) || Self::round_unresolved(session);
        Self::eligible(session, mediator_allowed)
    }

    fn select_opening(session: &Session) -> Result<Selection<'_>, SelectionError> {
        session
            .registry()
            .opening_order()
            .get(session.opening_cursor())
            .map(|&participant| Selection::new(participant, SelectionRule::Opening))
            .ok_or(SelectionError::NoEligibleSpeaker {
                phase: Phase::Opening,
            })
    }

    fn select_debate(session: &Session) -> Result<Selection<'_>, SelectionError> {
        let registry = session.registry();
        let deadlocked = Self::is_deadlocked(session);
        let unresolved = Self::round_unresolved(session);
        let eligible = Self::eligible(session, deadlocked || unresolved);

        // Rule 1
        if let Some(last) = session.transcript().last()
            && !last.is_seed()
        {
            let addressed = eligible
                .iter()
                .filter_map(|p| p.mention_offset(&last.content).map(|at| (at, *p)))
                .min_by_key(|(at, _)| *at);
            if let Some((_, participant)) = addressed {
                return Ok(Selection::new(participant, SelectionRule::Addressed));
            }
            if last.content.contains('?')
                && let Some(participant) = eligible.iter().copied().find(|p| p.is_restricted())
            {
                return Ok(Selection::new(participant, SelectionRule::Question));
            }
        }

        // Rule 3a
        if deadlocked && let Some(mediator) = registry.mediator() {
            return Ok(Selection::new(mediator, SelectionRule::Deadlock));
        }

        // Rule 4
        let spoken: HashSet<&str> = session
            .debate_round()
            .iter()
            .map(|t| t.speaker.as_str())
            .collect();
        if let Some(participant) = eligible
            .iter()
            .copied()
            .find(|p| !p.is_mediator() && !p.is_restricted() && !spoken.contains(p.name()))
        {
            return Ok(Selection::new(participant, SelectionRule::NextInRound));
        }

        // Rule 3b
        if unresolved && let Some(mediator) = registry.mediator() {
            return Ok(Selection::new(mediator, SelectionRule::Arbitration));
        }

        let transcript = session.transcript();
        let last_spoke = |p: &Participant| {
            transcript
                .iter()
                .rev()
                .find(|t| t.speaker == p.name())
                .map(|t| t.sequence)
        };
        eligible
            .into_iter()
            .filter(|p| !p.is_mediator())
            .min_by_key(|p| last_spoke(*p))
            .map(|participant| Selection::new(participant, SelectionRule::LeastRecent))
            .ok_or(SelectionError::NoEligibleSpeaker {
                phase: Phase::Debate,
            })
    }

    /// Rotate through the voting set in registry order.
    ///
    /// A cycle ends once every voter has spoken; a voter speaking twice
    /// within a cycle starts a new one.
    fn select_final_poll(session: &Session) -> Result<Selection<'_>, SelectionError> {
        let voters = session.registry().voting_set();
        let mut cycle: HashSet<&str> = HashSet::new();
        for turn in session.phase_window() {
            if !voters.iter().any(|v| v.name() == turn.speaker) {
                continue;
            }
            if !cycle.insert(turn.speaker.as_str()) {
                cycle.clear();
                cycle.insert(turn.speaker.as_str());
            }
            if cycle.len() == voters.len() {
                cycle.clear();
            }
        }

        voters
            .into_iter()
            .find(|v| !cycle.contains(v.name()))
            .map(|participant| Selection::new(participant, SelectionRule::FinalPoll))
            .ok_or(SelectionError::NoEligibleSpeaker {
                phase: Phase::FinalPoll,
            })
    }

    fn eligible(session: &Session, mediator_allowed: bool) -> Vec<&Participant> {
        let last = session.transcript().last();
        let last_speaker = last.filter(|t| !t.is_seed()).map(|t| t.speaker.as_str());
        let last_role = last.and_then(|t| t.role);

        session
            .registry()
            .participants()
            .iter()
            .filter(|p| Some(p.name()) != last_speaker)
            .filter(|p| !p.is_restricted() || last_role.is_some_and(|r| p.responds_to(r)))
            .filter(|p| !p.is_mediator() || mediator_allowed)
            .collect()
    }

    /// Every voter spoke in the current round and they still disagree.
    fn round_unresolved(session: &Session) -> bool {
        let round = session.debate_round();
        let voters = session.registry().voting_set();
        let all_spoke = voters
            .iter()
            .all(|v| round.iter().any(|t| t.speaker == v.name()));
        all_spoke && !ConsensusTracker::from_turns(round, session.registry()).agreed
    }

    fn is_deadlocked(session: &Session) -> bool {
        deadlock_exchanges(session.phase_window()) > session.policy().deadlock_exchanges
    }
}

/// Length of the trailing run of conflicting exchanges between two speakers.
///
/// An exchange is a pair of adjacent turns by the two alternating speakers,
/// both carrying a well-formed proposal, with different values.
fn deadlock_exchanges(turns: &[Turn]) -> usize {
    let [.., before, last] = turns else {
        return 0;
    };
    let pair = [before.speaker.as_str(), last.speaker.as_str()];
    if pair[0] == pair[1] {
        return 0;
    }

    turns
        .windows(2)
        .rev()
        .take_while(|w| {
            let (earlier, later) = (&w[0], &w[1]);
            earlier.speaker != later.speaker
                && pair.contains(&earlier.speaker.as_str())
                && pair.contains(&later.speaker.as_str())
                && matches!(
                    (earlier.valid_proposal(), later.valid_proposal()),
                    (Some(a), Some(b)) if !a.agrees_with(b)
                )
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deliberation::{DeliberationPolicy, Proposal};
    use crate::participant::{ParticipantRegistry, Role};

    fn registry() -> ParticipantRegistry {
        ParticipantRegistry::new(vec![
            Participant::new("A", Role::Opener).voting(),
            Participant::new("B", Role::Voter).voting(),
            Participant::new("C", Role::Voter).voting(),
            Participant::new("Search", Role::Support).responds_only_to([Role::Voter]),
            Participant::new("Manager", Role::Mediator),
        ])
        .unwrap()
        .with_opening_order(&["A", "B", "C", "Manager"])
        .unwrap()
    }

    fn session() -> Session {
        Session::new("s", registry(), DeliberationPolicy::default(), "task").unwrap()
    }

    fn say(session: &mut Session, name: &str, content: &str) {
        let speaker = session.registry().get(name).unwrap().clone();
        let turn = Turn::new(session.next_sequence(), &speaker, session.phase(), content);
        session.append(turn).unwrap();
        session.advance().unwrap();
    }

    fn propose(session: &mut Session, name: &str, value: f64) {
        let speaker = session.registry().get(name).unwrap().clone();
        let turn = Turn::new(session.next_sequence(), &speaker, session.phase(), "my number")
            .with_proposal(Proposal::new(value));
        session.append(turn).unwrap();
        session.advance().unwrap();
    }

    fn next(session: &Session) -> &str {
        SpeakerSelector::select(session).unwrap().name()
    }

    fn debate_session() -> Session {
        let mut session = session();
        for name in ["A", "B", "C", "Manager"] {
            say(&mut session, name, "opening statement");
        }
        assert_eq!(session.phase(), Phase::Debate);
        session
    }

    #[test]
    fn test_opening_follows_order_exactly_once() {
        let mut session = session();
        let mut seen = Vec::new();
        while session.phase() == Phase::Opening {
            let name = next(&session).to_string();
            say(&mut session, &name, "opening statement");
            seen.push(name);
        }
        assert_eq!(seen, vec!["A", "B", "C", "Manager"]);
    }

    #[test]
    fn test_restricted_responder_excluded_after_other_roles() {
        let mut session = debate_session();
        say(&mut session, "A", "Can anyone search for news?");

        let candidates: Vec<_> = SpeakerSelector::debate_candidates(&session)
            .iter()
            .map(|p| p.name())
            .collect();
        assert!(!candidates.contains(&"Search"));
        assert_ne!(next(&session), "Search");
    }

    #[test]
    fn test_restricted_responder_answers_voter_question() {
        let mut session = debate_session();
        say(&mut session, "B", "Is there any recent news on this company?");

        let selection = SpeakerSelector::select_with_rule(&session).unwrap();
        assert_eq!(selection.participant.name(), "Search");
        assert_eq!(selection.rule, SelectionRule::Question);
    }

    #[test]
    fn test_addressed_participant_first_mention_wins() {
        let mut session = debate_session();
        say(&mut session, "A", "I disagree with C, and B should weigh in too.");
        assert_eq!(next(&session), "C");
    }

    #[test]
    fn test_mediator_not_addressable_without_condition() {
        let mut session = debate_session();
        say(&mut session, "A", "Manager, what do you think?");
        assert_ne!(next(&session), "Manager");
    }

    #[test]
    fn test_round_robin_then_arbitration() {
        let mut session = debate_session();
        assert_eq!(next(&session), "A");
        propose(&mut session, "A", 20.0);
        assert_eq!(next(&session), "B");
        propose(&mut session, "B", 15.0);
        assert_eq!(next(&session), "C");
        say(&mut session, "C", "I lean towards 20.");
        let selection = SpeakerSelector::select_with_rule(&session).unwrap();
        assert_eq!(selection.participant.name(), "Manager");
        assert_eq!(selection.rule, SelectionRule::Arbitration);
    }

    #[test]
    fn test_deadlock_calls_mediator() {
        let mut session = debate_session();
        propose(&mut session, "A", 20.0);
        propose(&mut session, "B", 10.0);
        propose(&mut session, "A", 20.0);
        propose(&mut session, "B", 10.0);

        let selection = SpeakerSelector::select_with_rule(&session).unwrap();
        assert_eq!(selection.participant.name(), "Manager");
        assert_eq!(selection.rule, SelectionRule::Deadlock);
    }

    #[test]
    fn test_deadlock_exchange_count() {
        let registry = registry();
        let a = registry.get("A").unwrap();
        let b = registry.get("B").unwrap();
        let c = registry.get("C").unwrap();
        let t = |seq, p, v| Turn::new(seq, p, Phase::Debate, "x").with_proposal(Proposal::new(v));

        let turns = vec![t(1, a, 20.0), t(2, b, 10.0), t(3, a, 20.0), t(4, b, 10.0)];
        assert_eq!(deadlock_exchanges(&turns), 3);

        let turns = vec![t(1, c, 20.0), t(2, a, 20.0), t(3, b, 10.0)];
        assert_eq!(deadlock_exchanges(&turns), 1);

        let turns = vec![t(1, a, 20.0), t(2, b, 20.0)];
        assert_eq!(deadlock_exchanges(&turns), 0);
    }

    #[test]
    fn test_final_poll_rotates_voters() {
        let mut session = debate_session();
        say(&mut session, "Manager", "Time for the FINAL DECISION.");
        assert_eq!(session.phase(), Phase::FinalPoll);

        let mut order = Vec::new();
        for value in [20.0, 15.0, 20.0, 20.0] {
            let name = next(&session).to_string();
            propose(&mut session, &name, value);
            order.push(name);
        }
        assert_eq!(order, vec!["A", "B", "C", "A"]);
    }

    #[test]
    fn test_concluded_session_has_no_speaker() {
        let mut session = session();
        session
            .conclude(crate::deliberation::TerminationReason::Sentinel)
            .unwrap();
        assert_eq!(
            SpeakerSelector::select(&session).unwrap_err(),
            SelectionError::SessionConcluded
        );
    }
}
