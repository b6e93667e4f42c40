//! Participant registry - the validated roster of one session

use super::entities::Participant;
use crate::core::error::DomainError;
use crate::deliberation::ProposalKind;
use std::collections::HashSet;

/// Read-only roster of a session (Entity)
///
/// Holds every participant in registry order (the order used for tie
/// breaking and for the final poll) together with the fixed opening order.
/// Construction validates the roster; nothing can be changed afterwards.
///
/// # Example
///
/// ```
/// use boardroom_domain::participant::{Participant, ParticipantRegistry, Role};
///
/// let registry = ParticipantRegistry::new(vec![
///     Participant::new("Liquidity_Analyst", Role::Opener).voting(),
///     Participant::new("Solid_Analyst", Role::Voter).voting(),
///     Participant::new("Manager", Role::Mediator),
/// ])
/// .unwrap();
///
/// assert_eq!(registry.voting_set().len(), 2);
/// assert_eq!(registry.mediator().unwrap().name(), "Manager");
/// ```
#[derive(Debug, Clone)]
pub struct ParticipantRegistry {
    participants: Vec<Participant>,
    /// Indices into `participants`
    opening_order: Vec<usize>,
    proposal_kind: ProposalKind,
}

impl ParticipantRegistry {
    /// Build a registry whose opening order is the registry order.
    pub fn new(participants: Vec<Participant>) -> Result<Self, DomainError> {
        if participants.is_empty() {
            return Err(DomainError::EmptyRoster);
        }

        let mut seen = HashSet::new();
        for p in &participants {
            if !seen.insert(p.name().to_lowercase()) {
                return Err(DomainError::DuplicateParticipant(p.name().to_string()));
            }
        }

        if !participants.iter().any(|p| p.is_voting()) {
            return Err(DomainError::EmptyVotingSet);
        }

        let mut mediators = participants.iter().filter(|p| p.is_mediator());
        if let (Some(first), Some(second)) = (mediators.next(), mediators.next()) {
            return Err(DomainError::MultipleMediators(
                first.name().to_string(),
                second.name().to_string(),
            ));
        }

        let opening_order = (0..participants.len()).collect();
        Ok(Self {
            participants,
            opening_order,
            proposal_kind: ProposalKind::default(),
        })
    }

    /// Replace the opening order with the given participant names.
    ///
    /// Every name must exist and may appear only once. Participants left out
    /// simply do not speak during the opening.
    pub fn with_opening_order<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self, DomainError> {
        let mut order = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let index = self
                .index_of(name)
                .ok_or_else(|| DomainError::UnknownParticipant(name.to_string()))?;
            if order.contains(&index) {
                return Err(DomainError::DuplicateParticipant(name.to_string()));
            }
            order.push(index);
        }
        self.opening_order = order;
        Ok(self)
    }

    /// Set what the voters' proposal values mean.
    pub fn with_proposal_kind(mut self, kind: ProposalKind) -> Self {
        self.proposal_kind = kind;
        self
    }

    pub fn proposal_kind(&self) -> ProposalKind {
        self.proposal_kind
    }

    /// All participants in registry order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// The fixed sequence of speakers used once at session start.
    pub fn opening_order(&self) -> Vec<&Participant> {
        self.opening_order
            .iter()
            .map(|&i| &self.participants[i])
            .collect()
    }

    /// Voting participants in registry order.
    pub fn voting_set(&self) -> Vec<&Participant> {
        self.participants.iter().filter(|p| p.is_voting()).collect()
    }

    pub fn mediator(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.is_mediator())
    }

    pub fn get(&self, name: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.name() == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.participants.iter().position(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
