//! Session persistence adapters
//!
//! Implementations of the [`SessionStore`](boardroom_application::SessionStore)
//! port: one JSON file per session, or an in-memory map.

mod file_store;
mod memory_store;

pub use file_store::FileSessionStore;
pub use memory_store::InMemorySessionStore;

use boardroom_application::StoreError;

/// Session ids become file names, so only a conservative alphabet is allowed.
pub(crate) fn validate_session_id(session_id: &str) -> Result<(), StoreError> {
    let valid = !session_id.is_empty()
        && session_id.len() <= 128
        && !session_id.starts_with('.')
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId(session_id.to_string()))
    }
}

#[cfg(test)]
pub(crate) fn sample_result(session_id: &str) -> boardroom_domain::SessionResult {
    use boardroom_domain::{
        DeliberationPolicy, Participant, ParticipantRegistry, Proposal, Role, Session,
        TerminationReason, Turn,
    };

    let registry = ParticipantRegistry::new(vec![
        Participant::new("Alpha", Role::Voter).voting(),
        Participant::new("Manager", Role::Mediator),
    ])
    .unwrap();
    let alpha = registry.get("Alpha").unwrap().clone();
    let manager = registry.get("Manager").unwrap().clone();
    let mut session = Session::new(
        session_id,
        registry,
        DeliberationPolicy::default(),
        "Decide the allocation for XYZ.",
    )
    .unwrap();
    let phase = session.phase();
    session
        .append(
            Turn::new(1, &alpha, phase, "Margins look healthy, I propose 20 percent.")
                .with_proposal(Proposal::new(20.0)),
        )
        .unwrap();
    session
        .append(Turn::new(2, &manager, phase, "Noted. TERMINATE"))
        .unwrap();
    session.conclude(TerminationReason::Sentinel).unwrap();
    session.into_result().unwrap()
}
