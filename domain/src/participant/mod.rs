//! Participant domain
//!
//! Who takes part in a deliberation and what each party is allowed to do.
//!
//! - [`Role`]: closed set of role tags (opener, voter, mediator, support)
//! - [`Participant`]: identity, role tag and capability flags
//! - [`ParticipantRegistry`]: validated, read-only roster for one session

pub mod entities;
pub mod registry;
pub mod role;

pub use entities::Participant;
pub use registry::ParticipantRegistry;
pub use role::Role;
