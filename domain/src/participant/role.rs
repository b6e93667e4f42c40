//! Participant role tags

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Role tag of a participant (Value Object)
///
/// The set is closed: selection rules and `restricted_responders` sets are
/// expressed purely in terms of these tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Specialist analyst that presents its analysis during the opening
    Opener,
    /// Arbitrates deadlocks and calls for final decisions
    Mediator,
    /// Debating analyst expected to hold a position
    Voter,
    /// Tool-backed helper that only reacts to specific roles
    Support,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Opener => "opener",
            Role::Mediator => "mediator",
            Role::Voter => "voter",
            Role::Support => "support",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Role::Opener => "Opening Analyst",
            Role::Mediator => "Mediator",
            Role::Voter => "Voting Analyst",
            Role::Support => "Support Tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "opener" => Ok(Role::Opener),
            "mediator" | "manager" => Ok(Role::Mediator),
            "voter" => Ok(Role::Voter),
            "support" | "tool" => Ok(Role::Support),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}
