//! Participant entity

use super::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One named party in a deliberation (Entity)
///
/// Participants are created once per session and never change afterwards;
/// all fields are private and only readable through accessors.
///
/// # Example
///
/// ```
/// use boardroom_domain::participant::{Participant, Role};
///
/// let search = Participant::new("Google_Search_Analyst", Role::Support)
///     .responds_only_to([Role::Voter]);
///
/// assert!(search.is_restricted());
/// assert!(search.responds_to(Role::Voter));
/// assert!(!search.responds_to(Role::Opener));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    name: String,
    role: Role,
    #[serde(default)]
    description: String,
    #[serde(default)]
    system_prompt: String,
    #[serde(default)]
    is_voting: bool,
    #[serde(default)]
    restricted_responders: BTreeSet<Role>,
    /// Optional model override for the reasoning provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model: Option<String>,
}

impl Participant {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
            description: String::new(),
            system_prompt: String::new(),
            is_voting: false,
            restricted_responders: BTreeSet::new(),
            model: None,
        }
    }

    /// Mark this participant as part of the voting set.
    pub fn voting(mut self) -> Self {
        self.is_voting = true;
        self
    }

    /// Limit this participant to reacting only to the given roles.
    pub fn responds_only_to(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.restricted_responders = roles.into_iter().collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    // ==================== Accessors ====================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn is_voting(&self) -> bool {
        self.is_voting
    }

    pub fn is_mediator(&self) -> bool {
        self.role == Role::Mediator
    }

    /// Whether this participant only reacts to a limited set of roles.
    pub fn is_restricted(&self) -> bool {
        !self.restricted_responders.is_empty()
    }

    pub fn restricted_responders(&self) -> &BTreeSet<Role> {
        &self.restricted_responders
    }

    /// Whether a turn by a speaker with `role` may be answered by this participant.
    ///
    /// Unrestricted participants respond to anyone.
    pub fn responds_to(&self, role: Role) -> bool {
        !self.is_restricted() || self.restricted_responders.contains(&role)
    }

    /// Position of the first mention of this participant in `text`, if any.
    ///
    /// The offset indexes the lowercased text; it is only meaningful for
    /// ordering mentions within the same message.
    ///
    /// Matches the exact name, the name with underscores read as spaces, and
    /// an `@name` handle, case-insensitively and on word boundaries, so
    /// `Red_Flags_Analyst` is not found inside `Red_Flags_Liquidity_Analyst`.
    pub fn mention_offset(&self, text: &str) -> Option<usize> {
        let haystack = normalize(text);
        let needle = normalize(&self.name);
        if needle.is_empty() {
            return None;
        }

        let mut from = 0;
        while let Some(found) = haystack[from..].find(&needle) {
            let start = from + found;
            let end = start + needle.len();
            let before_ok = haystack[..start]
                .chars()
                .next_back()
                .is_none_or(|c| !c.is_alphanumeric());
            let after_ok = haystack[end..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric());
            if before_ok && after_ok {
                return Some(start);
            }
            from = end;
        }
        None
    }
}

/// Lowercase and read `_` / `-` as spaces so names match prose.
///
/// Every replaced character is one byte, so offsets stay aligned with the
/// lowercased input.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect()
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_flags() {
        let p = Participant::new("Liquidity_Analyst", Role::Opener)
            .voting()
            .with_description("Analyzes liquidity ratios");

        assert!(p.is_voting());
        assert!(!p.is_mediator());
        assert!(!p.is_restricted());
        assert!(p.responds_to(Role::Support));
        assert_eq!(p.description(), "Analyzes liquidity ratios");
    }

    #[test]
    fn test_mediator_flag_follows_role() {
        let manager = Participant::new("Manager", Role::Mediator);
        assert!(manager.is_mediator());
        assert!(!manager.is_voting());
    }

    #[test]
    fn test_mention_with_spaces_and_case() {
        let p = Participant::new("Solid_Analyst", Role::Voter);
        assert!(p.mention_offset("What does the solid analyst think?").is_some());
        assert!(p.mention_offset("@Solid_Analyst please respond").is_some());
        assert!(p.mention_offset("A solid analysis overall.").is_none());
    }

    #[test]
    fn test_mention_respects_word_boundaries() {
        let red_flags = Participant::new("Red_Flags_Analyst", Role::Voter);
        assert!(
            red_flags
                .mention_offset("Red_Flags_Liquidity_Analyst raised a concern")
                .is_none()
        );
        assert_eq!(red_flags.mention_offset("Red_Flags_Analyst, go"), Some(0));
    }

    #[test]
    fn test_mention_returns_first_offset() {
        let p = Participant::new("Manager", Role::Mediator);
        let text = "We need a decision. Manager, please weigh in.";
        assert_eq!(p.mention_offset(text), Some(20));
    }
}
