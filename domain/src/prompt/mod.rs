//! Prompt domain
//!
//! System prompts, task descriptions and per-turn instructions.

mod template;

pub use template::{PromptTemplate, SUBMIT_PROPOSAL_TOOL};
