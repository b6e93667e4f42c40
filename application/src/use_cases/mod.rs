//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod run_comparison;
pub mod run_deliberation;

#[cfg(test)]
pub(crate) mod test_support;
