//! Application-level configuration.
//!
//! - [`DeliberationParams`]: orchestrator loop limits (turn timeout, retries, deadline)

pub mod deliberation_params;

pub use deliberation_params::DeliberationParams;
