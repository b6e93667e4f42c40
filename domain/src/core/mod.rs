//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: configuration and invariant violations

pub mod error;
