//! Presentation layer for boardroom
//!
//! This crate contains the CLI definition, result formatters and live
//! progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, CompareArgs, DeliberateArgs, MarketArgs, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
