//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for the daily diagnostic log and conversation logs.
    /// Nothing is written to disk when unset.
    pub dir: Option<PathBuf>,
    /// Write a `<run>.conversation.jsonl` next to the diagnostic log.
    pub conversation: bool,
    /// Default tracing filter when `-v` is not given, e.g. "boardroom=info".
    pub filter: Option<String>,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            conversation: true,
            filter: None,
        }
    }
}
