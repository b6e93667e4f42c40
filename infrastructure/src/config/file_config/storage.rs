//! Session storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Directory holding one JSON file per finished session.
    pub dir: PathBuf,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".boardroom/sessions"),
        }
    }
}
