//! Output format value object

use serde::{Deserialize, Serialize};

/// How a finished session or comparison is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every turn of every transcript
    Full,
    /// Outcome, final proposals and closing remarks (default)
    #[default]
    Summary,
    /// The result as JSON
    Json,
}
