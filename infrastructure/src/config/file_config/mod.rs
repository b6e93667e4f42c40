//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and convert into domain and application
//! types on demand.

mod deliberation;
mod logging;
mod output;
mod provider;
mod storage;

pub use deliberation::FileDeliberationConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use provider::FileProviderConfig;
pub use storage::FileStorageConfig;

use super::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Turn-taking policy and loop limits
    pub deliberation: FileDeliberationConfig,
    /// Reasoning provider endpoint
    pub provider: FileProviderConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Diagnostic and conversation logs
    pub logging: FileLoggingConfig,
    /// Where finished sessions are persisted
    pub storage: FileStorageConfig,
}

impl FileConfig {
    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.deliberation
            .to_policy()
            .validate()
            .map_err(|e| ConfigError::invalid("deliberation", e.to_string()))?;

        if self.deliberation.turn_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "deliberation.turn_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("provider.base_url", "must not be empty"));
        }
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::invalid("provider.model", "must not be empty"));
        }
        if let Some(t) = self.provider.temperature
            && !(0.0..=2.0).contains(&t)
        {
            return Err(ConfigError::invalid(
                "provider.temperature",
                format!("{t} is outside 0.0..=2.0"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardroom_domain::OutputFormat;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[deliberation]
turn_budget = 40
final_poll_directives = ["FINAL DECISION"]

[provider]
base_url = "http://localhost:11434/v1"
model = "llama3"
temperature = 0.3

[output]
format = "full"
color = false

[logging]
dir = "logs"

[storage]
dir = "runs"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.deliberation.turn_budget, 40);
        assert_eq!(config.deliberation.final_poll_directives, vec!["FINAL DECISION"]);
        assert_eq!(config.provider.model, "llama3");
        assert_eq!(config.provider.temperature, Some(0.3));
        assert_eq!(config.output.format, Some(OutputFormat::Full));
        assert!(!config.output.color);
        assert_eq!(config.logging.dir.as_deref(), Some(std::path::Path::new("logs")));
        assert_eq!(config.storage.dir, std::path::PathBuf::from("runs"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default();
        assert!(config.output.color);
        assert_eq!(config.provider.api_key_env, "OPENAI_API_KEY");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let mut config = FileConfig::default();
        config.deliberation.turn_budget = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field, .. }) if field == "deliberation"
        ));
    }

    #[test]
    fn test_validate_rejects_temperature() {
        let mut config = FileConfig::default();
        config.provider.temperature = Some(3.5);
        assert!(config.validate().is_err());
    }
}
