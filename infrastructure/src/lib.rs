//! Infrastructure layer for boardroom
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod openai;
pub mod persistence;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, FileConfig, FileDeliberationConfig, FileLoggingConfig,
    FileOutputConfig, FileProviderConfig, FileStorageConfig,
};
pub use logging::JsonlConversationLogger;
pub use openai::{OpenAiConfig, OpenAiError, OpenAiReasoningAgent};
pub use persistence::{FileSessionStore, InMemorySessionStore};
pub use tools::{AgentTool, FETCH_DISCUSSION, FetchDiscussionTool, ToolRegistry};
