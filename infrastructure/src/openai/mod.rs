//! OpenAI-compatible reasoning adapter
//!
//! Implements the [`ReasoningAgent`](boardroom_application::ReasoningAgent)
//! port over the chat completions API with native tool calling. Any server
//! speaking that protocol works (OpenAI, Azure OpenAI, vLLM, Ollama).

pub mod agent;
pub mod error;
pub mod protocol;

pub use agent::{OpenAiConfig, OpenAiReasoningAgent};
pub use error::OpenAiError;
