//! Chat relay to a hosted LLM (Azure OpenAI chat completions).
//!
//! Each request is forwarded once and the completion text is returned
//! verbatim. `/plan` requests get a fixed trip-planning system prompt.

mod client;
mod error;
mod prompt;
mod types;

pub use client::{LlmClient, LlmConfig};
pub use error::RelayError;
pub use prompt::SYSTEM_PROMPT;
pub use types::{ChatMessage, ChatRequest, ChatResponse, PlanRequest, Role};
