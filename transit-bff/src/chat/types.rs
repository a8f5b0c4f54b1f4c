//! Request and response types for the chat relay.

use serde::{Deserialize, Serialize};

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

fn default_temperature() -> f64 {
    0.3
}

fn default_chat_max_tokens() -> Option<u32> {
    Some(256)
}

fn default_plan_max_tokens() -> Option<u32> {
    Some(180)
}

/// Body of `POST /chat`.
///
/// An explicit `"max_tokens": null` is forwarded as null; an absent field
/// takes the default.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_chat_max_tokens")]
    pub max_tokens: Option<u32>,
}

/// Body of `POST /plan`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    pub prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_plan_max_tokens")]
    pub max_tokens: Option<u32>,
}

/// Body returned by `POST /chat` and `POST /plan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
}

/// Payload sent to the completions endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct CompletionRequest<'a> {
    pub messages: &'a [ChatMessage],
    pub temperature: f64,
    pub max_tokens: Option<u32>,
}

/// The subset of a completions response we read.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CompletionResponse {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Default, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<CompletionMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice, or empty if the response has none.
    pub fn into_content(self) -> String {
        self.choices
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default()
    }
}
