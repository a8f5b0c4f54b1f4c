//! Azure OpenAI chat completions client.

use std::time::Duration;

use tracing::debug;

use super::error::RelayError;
use super::prompt::SYSTEM_PROMPT;
use super::types::{ChatMessage, CompletionRequest, CompletionResponse};

/// Configuration for the LLM endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Resource endpoint, without trailing slash
    pub endpoint: String,
    /// Deployment name
    pub deployment: String,
    /// `api-version` query parameter
    pub api_version: String,
    /// Sent in the `api-key` header
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Create a new config. A trailing `/` on the endpoint is dropped.
    pub fn new(
        endpoint: impl Into<String>,
        deployment: impl Into<String>,
        api_version: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            deployment: deployment.into(),
            api_version: api_version.into(),
            api_key: api_key.into(),
            timeout_secs: 30,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Whether every credential needed for a call is present.
    pub fn is_configured(&self) -> bool {
        [
            &self.endpoint,
            &self.deployment,
            &self.api_version,
            &self.api_key,
        ]
        .iter()
        .all(|v| !v.is_empty())
    }

    /// Chat completions URL for the configured deployment.
    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

/// Relays conversations to the LLM and returns the reply text.
///
/// Stateless: no retry, no streaming.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new client.
    pub fn new(config: LlmConfig) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    /// Send `messages` and return the first choice's content.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f64,
        max_tokens: Option<u32>,
    ) -> Result<String, RelayError> {
        if !self.config.is_configured() {
            return Err(RelayError::NotConfigured);
        }

        let payload = CompletionRequest {
            messages,
            temperature,
            max_tokens,
        };

        debug!(
            deployment = %self.config.deployment,
            messages = messages.len(),
            "Sending chat completion"
        );
        let response = self
            .http
            .post(self.config.completions_url())
            .header("api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 300 {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let completion: CompletionResponse =
            serde_json::from_str(&body).map_err(|e| RelayError::Json {
                message: e.to_string(),
            })?;

        Ok(completion.into_content())
    }

    /// Ask the trip planner: the system prompt followed by `prompt`.
    pub async fn plan(
        &self,
        prompt: &str,
        temperature: f64,
        max_tokens: Option<u32>,
    ) -> Result<String, RelayError> {
        let messages = [ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];
        self.complete(&messages, temperature, max_tokens).await
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;

    /// Fake completions endpoint: echoes the message count, roles and last content.
    async fn serve_llm() -> String {
        async fn completions(
            Path(deployment): Path<String>,
            Query(params): Query<std::collections::HashMap<String, String>>,
            headers: HeaderMap,
            Json(body): Json<Value>,
        ) -> (StatusCode, Json<Value>) {
            if headers.get("api-key").and_then(|v| v.to_str().ok()) != Some("k") {
                return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
            }
            if deployment != "gpt" || params.get("api-version").map(String::as_str) != Some("v1")
            {
                return (StatusCode::NOT_FOUND, Json(json!({"error": "no such deployment"})));
            }

            let messages = body["messages"].as_array().cloned().unwrap_or_default();
            let roles: Vec<String> = messages
                .iter()
                .map(|m| m["role"].as_str().unwrap_or("").to_string())
                .collect();
            let last = messages
                .last()
                .and_then(|m| m["content"].as_str())
                .unwrap_or("");
            let content = format!(
                "{}|{}|{}|{}",
                roles.join(","),
                body["temperature"],
                body["max_tokens"],
                last
            );
            (
                StatusCode::OK,
                Json(json!({"choices": [{"message": {"role": "assistant", "content": content}}]})),
            )
        }

        let app = Router::new().route(
            "/openai/deployments/:deployment/chat/completions",
            post(completions),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[test]
    fn config_defaults() {
        let config = LlmConfig::new("https://llm.example/", "gpt", "v1", "k");
        assert_eq!(config.endpoint, "https://llm.example");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.is_configured());
        assert_eq!(
            config.completions_url(),
            "https://llm.example/openai/deployments/gpt/chat/completions?api-version=v1"
        );
    }

    #[test]
    fn any_missing_field_is_unconfigured() {
        assert!(!LlmConfig::new("", "gpt", "v1", "k").is_configured());
        assert!(!LlmConfig::new("https://llm.example", "", "v1", "k").is_configured());
        assert!(!LlmConfig::new("https://llm.example", "gpt", "", "k").is_configured());
        assert!(!LlmConfig::new("https://llm.example", "gpt", "v1", "").is_configured());
    }

    #[tokio::test]
    async fn unconfigured_client_fails_without_calling_out() {
        let client = LlmClient::new(LlmConfig::new("", "", "", "")).unwrap();
        let err = client
            .complete(&[ChatMessage::user("hej")], 0.3, Some(10))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::NotConfigured));
    }

    #[tokio::test]
    async fn relays_messages_verbatim() {
        let endpoint = serve_llm().await;
        let client = LlmClient::new(LlmConfig::new(endpoint, "gpt", "v1", "k")).unwrap();

        let content = client
            .complete(&[ChatMessage::user("hej")], 0.5, Some(42))
            .await
            .unwrap();
        assert_eq!(content, "user|0.5|42|hej");
    }

    #[tokio::test]
    async fn plan_prepends_system_prompt() {
        let endpoint = serve_llm().await;
        let client = LlmClient::new(LlmConfig::new(endpoint, "gpt", "v1", "k")).unwrap();

        let content = client.plan("till Flogsta", 0.3, None).await.unwrap();
        assert_eq!(content, "system,user|0.3|null|till Flogsta");
    }

    #[tokio::test]
    async fn upstream_status_is_passed_through() {
        let endpoint = serve_llm().await;
        let client = LlmClient::new(LlmConfig::new(endpoint, "gpt", "v1", "wrong")).unwrap();

        let err = client
            .complete(&[ChatMessage::user("hej")], 0.3, None)
            .await
            .unwrap_err();
        match err {
            RelayError::Upstream { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("bad key"));
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }
}
