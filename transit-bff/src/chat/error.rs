//! Chat relay error types.

/// Errors from relaying a conversation to the LLM endpoint.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Endpoint, deployment, API version or key is missing
    #[error("Server is missing Azure config")]
    NotConfigured,

    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a status of 300 or above
    #[error("{body}")]
    Upstream { status: u16, body: String },

    /// Completion body was not the expected JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            RelayError::NotConfigured.to_string(),
            "Server is missing Azure config"
        );

        let err = RelayError::Upstream {
            status: 429,
            body: "slow down".into(),
        };
        assert_eq!(err.to_string(), "slow down");

        let err = RelayError::Json {
            message: "expected value".into(),
        };
        assert!(err.to_string().contains("expected value"));
    }
}
