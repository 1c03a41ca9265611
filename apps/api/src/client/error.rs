use reqwest::Method;
use serde::Deserialize;
use thiserror::Error;

pub const ALREADY_APPLIED_MESSAGE: &str = "You've already applied to this job.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The server rejected the credentials. The stored token has been cleared.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Connection failures, timeouts and 5xx responses. 4xx never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_connect() || e.is_timeout(),
            ClientError::Api { status, .. } => *status >= 500,
            ClientError::Unauthorized | ClientError::Decode(_) => false,
        }
    }

    /// Like `is_retryable`, but a timed-out request is only resent when
    /// `method` is idempotent: the server may already have applied it.
    pub fn is_retryable_for(&self, method: &Method) -> bool {
        match self {
            ClientError::Http(e) if e.is_timeout() && !e.is_connect() => method.is_idempotent(),
            _ => self.is_retryable(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Unauthorized => Some(401),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            ClientError::Decode(_) => None,
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { status: 409, message } if is_duplicate_application(message) => {
                ALREADY_APPLIED_MESSAGE.to_string()
            }
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            ClientError::Http(_) => "Could not reach the server. Please try again.".to_string(),
            ClientError::Decode(_) => "Unexpected response from the server.".to_string(),
        }
    }
}

fn is_duplicate_application(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("already applied") || lower.contains("duplicate")
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pulls `error.message` out of an API error body, falling back to the raw text.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, message: &str) -> ClientError {
        ClientError::Api {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_duplicate_application_is_friendly() {
        assert_eq!(
            api(409, "You have already applied to this job").user_message(),
            ALREADY_APPLIED_MESSAGE
        );
        assert_eq!(
            api(409, "duplicate key value violates unique constraint").user_message(),
            ALREADY_APPLIED_MESSAGE
        );
    }

    #[test]
    fn test_other_conflicts_pass_through() {
        assert_eq!(
            api(409, "An account with this email already exists").user_message(),
            "An account with this email already exists"
        );
        assert_eq!(api(400, "already applied").user_message(), "already applied");
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(api(503, "unavailable").is_retryable());
        assert!(!api(404, "missing").is_retryable());
        assert!(!ClientError::Unauthorized.is_retryable());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error":{"code":"CONFLICT","message":"dup"}}"#),
            "dup"
        );
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
    }
}
