use reqwest::StatusCode;
use thiserror::Error;

use crate::forms::FieldErrors;
use crate::session::Route;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    /// 409. `from_server` is false when the body carried no message of its own.
    #[error("{message}")]
    Conflict { message: String, from_server: bool },

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Unauthorized access, sign in at {redirect}")]
    Unauthorized { redirect: Route },

    #[error("Session error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Not supported: {0}")]
    Unsupported(String),
}

impl ClientError {
    /// Builds the error for a non-2xx response, preferring the server's own message.
    pub fn from_status(status: u16, body: &serde_json::Value) -> Self {
        let server_message = body
            .get("message")
            .or_else(|| body.get("error"))
            .and_then(|m| m.as_str())
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string);
        let from_server = server_message.is_some();
        let message = server_message.unwrap_or_else(|| format!("Request failed ({})", status));

        if status == StatusCode::CONFLICT.as_u16() {
            ClientError::Conflict {
                message,
                from_server,
            }
        } else {
            ClientError::Http { status, message }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Conflict { .. } => Some(StatusCode::CONFLICT.as_u16()),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::Conflict { .. })
    }

    /// 2xx response whose envelope carried `success: false`.
    pub fn rejected(body: &serde_json::Value, fallback: &str) -> Self {
        let message = body
            .get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback);
        ClientError::Rejected(message.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    /// Text shown in the transient notification for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => "Network error. Please try again.".to_string(),
            ClientError::Http { message, .. } => message.clone(),
            ClientError::Conflict { message, .. } => message.clone(),
            ClientError::Rejected(message) => message.clone(),
            ClientError::Validation(errors) => errors
                .first_message()
                .unwrap_or("Please correct the highlighted fields.")
                .to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        log::error!("Transport error: {}", error);
        ClientError::Network(error.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        log::error!("Decode error: {}", error);
        ClientError::Decode(error.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
