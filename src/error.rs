//! Error handling for the RookieShop back-office client

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::store::Notice;

/// Structured error payload returned by the API for any failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// HTTP status code echoed by the server
    #[serde(alias = "status")]
    pub status_code: u16,

    /// Short, human-readable summary
    #[serde(default)]
    pub title: String,

    /// Explanation specific to this occurrence
    #[serde(default)]
    pub detail: String,
}

impl ProblemDetails {
    pub fn new<T: fmt::Display, D: fmt::Display>(status_code: u16, title: T, detail: D) -> Self {
        Self {
            status_code,
            title: title.to_string(),
            detail: detail.to_string(),
        }
    }

    /// Build a problem from a response that did not carry a problem-details body.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let title = status.canonical_reason().unwrap_or("Request failed");
        let detail = if body.trim().is_empty() {
            format!("Request failed with status {}", status.as_u16())
        } else {
            body.to_string()
        };

        Self::new(status.as_u16(), title, detail)
    }
}

impl fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.title, self.status_code, self.detail)
    }
}

/// Unified error type for the back-office client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// File system errors while preparing uploads
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Non-2xx response carrying the server's problem details
    #[error("API error: {0}")]
    Problem(ProblemDetails),

    /// Identity provider errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A 401 that silent renewal could not recover
    #[error("Interactive sign-in required")]
    SignInRequired,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Access token could not be decoded
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// The problem details carried by this error, if the server sent one.
    pub fn problem(&self) -> Option<&ProblemDetails> {
        match self {
            Error::Problem(problem) => Some(problem),
            _ => None,
        }
    }

    /// Project the error into the notice a slice keeps for display.
    ///
    /// Problem details are surfaced verbatim; every other failure gets a
    /// generic title and its display text as detail.
    pub fn notice(&self) -> Notice {
        match self {
            Error::Problem(problem) => Notice::new(&problem.title, &problem.detail),
            Error::SignInRequired => Notice::new("Unauthorized", "Please sign in again"),
            other => Notice::new("Error", other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_details_accepts_status_alias() {
        let problem: ProblemDetails = serde_json::from_str(
            r#"{"status": 404, "title": "Not Found", "detail": "Category 7 does not exist"}"#,
        )
        .unwrap();

        assert_eq!(problem.status_code, 404);
        assert_eq!(problem.title, "Not Found");
    }

    #[test]
    fn notice_keeps_problem_verbatim() {
        let error = Error::Problem(ProblemDetails::new(409, "Conflict", "SKU already exists"));
        let notice = error.notice();

        assert_eq!(notice.title, "Conflict");
        assert_eq!(notice.detail, "SKU already exists");
    }

    #[test]
    fn notice_for_other_errors_uses_display_text() {
        let notice = Error::config("api_url cannot be empty").notice();

        assert_eq!(notice.title, "Error");
        assert!(notice.detail.contains("api_url cannot be empty"));
    }

    #[test]
    fn from_status_falls_back_to_reason() {
        let problem = ProblemDetails::from_status(reqwest::StatusCode::BAD_GATEWAY, "");

        assert_eq!(problem.status_code, 502);
        assert_eq!(problem.title, "Bad Gateway");
        assert!(problem.detail.contains("502"));
    }
}
