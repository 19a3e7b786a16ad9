use serde::Deserialize;
use thiserror::Error;

use crate::auth::store::StorageError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server explicitly rejected the request. The message comes from
    /// the response body when the backend sent one and is suitable for
    /// direct display.
    #[error("{0}")]
    Auth(String),

    /// Transport-level failure: the backend could not be reached at all.
    /// Callers offer a retry rather than re-prompting for credentials.
    #[error("cannot reach server: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("local storage failure: {0}")]
    Storage(#[from] StorageError),
}

/// Structured error body the backend sends on rejections.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Build the rejection error for a non-success response, preferring the
    /// server's `{"message": ...}` body over a generic fallback.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.message)
            .filter(|msg| !msg.is_empty())
            .unwrap_or_else(|| format!("request failed with status {}", status));
        ApiError::Auth(message)
    }

    /// True when the server rejected the request (as opposed to the request
    /// never arriving). A rejection on a data fetch means the session is no
    /// longer good and the user is routed back to the login screen.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }

    /// Text shown to the user in the status bar or login form.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Auth(message) => message.clone(),
            ApiError::Network(_) => {
                "Unable to reach the server. Check that the backend is running.".to_string()
            }
            ApiError::InvalidResponse(_) => "The server sent an unexpected response.".to_string(),
            ApiError::Storage(_) => "Could not save session data locally.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_prefers_server_message() {
        let err = ApiError::from_status(
            reqwest::StatusCode::UNAUTHORIZED,
            r#"{"message":"invalid credentials"}"#,
        );
        assert!(err.is_auth());
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[test]
    fn test_from_status_falls_back_without_body() {
        let err = ApiError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "");
        assert!(err.is_auth());
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_from_status_falls_back_on_unparseable_body() {
        let err = ApiError::from_status(reqwest::StatusCode::FORBIDDEN, "<html>denied</html>");
        assert!(err.to_string().contains("403"));
    }
}
