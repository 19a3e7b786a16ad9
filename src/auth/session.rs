//! Session operations over the API client and the session store.
//!
//! `SessionClient` is the only component that calls the authentication and
//! user-management endpoints, and the only writer of the session store.
//! The contract every caller relies on:
//!
//! - `login` has already persisted the token and profile by the time it
//!   returns `Ok`.
//! - `is_authenticated` answers without a network call when either stored
//!   entry is missing, and otherwise asks the server.
//! - `validate_token` always produces a definite boolean; an unreachable
//!   backend counts as "not valid".
//! - `logout` is idempotent.

use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{User, UserPayload};

use super::store::SessionStore;

pub struct SessionClient {
    api: ApiClient,
    store: SessionStore,
}

impl SessionClient {
    pub fn new(api: ApiClient, store: SessionStore) -> Self {
        Self { api, store }
    }

    /// Authenticate and persist the session. Callers may assume the token
    /// and profile are durably stored once this resolves, so a failed write
    /// fails the login rather than leaving a half-established session.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        let response = self.api.login(username, password).await?;
        self.store.save_session(&response.token, &response.user)?;
        debug!(username, "Session persisted");
        Ok(response.user)
    }

    /// Clear the stored session. Calling this when already signed out
    /// succeeds silently.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.store.remove_all()?;
        Ok(())
    }

    /// Ask the server whether the token is still good. Any failure to get
    /// an answer counts as "not valid" so the caller always gets a definite
    /// boolean and never a hang or a propagated error.
    pub async fn validate_token(&self, token: &str) -> bool {
        match self.api.validate_token(token).await {
            Ok(valid) => valid,
            Err(e) => {
                debug!(error = %e, "Token validation unreachable; treating as invalid");
                false
            }
        }
    }

    /// Whether a usable session exists. Absent or unreadable entries answer
    /// `false` immediately - the common never-logged-in case costs no
    /// network round trip, and a token without a profile (or vice versa)
    /// never counts as signed in. Only a fully present session is checked
    /// against the server.
    pub async fn is_authenticated(&self) -> bool {
        let token = match self.store.token() {
            Ok(Some(token)) => token,
            Ok(None) => return false,
            Err(e) => {
                warn!(error = %e, "Session store unreadable; treating as signed out");
                return false;
            }
        };

        match self.store.user() {
            Ok(Some(_)) => {}
            Ok(None) => return false,
            Err(e) => {
                warn!(error = %e, "Stored profile unreadable; treating as signed out");
                return false;
            }
        }

        self.validate_token(&token).await
    }

    /// The stored profile, if any. Corrupt data reads as absent.
    pub fn stored_user(&self) -> Option<User> {
        self.store.user_lossy()
    }

    /// The stored bearer token, if any.
    pub fn stored_token(&self) -> Option<String> {
        self.store.token().unwrap_or_else(|e| {
            warn!(error = %e, "Session store unreadable");
            None
        })
    }

    /// API client carrying whatever token is currently stored. Privileged
    /// calls go through this so they always use the live session.
    fn authed_api(&self) -> ApiClient {
        match self.stored_token() {
            Some(token) => self.api.with_token(token),
            None => self.api.clone(),
        }
    }

    // ===== User management (admin screens) =====
    //
    // No role check happens here; the backend authorizes every request and
    // rejections surface as the message-carrying auth error.

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.authed_api().list_users().await
    }

    pub async fn register_user(&self, payload: &UserPayload) -> Result<User, ApiError> {
        self.authed_api().create_user(payload).await
    }

    pub async fn update_user(&self, id: i64, payload: &UserPayload) -> Result<User, ApiError> {
        self.authed_api().update_user(id, payload).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        self.authed_api().delete_user(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_client(base_url: String) -> (SessionClient, TempDir) {
        let dir = TempDir::new().unwrap();
        let api = ApiClient::new(base_url).unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());
        (SessionClient::new(api, store), dir)
    }

    fn mock_client(server: &MockServer) -> (SessionClient, TempDir) {
        session_client(format!("{}/api", server.uri()))
    }

    fn login_body() -> serde_json::Value {
        serde_json::json!({
            "token": "tok123",
            "usuario": {"id": 1, "username": "alice", "tipoUsuario": "ADMIN"}
        })
    }

    async fn mount_login_ok(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(serde_json::json!({
                "username": "alice",
                "password": "correct"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_body()))
            .mount(server)
            .await;
    }

    async fn mount_validate(server: &MockServer, token: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path("/api/auth/validate-token"))
            .and(query_param("token", token))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_login_rejection_carries_server_message() {
        // Scenario: wrong password, backend answers 401 with a message body
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "invalid credentials"})),
            )
            .mount(&server)
            .await;

        let (client, _dir) = mock_client(&server);
        let err = client.login("alice", "wrong").await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(err.to_string(), "invalid credentials");

        // Store untouched
        assert!(client.stored_token().is_none());
        assert!(client.stored_user().is_none());
    }

    #[tokio::test]
    async fn test_login_persists_before_returning() {
        let server = MockServer::start().await;
        mount_login_ok(&server).await;
        mount_validate(&server, "tok123", 200).await;

        let (client, _dir) = mock_client(&server);
        let user = client.login("alice", "correct").await.unwrap();
        assert_eq!(user.username, "alice");

        // Both entries are already durable and the stored profile matches
        // the server's usuario object field for field
        assert_eq!(client.stored_token().as_deref(), Some("tok123"));
        assert_eq!(client.stored_user(), Some(user));

        assert!(client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_login_unreachable_backend_is_network_error() {
        // Nothing listens on this port: connection refused
        let (client, _dir) = session_client("http://127.0.0.1:9/api".to_string());
        let err = client.login("alice", "correct").await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert!(client.stored_token().is_none());
    }

    #[tokio::test]
    async fn test_is_authenticated_short_circuits_on_empty_store() {
        // Unreachable backend: if this tried the network it would error or
        // stall; an empty store must answer false without it
        let (client, _dir) = session_client("http://127.0.0.1:9/api".to_string());
        assert!(!client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_is_authenticated_false_on_partial_store() {
        let server = MockServer::start().await;
        mount_validate(&server, "tok123", 200).await;

        let (client, dir) = mock_client(&server);
        // Simulated corruption: token present, profile absent
        std::fs::write(dir.path().join("token"), "tok123").unwrap();

        assert!(!client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_is_authenticated_fails_closed_on_validation_error() {
        // Scenario: stored session is fully present but the validation
        // endpoint errors out
        let server = MockServer::start().await;
        mount_login_ok(&server).await;
        mount_validate(&server, "tok123", 500).await;

        let (client, _dir) = mock_client(&server);
        client.login("alice", "correct").await.unwrap();
        assert!(!client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_validate_token_false_when_unreachable() {
        let (client, _dir) = session_client("http://127.0.0.1:9/api".to_string());
        assert!(!client.validate_token("tok123").await);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let server = MockServer::start().await;
        mount_login_ok(&server).await;

        let (client, _dir) = mock_client(&server);
        client.login("alice", "correct").await.unwrap();

        client.logout().unwrap();
        assert!(client.stored_token().is_none());
        assert!(client.stored_user().is_none());
        assert!(!client.is_authenticated().await);

        // Second logout on an already-empty store succeeds silently
        client.logout().unwrap();
        assert!(client.stored_token().is_none());
    }
}
