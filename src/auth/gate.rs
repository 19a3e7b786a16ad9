//! Process-wide authentication state.
//!
//! `SessionGate` owns the single authoritative answer to "is someone
//! signed in". It starts in `Booting`, resolves exactly once by reading
//! the session store and re-validating the stored token against the
//! server, and afterwards moves only through `sign_in` / `sign_out`.
//! The screen router renders nothing until the boot check resolves, so
//! the login screen never flashes before a valid session is recognized.

use tracing::{info, warn};

use crate::api::ApiError;
use crate::models::User;

use super::session::SessionClient;

/// Authentication phase of the running process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    /// Startup check still pending; nothing is rendered.
    Booting,
    Unauthenticated,
    Authenticated,
}

pub struct SessionGate {
    client: SessionClient,
    phase: AuthPhase,
    user: Option<User>,
}

impl SessionGate {
    pub fn new(client: SessionClient) -> Self {
        Self {
            client,
            phase: AuthPhase::Booting,
            user: None,
        }
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == AuthPhase::Authenticated
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin())
    }

    /// The stored bearer token, for handing to data-plane clients.
    pub fn token(&self) -> Option<String> {
        self.client.stored_token()
    }

    pub fn session(&self) -> &SessionClient {
        &self.client
    }

    /// Resolve the boot phase, exactly once. A stored session that the
    /// server still accepts boots into `Authenticated`; anything else -
    /// empty store, partial store, failed validation, storage failure -
    /// degrades to `Unauthenticated`, clearing whatever was left behind.
    /// Storage failures are logged, never surfaced.
    pub async fn bootstrap(&mut self) {
        if self.phase != AuthPhase::Booting {
            return;
        }

        if self.client.is_authenticated().await {
            match self.client.stored_user() {
                Some(user) => {
                    info!(username = %user.username, "Resuming stored session");
                    self.user = Some(user);
                    self.phase = AuthPhase::Authenticated;
                    return;
                }
                None => {
                    // Profile vanished between the check and the read;
                    // fall through to the signed-out path
                    warn!("Stored profile disappeared during boot");
                }
            }
        }

        // The session is absent, stale, or unreadable: drop the leftovers
        // so the store and the flag agree
        if let Err(e) = self.client.logout() {
            warn!(error = %e, "Could not clear session store during boot");
        }
        self.user = None;
        self.phase = AuthPhase::Unauthenticated;
    }

    /// Sign in. The phase flips to `Authenticated` only after the session
    /// client has persisted the token and profile, so an observer never
    /// sees the authenticated tree with an empty store.
    pub async fn sign_in(&mut self, username: &str, password: &str) -> Result<(), ApiError> {
        let user = self.client.login(username, password).await?;
        info!(username = %user.username, "Signed in");
        self.user = Some(user);
        self.phase = AuthPhase::Authenticated;
        Ok(())
    }

    /// Sign out. Clears the store first, then the flag; even a partial
    /// clear forces `Unauthenticated`, since an indeterminate store must
    /// never be treated as a live session. Idempotent and silent.
    pub async fn sign_out(&mut self) {
        if let Err(e) = self.client.logout() {
            warn!(error = %e, "Session store may be partially cleared; forcing signed-out state");
        }
        self.user = None;
        if self.phase != AuthPhase::Unauthenticated {
            info!("Signed out");
        }
        self.phase = AuthPhase::Unauthenticated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::auth::store::SessionStore;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gate_for(base_url: String) -> (SessionGate, TempDir) {
        let dir = TempDir::new().unwrap();
        let api = ApiClient::new(base_url).unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());
        (SessionGate::new(SessionClient::new(api, store)), dir)
    }

    async fn mount_login_ok(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "tok123",
                "usuario": {"id": 1, "username": "alice", "tipoUsuario": "ADMIN"}
            })))
            .mount(server)
            .await;
    }

    async fn mount_validate(server: &MockServer, status: u16) {
        Mock::given(method("POST"))
            .and(path("/api/auth/validate-token"))
            .and(query_param("token", "tok123"))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_boot_with_empty_store_is_unauthenticated() {
        let (mut gate, _dir) = gate_for("http://127.0.0.1:9/api".to_string());
        assert_eq!(gate.phase(), AuthPhase::Booting);

        gate.bootstrap().await;
        assert_eq!(gate.phase(), AuthPhase::Unauthenticated);
        assert!(gate.current_user().is_none());
    }

    #[tokio::test]
    async fn test_boot_resumes_validated_session() {
        let server = MockServer::start().await;
        mount_login_ok(&server).await;
        mount_validate(&server, 200).await;

        let (mut gate, dir) = gate_for(format!("{}/api", server.uri()));
        gate.sign_in("alice", "correct").await.unwrap();

        // Fresh gate over the same store simulates a process restart
        let api = ApiClient::new(format!("{}/api", server.uri())).unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());
        let mut restarted = SessionGate::new(SessionClient::new(api, store));
        restarted.bootstrap().await;

        assert_eq!(restarted.phase(), AuthPhase::Authenticated);
        assert_eq!(
            restarted.current_user().map(|u| u.username.as_str()),
            Some("alice")
        );
        assert!(restarted.is_admin());
    }

    #[tokio::test]
    async fn test_boot_clears_store_when_validation_fails() {
        let server = MockServer::start().await;
        mount_login_ok(&server).await;
        mount_validate(&server, 401).await;

        let (mut gate, dir) = gate_for(format!("{}/api", server.uri()));
        gate.sign_in("alice", "correct").await.unwrap();

        let api = ApiClient::new(format!("{}/api", server.uri())).unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());
        let mut restarted = SessionGate::new(SessionClient::new(api, store));
        restarted.bootstrap().await;

        assert_eq!(restarted.phase(), AuthPhase::Unauthenticated);
        // The stale session was destroyed, not left half-alive
        assert!(restarted.token().is_none());
        assert!(restarted.session().stored_user().is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_resolves_only_once() {
        let (mut gate, _dir) = gate_for("http://127.0.0.1:9/api".to_string());
        gate.bootstrap().await;
        assert_eq!(gate.phase(), AuthPhase::Unauthenticated);

        // A second call is a no-op even if state changed in between
        gate.phase = AuthPhase::Authenticated;
        gate.bootstrap().await;
        assert_eq!(gate.phase(), AuthPhase::Authenticated);
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_gate_unauthenticated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "invalid credentials"})),
            )
            .mount(&server)
            .await;

        let (mut gate, _dir) = gate_for(format!("{}/api", server.uri()));
        gate.bootstrap().await;

        let err = gate.sign_in("alice", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "invalid credentials");
        assert_eq!(gate.phase(), AuthPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_sign_out_twice_is_silent() {
        let server = MockServer::start().await;
        mount_login_ok(&server).await;

        let (mut gate, _dir) = gate_for(format!("{}/api", server.uri()));
        gate.bootstrap().await;
        gate.sign_in("alice", "correct").await.unwrap();
        assert_eq!(gate.phase(), AuthPhase::Authenticated);

        gate.sign_out().await;
        assert_eq!(gate.phase(), AuthPhase::Unauthenticated);
        assert!(gate.token().is_none());

        gate.sign_out().await;
        assert_eq!(gate.phase(), AuthPhase::Unauthenticated);
        assert!(gate.token().is_none());
    }
}
