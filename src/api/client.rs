//! API client for communicating with the fleet backend REST API.
//!
//! One `ApiClient` carries the base URL, the shared connection pool, and
//! the bearer token for the signed-in session. Every endpoint of the
//! backend contract lives here; nothing else in the app builds requests.

// Allow dead code: the whole backend contract is implemented, the screens
// consume a subset
#![allow(dead_code)]

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{Delivery, DeliveryStatus, Robot, RobotStatus, SensorEvent, User, UserPayload};

use super::ApiError;

/// HTTP request timeout in seconds. The backend answers quickly on a local
/// network; failing fast keeps the login form responsive when it is down.
/// Applies to every call, including login and token validation.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Successful login body: the bearer token plus the account it belongs to.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "usuario")]
    pub user: User,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// API client for the fleet backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the given base URL
    /// (e.g. `http://localhost:8080/api`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Drop the bearer token (after sign-out).
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.client.request(method, self.url(path));
        if let Some(ref token) = self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Check if a response is successful, building the rejection error from
    /// the body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, "Server rejected request");
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path).send().await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response).await
    }

    async fn put_json<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let response = self.request(Method::PUT, path).json(body).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Authentication =====

    /// Exchange credentials for a token and profile. Does not touch any
    /// local state; persistence is the session layer's job.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response).await
    }

    /// Ask the server whether a token is still good. Success or failure is
    /// signaled purely by the HTTP status; transport errors propagate so the
    /// caller can decide how to treat an unreachable backend.
    pub async fn validate_token(&self, token: &str) -> Result<bool, ApiError> {
        let response = self
            .client
            .post(self.url("/auth/validate-token"))
            .query(&[("token", token)])
            .send()
            .await?;

        Ok(response.status().is_success())
    }

    // ===== Users =====

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("/usuarios").await
    }

    pub async fn create_user(&self, payload: &UserPayload) -> Result<User, ApiError> {
        let response = self
            .request(Method::POST, "/usuarios")
            .json(payload)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response).await
    }

    pub async fn update_user(&self, id: i64, payload: &UserPayload) -> Result<User, ApiError> {
        let response = self
            .request(Method::PUT, &format!("/usuarios/{}", id))
            .json(payload)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/usuarios/{}", id))
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    pub async fn fetch_profile(&self) -> Result<User, ApiError> {
        self.get_json("/usuarios/perfil").await
    }

    // ===== Robots =====

    pub async fn fetch_robots(&self) -> Result<Vec<Robot>, ApiError> {
        self.get_json("/robos").await
    }

    pub async fn fetch_robot(&self, id: i64) -> Result<Robot, ApiError> {
        self.get_json(&format!("/robos/{}", id)).await
    }

    pub async fn update_robot_status(&self, id: i64, status: RobotStatus) -> Result<(), ApiError> {
        self.put_json(
            &format!("/robos/{}/status", id),
            &serde_json::json!({ "status": status }),
        )
        .await
    }

    pub async fn update_robot_location(&self, id: i64, location: &str) -> Result<(), ApiError> {
        self.put_json(
            &format!("/robos/{}/localizacao", id),
            &serde_json::json!({ "localizacao": location }),
        )
        .await
    }

    // ===== Sensor events =====

    /// Events flagged as critical alerts across the whole fleet.
    pub async fn fetch_critical_alerts(&self) -> Result<Vec<SensorEvent>, ApiError> {
        self.get_json("/eventos/alertas").await
    }

    pub async fn fetch_robot_events(&self, robot_id: i64) -> Result<Vec<SensorEvent>, ApiError> {
        self.get_json(&format!("/eventos/robo/{}", robot_id)).await
    }

    /// Most recent readings for one robot, newest first.
    pub async fn fetch_latest_readings(&self, robot_id: i64) -> Result<Vec<SensorEvent>, ApiError> {
        self.get_json(&format!("/eventos/robo/{}/ultimas", robot_id))
            .await
    }

    // ===== Deliveries =====

    pub async fn fetch_deliveries(&self) -> Result<Vec<Delivery>, ApiError> {
        self.get_json("/entregas").await
    }

    pub async fn fetch_delivery(&self, id: i64) -> Result<Delivery, ApiError> {
        self.get_json(&format!("/entregas/{}", id)).await
    }

    pub async fn update_delivery_status(
        &self,
        id: i64,
        status: DeliveryStatus,
    ) -> Result<(), ApiError> {
        self.put_json(
            &format!("/entregas/{}/status", id),
            &serde_json::json!({ "status": status }),
        )
        .await
    }

    /// Deliveries scheduled for today.
    pub async fn fetch_todays_deliveries(&self) -> Result<Vec<Delivery>, ApiError> {
        self.get_json("/entregas/dia").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(format!("{}/api", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_robots_attaches_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/robos"))
            .and(header("Authorization", "Bearer tok123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id":1,"codigo":"RBT-001","modelo":"CargoMax 3","status":"ATIVO","localizacao":"Doca 1","nivelBateria":88}
            ])))
            .mount(&server)
            .await;

        let api = client_for(&server).with_token("tok123".to_string());
        let robots = api.fetch_robots().await.unwrap();
        assert_eq!(robots.len(), 1);
        assert_eq!(robots[0].code, "RBT-001");
    }

    #[tokio::test]
    async fn test_update_robot_status_sends_wire_name() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/robos/1/status"))
            .and(wiremock::matchers::body_json(
                serde_json::json!({"status": "INATIVO"}),
            ))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let api = client_for(&server);
        api.update_robot_status(1, RobotStatus::Inactive)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_validate_token_reads_status_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/validate-token"))
            .and(query_param("token", "good"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let api = client_for(&server);
        assert!(api.validate_token("good").await.unwrap());
        // Unmatched token hits no mock and comes back 404: not valid
        assert!(!api.validate_token("bad").await.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_robot_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/robos/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(
                {"id":7,"codigo":"RBT-007","modelo":"CargoMax 3","status":"MANUTENCAO","localizacao":null,"nivelBateria":12}
            )))
            .mount(&server)
            .await;

        let api = client_for(&server);
        let robot = api.fetch_robot(7).await.unwrap();
        assert_eq!(robot.code, "RBT-007");
        assert_eq!(robot.status, RobotStatus::Maintenance);
        assert_eq!(robot.location, None);
    }

    #[tokio::test]
    async fn test_fetch_todays_deliveries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/entregas/dia"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id":1,"codigoPedido":"PED-0001","robo":{"id":1,"codigo":"RBT-001"},
                 "origem":"CD Norte","destino":"Loja 3","distancia":1.2,
                 "status":"PENDENTE","dataInicio":null,"dataFim":null,"observacoes":null}
            ])))
            .mount(&server)
            .await;

        let api = client_for(&server);
        let deliveries = api.fetch_todays_deliveries().await.unwrap();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].order_code, "PED-0001");
    }

    #[tokio::test]
    async fn test_fetch_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/usuarios/perfil"))
            .and(header("Authorization", "Bearer tok123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(
                {"id":2,"nomeCompleto":"Bruna Lima","username":"bruna","tipoUsuario":"USUARIO"}
            )))
            .mount(&server)
            .await;

        let api = client_for(&server).with_token("tok123".to_string());
        let profile = api.fetch_profile().await.unwrap();
        assert_eq!(profile.username, "bruna");
        assert!(!profile.is_admin());
    }

    #[tokio::test]
    async fn test_rejection_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/entregas"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(serde_json::json!({"message": "acesso negado"})),
            )
            .mount(&server)
            .await;

        let api = client_for(&server);
        let err = api.fetch_deliveries().await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(err.to_string(), "acesso negado");
    }
}
