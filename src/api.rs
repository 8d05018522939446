//! REST client for the TxunaJob backend.
//!
//! Every endpoint answers JSON with a `success` flag and either a payload or
//! an `error` string. Non-2xx statuses and `success:false` both surface as an
//! [`ApiError`]; callers treat all of them as soft failures.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::common::records::{
    Activity, AdminService, AdminStats, AdminUser, NewService, ProfessionalAccount,
    ProfessionalStats, Review, ServiceItem, SystemSettings, SystemStatus, UserAction,
};
use crate::common::types::{ContactRequest, LoginRequest};
use crate::common::{Conversation, Id, Message, ProfessionalListing, RegisterForm, User};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP {status}: {}", .error.as_deref().unwrap_or("no details"))]
    Status { status: u16, error: Option<String> },

    /// `success:false` with the server's error string.
    #[error("{0}")]
    Rejected(String),

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_soft(&self) -> bool {
        true
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout)
    }

    /// Text shown to the user after a prefix such as "Erro no login: ".
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected(error) => error.clone(),
            ApiError::Status {
                error: Some(error), ..
            } => error.clone(),
            ApiError::Status { status, .. } => format!("Erro HTTP: {status}"),
            ApiError::Timeout => "Tempo de resposta esgotado".to_string(),
            ApiError::Http(_) => "Erro de conexão".to_string(),
            ApiError::Decode(_) => "Resposta inválida do servidor".to_string(),
        }
    }

    /// The server refused the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }

    /// Transport-level failure (no usable answer from the server).
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, ApiError::Http(_) | ApiError::Timeout)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: String,
    token: Option<String>,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base: impl Into<String>, timeout: Duration) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base,
            token: None,
            timeout,
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base, path);
        let builder = self.http.request(method, url).timeout(self.timeout);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> Result<Value, ApiError> {
        log::debug!("API request {path}");
        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(classify)?;

        let body = match serde_json::from_slice::<Value>(&bytes) {
            Ok(body) => body,
            Err(_) if !status.is_success() => Value::Null,
            Err(err) => {
                log::warn!("API {path}: body is not JSON ({err})");
                return Err(ApiError::Decode(err));
            }
        };

        if !status.is_success() {
            let error = error_field(&body);
            log::warn!("API {path}: HTTP {status} {error:?}");
            return Err(ApiError::Status {
                status: status.as_u16(),
                error,
            });
        }

        if body.get("success").and_then(Value::as_bool) == Some(false) {
            let error = error_field(&body).unwrap_or_else(|| "Erro desconhecido".to_string());
            log::warn!("API {path}: rejected: {error}");
            return Err(ApiError::Rejected(error));
        }

        Ok(body)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, field: &str) -> Result<T, ApiError> {
        let body = self.send(self.request(Method::GET, path), path).await?;
        extract(body, field)
    }

    async fn post(&self, path: &str, payload: &impl serde::Serialize) -> Result<Value, ApiError> {
        let builder = self.request(Method::POST, path).json(payload);
        self.send(builder, path).await
    }

    // ========== Auth ==========

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = self.post("/login", &LoginRequest { email, password }).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<Option<Id>, ApiError> {
        let body = self.post("/register", form).await?;
        Ok(body
            .get("user_id")
            .cloned()
            .and_then(|id| serde_json::from_value(id).ok()))
    }

    // ========== Chat ==========

    pub async fn chats(&self) -> Result<Vec<Conversation>, ApiError> {
        self.get("/chats", "chats").await
    }

    pub async fn messages(&self, chat_id: &Id) -> Result<Vec<Message>, ApiError> {
        self.get(&format!("/chats/{chat_id}/messages"), "messages")
            .await
    }

    // ========== Marketplace ==========

    pub async fn professionals(&self) -> Result<Vec<ProfessionalListing>, ApiError> {
        self.get("/professionals", "professionals").await
    }

    pub async fn contact(
        &self,
        professional_id: &Id,
        message: &str,
        client_name: &str,
    ) -> Result<(), ApiError> {
        let request = ContactRequest {
            professional_id,
            message,
            client_name,
        };
        self.post("/contact", &request).await.map(|_| ())
    }

    // ========== Admin ==========

    pub async fn admin_stats(&self) -> Result<AdminStats, ApiError> {
        self.get("/admin/stats", "stats").await
    }

    pub async fn admin_users(&self) -> Result<Vec<AdminUser>, ApiError> {
        self.get("/admin/users", "users").await
    }

    pub async fn admin_services(&self) -> Result<Vec<AdminService>, ApiError> {
        self.get("/admin/services", "services").await
    }

    pub async fn admin_activities(&self) -> Result<Vec<Activity>, ApiError> {
        self.get("/admin/activities", "activities").await
    }

    pub async fn admin_system_status(&self) -> Result<SystemStatus, ApiError> {
        self.get("/admin/system-status", "status").await
    }

    pub async fn admin_settings(&self) -> Result<SystemSettings, ApiError> {
        self.get("/admin/settings", "settings").await
    }

    pub async fn save_admin_settings(&self, settings: &SystemSettings) -> Result<(), ApiError> {
        self.post("/admin/settings/save", settings).await.map(|_| ())
    }

    pub async fn admin_user_action(
        &self,
        user_id: &Id,
        action: UserAction,
    ) -> Result<(), ApiError> {
        let path = format!("/admin/users/{user_id}/{}", action.path_segment());
        self.post(&path, &serde_json::json!({})).await.map(|_| ())
    }

    // ========== Professional ==========

    pub async fn professional_current(&self) -> Result<ProfessionalAccount, ApiError> {
        self.get("/professional/current", "user").await
    }

    pub async fn professional_stats(&self) -> Result<ProfessionalStats, ApiError> {
        self.get("/professional/stats", "stats").await
    }

    pub async fn professional_services(&self) -> Result<Vec<ServiceItem>, ApiError> {
        self.get("/professional/services", "services").await
    }

    pub async fn professional_schedule(&self) -> Result<Vec<ServiceItem>, ApiError> {
        self.get("/professional/schedule", "schedule").await
    }

    pub async fn professional_reviews(&self) -> Result<Vec<Review>, ApiError> {
        self.get("/professional/reviews", "reviews").await
    }

    pub async fn create_service(&self, service: &NewService) -> Result<(), ApiError> {
        self.post("/professional/services/create", service)
            .await
            .map(|_| ())
    }
}

fn classify(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Http(err)
    }
}

fn error_field(body: &Value) -> Option<String> {
    body.get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Payload lives under `field` when wrapped in an envelope, or is the whole
/// body for endpoints that answer with a bare array/object.
fn extract<T: DeserializeOwned>(mut body: Value, field: &str) -> Result<T, ApiError> {
    let payload = match body.as_object_mut().and_then(|map| map.remove(field)) {
        Some(payload) => payload,
        None => body,
    };
    Ok(serde_json::from_value(payload)?)
}
