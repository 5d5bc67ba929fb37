//! External claims backend surface. Everything the portal persists or fetches
//! goes through [`BackendApi`]; the shipped implementation speaks JSON over
//! HTTP, tests substitute their own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::intimation::IntimationForm;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response from the backend. The display form is what the
    /// user-friendly message table keys off.
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Message(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePayload {
    pub department: String,
    pub responsibility: String,
    pub experience_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClaimHandler {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftReceipt {
    pub draft_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub reference_id: String,
}

#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;
    async fn reset_password(&self, req: &ResetPasswordRequest) -> Result<(), ApiError>;
    async fn complete_profile(&self, payload: &ProfilePayload) -> Result<(), ApiError>;
    async fn get_claim_handlers(&self) -> Result<Vec<ClaimHandler>, ApiError>;
    async fn save_draft(&self, form: &IntimationForm) -> Result<DraftReceipt, ApiError>;
    async fn submit_intimation(&self, form: &IntimationForm) -> Result<SubmitReceipt, ApiError>;
}

/// Backend client over reqwest, rooted at a base URL such as
/// `http://claims-api.internal:8080`.
pub struct HttpBackend {
    base: String,
    http: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { base, http: reqwest::Client::new() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(ApiError::Status(resp.status().as_u16()))
        }
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let resp = self.http.post(self.url("/auth/login")).json(credentials).send().await?;
        Ok(Self::check(resp)?.json().await?)
    }

    async fn reset_password(&self, req: &ResetPasswordRequest) -> Result<(), ApiError> {
        let resp = self.http.post(self.url("/auth/reset-password")).json(req).send().await?;
        Self::check(resp)?;
        Ok(())
    }

    async fn complete_profile(&self, payload: &ProfilePayload) -> Result<(), ApiError> {
        let resp = self.http.post(self.url("/users/profile")).json(payload).send().await?;
        Self::check(resp)?;
        Ok(())
    }

    async fn get_claim_handlers(&self) -> Result<Vec<ClaimHandler>, ApiError> {
        let resp = self.http.get(self.url("/claim-handlers")).send().await?;
        Ok(Self::check(resp)?.json().await?)
    }

    async fn save_draft(&self, form: &IntimationForm) -> Result<DraftReceipt, ApiError> {
        let resp = self.http.post(self.url("/intimations/draft")).json(form).send().await?;
        Ok(Self::check(resp)?.json().await?)
    }

    async fn submit_intimation(&self, form: &IntimationForm) -> Result<SubmitReceipt, ApiError> {
        let resp = self.http.post(self.url("/intimations")).json(form).send().await?;
        Ok(Self::check(resp)?.json().await?)
    }
}
