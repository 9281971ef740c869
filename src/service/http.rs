//! HTTP auth service client.
//!
//! Thin reqwest wrapper over the `/auth/*` JSON endpoints. Response
//! classification lives in `parse_success` / `parse_failure` for testability.

use std::time::Duration;

use serde::Serialize;
use serde_json::json;

use super::{AuthService, AuthServiceError};
use crate::config::{AuthConfig, AuthTimeouts};
use crate::types::{AuthFailure, AuthResponse};

const LOGIN_PATH: &str = "auth/login";
const LOGOUT_PATH: &str = "auth/logout";
const SIGNUP_PATH: &str = "auth/signup";
const INITIATE_SIGNUP_PATH: &str = "auth/signup/initiate";
const VERIFY_SIGNUP_OTP_PATH: &str = "auth/signup/verify-otp";
const COMPLETE_SIGNUP_PATH: &str = "auth/signup/complete";
const FORGOT_PASSWORD_PATH: &str = "auth/forgot-password";
const VERIFY_OTP_PATH: &str = "auth/verify-otp";
const RESET_PASSWORD_PATH: &str = "auth/reset-password";

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpAuthService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthService {
    /// Build a client rooted at `base_url` (e.g. `https://host/api`).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(base_url: impl Into<String>, timeouts: AuthTimeouts) -> Result<Self, AuthServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| AuthServiceError::HttpClientBuild(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { http, base_url })
    }

    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthServiceError> {
        Self::new(config.base_url.clone(), config.timeouts)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<AuthResponse, AuthServiceError> {
        let url = endpoint(&self.base_url, path);
        let mut request = self.http.post(&url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthServiceError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AuthServiceError::Transport(e.to_string()))?;

        tracing::debug!(%url, status, "auth service responded");

        if (200..300).contains(&status) {
            parse_success(status, &text)
        } else {
            Err(parse_failure(status, &text))
        }
    }
}

#[async_trait::async_trait]
impl AuthService for HttpAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthServiceError> {
        self.post(LOGIN_PATH, &json!({ "email": email, "password": password }), None)
            .await
    }

    async fn logout(&self, token: Option<&str>) -> Result<AuthResponse, AuthServiceError> {
        self.post(LOGOUT_PATH, &json!({}), token).await
    }

    async fn signup(&self, name: &str, email: &str, password: &str) -> Result<AuthResponse, AuthServiceError> {
        self.post(SIGNUP_PATH, &json!({ "name": name, "email": email, "password": password }), None)
            .await
    }

    async fn initiate_signup(&self, email: &str) -> Result<AuthResponse, AuthServiceError> {
        self.post(INITIATE_SIGNUP_PATH, &json!({ "email": email }), None)
            .await
    }

    async fn verify_signup_otp(&self, email: &str, otp: &str) -> Result<AuthResponse, AuthServiceError> {
        self.post(VERIFY_SIGNUP_OTP_PATH, &json!({ "email": email, "otp": otp }), None)
            .await
    }

    async fn complete_signup(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<AuthResponse, AuthServiceError> {
        self.post(COMPLETE_SIGNUP_PATH, &json!({ "email": email, "name": name, "password": password }), None)
            .await
    }

    async fn forgot_password(&self, email: &str) -> Result<AuthResponse, AuthServiceError> {
        self.post(FORGOT_PASSWORD_PATH, &json!({ "email": email }), None)
            .await
    }

    async fn verify_otp(&self, email: &str, otp: &str) -> Result<AuthResponse, AuthServiceError> {
        self.post(VERIFY_OTP_PATH, &json!({ "email": email, "otp": otp }), None)
            .await
    }

    async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<AuthResponse, AuthServiceError> {
        self.post(
            RESET_PASSWORD_PATH,
            &json!({ "email": email, "otp": otp, "newPassword": new_password }),
            None,
        )
        .await
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// A 2xx body. Empty bodies resolve to an empty response so the session
/// layer can apply its own "malformed success" handling.
fn parse_success(status: u16, body: &str) -> Result<AuthResponse, AuthServiceError> {
    if body.trim().is_empty() {
        return Ok(AuthResponse::default());
    }
    serde_json::from_str(body).map_err(|_| AuthServiceError::Unparseable { status, body: body.to_owned() })
}

/// A non-2xx body. Anything without a recognizable field is unparseable.
fn parse_failure(status: u16, body: &str) -> AuthServiceError {
    match serde_json::from_str::<AuthFailure>(body) {
        Ok(failure) if !failure.is_empty() => AuthServiceError::Rejected(failure),
        _ => AuthServiceError::Unparseable { status, body: body.to_owned() },
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
