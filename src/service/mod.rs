//! Auth service seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionManager` talks to the remote auth backend only through
//! [`AuthService`], so tests drive it with in-process stubs and the CLI
//! plugs in [`http::HttpAuthService`].

pub mod http;

use crate::types::{AuthFailure, AuthResponse};

pub use http::HttpAuthService;

// =============================================================================
// ERROR
// =============================================================================

/// Ways an auth service call can reject.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthServiceError {
    /// The service answered with a structured failure body.
    #[error("auth service rejected request: {0:?}")]
    Rejected(AuthFailure),

    /// The request never produced a response (connect, timeout, IO).
    #[error("auth service transport error: {0}")]
    Transport(String),

    /// The service answered with a failure body that is not recognizable JSON.
    #[error("auth service returned unparseable response: status {status}")]
    Unparseable { status: u16, body: String },

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl AuthServiceError {
    /// Structured failure body, if the rejection carried one.
    #[must_use]
    pub fn failure(&self) -> Option<&AuthFailure> {
        match self {
            Self::Rejected(failure) => Some(failure),
            _ => None,
        }
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Remote auth operations. Each call is a single attempt; retries are the
/// caller's decision.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange credentials for a token and user.
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthServiceError>;

    /// Invalidate the server-side session for `token`, if any.
    async fn logout(&self, token: Option<&str>) -> Result<AuthResponse, AuthServiceError>;

    /// Single-step account creation.
    async fn signup(&self, name: &str, email: &str, password: &str) -> Result<AuthResponse, AuthServiceError>;

    /// Send a signup one-time code to `email`.
    async fn initiate_signup(&self, email: &str) -> Result<AuthResponse, AuthServiceError>;

    /// Confirm the signup one-time code.
    async fn verify_signup_otp(&self, email: &str, otp: &str) -> Result<AuthResponse, AuthServiceError>;

    /// Finalize the account after OTP verification.
    async fn complete_signup(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<AuthResponse, AuthServiceError>;

    /// Send a password-recovery code to `email`.
    async fn forgot_password(&self, email: &str) -> Result<AuthResponse, AuthServiceError>;

    /// Confirm the password-recovery code.
    async fn verify_otp(&self, email: &str, otp: &str) -> Result<AuthResponse, AuthServiceError>;

    /// Set a new password using a verified recovery code.
    async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<AuthResponse, AuthServiceError>;
}
