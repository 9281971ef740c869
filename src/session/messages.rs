//! User-facing outcome text for each session operation.
//!
//! Rejections are flattened in a fixed priority order: validation details,
//! then the short `error` field, then `message`, then the operation default.

#[cfg(test)]
#[path = "messages_test.rs"]
mod messages_test;

use crate::service::AuthServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Login,
    Signup,
    Logout,
    InitiateSignup,
    VerifySignupOtp,
    CompleteSignup,
    ForgotPassword,
    VerifyOtp,
    ResetPassword,
}

impl Operation {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
            Self::Logout => "logout",
            Self::InitiateSignup => "initiate_signup",
            Self::VerifySignupOtp => "verify_signup_otp",
            Self::CompleteSignup => "complete_signup",
            Self::ForgotPassword => "forgot_password",
            Self::VerifyOtp => "verify_otp",
            Self::ResetPassword => "reset_password",
        }
    }

    #[must_use]
    pub fn default_failure(self) -> &'static str {
        match self {
            Self::Login => "Login failed",
            Self::Signup => "Signup failed",
            Self::Logout => "Logout failed",
            Self::InitiateSignup => "Failed to send verification code",
            Self::VerifySignupOtp => "Invalid or expired verification code",
            Self::CompleteSignup => "Failed to complete signup",
            Self::ForgotPassword => "Failed to send password reset code",
            Self::VerifyOtp => "Invalid or expired code",
            Self::ResetPassword => "Failed to reset password",
        }
    }

    /// `None` for operations that never announce success (login).
    #[must_use]
    pub fn default_success(self) -> Option<&'static str> {
        let text = match self {
            Self::Login => return None,
            Self::Signup => "Signup successful",
            Self::Logout => "Logged out",
            Self::InitiateSignup => "Verification code sent to your email",
            Self::VerifySignupOtp => "Email verified successfully",
            Self::CompleteSignup => "Account created successfully. Please log in.",
            Self::ForgotPassword => "Password reset code sent to your email",
            Self::VerifyOtp => "Code verified successfully",
            Self::ResetPassword => "Password reset successfully",
        };
        Some(text)
    }

    /// Signup-family operations own `validation_errors`.
    #[must_use]
    pub fn collects_details(self) -> bool {
        matches!(self, Self::Signup | Self::InitiateSignup | Self::VerifySignupOtp | Self::CompleteSignup)
    }
}

/// Flattened rejection ready to store on the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub error: String,
    pub validation_errors: Option<Vec<String>>,
}

#[must_use]
pub fn classify(op: Operation, err: &AuthServiceError) -> Failure {
    let Some(failure) = err.failure() else {
        return Failure { error: op.default_failure().to_owned(), validation_errors: None };
    };

    let summary = non_empty(failure.error.as_deref())
        .or_else(|| non_empty(failure.message.as_deref()))
        .unwrap_or(op.default_failure())
        .to_owned();

    let validation_errors =
        (op.collects_details() && !failure.details.is_empty()).then(|| failure.details.clone());

    Failure { error: summary, validation_errors }
}

/// Service-provided message, or the operation default when absent or blank.
/// Silent operations yield `None` whatever the service sent.
#[must_use]
pub fn success_text(op: Operation, message: Option<&str>) -> Option<String> {
    let default = op.default_success()?;
    Some(non_empty(message).unwrap_or(default).to_owned())
}

pub(crate) fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}
