//! Client session state: who is signed in and what the last attempt produced.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Session` is the snapshot observed by route guards and navigation UI.
//! Only [`SessionManager`] writes it; everyone else reads clones or
//! subscribes to changes.

pub mod manager;
pub mod messages;


pub use manager::SessionManager;

use crate::types::User;

/// Which step of the three-step signup flow last succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignupStep {
    Initiated,
    OtpVerified,
    Completed,
}

/// Ephemeral signup progress for one email address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignupFlow {
    pub email: String,
    pub step: SignupStep,
}

/// Authentication state tracking the current user and last outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    /// Mirrors `user.role`; rewritten with every credential change.
    pub role: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub validation_errors: Option<Vec<String>>,
    pub success_message: Option<String>,
    pub signup_flow: Option<SignupFlow>,
}

impl Default for Session {
    /// A fresh session is loading until hydration completes.
    fn default() -> Self {
        Self {
            user: None,
            token: None,
            role: None,
            loading: true,
            error: None,
            validation_errors: None,
            success_message: None,
            signup_flow: None,
        }
    }
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub(crate) fn set_credentials(&mut self, token: String, user: User) {
        self.role.clone_from(&user.role);
        self.token = Some(token);
        self.user = Some(user);
    }

    pub(crate) fn clear_credentials(&mut self) {
        self.token = None;
        self.user = None;
        self.role = None;
    }

    pub(crate) fn clear_messages(&mut self) {
        self.error = None;
        self.validation_errors = None;
        self.success_message = None;
    }
}
