//! Session manager: the single writer of [`Session`].
//!
//! ARCHITECTURE
//! ============
//! The manager is a cheap `Clone` handle over shared state. Session
//! snapshots are published through a `watch` channel so guards and UI can
//! observe changes, and a `tokio` mutex serializes operations so two actions
//! never interleave their writes to `loading`/`error`.
//!
//! ERROR HANDLING
//! ==============
//! Operations never return service errors. Every failure is flattened into
//! `Session::error` (plus `validation_errors` for the signup family); the
//! password-recovery operations additionally return `false`.
//!
//! TRADE-OFFS
//! ==========
//! `logout` is fail-open: a server-side failure is logged and local
//! credentials are cleared regardless.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, watch};
use tracing::{debug, info, warn};

use super::messages::{Operation, classify, non_empty, success_text};
use super::{Session, SignupFlow, SignupStep};
use crate::service::{AuthService, AuthServiceError};
use crate::storage::{TOKEN_KEY, TieredStore, USER_KEY};
use crate::types::{AuthResponse, User};

#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    service: Arc<dyn AuthService>,
    store: TieredStore,
    state: watch::Sender<Session>,
    serial: Mutex<()>,
}

/// Held for the duration of one operation; settles `loading` on drop so a
/// cancelled future cannot leave the session stuck in flight.
struct InFlight<'a> {
    state: &'a watch::Sender<Session>,
    _serial: MutexGuard<'a, ()>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.loading = false);
    }
}

impl SessionManager {
    /// Create an unhydrated manager. The session reports `loading` until
    /// [`SessionManager::hydrate`] runs.
    #[must_use]
    pub fn new(service: Arc<dyn AuthService>, store: TieredStore) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self { inner: Arc::new(Inner { service, store, state, serial: Mutex::new(()) }) }
    }

    /// Create and hydrate in one step.
    #[must_use]
    pub fn start(service: Arc<dyn AuthService>, store: TieredStore) -> Self {
        let manager = Self::new(service, store);
        manager.hydrate();
        manager
    }

    // =========================================================================
    // OBSERVATION
    // =========================================================================

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Receive every subsequent session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().token.clone()
    }

    #[must_use]
    pub fn role(&self) -> Option<String> {
        self.inner.state.borrow().role.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.state.borrow().user.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    fn update(&self, f: impl FnOnce(&mut Session)) {
        self.inner.state.send_modify(f);
    }

    async fn begin(&self, clear_messages: bool) -> InFlight<'_> {
        let serial = self.inner.serial.lock().await;
        self.update(|s| {
            s.loading = true;
            if clear_messages {
                s.clear_messages();
            }
        });
        InFlight { state: &self.inner.state, _serial: serial }
    }

    // =========================================================================
    // HYDRATION
    // =========================================================================

    /// Restore credentials from storage. Corrupt or partial state is
    /// discarded from both tiers. Always settles `loading` to `false`.
    pub fn hydrate(&self) {
        let stored = match self.inner.store.get_preferred_pair(TOKEN_KEY, USER_KEY) {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "stored session is unreadable; discarding");
                self.discard_stored();
                (None, None)
            }
        };

        let restored = match stored {
            (Some(token), Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some((token, user)),
                Err(e) => {
                    warn!(error = %e, "stored user is corrupt; discarding session");
                    self.discard_stored();
                    None
                }
            },
            (None, None) => None,
            _ => {
                warn!("stored session is incomplete; discarding");
                self.discard_stored();
                None
            }
        };

        debug!(authenticated = restored.is_some(), "session hydrated");
        self.update(|s| {
            match restored {
                Some((token, user)) => s.set_credentials(token, user),
                None => s.clear_credentials(),
            }
            s.loading = false;
        });
    }

    fn discard_stored(&self) {
        self.inner.store.clear_both(TOKEN_KEY);
        self.inner.store.clear_both(USER_KEY);
    }

    fn persist(&self, token: &str, user: &User) {
        match serde_json::to_string(user) {
            Ok(raw) => {
                self.inner.store.set_both(TOKEN_KEY, token);
                self.inner.store.set_both(USER_KEY, &raw);
            }
            Err(e) => warn!(error = %e, "failed to serialize user; session not persisted"),
        }
    }

    fn fail(&self, op: Operation, err: &AuthServiceError) {
        warn!(op = op.name(), error = %err, "auth operation failed");
        let failure = classify(op, err);
        self.update(|s| {
            s.success_message = None;
            s.error = Some(failure.error);
            if op.collects_details() {
                s.validation_errors = failure.validation_errors;
            }
        });
    }

    fn fail_with(&self, op: Operation, reported: Option<&str>) {
        let error = non_empty(reported)
            .unwrap_or(op.default_failure())
            .to_owned();
        warn!(op = op.name(), %error, "auth operation resolved without success");
        self.update(|s| {
            s.success_message = None;
            s.error = Some(error);
        });
    }

    // =========================================================================
    // LOGIN / SIGNUP
    // =========================================================================

    pub async fn login(&self, email: &str, password: &str) {
        let _op = self.begin(true).await;
        match self.inner.service.login(email, password).await {
            Ok(resp) => self.accept_credentials(Operation::Login, resp),
            Err(err) => self.fail(Operation::Login, &err),
        }
    }

    /// Single-step signup; authenticates on success.
    pub async fn signup(&self, name: &str, email: &str, password: &str) {
        let _op = self.begin(true).await;
        match self.inner.service.signup(name, email, password).await {
            Ok(resp) => self.accept_credentials(Operation::Signup, resp),
            Err(err) => self.fail(Operation::Signup, &err),
        }
    }

    fn accept_credentials(&self, op: Operation, resp: AuthResponse) {
        let AuthResponse { token, user, message, error } = resp;
        let (Some(token), Some(user)) = (token, user) else {
            self.fail_with(op, error.as_deref());
            return;
        };

        self.persist(&token, &user);
        info!(op = op.name(), user_id = %user.id, role = ?user.role, "authenticated");
        let success = success_text(op, message.as_deref());
        self.update(|s| {
            s.set_credentials(token, user);
            s.success_message = success;
        });
    }

    // =========================================================================
    // THREE-STEP SIGNUP
    // =========================================================================

    /// Ask the service to email a signup code. Prior messages stay visible
    /// until this call settles.
    pub async fn initiate_signup(&self, email: &str) {
        let _op = self.begin(false).await;
        let op = Operation::InitiateSignup;
        match self.inner.service.initiate_signup(email).await {
            Ok(resp) => match non_empty(resp.message.as_deref()) {
                Some(message) => {
                    let message = message.to_owned();
                    let flow = SignupFlow { email: email.to_owned(), step: SignupStep::Initiated };
                    self.update(|s| {
                        s.clear_messages();
                        s.success_message = Some(message);
                        s.signup_flow = Some(flow);
                    });
                }
                None => {
                    self.update(|s| s.validation_errors = None);
                    self.fail_with(op, resp.error.as_deref());
                }
            },
            Err(err) => self.fail(op, &err),
        }
    }

    pub async fn verify_signup_otp(&self, email: &str, otp: &str) {
        let _op = self.begin(true).await;
        let op = Operation::VerifySignupOtp;
        match self.inner.service.verify_signup_otp(email, otp).await {
            Ok(resp) => match non_empty(resp.message.as_deref()) {
                Some(message) => {
                    let message = message.to_owned();
                    self.advance_signup(email, SignupStep::OtpVerified, Some(message));
                }
                None => self.fail_with(op, resp.error.as_deref()),
            },
            Err(err) => self.fail(op, &err),
        }
    }

    /// Finalize the account. Never signs the caller in, even when the
    /// service returns credentials.
    pub async fn complete_signup(&self, email: &str, name: &str, password: &str) {
        let _op = self.begin(true).await;
        let op = Operation::CompleteSignup;
        match self.inner.service.complete_signup(email, name, password).await {
            Ok(resp) if resp.message.is_none() && non_empty(resp.error.as_deref()).is_some() => {
                self.fail_with(op, resp.error.as_deref());
            }
            Ok(resp) => {
                let message = success_text(op, resp.message.as_deref());
                self.advance_signup(email, SignupStep::Completed, message);
            }
            Err(err) => self.fail(op, &err),
        }
    }

    fn advance_signup(&self, email: &str, step: SignupStep, message: Option<String>) {
        let flow = SignupFlow { email: email.to_owned(), step };
        self.update(|s| {
            s.success_message = message;
            s.signup_flow = Some(flow);
        });
    }

    // =========================================================================
    // PASSWORD RECOVERY
    // =========================================================================

    pub async fn forgot_password(&self, email: &str) -> bool {
        let _op = self.begin(true).await;
        let result = self.inner.service.forgot_password(email).await;
        self.settle_recovery(Operation::ForgotPassword, result)
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> bool {
        let _op = self.begin(true).await;
        let result = self.inner.service.verify_otp(email, otp).await;
        self.settle_recovery(Operation::VerifyOtp, result)
    }

    pub async fn reset_password(&self, email: &str, otp: &str, new_password: &str) -> bool {
        let _op = self.begin(true).await;
        let result = self
            .inner
            .service
            .reset_password(email, otp, new_password)
            .await;
        self.settle_recovery(Operation::ResetPassword, result)
    }

    fn settle_recovery(&self, op: Operation, result: Result<AuthResponse, AuthServiceError>) -> bool {
        match result {
            Ok(resp) if resp.message.is_none() && non_empty(resp.error.as_deref()).is_some() => {
                self.fail_with(op, resp.error.as_deref());
                false
            }
            Ok(resp) => {
                let message = success_text(op, resp.message.as_deref());
                self.update(|s| s.success_message = message);
                true
            }
            Err(err) => {
                self.fail(op, &err);
                false
            }
        }
    }

    // =========================================================================
    // LOGOUT / MESSAGES
    // =========================================================================

    /// End the session. Local credentials and both storage tiers are always
    /// cleared, even when the server-side call fails; that failure is logged
    /// and never shown.
    pub async fn logout(&self) {
        let _op = self.begin(true).await;
        let op = Operation::Logout;
        let token = self.token();
        let message = match self.inner.service.logout(token.as_deref()).await {
            Ok(resp) => resp.message,
            Err(err) => {
                warn!(op = op.name(), error = %err, "server-side logout failed; clearing local session");
                None
            }
        };

        self.discard_stored();
        let user_id = self.user().map(|u| u.id);
        let success = success_text(op, message.as_deref());
        self.update(|s| {
            s.clear_credentials();
            s.signup_flow = None;
            s.success_message = success;
        });
        info!(user_id = ?user_id, "logged out");
    }

    pub fn clear_messages(&self) {
        self.update(Session::clear_messages);
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
