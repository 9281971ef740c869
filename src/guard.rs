//! Route authorization gate.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected views consult [`decide`] on every session change. A gate never
//! redirects while the session is still loading, and a signed-in user with
//! an unrecognized role is reported separately from an anonymous visitor.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::config::DEFAULT_ELEVATED_ROLES;
use crate::session::Session;

/// Outcome of checking a session against a protected view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// Session still hydrating or an operation is in flight; render nothing.
    Pending,
    /// No token; send to login.
    Anonymous,
    /// Token and a recognized elevated role.
    Granted { role: String },
    /// Token present but the role is missing or not recognized.
    InvalidRole { role: Option<String> },
}

/// Elevated role names allowed through the gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleSet {
    roles: Vec<String>,
}

impl RoleSet {
    #[must_use]
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { roles: roles.into_iter().map(Into::into).collect() }
    }

    #[must_use]
    pub fn contains(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl Default for RoleSet {
    fn default() -> Self {
        Self::new(DEFAULT_ELEVATED_ROLES.iter().copied())
    }
}

#[must_use]
pub fn decide(session: &Session, allowed: &RoleSet) -> GateDecision {
    if session.loading {
        return GateDecision::Pending;
    }
    if session.token.is_none() {
        return GateDecision::Anonymous;
    }
    match session.role.as_deref() {
        Some(role) if allowed.contains(role) => GateDecision::Granted { role: role.to_owned() },
        other => GateDecision::InvalidRole { role: other.map(str::to_owned) },
    }
}

/// Navigation path a consumer should route to, if any.
#[must_use]
pub fn redirect_target(decision: &GateDecision) -> Option<&'static str> {
    match decision {
        GateDecision::Pending | GateDecision::Granted { .. } => None,
        GateDecision::Anonymous => Some("/login"),
        GateDecision::InvalidRole { .. } => Some("/invalid-role"),
    }
}
