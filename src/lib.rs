//! Client-side authentication session for the company portal.
//!
//! DESIGN
//! ======
//! [`SessionManager`] owns credentials, their two-tier persistence, and the
//! outcome of the last auth operation. It reaches the remote backend only
//! through [`AuthService`]; route guards read its snapshots through
//! [`guard::decide`].

pub mod config;
pub mod guard;
pub mod service;
pub mod session;
pub mod storage;
pub mod types;

pub use config::AuthConfig;
pub use guard::{GateDecision, RoleSet};
pub use service::{AuthService, AuthServiceError, HttpAuthService};
pub use session::{Session, SessionManager, SignupFlow, SignupStep};
pub use storage::{FileStore, KeyValueStore, MemoryStore, TieredStore};
pub use types::{AuthFailure, AuthResponse, User};
