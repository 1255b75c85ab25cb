//! Identity: account backend plus the client-side session context.

mod backend;
mod error;
mod password;
mod provider;

pub use backend::{AuthBackend, DEFAULT_SESSION_TTL_SECS, InMemoryAuthBackend, Session};
pub use error::{AuthError, BackendError};
pub use provider::{DEFAULT_RECHECK_INTERVAL, IdentityProvider};
