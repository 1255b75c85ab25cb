use domain::ValidationError;
use thiserror::Error;

/// Failures reported by an identity backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Email already in use")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Identity service unavailable: {0}")]
    Unavailable(String),
}

/// Failures surfaced to callers of [`crate::IdentityProvider`]
///
/// Backend failures collapse into one generic variant per operation so callers
/// cannot tell a wrong password from a missing account.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Could not authenticate. Check your email and password.")]
    AuthenticationFailed,

    #[error("Failed to create account. Email might be already in use.")]
    RegistrationFailed,
}
