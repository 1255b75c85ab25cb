use argon2::password_hash::{
    Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::error::BackendError;

/// Argon2id digest of an account password in PHC string form
#[derive(Clone)]
pub(crate) struct PasswordDigest {
    phc: String,
}

impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

impl PasswordDigest {
    pub(crate) fn new(password: &str) -> Result<Self, BackendError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| BackendError::Unavailable(format!("Password hashing failed: {e}")))?
            .to_string();
        Ok(Self { phc })
    }

    pub(crate) fn verify(&self, password: &str) -> Result<bool, BackendError> {
        let parsed = PasswordHash::new(&self.phc)
            .map_err(|e| BackendError::Unavailable(format!("Stored password hash invalid: {e}")))?;
        match hasher()?.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(e) => Err(BackendError::Unavailable(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// Hash on the blocking pool
    pub(crate) async fn new_blocking(password: &str) -> Result<Self, BackendError> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || Self::new(&password))
            .await
            .map_err(|e| BackendError::Unavailable(format!("Password hashing task failed: {e}")))?
    }

    /// Verify on the blocking pool
    pub(crate) async fn verify_blocking(&self, password: &str) -> Result<bool, BackendError> {
        let digest = self.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || digest.verify(&password))
            .await
            .map_err(|e| {
                BackendError::Unavailable(format!("Password verification task failed: {e}"))
            })?
    }
}

fn hasher() -> Result<Argon2<'static>, BackendError> {
    // 4 MiB, 2 passes, single lane
    let params = Params::new(4 * 1024, 2, 1, None).map_err(|e| {
        BackendError::Unavailable(format!("Failed to configure password hashing: {e}"))
    })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}
