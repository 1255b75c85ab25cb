use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use domain::User;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::error::BackendError;
use crate::password::PasswordDigest;

/// Default session lifetime in seconds (1 hour)
pub const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

/// A signed-in session issued by the identity backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer token
    pub token: String,
    pub user: User,
    /// When the token stops resolving. `None` if it never lapses on its own.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Remote identity service
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Create an account and sign it in
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Session, BackendError>;

    /// Exchange credentials for a session
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    /// Revoke a session token. Unknown tokens are ignored.
    async fn sign_out(&self, token: &str) -> Result<(), BackendError>;

    /// Look up the user behind a live session token
    async fn resolve(&self, token: &str) -> Result<Option<User>, BackendError>;
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: PasswordDigest,
}

/// Session metadata for tracking expiry
#[derive(Debug, Clone)]
struct SessionMetadata {
    user_id: String,
    /// When the session was issued
    issued_at: DateTime<Utc>,
    /// Lifetime (can be negative for already-expired sessions)
    ttl: Duration,
}

impl SessionMetadata {
    /// Out-of-range expiry times never lapse
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at.checked_add_signed(self.ttl)
    }

    fn is_expired(&self) -> bool {
        self.expires_at().is_some_and(|expires_at| Utc::now() >= expires_at)
    }
}

#[derive(Default)]
struct Directory {
    /// Accounts keyed by normalized email
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, SessionMetadata>,
}

/// In-memory implementation of the AuthBackend trait
#[derive(Clone)]
pub struct InMemoryAuthBackend {
    directory: Arc<RwLock<Directory>>,
    session_ttl: Duration,
}

impl InMemoryAuthBackend {
    pub fn new(session_ttl: Duration) -> Self {
        Self {
            directory: Arc::new(RwLock::new(Directory::default())),
            session_ttl,
        }
    }

    fn poisoned() -> BackendError {
        BackendError::Unavailable("account directory lock poisoned".to_string())
    }

    fn normalize(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn issue(&self, directory: &mut Directory, user: &User) -> Session {
        let token = format!("session_{}", uuid::Uuid::new_v4().simple());
        let metadata = SessionMetadata {
            user_id: user.id.clone(),
            issued_at: Utc::now(),
            ttl: self.session_ttl,
        };
        let expires_at = metadata.expires_at();
        directory.sessions.insert(token.clone(), metadata);
        Session {
            token,
            user: user.clone(),
            expires_at,
        }
    }
}

impl Default for InMemoryAuthBackend {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_SESSION_TTL_SECS))
    }
}

#[async_trait]
impl AuthBackend for InMemoryAuthBackend {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Session, BackendError> {
        let key = Self::normalize(email);
        if key.is_empty() || !key.contains('@') {
            return Err(BackendError::Rejected("invalid email address".to_string()));
        }

        // Hash outside the lock
        let digest = PasswordDigest::new_blocking(password).await?;

        let mut directory = self.directory.write().map_err(|_| Self::poisoned())?;
        if directory.accounts.contains_key(&key) {
            return Err(BackendError::EmailTaken);
        }

        let user = User {
            id: uuid::Uuid::new_v4().simple().to_string(),
            email: key.clone(),
            name: name.trim().to_string(),
        };
        directory.accounts.insert(
            key,
            Account {
                user: user.clone(),
                password: digest,
            },
        );
        info!(user_id = %user.id, "account created");

        Ok(self.issue(&mut directory, &user))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let key = Self::normalize(email);
        let account = self
            .directory
            .read()
            .map_err(|_| Self::poisoned())?
            .accounts
            .get(&key)
            .cloned()
            .ok_or(BackendError::InvalidCredentials)?;

        if !account.password.verify_blocking(password).await? {
            return Err(BackendError::InvalidCredentials);
        }

        let mut directory = self.directory.write().map_err(|_| Self::poisoned())?;
        Ok(self.issue(&mut directory, &account.user))
    }

    async fn sign_out(&self, token: &str) -> Result<(), BackendError> {
        let removed = self
            .directory
            .write()
            .map_err(|_| Self::poisoned())?
            .sessions
            .remove(token);
        if let Some(session) = removed {
            debug!(user_id = %session.user_id, "session revoked");
        }
        Ok(())
    }

    async fn resolve(&self, token: &str) -> Result<Option<User>, BackendError> {
        let mut directory = self.directory.write().map_err(|_| Self::poisoned())?;
        let Some(session) = directory.sessions.get(token) else {
            return Ok(None);
        };

        if session.is_expired() {
            debug!(user_id = %session.user_id, "session expired");
            directory.sessions.remove(token);
            return Ok(None);
        }

        let user_id = session.user_id.clone();
        Ok(directory
            .accounts
            .values()
            .find(|account| account.user.id == user_id)
            .map(|account| account.user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::Fake;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;

    #[tokio::test]
    async fn test_create_account_issues_session() {
        let backend = InMemoryAuthBackend::default();
        let email: String = SafeEmail().fake();
        let name: String = Name().fake();

        let session = backend.create_account(&email, "secret1", &name).await.unwrap();

        assert!(session.token.starts_with("session_"));
        assert_eq!(session.user.email, email.to_lowercase());
        assert_eq!(backend.resolve(&session.token).await.unwrap(), Some(session.user));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_case_insensitively() {
        let backend = InMemoryAuthBackend::default();
        backend
            .create_account("Student@Example.com", "secret1", "A")
            .await
            .unwrap();

        let result = backend
            .create_account("student@example.com", "secret2", "B")
            .await;
        assert!(matches!(result, Err(BackendError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_sign_in_checks_password() {
        let backend = InMemoryAuthBackend::default();
        backend
            .create_account("a@example.com", "secret1", "A")
            .await
            .unwrap();

        assert!(backend.sign_in("a@example.com", "secret1").await.is_ok());
        assert!(matches!(
            backend.sign_in("a@example.com", "wrong!").await,
            Err(BackendError::InvalidCredentials)
        ));
        assert!(matches!(
            backend.sign_in("nobody@example.com", "secret1").await,
            Err(BackendError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_sign_out_revokes_token() {
        let backend = InMemoryAuthBackend::default();
        let session = backend
            .create_account("a@example.com", "secret1", "A")
            .await
            .unwrap();

        backend.sign_out(&session.token).await.unwrap();
        assert_eq!(backend.resolve(&session.token).await.unwrap(), None);
        backend.sign_out(&session.token).await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_session_resolves_to_nothing() {
        let backend = InMemoryAuthBackend::new(Duration::seconds(-1));
        let session = backend
            .create_account("a@example.com", "secret1", "A")
            .await
            .unwrap();

        assert_eq!(backend.resolve(&session.token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_session_reports_expiry() {
        let backend = InMemoryAuthBackend::new(Duration::seconds(60));
        let before = Utc::now();
        let session = backend
            .create_account("a@example.com", "secret1", "A")
            .await
            .unwrap();

        let expires_at = session.expires_at.unwrap();
        assert!(expires_at >= before + Duration::seconds(60));
        assert!(expires_at <= Utc::now() + Duration::seconds(60));
    }

    #[tokio::test]
    async fn test_huge_ttl_never_expires() {
        let backend = InMemoryAuthBackend::new(Duration::seconds(9_000_000_000_000));
        let session = backend
            .create_account("a@example.com", "secret1", "A")
            .await
            .unwrap();
        assert_eq!(session.expires_at, None);

        let resolved = tokio::spawn({
            let backend = backend.clone();
            let token = session.token.clone();
            async move { backend.resolve(&token).await }
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(resolved, Some(session.user));

        // The directory lock is still usable
        assert!(backend.sign_in("a@example.com", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_sign_ins() {
        let backend = InMemoryAuthBackend::default();
        backend
            .create_account("a@example.com", "secret1", "A")
            .await
            .unwrap();

        let (first, second, wrong) = tokio::join!(
            backend.sign_in("a@example.com", "secret1"),
            backend.sign_in("A@example.com", "secret1"),
            backend.sign_in("a@example.com", "secret2"),
        );
        assert_ne!(first.unwrap().token, second.unwrap().token);
        assert!(matches!(wrong, Err(BackendError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_rejects_malformed_email() {
        let backend = InMemoryAuthBackend::default();
        assert!(matches!(
            backend.create_account("not-an-email", "secret1", "A").await,
            Err(BackendError::Rejected(_))
        ));
    }
}
