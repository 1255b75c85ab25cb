use chrono::{DateTime, Utc};
use domain::{Registration, User};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::backend::{AuthBackend, Session};
use crate::error::AuthError;

/// How often a live session is re-checked for revocation by default
pub const DEFAULT_RECHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Session context for one signed-in client
///
/// Holds the current bearer token and publishes the signed-in user to every
/// subscriber whenever the session changes. While signed in, a background task
/// re-checks the session when it expires and every recheck interval, so
/// revocation and expiry reach subscribers without a manual [`refresh`].
/// Construct one per client and pass it to whatever needs the identity.
///
/// [`refresh`]: IdentityProvider::refresh
pub struct IdentityProvider {
    state: Arc<SessionState>,
    watcher: Mutex<Option<JoinHandle<()>>>,
    recheck_interval: Duration,
}

struct SessionState {
    backend: Arc<dyn AuthBackend>,
    token: Mutex<Option<String>>,
    current: watch::Sender<Option<User>>,
}

impl IdentityProvider {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            state: Arc::new(SessionState {
                backend,
                token: Mutex::new(None),
                current,
            }),
            watcher: Mutex::new(None),
            recheck_interval: DEFAULT_RECHECK_INTERVAL,
        }
    }

    pub fn with_recheck_interval(mut self, interval: Duration) -> Self {
        self.recheck_interval = interval;
        self
    }

    /// Validate a sign-up form, then register
    pub async fn register_form(&self, form: &Registration) -> Result<User, AuthError> {
        form.validate()?;
        self.register(&form.email, &form.password, &form.name).await
    }

    /// Create an account and sign in as it
    ///
    /// Password rules are the caller's job; see [`IdentityProvider::register_form`].
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, AuthError> {
        match self.state.backend.create_account(email, password, name).await {
            Ok(session) => Ok(self.establish(session)),
            Err(e) => {
                warn!(error = %e, "registration failed");
                Err(AuthError::RegistrationFailed)
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        match self.state.backend.sign_in(email, password).await {
            Ok(session) => Ok(self.establish(session)),
            Err(e) => {
                warn!(error = %e, "login failed");
                Err(AuthError::AuthenticationFailed)
            }
        }
    }

    /// Clear the session. The local identity is dropped even if revocation fails.
    pub async fn logout(&self) {
        self.stop_watcher();
        if let Some(token) = self.state.take_token() {
            if let Err(e) = self.state.backend.sign_out(&token).await {
                warn!(error = %e, "failed to revoke session");
            }
        }
        self.state.current.send_replace(None);
        info!("signed out");
    }

    /// Re-check the session against the backend and publish any change
    pub async fn refresh(&self) -> Option<User> {
        self.state.refresh().await
    }

    pub fn current(&self) -> Option<User> {
        self.state.current.borrow().clone()
    }

    /// Bearer token of the active session
    pub fn token(&self) -> Option<String> {
        self.state.token()
    }

    /// Watch the signed-in user
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.state.current.subscribe()
    }

    /// Stream of identity changes, starting with the current value
    pub fn changes(&self) -> WatchStream<Option<User>> {
        WatchStream::new(self.subscribe())
    }

    fn establish(&self, session: Session) -> User {
        if let Ok(mut token) = self.state.token.lock() {
            *token = Some(session.token);
        }
        info!(user_id = %session.user.id, "signed in");
        self.state.current.send_replace(Some(session.user.clone()));

        let watcher = tokio::spawn(watch_session(
            self.state.clone(),
            session.expires_at,
            self.recheck_interval,
        ));
        if let Ok(mut slot) = self.watcher.lock() {
            if let Some(previous) = slot.replace(watcher) {
                previous.abort();
            }
        }
        session.user
    }

    fn stop_watcher(&self) {
        if let Some(watcher) = self.watcher.lock().ok().and_then(|mut slot| slot.take()) {
            watcher.abort();
        }
    }
}

impl Drop for IdentityProvider {
    fn drop(&mut self) {
        self.stop_watcher();
    }
}

impl SessionState {
    async fn refresh(&self) -> Option<User> {
        let token = self.token()?;

        let user = match self.backend.resolve(&token).await {
            Ok(user) => user,
            Err(e) => {
                // Keep the current identity; the backend may come back
                warn!(error = %e, "failed to refresh session");
                return self.current.borrow().clone();
            }
        };

        if user.is_none() {
            info!("session no longer valid");
            self.take_token();
        }
        self.current.send_if_modified(|current| {
            if *current == user {
                false
            } else {
                *current = user.clone();
                true
            }
        });
        user
    }

    fn token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|token| token.clone())
    }

    fn take_token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|mut token| token.take())
    }
}

/// Re-check the session at expiry and on every interval until it ends
async fn watch_session(
    state: Arc<SessionState>,
    expires_at: Option<DateTime<Utc>>,
    interval: Duration,
) {
    loop {
        let until_expiry = expires_at
            .map(|at| (at - Utc::now()).to_std().unwrap_or(Duration::ZERO))
            .unwrap_or(interval);
        tokio::time::sleep(until_expiry.min(interval)).await;

        if state.refresh().await.is_none() {
            debug!("session watcher finished");
            return;
        }
    }
}
