//! Session lifecycle: login, logout, rehydration, and cascading
//! invalidation.
//!
//! The session is one explicitly owned state object. Token and user are
//! only ever cleared together, through [`SessionManager::invalidate`]; the
//! sole transient exception is the window between a successful login
//! response and the follow-up user fetch, during which the token is set and
//! the user is still absent.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::client::storage::TokenStore;
use crate::client::ClientError;
use crate::common::{Credentials, Envelope, LoginData, UserInfo};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Clone)]
struct AuthState {
    token: Option<String>,
    user: Option<UserInfo>,
}

/// Shared, read-mostly view of the session. The transfer coordinator holds
/// one of these and only ever reads the token; mutation stays with the
/// session manager.
#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<AuthState>>,
}

impl SessionHandle {
    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<UserInfo> {
        self.read().user.clone()
    }

    /// True iff both the token and the user record are present.
    pub fn is_authenticated(&self) -> bool {
        let state = self.read();
        state.token.is_some() && state.user.is_some()
    }

    fn read(&self) -> AuthState {
        let guard = match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("session lock poisoned during read, recovering");
                poisoned.into_inner()
            }
        };
        guard.clone()
    }

    fn write(&self, apply: impl FnOnce(&mut AuthState)) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("session lock poisoned during write, recovering");
                poisoned.into_inner()
            }
        };
        apply(&mut guard);
    }

    fn set_token(&self, token: String) {
        self.write(|state| state.token = Some(token));
    }

    fn set_user(&self, user: UserInfo) {
        self.write(|state| state.user = Some(user));
    }

    fn clear(&self) {
        self.write(|state| *state = AuthState::default());
    }
}

/// Owns the authentication token and user record, and every operation that
/// may change them.
pub struct SessionManager {
    http: reqwest::Client,
    base_url: String,
    session: SessionHandle,
    store: Arc<dyn TokenStore>,
}

impl SessionManager {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            session: SessionHandle::default(),
            store,
        })
    }

    /// Handle for components that need to read the session (the transfer
    /// coordinator attaches the token it yields).
    pub fn handle(&self) -> SessionHandle {
        self.session.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn current_user(&self) -> Option<UserInfo> {
        self.session.user()
    }

    /// Authenticate against the login endpoint. On success the token is
    /// stored and persisted, then the user record is fetched; any failure
    /// along the way leaves the session fully cleared.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserInfo, ClientError> {
        let result = self.login_inner(credentials).await;
        if result.is_err() {
            self.invalidate();
        }
        result
    }

    async fn login_inner(&self, credentials: &Credentials) -> Result<UserInfo, ClientError> {
        let envelope: Envelope<LoginData> = self
            .http
            .post(self.endpoint("/api/auth/login"))
            .json(credentials)
            .send()
            .await?
            .json()
            .await?;

        let data = envelope.require_data().map_err(|failure| {
            // On the login endpoint a 401 means bad credentials, not a
            // missing session.
            match ClientError::from(failure) {
                ClientError::NotAuthenticated => {
                    ClientError::Credentials("Invalid credentials".to_string())
                }
                other => other,
            }
        })?;

        self.session.set_token(data.tokens.access_token.clone());
        self.persist_token(&data.tokens.access_token);

        match self.fetch_user_info().await? {
            Some(user) => Ok(user),
            // Token vanished between the set above and the fetch; treat as
            // an invalidated session.
            None => Err(ClientError::NotAuthenticated),
        }
    }

    /// Best-effort server notify, then unconditional local clear. Never
    /// fails; calling without an active session is a no-op that still ends
    /// in the anonymous state.
    pub async fn logout(&self) {
        if let Some(token) = self.session.token() {
            let outcome = self
                .http
                .post(self.endpoint("/api/auth/logout"))
                .bearer_auth(&token)
                .send()
                .await;
            if let Err(err) = outcome {
                tracing::warn!("logout notify failed: {err}");
            }
        }

        self.invalidate();
    }

    /// Refresh the user record behind the current token.
    ///
    /// Returns `Ok(None)` without touching the network when no token is
    /// held. Any failure on the authenticated call means the token is no
    /// longer trusted, so the entire session is cleared before propagating.
    pub async fn fetch_user_info(&self) -> Result<Option<UserInfo>, ClientError> {
        let Some(token) = self.session.token() else {
            return Ok(None);
        };

        match self.fetch_user_info_inner(&token).await {
            Ok(user) => {
                self.session.set_user(user.clone());
                Ok(Some(user))
            }
            Err(err) => {
                tracing::debug!("user info fetch failed, clearing session: {err}");
                self.invalidate();
                Err(err)
            }
        }
    }

    async fn fetch_user_info_inner(&self, token: &str) -> Result<UserInfo, ClientError> {
        let envelope: Envelope<UserInfo> = self
            .http
            .get(self.endpoint("/api/auth/userinfo"))
            .bearer_auth(token)
            .send()
            .await?
            .json()
            .await?;

        envelope.require_data().map_err(ClientError::from)
    }

    /// Rehydrate the session from the persisted token, if any. Failures are
    /// absorbed into the anonymous state so application bootstrap never
    /// hard-fails on a stale token.
    pub async fn init_auth(&self) {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!("failed to read persisted token: {err}");
                None
            }
        };
        let Some(token) = stored else {
            return;
        };

        self.session.set_token(token);
        if let Err(err) = self.fetch_user_info().await {
            // fetch_user_info already cleared the session and the store.
            tracing::warn!("session rehydration failed: {err}");
        }
    }

    /// The single invalidation entry point: clears token and user together
    /// and removes the persisted token.
    fn invalidate(&self) {
        self.session.clear();
        if let Err(err) = self.store.remove() {
            tracing::warn!("failed to remove persisted token: {err}");
        }
    }

    fn persist_token(&self, token: &str) {
        if let Err(err) = self.store.save(token) {
            tracing::warn!("failed to persist token: {err}");
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserInfo {
        UserInfo {
            id: "1".to_string(),
            name: "Admin User".to_string(),
            email: "admin@example.com".to_string(),
            role: "admin".to_string(),
            status: "active".to_string(),
        }
    }

    #[test]
    fn handle_starts_anonymous() {
        let handle = SessionHandle::default();
        assert_eq!(handle.token(), None);
        assert_eq!(handle.user(), None);
        assert!(!handle.is_authenticated());
    }

    #[test]
    fn token_alone_is_not_authenticated() {
        let handle = SessionHandle::default();
        handle.set_token("tok".to_string());
        assert!(!handle.is_authenticated());

        handle.set_user(sample_user());
        assert!(handle.is_authenticated());
    }

    #[test]
    fn clear_drops_token_and_user_together() {
        let handle = SessionHandle::default();
        handle.set_token("tok".to_string());
        handle.set_user(sample_user());

        handle.clear();
        assert_eq!(handle.token(), None);
        assert_eq!(handle.user(), None);
    }

    #[test]
    fn clones_share_state() {
        let handle = SessionHandle::default();
        let view = handle.clone();

        handle.set_token("tok".to_string());
        assert_eq!(view.token(), Some("tok".to_string()));

        handle.clear();
        assert_eq!(view.token(), None);
    }
}
