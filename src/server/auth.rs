//! Bearer-token extraction and the session table every protected request
//! resolves against.
//!
//! JSON routes call [`resolve_bearer`] and answer a miss with the uniform
//! envelope failure (HTTP 200). The binary routes call [`require_bearer`],
//! which rejects at the transport level instead.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use dashmap::DashMap;
use uuid::Uuid;

use crate::common::{Envelope, UserInfo};
use crate::server::{AppError, AppState};

/// Active sessions, keyed by issued token.
#[derive(Default)]
pub struct SessionTable {
    sessions: DashMap<String, UserInfo>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh opaque token bound to `user`.
    pub fn issue(&self, user: UserInfo) -> String {
        let token = Uuid::new_v4().to_string();
        tracing::debug!(user = %user.email, "session issued");
        self.sessions.insert(token.clone(), user);
        token
    }

    pub fn resolve(&self, token: &str) -> Option<UserInfo> {
        self.sessions.get(token).map(|entry| entry.value().clone())
    }

    /// Drop the session for `token`. Unknown tokens are a no-op.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}

/// Extracted bearer token from `Authorization: Bearer <token>`.
/// Rejects at the transport level; reserved for the binary routes.
pub struct BearerToken(pub String);

/// Bearer token if present and well-formed, `None` otherwise. Never rejects,
/// so JSON routes can answer with an envelope failure instead.
pub struct MaybeBearer(pub Option<String>);

fn bearer_from_parts(parts: &Parts) -> Option<String> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;
    let token = header.strip_prefix("Bearer ")?;
    if token.trim().is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_from_parts(parts)
            .map(BearerToken)
            .ok_or_else(|| AppError::Unauthorized("missing or invalid authorization header".to_string()))
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MaybeBearer {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeBearer(bearer_from_parts(parts)))
    }
}

/// The auth gate for JSON routes: resolve the caller or report why not.
pub fn resolve_bearer(state: &AppState, token: Option<&str>) -> Option<UserInfo> {
    let token = token?;
    state.sessions.resolve(token)
}

/// Uniform envelope failure for an unauthenticated JSON request.
pub fn not_authenticated<T>() -> Envelope<T> {
    Envelope::failure(401, "Not authenticated")
}

/// The auth gate for binary routes: transport-level 401 on a miss.
pub fn require_bearer(state: &AppState, token: &str) -> Result<UserInfo, AppError> {
    state
        .sessions
        .resolve(token)
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::state::admin_user;

    #[test]
    fn issued_token_resolves_to_its_user() {
        let table = SessionTable::new();
        let user = admin_user("admin@example.com");
        let token = table.issue(user.clone());

        assert!(!token.is_empty());
        assert_eq!(table.resolve(&token), Some(user));
    }

    #[test]
    fn revoked_token_no_longer_resolves() {
        let table = SessionTable::new();
        let token = table.issue(admin_user("admin@example.com"));

        assert!(table.revoke(&token));
        assert!(!table.revoke(&token));
        assert_eq!(table.resolve(&token), None);
    }

    #[test]
    fn unknown_token_does_not_resolve() {
        let table = SessionTable::new();
        assert_eq!(table.resolve("nope"), None);
    }
}
