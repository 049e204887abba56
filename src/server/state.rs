use std::sync::Arc;

use crate::common::config::IdentitySettings;
use crate::common::{DelayProfile, UserInfo};
use crate::server::auth::SessionTable;

/// Shared server state. Cloned per request by axum; everything mutable lives
/// behind the shared session table.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionTable>,
    pub identity: IdentitySettings,
    pub delays: DelayProfile,
}

impl AppState {
    pub fn new(identity: IdentitySettings, delays: DelayProfile) -> Self {
        Self {
            sessions: Arc::new(SessionTable::new()),
            identity,
            delays,
        }
    }
}

/// The user record bound to the configured login identity.
pub fn admin_user(email: &str) -> UserInfo {
    UserInfo {
        id: "1".to_string(),
        name: "Admin User".to_string(),
        email: email.to_string(),
        role: "admin".to_string(),
        status: "active".to_string(),
    }
}
