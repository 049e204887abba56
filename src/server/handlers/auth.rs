//! Session lifecycle endpoints: login, logout, whoami, and profile.

use axum::extract::State;
use axum::Json;

use crate::common::config::latency;
use crate::common::{Credentials, Envelope, LoginData, ProfileInfo, TokenBundle, UserInfo};
use crate::server::state::admin_user;
use crate::server::{auth, AppState};

/// Equality check against the configured identity; a fresh token on success,
/// an envelope 401 otherwise.
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Json<Envelope<LoginData>> {
    state.delays.sleep(latency::LOGIN).await;

    if credentials.email != state.identity.email || credentials.password != state.identity.password
    {
        tracing::warn!(email = %credentials.email, "login rejected");
        return Json(Envelope::failure(401, "Invalid credentials"));
    }

    let user = admin_user(&state.identity.email);
    let token = state.sessions.issue(user.clone());
    tracing::info!(email = %user.email, "login accepted");

    Json(Envelope::ok(
        "Login successful",
        LoginData {
            tokens: TokenBundle {
                access_token: token,
                token_type: "Bearer".to_string(),
                expires_in: 3600,
            },
            user,
        },
    ))
}

/// Revoke the caller's session if one is attached. Succeeds either way.
pub async fn logout(
    auth::MaybeBearer(token): auth::MaybeBearer,
    State(state): State<AppState>,
) -> Json<Envelope<()>> {
    if let Some(token) = token {
        if state.sessions.revoke(&token) {
            tracing::info!("session revoked");
        }
    }

    Json(Envelope::ok_empty("Logout successful"))
}

/// Current user behind the gate.
pub async fn userinfo(
    auth::MaybeBearer(token): auth::MaybeBearer,
    State(state): State<AppState>,
) -> Json<Envelope<UserInfo>> {
    let Some(user) = auth::resolve_bearer(&state, token.as_deref()) else {
        return Json(auth::not_authenticated());
    };

    Json(Envelope::ok("success", user))
}

/// Current user plus the extra bio fields.
pub async fn profile(
    auth::MaybeBearer(token): auth::MaybeBearer,
    State(state): State<AppState>,
) -> Json<Envelope<ProfileInfo>> {
    let Some(user) = auth::resolve_bearer(&state, token.as_deref()) else {
        return Json(auth::not_authenticated());
    };

    state.delays.sleep(latency::PROFILE).await;

    Json(Envelope::ok(
        "success",
        ProfileInfo {
            user,
            bio: "A passionate developer".to_string(),
            joined_at: "2024-01-01".to_string(),
            last_login: chrono::Utc::now().to_rfc3339(),
        },
    ))
}
