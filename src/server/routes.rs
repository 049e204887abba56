//! Router wiring for the mock API.

use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};

use crate::server::handlers::{auth, transfer, users};
use crate::server::AppState;

/// Build the full API router over the shared state.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/userinfo", get(auth::userinfo))
        .route("/api/profile", get(auth::profile))
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route("/api/users/:id", get(users::get_user))
        .route("/api/tasks", get(users::list_tasks))
        .route("/api/system/files/upload", post(transfer::upload))
        .route("/api/download/report", get(transfer::report))
        .route("/api/download/:id", get(transfer::download))
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
        .with_state(state)
}
