#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use http_body_util::BodyExt;

use mockdrop::common::config::IdentitySettings;
use mockdrop::common::DelayProfile;
use mockdrop::server::state::admin_user;
use mockdrop::server::{routes, AppState};

pub const TEST_EMAIL: &str = "admin@example.com";
pub const TEST_PASSWORD: &str = "password";

//===========
// App Factory
//===========

/// Server state with the default identity and the instant delay profile, so
/// the staged-delay contract runs without wall-clock sleeps.
pub fn create_test_state() -> AppState {
    AppState::new(IdentitySettings::default(), DelayProfile::Instant)
}

pub fn create_test_app() -> (Router, AppState) {
    let state = create_test_state();
    let app = routes::create_router(state.clone());
    (app, state)
}

/// Issue a session token directly against the table, bypassing the login
/// endpoint, for tests that only care about the gate.
pub fn issue_token(state: &AppState) -> String {
    state.sessions.issue(admin_user(TEST_EMAIL))
}

/// Bind a real socket and serve the app in the background; returns the base
/// URL for reqwest-driven client tests.
pub async fn spawn_server() -> (String, AppState) {
    let (app, state) = create_test_app();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    (format!("http://{addr}"), state)
}

//=================
// Request Builders
//=================

pub fn build_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("Failed to build request")
}

pub fn build_json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: &serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).expect("serialize body")))
        .expect("Failed to build request")
}

//================
// Response Helpers
//================

pub async fn extract_json(response: axum::response::Response) -> serde_json::Value {
    let body_bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect body")
        .to_bytes();
    serde_json::from_slice(&body_bytes).expect("Failed to parse JSON")
}

pub async fn extract_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect body")
        .to_bytes()
        .to_vec()
}
