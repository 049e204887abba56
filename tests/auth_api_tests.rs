mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::{
    build_json_request, build_request, create_test_app, extract_json, issue_token, TEST_EMAIL,
    TEST_PASSWORD,
};

#[tokio::test]
async fn login_with_valid_credentials_issues_a_token() {
    let (app, _state) = create_test_app();
    let request = build_json_request(
        Method::POST,
        "/api/auth/login",
        None,
        &json!({ "email": TEST_EMAIL, "password": TEST_PASSWORD }),
    );
    let response = app.oneshot(request).await.expect("send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert_eq!(body["code"], 0);
    assert!(!body["data"]["accessToken"].as_str().unwrap().is_empty());
    assert_eq!(body["data"]["tokenType"], "Bearer");
    assert_eq!(body["data"]["user"]["email"], TEST_EMAIL);
}

#[tokio::test]
async fn login_with_wrong_password_fails_inside_the_envelope() {
    let (app, _state) = create_test_app();
    let request = build_json_request(
        Method::POST,
        "/api/auth/login",
        None,
        &json!({ "email": TEST_EMAIL, "password": "wrong" }),
    );
    let response = app.oneshot(request).await.expect("send request");

    // Auth failures on JSON routes ride an HTTP 200; callers branch on code.
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert_eq!(body["code"], 401);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn userinfo_without_a_token_is_an_envelope_401() {
    let (app, _state) = create_test_app();
    let request = build_request(Method::GET, "/api/auth/userinfo", None);
    let response = app.oneshot(request).await.expect("send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert_eq!(body["code"], 401);
    assert_eq!(body["message"], "Not authenticated");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn userinfo_with_an_issued_token_returns_the_user() {
    let (app, state) = create_test_app();
    let token = issue_token(&state);
    let request = build_request(Method::GET, "/api/auth/userinfo", Some(&token));
    let response = app.oneshot(request).await.expect("send request");

    let body = extract_json(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["email"], TEST_EMAIL);
    assert_eq!(body["data"]["role"], "admin");
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let (app, state) = create_test_app();
    let token = issue_token(&state);

    let request = build_request(Method::POST, "/api/auth/logout", Some(&token));
    let response = app.clone().oneshot(request).await.expect("send request");
    let body = extract_json(response).await;
    assert_eq!(body["code"], 0);
    assert!(body["data"].is_null());

    // The revoked token no longer passes the gate.
    let request = build_request(Method::GET, "/api/auth/userinfo", Some(&token));
    let response = app.oneshot(request).await.expect("send request");
    let body = extract_json(response).await;
    assert_eq!(body["code"], 401);
}

#[tokio::test]
async fn logout_without_a_token_still_succeeds() {
    let (app, _state) = create_test_app();
    let request = build_request(Method::POST, "/api/auth/logout", None);
    let response = app.oneshot(request).await.expect("send request");

    let body = extract_json(response).await;
    assert_eq!(body["code"], 0);
}

#[tokio::test]
async fn profile_adds_bio_fields_to_the_user() {
    let (app, state) = create_test_app();
    let token = issue_token(&state);
    let request = build_request(Method::GET, "/api/profile", Some(&token));
    let response = app.oneshot(request).await.expect("send request");

    let body = extract_json(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["email"], TEST_EMAIL);
    assert_eq!(body["data"]["bio"], "A passionate developer");
    assert!(body["data"]["lastLogin"].is_string());
}

#[tokio::test]
async fn tasks_are_gated_behind_the_envelope() {
    let (app, state) = create_test_app();

    let request = build_request(Method::GET, "/api/tasks", None);
    let response = app.clone().oneshot(request).await.expect("send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert_eq!(body["code"], 401);

    let token = issue_token(&state);
    let request = build_request(Method::GET, "/api/tasks", Some(&token));
    let response = app.oneshot(request).await.expect("send request");
    let body = extract_json(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn report_rejects_a_missing_token_at_the_transport_level() {
    let (app, _state) = create_test_app();
    let request = build_request(Method::GET, "/api/download/report", None);
    let response = app.oneshot(request).await.expect("send request");

    // The binary route cannot switch to a JSON envelope, so it is the one
    // place auth failure surfaces as an HTTP status.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn report_rejects_a_stale_token_at_the_transport_level() {
    let (app, state) = create_test_app();
    let token = issue_token(&state);
    state.sessions.revoke(&token);

    let request = build_request(Method::GET, "/api/download/report", Some(&token));
    let response = app.oneshot(request).await.expect("send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
