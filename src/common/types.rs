//! Wire records shared by the server and the typed client.
//!
//! Field names follow the JSON contract (camelCase); records are replaced
//! wholesale on refresh, never patched.

use serde::{Deserialize, Serialize};

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Token material issued at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBundle {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Server-issued profile record for the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
}

/// Successful login payload: the token bundle plus the user it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    #[serde(flatten)]
    pub tokens: TokenBundle,
    pub user: UserInfo,
}

/// Extended profile served by `/api/profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInfo {
    #[serde(flatten)]
    pub user: UserInfo,
    pub bio: String,
    pub joined_at: String,
    pub last_login: String,
}

/// Metadata echoed back after a simulated upload. The bytes themselves are
/// not persisted anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadResponse {
    pub filename: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub uploaded_at: String,
}

/// Row in the mock users dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
}

/// Create-user request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Echo of a created user, stamped with an id and creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

/// Row in the mock tasks dataset, served behind the auth gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: u32,
    pub title: String,
    pub status: String,
    pub priority: String,
}
