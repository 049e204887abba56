//! Mock CRUD endpoints over the seeded users dataset, plus the gated tasks
//! list. Creates are echoes; nothing is stored.

use axum::extract::{Path, State};
use axum::Json;
use rand::Rng;

use crate::common::config::latency;
use crate::common::{CreatedUser, Envelope, NewUserRequest, TaskRecord, UserRecord};
use crate::server::{auth, catalog, AppState};

pub async fn list_users(State(state): State<AppState>) -> Json<Envelope<Vec<UserRecord>>> {
    state.delays.sleep(latency::USER_LIST).await;
    Json(Envelope::ok("success", catalog::seed_users()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Envelope<UserRecord>> {
    state.delays.sleep(latency::USER_GET).await;

    let found = id.parse::<u32>().ok().and_then(catalog::find_user);
    match found {
        Some(user) => Json(Envelope::ok("success", user)),
        None => Json(Envelope::failure(404, "User not found")),
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<NewUserRequest>,
) -> Json<Envelope<CreatedUser>> {
    if request.name.trim().is_empty() || request.email.trim().is_empty() {
        return Json(Envelope::failure(400, "name and email are required"));
    }

    state.delays.sleep(latency::USER_CREATE).await;

    let created = CreatedUser {
        id: rand::thread_rng().gen_range(100..1000),
        name: request.name,
        email: request.email,
        role: request.role.unwrap_or_else(|| "user".to_string()),
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    tracing::debug!(email = %created.email, "mock user created");

    Json(Envelope::ok("User created successfully", created))
}

pub async fn list_tasks(
    auth::MaybeBearer(token): auth::MaybeBearer,
    State(state): State<AppState>,
) -> Json<Envelope<Vec<TaskRecord>>> {
    let Some(_user) = auth::resolve_bearer(&state, token.as_deref()) else {
        return Json(auth::not_authenticated());
    };

    state.delays.sleep(latency::TASKS).await;
    Json(Envelope::ok("success", catalog::seed_tasks()))
}
