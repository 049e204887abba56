//! Simulated transfer endpoints.
//!
//! Both directions run the same fixed-count staged delay sequence. Uploads
//! parse the multipart payload first, so validation failures short-circuit
//! before any delay step; downloads allocate the declared payload only after
//! the sequence finishes and return it in one shot (no mid-transfer progress
//! is observable by design).

use anyhow::Context;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, Response};
use axum::Json;
use serde::Deserialize;

use crate::common::config::{latency, TRANSFER_DELAY_STEPS};
use crate::common::{Envelope, FileUploadResponse};
use crate::server::catalog::{self, CatalogFile};
use crate::server::{auth, AppError, AppState};

#[derive(Deserialize, Default)]
pub struct UploadQuery {
    pub category: Option<String>,
}

/// Fixed ten-step delay sequence modelling staged transfer latency.
async fn staged_transfer_delay(state: &AppState) {
    for _ in 0..TRANSFER_DELAY_STEPS {
        state.delays.sleep(latency::TRANSFER_STEP).await;
    }
}

/// Accept one multipart file, run the staged delays, and echo its metadata.
pub async fn upload(
    auth::MaybeBearer(token): auth::MaybeBearer,
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Json<Envelope<FileUploadResponse>> {
    let Some(user) = auth::resolve_bearer(&state, token.as_deref()) else {
        return Json(auth::not_authenticated());
    };

    let mut file: Option<(String, String, u64)> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!("multipart parse failed: {err}");
                return Json(Envelope::failure(400, "Malformed upload payload"));
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.bin").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        match field.bytes().await {
            Ok(bytes) => file = Some((filename, content_type, bytes.len() as u64)),
            Err(err) => {
                tracing::warn!("failed to read file field: {err}");
                return Json(Envelope::failure(400, "Malformed upload payload"));
            }
        }
    }

    // Validation happens before the delay sequence starts.
    let Some((filename, content_type, size)) = file else {
        return Json(Envelope::failure(400, "No file provided"));
    };

    staged_transfer_delay(&state).await;

    tracing::info!(
        user = %user.email,
        filename = %filename,
        size,
        category = query.category.as_deref().unwrap_or("-"),
        "upload complete"
    );

    Json(Envelope::ok(
        "Upload successful",
        FileUploadResponse {
            filename,
            size,
            content_type,
            uploaded_at: chrono::Utc::now().to_rfc3339(),
        },
    ))
}

/// Run the staged delays, then emit the declared payload with the three
/// contract headers.
async fn serve_catalog_file(
    state: &AppState,
    file: &CatalogFile,
) -> Result<Response<Body>, AppError> {
    staged_transfer_delay(state).await;

    let payload = vec![0u8; file.size as usize];

    Ok(Response::builder()
        .header(header::CONTENT_TYPE, file.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.name),
        )
        .header(header::CONTENT_LENGTH, file.size.to_string())
        .body(Body::from(payload))
        .context("build download response")?)
}

/// Catalog download by id. Unauthenticated; unknown ids fail at the
/// transport level since the route is committed to a binary body.
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response<Body>, AppError> {
    let file =
        catalog::find_file(&id).ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    tracing::debug!(id = %id, name = %file.name, "download start");
    serve_catalog_file(&state, file).await
}

/// The authenticated report. Auth failures here are transport-level 401s,
/// unlike the JSON routes.
pub async fn report(
    auth::BearerToken(token): auth::BearerToken,
    State(state): State<AppState>,
) -> Result<Response<Body>, AppError> {
    let user = auth::require_bearer(&state, &token)?;

    tracing::debug!(user = %user.email, "report download start");
    serve_catalog_file(&state, &catalog::REPORT_FILE).await
}
