//! Drives one upload or download against the mock API, spending the token
//! the session manager holds.
//!
//! Uploads stream the file part in fixed-size pieces so byte-level progress
//! is observable; the caller's callback sees deduplicated, non-decreasing
//! percentages ending at 100 on success. Downloads have no progress signal
//! at all: the server commits to a binary body and nothing arrives until the
//! staged delays finish. That asymmetry is part of the contract, so no
//! synthetic progress is emitted client-side.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream;
use reqwest::multipart;
use tokio_util::sync::CancellationToken;

use crate::client::session::SessionHandle;
use crate::client::ClientError;
use crate::common::{Envelope, FileUploadResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Size of each piece the upload body is streamed in. Small enough that
/// progress moves visibly on the payload sizes the mock serves.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Progress observer: called with a percentage in `[0, 100]`.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// One upload, built by the caller and consumed by [`TransferCoordinator::upload`].
pub struct UploadRequest {
    pub filename: String,
    pub content_type: String,
    pub payload: Bytes,
    pub category: Option<String>,
}

impl UploadRequest {
    pub fn new(filename: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: "application/octet-stream".to_string(),
            payload: payload.into(),
            category: None,
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// An opaque downloaded payload plus the metadata the server declared for it.
#[derive(Debug)]
pub struct DownloadedFile {
    pub bytes: Bytes,
    pub content_type: String,
    pub declared_length: Option<u64>,
    pub filename: Option<String>,
}

/// Client-side driver for simulated transfers. Holds a read-only view of the
/// session; the token is attached as a bearer credential, never mutated here.
pub struct TransferCoordinator {
    http: reqwest::Client,
    base_url: String,
    session: SessionHandle,
}

impl TransferCoordinator {
    pub fn new(
        base_url: impl Into<String>,
        session: SessionHandle,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            session,
        })
    }

    /// Upload one file as a streamed multipart body.
    ///
    /// Fails immediately with an authentication error when no token is held.
    /// `on_progress` observes `round(sent / total * 100)` as body pieces are
    /// handed to the transport; cancelling `cancel` rejects with
    /// [`ClientError::Cancelled`] and stops progress delivery.
    pub async fn upload(
        &self,
        request: UploadRequest,
        on_progress: Option<ProgressFn>,
        cancel: CancellationToken,
    ) -> Result<FileUploadResponse, ClientError> {
        let Some(token) = self.session.token() else {
            return Err(ClientError::NotAuthenticated);
        };

        let reporter = ProgressReporter::new(on_progress, cancel.clone());
        let total = request.payload.len();
        let part = multipart::Part::stream_with_length(
            upload_body(request.payload, reporter.clone()),
            total as u64,
        )
        .file_name(request.filename)
        .mime_str(&request.content_type)?;

        let mut builder = self
            .http
            .post(self.endpoint("/api/system/files/upload"))
            .bearer_auth(token)
            .multipart(multipart::Form::new().part("file", part));
        if let Some(category) = &request.category {
            builder = builder.query(&[("category", category)]);
        }

        let send = async {
            let envelope: Envelope<FileUploadResponse> =
                builder.send().await?.json().await?;
            envelope.require_data().map_err(ClientError::from)
        };

        let response = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("upload cancelled by caller");
                return Err(ClientError::Cancelled);
            }
            response = send => response?,
        };

        // The transport saw every byte; make the terminal value explicit.
        reporter.report(100);
        Ok(response)
    }

    /// Fetch a catalog file by id. No progress is observable on this path.
    pub async fn download(&self, id: &str) -> Result<DownloadedFile, ClientError> {
        let mut builder = self.http.get(self.endpoint(&format!("/api/download/{id}")));
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }

        self.fetch_binary(builder).await
    }

    /// Fetch the authenticated report. The server answers a bad credential
    /// here with a transport-level 401, surfaced as an authentication error.
    pub async fn download_report(&self) -> Result<DownloadedFile, ClientError> {
        let Some(token) = self.session.token() else {
            return Err(ClientError::NotAuthenticated);
        };

        let builder = self
            .http
            .get(self.endpoint("/api/download/report"))
            .bearer_auth(token);

        self.fetch_binary(builder).await
    }

    async fn fetch_binary(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<DownloadedFile, ClientError> {
        let response = builder.send().await?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => {
                return Err(ClientError::NotFound("file not found".to_string()));
            }
            reqwest::StatusCode::UNAUTHORIZED => {
                return Err(ClientError::NotAuthenticated);
            }
            _ => {}
        }
        let response = response.error_for_status()?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let declared_length = response.content_length();
        let filename = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_filename);

        let bytes = response.bytes().await?;

        Ok(DownloadedFile {
            bytes,
            content_type,
            declared_length,
            filename,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Deduplicating, monotonic progress fan-out. Percentages are only delivered
/// when they advance past the last reported value, and never after the
/// transfer's cancellation token fires.
#[derive(Clone)]
struct ProgressReporter {
    callback: Option<ProgressFn>,
    last: Arc<AtomicU8>,
    cancel: CancellationToken,
}

impl ProgressReporter {
    fn new(callback: Option<ProgressFn>, cancel: CancellationToken) -> Self {
        Self {
            callback,
            last: Arc::new(AtomicU8::new(0)),
            cancel,
        }
    }

    fn report(&self, percent: u8) {
        let Some(callback) = &self.callback else {
            return;
        };
        if self.cancel.is_cancelled() {
            return;
        }
        let previous = self.last.fetch_max(percent, Ordering::AcqRel);
        if percent > previous {
            callback(percent);
        }
    }
}

/// Body stream that yields the payload in fixed-size pieces, reporting the
/// cumulative percentage after each piece is handed to the transport.
fn upload_body(payload: Bytes, reporter: ProgressReporter) -> reqwest::Body {
    let total = payload.len();
    let pieces = stream::iter((0..total.max(1)).step_by(UPLOAD_CHUNK_SIZE).map(move |start| {
        let end = (start + UPLOAD_CHUNK_SIZE).min(total);
        let piece = payload.slice(start..end);
        let percent = if total == 0 {
            100
        } else {
            ((end as f64 / total as f64) * 100.0).round() as u8
        };
        reporter.report(percent);
        Ok::<Bytes, std::io::Error>(piece)
    }));

    reqwest::Body::wrap_stream(pieces)
}

/// Pulls `filename="..."` out of a content-disposition header.
fn disposition_filename(header: &str) -> Option<String> {
    let rest = header.split("filename=").nth(1)?;
    let name = rest.trim().trim_matches('"');
    let name = name.split('"').next().unwrap_or(name);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
