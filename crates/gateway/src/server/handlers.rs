//! Axum request handlers for all gateway endpoints.
//!
//! Handlers are thin: parse the multipart form, hand the spooled files to the
//! blocking engine or tool on a `spawn_blocking` thread, and stream the
//! resulting temp file back as an attachment. All temp files are anonymous,
//! so they vanish when their handles drop — on success, error, and abort
//! paths alike.

use std::io::{BufReader, Seek, SeekFrom};

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use cipherstream::CipherStreamError;
use common::protocol::{ErrorResponse, HealthResponse};
use common::ServiceError;
use tokio_util::io::ReaderStream;
use tracing::warn;

use super::state::AppState;
use super::upload::{self, CipherUpload};
use crate::tools;

/// `GET /` — banner route, confirms the backend is up.
pub async fn root() -> &'static str {
    "file-tools backend running"
}

/// `GET /health` — liveness check plus chat upstream configuration status.
///
/// Always `200 OK`: the gateway has no warm-up dependency, every tool
/// operates per-request.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        chat_upstream_configured: state.config.chat_api_key.is_some(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// File encryption / decryption
// ---------------------------------------------------------------------------

/// Which way the cipher engine runs, and how the download is named.
enum Direction {
    Encrypt,
    Decrypt,
}

impl Direction {
    /// Download name policy: `<original>.enc` on encrypt, the `.enc` suffix
    /// stripped on decrypt. The container itself carries no name metadata.
    fn suggested_name(&self, original: Option<&str>) -> String {
        match self {
            Direction::Encrypt => match original {
                Some(name) => format!("{name}.enc"),
                None => "encrypted.enc".into(),
            },
            Direction::Decrypt => match original.and_then(|n| n.strip_suffix(".enc")) {
                Some(stem) if !stem.is_empty() => stem.to_owned(),
                _ => "decrypted_file".into(),
            },
        }
    }
}

/// `POST /api/encrypt` — encrypt an uploaded file under a passphrase.
///
/// Multipart form: a `file` part and a `key` (alias `password`) text field.
/// Responds with the IV-prefixed ciphertext container as an attachment.
pub async fn encrypt(multipart: Multipart) -> Response {
    run_cipher(multipart, Direction::Encrypt).await
}

/// `POST /api/decrypt` — decrypt a previously encrypted container.
///
/// Same form as [`encrypt`]. A wrong passphrase surfaces as a 422: the
/// container carries no integrity tag, so bad padding is the only signal.
pub async fn decrypt(multipart: Multipart) -> Response {
    run_cipher(multipart, Direction::Decrypt).await
}

async fn run_cipher(multipart: Multipart, direction: Direction) -> Response {
    let CipherUpload {
        file,
        file_name,
        passphrase,
    } = match upload::read_cipher_upload(multipart).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };
    let name = direction.suggested_name(file_name.as_deref());

    let result =
        tokio::task::spawn_blocking(move || -> Result<std::fs::File, CipherStreamError> {
            let mut out = tempfile::tempfile()?;
            match direction {
                Direction::Encrypt => cipherstream::encrypt_stream(file, &mut out, &passphrase)?,
                Direction::Decrypt => cipherstream::decrypt_stream(file, &mut out, &passphrase)?,
            };
            out.seek(SeekFrom::Start(0))?;
            Ok(out)
        })
        .await;

    match result {
        Ok(Ok(out)) => download_response(out, &name),
        Ok(Err(e)) => error_response(cipher_error(e)),
        Err(e) => {
            warn!(error = %e, "cipher task failed to complete");
            error_response(ServiceError::Internal("cipher task failed".into()))
        }
    }
}

/// Map engine errors onto the service error surface. Messages stay specific
/// but never include passphrase material.
fn cipher_error(e: CipherStreamError) -> ServiceError {
    match e {
        CipherStreamError::InvalidPassphrase => {
            ServiceError::BadRequest("key field is required and must not be empty".into())
        }
        CipherStreamError::TruncatedContainer => ServiceError::UnprocessableInput(
            "file is shorter than an encrypted container's IV prefix".into(),
        ),
        CipherStreamError::InvalidPadding => {
            ServiceError::UnprocessableInput("decryption failed: wrong key or corrupted file".into())
        }
        CipherStreamError::StreamIo(err) => {
            ServiceError::Internal(format!("stream I/O failure: {err}"))
        }
    }
}

// ---------------------------------------------------------------------------
// Image conversion
// ---------------------------------------------------------------------------

/// `POST /api/image/convert` — re-encode an uploaded image.
///
/// Multipart form: a `file` part and an optional `target` text field
/// (`png` or `jpeg`, default `jpeg`).
pub async fn convert_image(multipart: Multipart) -> Response {
    let upload = match upload::read_image_upload(multipart).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };
    let Some(target) = tools::image::TargetFormat::parse(&upload.target) else {
        return error_response(ServiceError::BadRequest(format!(
            "unsupported target format: {}",
            upload.target
        )));
    };

    let file = upload.file;
    let result = tokio::task::spawn_blocking(move || -> Result<std::fs::File, ServiceError> {
        let mut out = new_temp_output()?;
        tools::image::convert(BufReader::new(file), &mut out, target)?;
        rewind(&mut out)?;
        Ok(out)
    })
    .await;

    match result {
        Ok(Ok(out)) => download_response(out, &format!("converted.{}", target.extension())),
        Ok(Err(e)) => error_response(e),
        Err(e) => {
            warn!(error = %e, "image conversion task failed to complete");
            error_response(ServiceError::Internal("image conversion task failed".into()))
        }
    }
}

// ---------------------------------------------------------------------------
// PDF merge
// ---------------------------------------------------------------------------

/// `POST /api/pdf/merge` — concatenate uploaded PDFs in field order.
///
/// Multipart form: repeated `pdfs` parts. Responds with `merged.pdf`.
pub async fn merge_pdfs(multipart: Multipart) -> Response {
    let files = match upload::read_pdf_uploads(multipart).await {
        Ok(f) => f,
        Err(e) => return error_response(e),
    };

    let result = tokio::task::spawn_blocking(move || -> Result<std::fs::File, ServiceError> {
        let readers: Vec<_> = files.into_iter().map(BufReader::new).collect();
        let mut merged = tools::pdf::merge(readers)?;
        let mut out = new_temp_output()?;
        merged
            .save_to(&mut out)
            .map_err(|e| ServiceError::Internal(format!("failed to serialise merged PDF: {e}")))?;
        rewind(&mut out)?;
        Ok(out)
    })
    .await;

    match result {
        Ok(Ok(out)) => download_response(out, "merged.pdf"),
        Ok(Err(e)) => error_response(e),
        Err(e) => {
            warn!(error = %e, "pdf merge task failed to complete");
            error_response(ServiceError::Internal("pdf merge task failed".into()))
        }
    }
}

// ---------------------------------------------------------------------------
// Chat completion proxy
// ---------------------------------------------------------------------------

/// `POST /api/chat` — forward a chat completion request to the configured
/// upstream and relay its status and JSON body.
///
/// The request body is passed through verbatim; the gateway only attaches the
/// bearer token. Neither the token nor message content is logged.
pub async fn chat(State(state): State<AppState>, Json(body): Json<serde_json::Value>) -> Response {
    let Some(api_key) = state.config.chat_api_key.clone() else {
        return error_response(ServiceError::Unavailable(
            "chat upstream API key is not configured".into(),
        ));
    };

    let url = format!(
        "{}/chat/completions",
        state.config.chat_api_base_url.trim_end_matches('/')
    );
    let upstream = match state
        .http
        .post(&url)
        .bearer_auth(&api_key)
        .json(&body)
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "chat upstream request failed");
            return error_response(ServiceError::UpstreamUnavailable(
                "chat completion upstream could not be reached".into(),
            ));
        }
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    match upstream.json::<serde_json::Value>().await {
        Ok(json) => (status, Json(json)).into_response(),
        Err(e) => {
            warn!(error = %e, "chat upstream returned an unreadable body");
            error_response(ServiceError::UpstreamUnavailable(
                "chat completion upstream returned an unreadable response".into(),
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Stream a rewound temp file back as an attachment download.
fn download_response(file: std::fs::File, name: &str) -> Response {
    let stream = ReaderStream::new(tokio::fs::File::from_std(file));
    let disposition = format!("attachment; filename=\"{}\"", sanitize_file_name(name));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

/// Restrict download names to a safe character set; client-supplied names go
/// into a response header.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches(|c| c == '.' || c == '_').is_empty() {
        "download".into()
    } else {
        cleaned
    }
}

fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::new(err.code(), err.to_string());
    (status, Json(body)).into_response()
}

fn new_temp_output() -> Result<std::fs::File, ServiceError> {
    tempfile::tempfile()
        .map_err(|e| ServiceError::Internal(format!("failed to create temp file: {e}")))
}

fn rewind(file: &mut std::fs::File) -> Result<(), ServiceError> {
    file.seek(SeekFrom::Start(0))
        .map_err(|e| ServiceError::Internal(format!("failed to rewind temp file: {e}")))?;
    Ok(())
}
