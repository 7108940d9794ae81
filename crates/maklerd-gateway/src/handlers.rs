// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Handles chat submission, SSE stream claiming, status polling, document
//! upload/listing, and health.

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    Json,
};
use futures::StreamExt;
use maklerd_agent::ChatSession;
use maklerd_core::{SessionId, StreamUpdate};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::markdown::render_html;
use crate::relay::StreamState;
use crate::server::{GatewayState, SessionEntry};

/// Request body for POST /v1/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's utterance.
    pub message: String,
    /// Optional session id to continue an existing conversation.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response body for POST /v1/chat.
#[derive(Debug, Serialize)]
pub struct ChatAccepted {
    pub status: String,
    pub stream_id: String,
    pub session_id: String,
}

/// Response body for GET /v1/status/{stream_id}.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Response body for GET /v1/documents.
#[derive(Debug, Serialize)]
pub struct DocumentList {
    pub documents: Vec<String>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// POST /v1/chat
///
/// Registers a stream, spawns the session interaction, and returns 202 with
/// the stream id to claim and the (possibly newly generated) session id.
pub async fn post_chat(
    State(state): State<GatewayState>,
    Json(body): Json<ChatRequest>,
) -> Response {
    let message = body.message.trim().to_string();
    if message.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "message must not be empty");
    }

    let session_id = body
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let stream_id = uuid::Uuid::new_v4().to_string();

    state.evict_idle_sessions();
    let session = state
        .sessions
        .entry(session_id.clone())
        .and_modify(|entry| entry.last_used = Instant::now())
        .or_insert_with(|| SessionEntry {
            session: Arc::new(Mutex::new(ChatSession::new(
                SessionId(session_id.clone()),
                state.client.clone(),
                state.router.clone(),
                state.dispatcher.clone(),
                state.assistant_id.clone(),
            ))),
            last_used: Instant::now(),
        })
        .value()
        .session
        .clone();

    let tx = state.registry.create(&stream_id);
    info!(session = %session_id, stream = %stream_id, "chat accepted");

    let registry = state.registry.clone();
    let task_stream_id = stream_id.clone();
    tokio::spawn(async move {
        let mut session = session.lock().await;
        session.handle_message(&message, tx).await;
        registry.mark_completed(&task_stream_id);
    });

    (
        StatusCode::ACCEPTED,
        Json(ChatAccepted {
            status: "streaming".to_string(),
            stream_id,
            session_id,
        }),
    )
        .into_response()
}

/// GET /v1/stream/{stream_id}
///
/// Claims the stream's receiver (single consumer) and forwards updates as
/// SSE events until the session drops the sender.
pub async fn get_stream(
    State(state): State<GatewayState>,
    Path(stream_id): Path<String>,
) -> Response {
    let Some(rx) = state.registry.claim(&stream_id) else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("unknown or already claimed stream id: {stream_id}"),
        );
    };

    let events = ReceiverStream::new(rx).map(|update| match update {
        StreamUpdate::Delta { text } => Event::default()
            .event("delta")
            .json_data(serde_json::json!({ "text": render_html(&text) })),
        StreamUpdate::Completed { text, suggestions } => Event::default()
            .event("completed")
            .json_data(serde_json::json!({
                "text": render_html(&text),
                "suggestions": suggestions,
            })),
        StreamUpdate::Error { message } => Event::default()
            .event("error")
            .json_data(serde_json::json!({ "error": message })),
    });

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// GET /v1/status/{stream_id} — poll fallback for clients without SSE.
pub async fn get_status(
    State(state): State<GatewayState>,
    Path(stream_id): Path<String>,
) -> Response {
    match state.registry.status(&stream_id) {
        Some(StreamState::Running) => Json(StatusResponse {
            status: "running".to_string(),
        })
        .into_response(),
        Some(StreamState::Completed) => Json(StatusResponse {
            status: "completed".to_string(),
        })
        .into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("unknown stream id: {stream_id}"),
        ),
    }
}

/// POST /v1/documents — multipart upload into the configured directory.
pub async fn upload_document(
    State(state): State<GatewayState>,
    mut multipart: Multipart,
) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("malformed multipart body: {e}"),
                );
            }
        };
        if field.name() != Some("document") {
            continue;
        }

        let Some(filename) = field.file_name().and_then(sanitize_filename) else {
            return error_response(StatusCode::BAD_REQUEST, "missing or invalid filename");
        };
        if !allowed_file(&filename, &state.uploads.allowed_extensions) {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("file extension not allowed: {filename}"),
            );
        }

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("failed to read upload: {e}"),
                );
            }
        };

        let dir = FsPath::new(&state.uploads.dir);
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!(error = %e, "failed to create upload directory");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "upload failed");
        }
        let target = dir.join(&filename);
        if let Err(e) = tokio::fs::write(&target, &bytes).await {
            warn!(error = %e, path = %target.display(), "failed to write upload");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "upload failed");
        }

        info!(file = %filename, bytes = bytes.len(), "document uploaded");
        return (
            StatusCode::CREATED,
            Json(serde_json::json!({ "filename": filename })),
        )
            .into_response();
    }
    error_response(StatusCode::BAD_REQUEST, "no document field in request")
}

/// GET /v1/documents — lists uploaded documents.
pub async fn list_documents(State(state): State<GatewayState>) -> Response {
    let mut documents = Vec::new();
    if let Ok(mut entries) = tokio::fs::read_dir(&state.uploads.dir).await {
        while let Ok(Some(entry)) = entries.next_entry().await {
            if let Ok(name) = entry.file_name().into_string() {
                documents.push(name);
            }
        }
    }
    documents.sort();
    Json(DocumentList { documents }).into_response()
}

/// GET /health — unauthenticated liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Strips path components and unexpected characters from a client-supplied
/// filename. Returns `None` when nothing safe remains.
fn sanitize_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// True when the filename carries an allow-listed extension.
fn allowed_file(filename: &str, allowed: &[String]) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| allowed.iter().any(|a| a == &ext.to_lowercase()))
        .unwrap_or(false)
}
