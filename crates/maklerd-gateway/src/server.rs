// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use dashmap::DashMap;
use maklerd_agent::ChatSession;
use maklerd_assistant::AssistantClient;
use maklerd_config::model::UploadConfig;
use maklerd_core::MaklerError;
use maklerd_intent::IntentRouter;
use maklerd_tools::ToolDispatcher;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::relay::StreamRegistry;

/// Sessions idle longer than this are dropped; the next chat with the same
/// session id starts over with a fresh assistant thread.
const SESSION_IDLE_TTL: std::time::Duration = std::time::Duration::from_secs(3600);

/// A live chat session plus the time it last handled a request.
pub struct SessionEntry {
    pub session: Arc<Mutex<ChatSession>>,
    pub last_used: Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// In-flight response streams keyed by stream id.
    pub registry: Arc<StreamRegistry>,
    /// Live chat sessions keyed by session id.
    pub sessions: Arc<DashMap<String, SessionEntry>>,
    /// Assistant-platform client shared by all sessions.
    pub client: Arc<AssistantClient>,
    /// Prepared intent router.
    pub router: Arc<IntentRouter>,
    /// Local tool dispatcher.
    pub dispatcher: Arc<ToolDispatcher>,
    /// Id of the provisioned assistant.
    pub assistant_id: String,
    /// Upload directory and extension allowlist.
    pub uploads: UploadConfig,
}

impl GatewayState {
    pub fn new(
        client: Arc<AssistantClient>,
        router: Arc<IntentRouter>,
        dispatcher: Arc<ToolDispatcher>,
        assistant_id: String,
        uploads: UploadConfig,
    ) -> Self {
        Self {
            registry: Arc::new(StreamRegistry::new()),
            sessions: Arc::new(DashMap::new()),
            client,
            router,
            dispatcher,
            assistant_id,
            uploads,
        }
    }

    /// Drops sessions that have been idle past the retention window, keeping
    /// the session map bounded by recent activity.
    pub(crate) fn evict_idle_sessions(&self) {
        self.sessions
            .retain(|_, entry| entry.last_used.elapsed() < SESSION_IDLE_TTL);
    }
}

/// Builds the gateway route tree.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/v1/chat", post(handlers::post_chat))
        .route("/v1/stream/{stream_id}", get(handlers::get_stream))
        .route("/v1/status/{stream_id}", get(handlers::get_status))
        .route(
            "/v1/documents",
            post(handlers::upload_document).get(handlers::list_documents),
        )
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the configured address and serves the gateway until the process
/// shuts down.
pub async fn start_server(host: &str, port: u16, state: GatewayState) -> Result<(), MaklerError> {
    let app = build_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MaklerError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| MaklerError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use maklerd_agent::reference_intents;
    use maklerd_config::model::ProviderConfig;
    use maklerd_core::{Embedder, SessionId};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Every text embeds orthogonally to the references, so nothing routes
    /// to a guided sequence in these tests.
    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MaklerError> {
            Ok(texts
                .iter()
                .map(|t| {
                    if t.starts_with("Wie") || t.starts_with("Welche") {
                        vec![0.0, 1.0]
                    } else {
                        vec![1.0, 0.0]
                    }
                })
                .collect())
        }
    }

    async fn test_state(provider_uri: &str, uploads_dir: &str) -> GatewayState {
        let provider = ProviderConfig {
            api_key: Some("sk-test".into()),
            base_url: provider_uri.to_string(),
            ..ProviderConfig::default()
        };
        let client = Arc::new(AssistantClient::from_config(&provider).unwrap());

        let mut router = IntentRouter::new(Arc::new(StubEmbedder), reference_intents(), 0.85);
        router.prepare().await.unwrap();

        let dispatcher = Arc::new(ToolDispatcher::new(
            format!("{uploads_dir}/zahlen.csv").into(),
            format!("{uploads_dir}/produktiv.csv").into(),
        ));

        GatewayState::new(
            client,
            Arc::new(router),
            dispatcher,
            "asst_test".into(),
            UploadConfig {
                dir: uploads_dir.to_string(),
                ..UploadConfig::default()
            },
        )
    }

    async fn mount_simple_run(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/threads"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "thread_g"})),
            )
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_g/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1", "role": "user", "content": []
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_g/runs"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(concat!(
                        "event: thread.message.delta\ndata: {\"delta\":{\"content\":[{\"type\":\"text\",\"text\":{\"value\":\"**Moin**\"}}]}}\n\n",
                        "event: thread.message.completed\ndata: {\"id\":\"m\",\"role\":\"assistant\",\"content\":[{\"type\":\"text\",\"text\":{\"value\":\"**Moin** Makler\"}}]}\n\n",
                        "event: thread.run.completed\ndata: {\"id\":\"r\",\"status\":\"completed\"}\n\n",
                    )),
            )
            .mount(server)
            .await;
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_responds_ok() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockServer::start().await;
        let app = build_router(test_state(&provider.uri(), dir.path().to_str().unwrap()).await);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn chat_then_stream_delivers_rendered_events() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockServer::start().await;
        mount_simple_run(&provider).await;
        let state = test_state(&provider.uri(), dir.path().to_str().unwrap()).await;
        let app = build_router(state.clone());

        let response = app
            .clone()
            .oneshot(
                Request::post("/v1/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"message": "Hallo"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let accepted = body_json(response).await;
        assert_eq!(accepted["status"], "streaming");
        let stream_id = accepted["stream_id"].as_str().unwrap().to_string();
        assert!(!accepted["session_id"].as_str().unwrap().is_empty());

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/v1/stream/{stream_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        let sse_text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(sse_text.contains("event: delta"), "got: {sse_text}");
        assert!(sse_text.contains("<b>Moin</b>"), "got: {sse_text}");
        assert!(sse_text.contains("event: completed"), "got: {sse_text}");
        assert!(sse_text.contains("suggestions"), "got: {sse_text}");

        // Second claim of the same stream id.
        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/v1/stream/{stream_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // The poll fallback eventually reports completion.
        let mut completed = false;
        for _ in 0..100 {
            let response = app
                .clone()
                .oneshot(
                    Request::get(format!("/v1/status/{stream_id}"))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            let json = body_json(response).await;
            if json["status"] == "completed" {
                completed = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(completed, "stream never reported completed");
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockServer::start().await;
        let app = build_router(test_state(&provider.uri(), dir.path().to_str().unwrap()).await);

        let response = app
            .oneshot(
                Request::post("/v1/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"message": "   "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_stream_and_status_are_404() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockServer::start().await;
        let app = build_router(test_state(&provider.uri(), dir.path().to_str().unwrap()).await);

        let response = app
            .clone()
            .oneshot(
                Request::get("/v1/stream/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(
                Request::get("/v1/status/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    fn multipart_body(filename: &str, content: &str) -> (String, String) {
        let boundary = "maklerd-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"document\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {content}\r\n\
             --{boundary}--\r\n"
        );
        (format!("multipart/form-data; boundary={boundary}"), body)
    }

    #[tokio::test]
    async fn upload_accepts_allowed_extension_and_lists_it() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockServer::start().await;
        let app = build_router(test_state(&provider.uri(), dir.path().to_str().unwrap()).await);

        let (content_type, body) = multipart_body("zieldefinition.txt", "Ziele: Soll vs Ist");
        let response = app
            .clone()
            .oneshot(
                Request::post("/v1/documents")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(dir.path().join("zieldefinition.txt").exists());

        let response = app
            .oneshot(Request::get("/v1/documents").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["documents"][0], "zieldefinition.txt");
    }

    #[tokio::test]
    async fn upload_rejects_disallowed_extension() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockServer::start().await;
        let app = build_router(test_state(&provider.uri(), dir.path().to_str().unwrap()).await);

        let (content_type, body) = multipart_body("malware.exe", "MZ");
        let response = app
            .oneshot(
                Request::post("/v1/documents")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!dir.path().join("malware.exe").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_sessions_are_evicted() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state("http://localhost:9", dir.path().to_str().unwrap()).await;

        state.sessions.insert(
            "stale".to_string(),
            SessionEntry {
                session: Arc::new(Mutex::new(ChatSession::new(
                    SessionId("stale".into()),
                    state.client.clone(),
                    state.router.clone(),
                    state.dispatcher.clone(),
                    state.assistant_id.clone(),
                ))),
                last_used: Instant::now(),
            },
        );
        assert_eq!(state.sessions.len(), 1);

        tokio::time::advance(SESSION_IDLE_TTL + std::time::Duration::from_secs(1)).await;
        state.evict_idle_sessions();
        assert!(state.sessions.is_empty(), "idle session must be dropped");
    }

    #[tokio::test(start_paused = true)]
    async fn active_sessions_survive_eviction() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state("http://localhost:9", dir.path().to_str().unwrap()).await;

        state.sessions.insert(
            "active".to_string(),
            SessionEntry {
                session: Arc::new(Mutex::new(ChatSession::new(
                    SessionId("active".into()),
                    state.client.clone(),
                    state.router.clone(),
                    state.dispatcher.clone(),
                    state.assistant_id.clone(),
                ))),
                last_used: Instant::now(),
            },
        );

        tokio::time::advance(SESSION_IDLE_TTL / 2).await;
        state.evict_idle_sessions();
        assert_eq!(state.sessions.len(), 1, "recently used session must stay");
    }
}
