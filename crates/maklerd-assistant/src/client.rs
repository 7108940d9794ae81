// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the hosted assistant platform.
//!
//! Provides [`AssistantClient`] which handles request construction,
//! authentication, streaming run responses, tool output submission,
//! knowledge-base provisioning, and transient error retry.

use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;
use maklerd_config::model::ProviderConfig;
use maklerd_core::{Embedder, MaklerError, ToolOutput};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::sse::{self, RunEvent};
use crate::types::{
    ApiErrorResponse, AssistantObject, CreateAssistantRequest, CreateMessageRequest,
    CreateRunRequest, EmbeddingRequest, EmbeddingResponse, FileObject, FileSearchResources,
    MessageObject, SubmitToolOutputsRequest, ThreadObject, Tool, ToolOutputEntry, ToolResources,
    UpdateAssistantRequest, VectorStoreObject,
};

/// A boxed stream of typed run events.
pub type RunEventStream = Pin<Box<dyn Stream<Item = Result<RunEvent, MaklerError>> + Send>>;

/// HTTP client for assistant-platform communication.
///
/// Manages authentication headers, connection pooling, and retry logic
/// for transient errors (429, 500, 503, 529).
#[derive(Debug, Clone)]
pub struct AssistantClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    embedding_model: String,
    temperature: f32,
    max_retries: u32,
    retry_delay: Duration,
}

impl AssistantClient {
    /// Creates a client from the provider configuration section.
    ///
    /// Fails with a configuration error when no API key is set.
    pub fn from_config(provider: &ProviderConfig) -> Result<Self, MaklerError> {
        let api_key = provider.api_key.as_deref().ok_or_else(|| {
            MaklerError::Config(
                "provider.api_key is not set (or export MAKLERD_PROVIDER_API_KEY)".into(),
            )
        })?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| MaklerError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert("authorization", auth);
        headers.insert("OpenAI-Beta", HeaderValue::from_static("assistants=v2"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| MaklerError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                retryable: false,
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: provider.base_url.trim_end_matches('/').to_string(),
            model: provider.model.clone(),
            embedding_model: provider.embedding_model.clone(),
            temperature: provider.temperature,
            max_retries: provider.max_retries,
            retry_delay: Duration::from_millis(provider.retry_delay_ms),
        })
    }

    /// Returns the configured chat model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a POST with bounded retry on transient statuses, returning the
    /// successful response. Each attempt rebuilds the request from `body`.
    async fn post_with_retry(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, MaklerError> {
        let url = format!("{}{path}", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, path, "retrying request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| MaklerError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    retryable: true,
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, path, "response received");

            if status.is_success() {
                return Ok(response);
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body_text = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body_text, "transient error, will retry");
                last_error = Some(MaklerError::provider_transient(format!(
                    "API returned {status}: {body_text}"
                )));
                continue;
            }

            // Non-transient error or exhausted retries.
            return Err(api_error(status, response.text().await.unwrap_or_default()));
        }

        Err(last_error
            .unwrap_or_else(|| MaklerError::provider_transient("request failed after retries")))
    }

    /// POST and decode the JSON response body.
    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, MaklerError> {
        let response = self.post_with_retry(path, body).await?;
        let text = response.text().await.map_err(|e| MaklerError::Provider {
            message: format!("failed to read response body: {e}"),
            retryable: true,
            source: Some(Box::new(e)),
        })?;
        serde_json::from_str(&text).map_err(|e| MaklerError::Provider {
            message: format!("failed to parse API response from {path}: {e}"),
            retryable: false,
            source: Some(Box::new(e)),
        })
    }

    /// Creates an assistant with the given instructions and tools.
    pub async fn create_assistant(
        &self,
        name: &str,
        instructions: &str,
        tools: Vec<Tool>,
    ) -> Result<AssistantObject, MaklerError> {
        let request = CreateAssistantRequest {
            name: name.to_string(),
            instructions: instructions.to_string(),
            model: self.model.clone(),
            temperature: self.temperature,
            tools,
        };
        self.post_json("/assistants", &to_value(&request)?).await
    }

    /// Points the assistant's file search at a vector store.
    pub async fn attach_vector_store(
        &self,
        assistant_id: &str,
        vector_store_id: &str,
    ) -> Result<AssistantObject, MaklerError> {
        let request = UpdateAssistantRequest {
            tool_resources: ToolResources {
                file_search: FileSearchResources {
                    vector_store_ids: vec![vector_store_id.to_string()],
                },
            },
        };
        self.post_json(&format!("/assistants/{assistant_id}"), &to_value(&request)?)
            .await
    }

    /// Creates an empty conversation thread.
    pub async fn create_thread(&self) -> Result<ThreadObject, MaklerError> {
        self.post_json("/threads", &serde_json::json!({})).await
    }

    /// Appends a user message to a thread.
    pub async fn add_message(
        &self,
        thread_id: &str,
        content: &str,
    ) -> Result<MessageObject, MaklerError> {
        let request = CreateMessageRequest {
            role: "user".to_string(),
            content: content.to_string(),
        };
        self.post_json(&format!("/threads/{thread_id}/messages"), &to_value(&request)?)
            .await
    }

    /// Starts a streaming run on a thread and returns the typed event stream.
    pub async fn stream_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<RunEventStream, MaklerError> {
        let request = CreateRunRequest {
            assistant_id: assistant_id.to_string(),
            stream: true,
        };
        let response = self
            .post_with_retry(&format!("/threads/{thread_id}/runs"), &to_value(&request)?)
            .await?;
        Ok(sse::parse_run_stream(response))
    }

    /// Submits tool outputs into a paused run and returns the continuation
    /// stream. The run resumes streaming where it left off.
    pub async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<RunEventStream, MaklerError> {
        let request = SubmitToolOutputsRequest {
            tool_outputs: outputs
                .iter()
                .map(|o| ToolOutputEntry {
                    tool_call_id: o.tool_call_id.clone(),
                    output: o.output.clone(),
                })
                .collect(),
            stream: true,
        };
        let response = self
            .post_with_retry(
                &format!("/threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
                &to_value(&request)?,
            )
            .await?;
        Ok(sse::parse_run_stream(response))
    }

    /// Creates a named vector store for knowledge-base files.
    pub async fn create_vector_store(&self, name: &str) -> Result<VectorStoreObject, MaklerError> {
        self.post_json("/vector_stores", &serde_json::json!({ "name": name }))
            .await
    }

    /// Uploads a local file for assistant use.
    ///
    /// Multipart uploads are not retried; a transient failure surfaces to the
    /// caller, which decides whether provisioning is fatal.
    pub async fn upload_file(&self, file_path: &Path) -> Result<FileObject, MaklerError> {
        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                MaklerError::InvalidInput(format!("invalid file path: {}", file_path.display()))
            })?
            .to_string();
        let bytes = tokio::fs::read(file_path).await.map_err(|e| MaklerError::Data {
            message: format!("failed to read {}: {e}", file_path.display()),
            source: Some(Box::new(e)),
        })?;

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .text("purpose", "assistants")
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/files", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| MaklerError::Provider {
                message: format!("file upload failed: {e}"),
                retryable: true,
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response.text().await.unwrap_or_default()));
        }
        response.json().await.map_err(|e| MaklerError::Provider {
            message: format!("failed to parse file upload response: {e}"),
            retryable: false,
            source: Some(Box::new(e)),
        })
    }

    /// Attaches an uploaded file to a vector store.
    pub async fn add_file_to_vector_store(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> Result<(), MaklerError> {
        let _: serde_json::Value = self
            .post_json(
                &format!("/vector_stores/{vector_store_id}/files"),
                &serde_json::json!({ "file_id": file_id }),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Embedder for AssistantClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MaklerError> {
        let request = EmbeddingRequest {
            model: self.embedding_model.clone(),
            input: texts.to_vec(),
        };
        let response: EmbeddingResponse =
            self.post_json("/embeddings", &to_value(&request)?).await?;

        // The API may reorder entries; restore input order by index.
        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        if data.len() != texts.len() {
            return Err(MaklerError::provider_permanent(format!(
                "embedding count mismatch: sent {}, received {}",
                texts.len(),
                data.len()
            )));
        }
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, MaklerError> {
    serde_json::to_value(value)
        .map_err(|e| MaklerError::Internal(format!("failed to serialize request: {e}")))
}

fn api_error(status: reqwest::StatusCode, body: String) -> MaklerError {
    let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
        format!(
            "assistant API error ({}): {}",
            api_err.error.type_.as_deref().unwrap_or("unknown"),
            api_err.error.message
        )
    } else {
        format!("API returned {status}: {body}")
    };
    MaklerError::Provider {
        message,
        retryable: is_transient_error(status),
        source: None,
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503 | 529)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> AssistantClient {
        let provider = ProviderConfig {
            api_key: Some("sk-test-key".into()),
            base_url: base_url.to_string(),
            ..ProviderConfig::default()
        };
        AssistantClient::from_config(&provider).unwrap()
    }

    #[test]
    fn missing_api_key_is_config_error() {
        let provider = ProviderConfig::default();
        let err = AssistantClient::from_config(&provider).unwrap_err();
        assert!(matches!(err, MaklerError::Config(_)));
    }

    #[tokio::test]
    async fn create_thread_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "thread_1"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let thread = client.create_thread().await.unwrap();
        assert_eq!(thread.id, "thread_1");
    }

    #[tokio::test]
    async fn client_sends_correct_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads"))
            .and(header("authorization", "Bearer sk-test-key"))
            .and(header("OpenAI-Beta", "assistants=v2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "thread_h"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.create_thread().await;
        assert!(result.is_ok(), "headers should match: {result:?}");
    }

    #[tokio::test]
    async fn retries_on_429_then_succeeds() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"type": "rate_limit_error", "message": "Rate limited"}
        });

        Mock::given(method("POST"))
            .and(path("/threads"))
            .respond_with(ResponseTemplate::new(429).set_body_json(&error_body))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/threads"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "thread_r"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let thread = client.create_thread().await.unwrap();
        assert_eq!(thread.id, "thread_r");
    }

    #[tokio::test]
    async fn fails_immediately_on_400() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"type": "invalid_request_error", "message": "Bad model"}
        });

        Mock::given(method("POST"))
            .and(path("/assistants"))
            .respond_with(ResponseTemplate::new(400).set_body_json(&error_body))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .create_assistant("Maklerd", "You advise brokers.", vec![Tool::FileSearch])
            .await
            .unwrap_err();
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("invalid_request_error"));
    }

    #[tokio::test]
    async fn exhausts_retries_on_503() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"type": "overloaded_error", "message": "Service overloaded"}
        });

        // max_retries defaults to 2, so three attempts in total.
        Mock::given(method("POST"))
            .and(path("/threads"))
            .respond_with(ResponseTemplate::new(503).set_body_json(&error_body))
            .expect(3)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.create_thread().await.unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("overloaded_error"));
    }

    #[tokio::test]
    async fn add_message_posts_user_role() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/messages"))
            .and(body_partial_json(serde_json::json!({
                "role": "user",
                "content": "Wie ist meine Zielerreichung?"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1", "role": "user", "content": []
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let msg = client
            .add_message("thread_1", "Wie ist meine Zielerreichung?")
            .await
            .unwrap();
        assert_eq!(msg.id, "msg_1");
    }

    #[tokio::test]
    async fn stream_run_yields_typed_events() {
        let server = MockServer::start().await;
        let sse = concat!(
            "event: thread.run.created\ndata: {\"id\":\"run_1\",\"status\":\"queued\"}\n\n",
            "event: thread.message.delta\ndata: {\"delta\":{\"content\":[{\"type\":\"text\",\"text\":{\"value\":\"Moin\"}}]}}\n\n",
            "event: thread.run.completed\ndata: {\"id\":\"run_1\",\"status\":\"completed\"}\n\n",
            "event: done\ndata: [DONE]\n\n",
        );

        Mock::given(method("POST"))
            .and(path("/threads/thread_1/runs"))
            .and(body_partial_json(serde_json::json!({
                "assistant_id": "asst_1", "stream": true
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let mut stream = client.stream_run("thread_1", "asst_1").await.unwrap();

        assert!(matches!(
            stream.next().await.unwrap().unwrap(),
            RunEvent::RunCreated { .. }
        ));
        match stream.next().await.unwrap().unwrap() {
            RunEvent::MessageDelta { text, .. } => assert_eq!(text, "Moin"),
            other => panic!("expected MessageDelta, got {other:?}"),
        }
        assert!(matches!(
            stream.next().await.unwrap().unwrap(),
            RunEvent::RunCompleted
        ));
        assert!(matches!(
            stream.next().await.unwrap().unwrap(),
            RunEvent::Done
        ));
    }

    #[tokio::test]
    async fn submit_tool_outputs_returns_continuation_stream() {
        let server = MockServer::start().await;
        let sse = concat!(
            "event: thread.message.delta\ndata: {\"delta\":{\"content\":[{\"type\":\"text\",\"text\":{\"value\":\"Danke\"}}]}}\n\n",
            "event: thread.run.completed\ndata: {\"id\":\"run_1\",\"status\":\"completed\"}\n\n",
        );

        Mock::given(method("POST"))
            .and(path("/threads/thread_1/runs/run_1/submit_tool_outputs"))
            .and(body_partial_json(serde_json::json!({
                "stream": true,
                "tool_outputs": [{"tool_call_id": "call_1", "output": "Performance = 82%"}]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let outputs = vec![ToolOutput {
            tool_call_id: "call_1".into(),
            output: "Performance = 82%".into(),
        }];
        let mut stream = client
            .submit_tool_outputs("thread_1", "run_1", &outputs)
            .await
            .unwrap();

        match stream.next().await.unwrap().unwrap() {
            RunEvent::MessageDelta { text, .. } => assert_eq!(text, "Danke"),
            other => panic!("expected MessageDelta, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn embed_restores_input_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"index": 1, "embedding": [0.3, 0.4]},
                    {"index": 0, "embedding": [0.1, 0.2]}
                ]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let vectors = client
            .embed(&["erste".to_string(), "zweite".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors[0], vec![0.1, 0.2]);
        assert_eq!(vectors[1], vec![0.3, 0.4]);
    }

    #[tokio::test]
    async fn embed_rejects_count_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"index": 0, "embedding": [0.1]}]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .embed(&["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("mismatch"));
    }

    #[tokio::test]
    async fn upload_file_sends_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/files"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "file_1"})),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("zieldefinition.txt");
        std::fs::write(&file_path, "Zielerreichung = Ist / Soll").unwrap();

        let client = test_client(&server.uri());
        let file = client.upload_file(&file_path).await.unwrap();
        assert_eq!(file.id, "file_1");
    }

    #[tokio::test]
    async fn vector_store_provisioning_flow() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/vector_stores"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "vs_1"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/vector_stores/vs_1/files"))
            .and(body_partial_json(serde_json::json!({"file_id": "file_1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "vsf_1", "status": "completed"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/assistants/asst_1"))
            .and(body_partial_json(serde_json::json!({
                "tool_resources": {"file_search": {"vector_store_ids": ["vs_1"]}}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "asst_1"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let store = client.create_vector_store("maklerd-knowledge").await.unwrap();
        client
            .add_file_to_vector_store(&store.id, "file_1")
            .await
            .unwrap();
        let assistant = client.attach_vector_store("asst_1", &store.id).await.unwrap();
        assert_eq!(assistant.id, "asst_1");
    }
}
