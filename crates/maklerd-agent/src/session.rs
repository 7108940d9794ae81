// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation session actor.
//!
//! Each chat session owns its assistant thread handle; nothing is shared
//! across sessions. An interaction either matches a reference intent, which
//! executes that intent's guided prompt sequence through a scratch thread,
//! or streams a run over the session thread. The sender side of the update
//! channel is dropped exactly once when the interaction finishes, which the
//! gateway observes as end of stream.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use maklerd_assistant::{AssistantClient, RunEvent, RunEventStream};
use maklerd_core::{MaklerError, SessionId, StreamUpdate};
use maklerd_intent::IntentRouter;
use maklerd_tools::ToolDispatcher;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;
use tracing::{debug, info, warn};

use crate::prompts;
use crate::suggestions::follow_up_questions;

/// Upper bound on forwarding one update to the stream consumer. A consumer
/// that never claims the stream or stops draining it is abandoned after this
/// long, so a full channel cannot block the session task forever.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// State and message processing for one conversation session.
pub struct ChatSession {
    session_id: SessionId,
    client: Arc<AssistantClient>,
    router: Arc<IntentRouter>,
    dispatcher: Arc<ToolDispatcher>,
    assistant_id: String,
    thread_id: Option<String>,
    send_timeout: Duration,
}

impl ChatSession {
    pub fn new(
        session_id: SessionId,
        client: Arc<AssistantClient>,
        router: Arc<IntentRouter>,
        dispatcher: Arc<ToolDispatcher>,
        assistant_id: String,
    ) -> Self {
        Self {
            session_id,
            client,
            router,
            dispatcher,
            assistant_id,
            thread_id: None,
            send_timeout: SEND_TIMEOUT,
        }
    }

    /// Overrides the update-forwarding timeout.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Handles one utterance, streaming updates into `tx`.
    ///
    /// Consumes the sender: dropping it on return closes the stream for the
    /// gateway regardless of outcome.
    pub async fn handle_message(&mut self, utterance: &str, tx: mpsc::Sender<StreamUpdate>) {
        match self.process(utterance, &tx).await {
            Ok(final_text) => {
                let suggestions = follow_up_questions(&final_text);
                let completed = StreamUpdate::Completed {
                    text: final_text,
                    suggestions,
                };
                if self.forward(&tx, completed).await.is_err() {
                    debug!(session = %self.session_id.0, "receiver gone before completion");
                }
            }
            Err(e) => {
                warn!(session = %self.session_id.0, error = %e, "interaction failed");
                let error = StreamUpdate::Error {
                    message: e.to_string(),
                };
                if self.forward(&tx, error).await.is_err() {
                    debug!(session = %self.session_id.0, "could not deliver error update");
                }
            }
        }
    }

    /// Forwards one update with a bounded wait, so a consumer that never
    /// claims the stream or stops draining it cannot block this task.
    async fn forward(
        &self,
        tx: &mpsc::Sender<StreamUpdate>,
        update: StreamUpdate,
    ) -> Result<(), MaklerError> {
        tx.send_timeout(update, self.send_timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Closed(_) => MaklerError::Channel {
                    message: "stream receiver dropped, abandoning run".into(),
                    source: None,
                },
                SendTimeoutError::Timeout(_) => MaklerError::Channel {
                    message: format!(
                        "stream consumer did not drain an update within {:?}, abandoning run",
                        self.send_timeout
                    ),
                    source: None,
                },
            })
    }

    async fn process(
        &mut self,
        utterance: &str,
        tx: &mpsc::Sender<StreamUpdate>,
    ) -> Result<String, MaklerError> {
        if let Some(matched) = self.router.route(utterance).await? {
            info!(
                session = %self.session_id.0,
                intent = matched.intent.name,
                score = matched.score,
                "running guided prompt sequence"
            );
            return self.run_sequence(matched.intent.name, tx).await;
        }

        let thread_id = self.ensure_thread().await?;
        self.client.add_message(&thread_id, utterance).await?;
        let stream = self.client.stream_run(&thread_id, &self.assistant_id).await?;
        self.drive_run(&thread_id, stream, tx).await
    }

    /// Executes a guided prompt sequence through a scratch thread, so the
    /// intermediate steps never pollute the session thread.
    async fn run_sequence(
        &self,
        intent_name: &str,
        tx: &mpsc::Sender<StreamUpdate>,
    ) -> Result<String, MaklerError> {
        let steps = prompts::sequence_for(intent_name);
        let thread = self.client.create_thread().await?;
        let mut final_text = String::new();

        for (idx, step) in steps.iter().enumerate() {
            debug!(intent = intent_name, step = idx, "sequence step");
            self.client.add_message(&thread.id, step).await?;
            let stream = self.client.stream_run(&thread.id, &self.assistant_id).await?;
            // Only the last step streams to the client; earlier steps feed
            // the thread context.
            let step_tx = if idx + 1 == steps.len() {
                Some(tx)
            } else {
                None
            };
            final_text = self.consume_run(&thread.id, stream, step_tx).await?;
        }
        Ok(final_text)
    }

    async fn ensure_thread(&mut self) -> Result<String, MaklerError> {
        if let Some(id) = &self.thread_id {
            return Ok(id.clone());
        }
        let thread = self.client.create_thread().await?;
        info!(session = %self.session_id.0, thread = %thread.id, "session thread created");
        self.thread_id = Some(thread.id.clone());
        Ok(thread.id)
    }

    async fn drive_run(
        &self,
        thread_id: &str,
        stream: RunEventStream,
        tx: &mpsc::Sender<StreamUpdate>,
    ) -> Result<String, MaklerError> {
        self.consume_run(thread_id, stream, Some(tx)).await
    }

    /// Consumes run events until completion, servicing tool calls inline.
    /// The continuation stream after a tool-output submission replaces the
    /// current stream within the same loop.
    async fn consume_run(
        &self,
        thread_id: &str,
        mut stream: RunEventStream,
        tx: Option<&mpsc::Sender<StreamUpdate>>,
    ) -> Result<String, MaklerError> {
        let mut accumulated = String::new();
        let mut final_text: Option<String> = None;

        while let Some(event) = stream.next().await {
            match event? {
                RunEvent::MessageDelta { text, citations } => {
                    let text = strip_citation_markers(&text, &citations);
                    if text.is_empty() {
                        continue;
                    }
                    accumulated.push_str(&text);
                    if let Some(tx) = tx {
                        self.forward(tx, StreamUpdate::Delta { text }).await?;
                    }
                }
                RunEvent::MessageCompleted { text, citations } => {
                    final_text = Some(strip_citation_markers(&text, &citations));
                }
                RunEvent::RunRequiresAction { run_id, tool_calls } => {
                    info!(run = %run_id, calls = tool_calls.len(), "run requires tool outputs");
                    let outputs = self.dispatcher.dispatch_all(&tool_calls);
                    stream = self
                        .client
                        .submit_tool_outputs(thread_id, &run_id, &outputs)
                        .await?;
                }
                RunEvent::RunCompleted | RunEvent::Done => break,
                RunEvent::RunFailed { message } => {
                    return Err(MaklerError::provider_permanent(format!(
                        "run failed: {message}"
                    )));
                }
                RunEvent::Error { kind, message } => {
                    return Err(MaklerError::Provider {
                        message: format!("{kind}: {message}"),
                        retryable: matches!(
                            kind.as_str(),
                            "overloaded_error" | "rate_limit_error"
                        ),
                        source: None,
                    });
                }
                // Lifecycle events carry no payload the session needs.
                _ => {}
            }
        }

        Ok(final_text.unwrap_or(accumulated))
    }
}

/// Removes citation markers from the rendered message text. The markers are
/// vendor-internal references into knowledge-base files and mean nothing to
/// the chat client.
fn strip_citation_markers(text: &str, citations: &[String]) -> String {
    let mut cleaned = text.to_string();
    for marker in citations {
        cleaned = cleaned.replace(marker.as_str(), "");
    }
    cleaned
}
