// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for assistant-platform run streams.
//!
//! Converts a reqwest response byte stream into typed [`RunEvent`] variants
//! using the `eventsource-stream` crate for SSE protocol compliance. All
//! event-name dispatch lives here; consumers match on one enum instead of
//! comparing event-name strings.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use maklerd_core::{MaklerError, ToolCall};

use crate::types::{
    Annotation, DeltaContent, MessageContent, MessageDeltaEvent, MessageObject, RunObject,
    RunToolCall, StreamErrorEvent, ThreadObject,
};

/// Typed SSE events from the assistant-platform run streaming protocol.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// A thread was created as part of this run.
    ThreadCreated { thread_id: String },
    /// The run object was created.
    RunCreated { run_id: String },
    /// The run is queued on the platform.
    RunQueued,
    /// The run started executing.
    RunInProgress,
    /// A run step was created.
    StepCreated,
    /// A run step started executing.
    StepInProgress,
    /// An assistant message object was created.
    MessageCreated,
    /// Incremental assistant text, with any citation markers it carried.
    MessageDelta {
        text: String,
        citations: Vec<String>,
    },
    /// The full assistant message, with de-duplicated citation markers.
    MessageCompleted {
        text: String,
        citations: Vec<String>,
    },
    /// The run is paused waiting for local tool outputs.
    RunRequiresAction {
        run_id: String,
        tool_calls: Vec<ToolCall>,
    },
    /// The run finished successfully.
    RunCompleted,
    /// The run failed terminally.
    RunFailed { message: String },
    /// API error during streaming.
    Error { kind: String, message: String },
    /// Stream terminator (`data: [DONE]`).
    Done,
}

/// Collect citation marker texts from annotations, de-duplicated in
/// first-seen order. This is the only place citations are de-duplicated.
fn citation_markers(annotations: &[Annotation]) -> Vec<String> {
    let mut seen = Vec::new();
    for annotation in annotations {
        let marker = annotation.marker();
        if !seen.iter().any(|m| m == marker) {
            seen.push(marker.to_string());
        }
    }
    seen
}

/// Flatten a message delta into its text and citation markers.
fn flatten_delta(event: MessageDeltaEvent) -> RunEvent {
    let mut text = String::new();
    let mut annotations = Vec::new();
    for content in event.delta.content {
        let DeltaContent::Text { text: delta } = content;
        if let Some(value) = delta.value {
            text.push_str(&value);
        }
        if let Some(mut anns) = delta.annotations {
            annotations.append(&mut anns);
        }
    }
    RunEvent::MessageDelta {
        text,
        citations: citation_markers(&annotations),
    }
}

/// Flatten a completed message into its full text and citation markers.
fn flatten_message(message: MessageObject) -> RunEvent {
    let mut text = String::new();
    let mut annotations = Vec::new();
    for content in message.content {
        let MessageContent::Text { text: body } = content;
        text.push_str(&body.value);
        annotations.extend(body.annotations);
    }
    RunEvent::MessageCompleted {
        text,
        citations: citation_markers(&annotations),
    }
}

/// Convert a wire tool call into the core representation, decoding the
/// JSON-encoded argument string. An empty argument string means no arguments.
fn convert_tool_call(call: RunToolCall) -> Result<ToolCall, MaklerError> {
    let arguments = if call.function.arguments.trim().is_empty() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        serde_json::from_str(&call.function.arguments).map_err(|e| {
            MaklerError::provider_permanent(format!(
                "malformed arguments for tool call {}: {e}",
                call.function.name
            ))
        })?
    };
    Ok(ToolCall {
        id: call.id,
        name: call.function.name,
        arguments,
    })
}

fn requires_action(run: RunObject) -> Result<RunEvent, MaklerError> {
    let calls = run
        .required_action
        .ok_or_else(|| {
            MaklerError::provider_permanent(
                "run requires_action event without required_action payload",
            )
        })?
        .submit_tool_outputs
        .tool_calls;
    let tool_calls = calls
        .into_iter()
        .map(convert_tool_call)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RunEvent::RunRequiresAction {
        run_id: run.id,
        tool_calls,
    })
}

fn parse_payload<T: serde::de::DeserializeOwned>(
    event_name: &str,
    data: &str,
) -> Result<T, MaklerError> {
    serde_json::from_str(data).map_err(|e| MaklerError::Provider {
        message: format!("failed to parse {event_name}: {e}"),
        retryable: false,
        source: Some(Box::new(e)),
    })
}

/// Parses a reqwest streaming response into a stream of typed [`RunEvent`]s.
///
/// Unknown event types are silently skipped so that new platform events do
/// not break existing consumers.
pub fn parse_run_stream(
    response: reqwest::Response,
) -> Pin<Box<dyn Stream<Item = Result<RunEvent, MaklerError>> + Send>> {
    let byte_stream = response.bytes_stream();
    let event_stream = byte_stream.eventsource();

    let mapped = event_stream.filter_map(|result| async move {
        match result {
            Ok(event) => {
                let parsed = match event.event.as_str() {
                    "thread.created" => parse_payload::<ThreadObject>("thread.created", &event.data)
                        .map(|t| RunEvent::ThreadCreated { thread_id: t.id }),
                    "thread.run.created" => {
                        parse_payload::<RunObject>("thread.run.created", &event.data)
                            .map(|r| RunEvent::RunCreated { run_id: r.id })
                    }
                    "thread.run.queued" => Ok(RunEvent::RunQueued),
                    "thread.run.in_progress" => Ok(RunEvent::RunInProgress),
                    "thread.run.step.created" => Ok(RunEvent::StepCreated),
                    "thread.run.step.in_progress" => Ok(RunEvent::StepInProgress),
                    "thread.message.created" => Ok(RunEvent::MessageCreated),
                    "thread.message.delta" => {
                        parse_payload::<MessageDeltaEvent>("thread.message.delta", &event.data)
                            .map(flatten_delta)
                    }
                    "thread.message.completed" => {
                        parse_payload::<MessageObject>("thread.message.completed", &event.data)
                            .map(flatten_message)
                    }
                    "thread.run.requires_action" => {
                        parse_payload::<RunObject>("thread.run.requires_action", &event.data)
                            .and_then(requires_action)
                    }
                    "thread.run.completed" => Ok(RunEvent::RunCompleted),
                    "thread.run.failed" => {
                        parse_payload::<RunObject>("thread.run.failed", &event.data).map(|r| {
                            RunEvent::RunFailed {
                                message: r
                                    .last_error
                                    .map(|e| e.message)
                                    .unwrap_or_else(|| "run failed without error detail".into()),
                            }
                        })
                    }
                    "error" => parse_payload::<StreamErrorEvent>("error", &event.data).map(|e| {
                        RunEvent::Error {
                            kind: e.error.type_.unwrap_or_else(|| "unknown".into()),
                            message: e.error.message,
                        }
                    }),
                    "done" => Ok(RunEvent::Done),
                    // Forward-compatible: new event types are skipped.
                    _ => return None,
                };
                Some(parsed)
            }
            Err(e) => Some(Err(MaklerError::Provider {
                message: format!("SSE stream error: {e}"),
                retryable: true,
                source: None,
            })),
        }
    });

    Box::pin(mapped)
}
