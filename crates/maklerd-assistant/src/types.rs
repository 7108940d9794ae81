// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assistant-platform request/response types and streaming event payloads.

use serde::{Deserialize, Serialize};

// --- Tool types ---

/// A tool made available to the hosted assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    /// Hosted document search over the assistant's vector store.
    FileSearch,
    /// A locally-serviced function call.
    Function { function: FunctionDefinition },
}

/// Definition of a locally-serviced function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name (unique identifier).
    pub name: String,
    /// Human-readable description of what the function does.
    pub description: String,
    /// JSON Schema describing the function's parameters, when it takes any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

// --- Request types ---

/// Request body for creating an assistant.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAssistantRequest {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub temperature: f32,
    pub tools: Vec<Tool>,
}

/// Request body for pointing an assistant's file search at a vector store.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateAssistantRequest {
    pub tool_resources: ToolResources,
}

/// Tool resources for the file-search tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResources {
    pub file_search: FileSearchResources,
}

/// Vector stores backing file search.
#[derive(Debug, Clone, Serialize)]
pub struct FileSearchResources {
    pub vector_store_ids: Vec<String>,
}

/// Request body for appending a message to a thread.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageRequest {
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
}

/// Request body for starting a run against a thread.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRunRequest {
    pub assistant_id: String,
    pub stream: bool,
}

/// Request body for returning tool outputs into a paused run.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitToolOutputsRequest {
    pub tool_outputs: Vec<ToolOutputEntry>,
    pub stream: bool,
}

/// One tool output entry on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutputEntry {
    pub tool_call_id: String,
    pub output: String,
}

/// Request body for the embeddings endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub input: Vec<String>,
}

// --- Response objects ---

/// A created assistant.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantObject {
    pub id: String,
}

/// A created conversation thread.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadObject {
    pub id: String,
}

/// A created vector store.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorStoreObject {
    pub id: String,
}

/// An uploaded file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    pub id: String,
}

/// A message in a thread.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageObject {
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

/// Typed content block within a message.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
}

/// Text content with citation annotations.
#[derive(Debug, Clone, Deserialize)]
pub struct TextContent {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// A citation annotation attached to message text.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    /// Marker pointing into a knowledge-base file.
    FileCitation {
        text: String,
        file_citation: FileCitation,
    },
    /// Marker pointing at a generated file path.
    FilePath { text: String },
}

impl Annotation {
    /// The literal marker text this annotation replaces in the message.
    pub fn marker(&self) -> &str {
        match self {
            Annotation::FileCitation { text, .. } => text,
            Annotation::FilePath { text } => text,
        }
    }
}

/// The file a citation points at.
#[derive(Debug, Clone, Deserialize)]
pub struct FileCitation {
    pub file_id: String,
}

/// The run object carried by run lifecycle events.
#[derive(Debug, Clone, Deserialize)]
pub struct RunObject {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub required_action: Option<RequiredAction>,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

/// Action the platform requires before a run can continue.
#[derive(Debug, Clone, Deserialize)]
pub struct RequiredAction {
    pub submit_tool_outputs: SubmitToolOutputsAction,
}

/// The tool calls a paused run is waiting on.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitToolOutputsAction {
    pub tool_calls: Vec<RunToolCall>,
}

/// One tool call within a paused run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunToolCall {
    pub id: String,
    pub function: RunToolFunction,
}

/// Function name and JSON-encoded argument string of a tool call.
#[derive(Debug, Clone, Deserialize)]
pub struct RunToolFunction {
    pub name: String,
    /// Arguments arrive as a JSON-encoded string, not a JSON object.
    pub arguments: String,
}

/// The terminal error of a failed run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunError {
    pub code: Option<String>,
    pub message: String,
}

// --- Streaming delta payloads ---

/// Payload of a `thread.message.delta` event.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDeltaEvent {
    pub delta: MessageDeltaBody,
}

/// Delta body containing updated content blocks.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDeltaBody {
    #[serde(default)]
    pub content: Vec<DeltaContent>,
}

/// One content block delta.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeltaContent {
    Text { text: TextDelta },
}

/// Incremental text and any annotations that arrived with it.
#[derive(Debug, Clone, Deserialize)]
pub struct TextDelta {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub annotations: Option<Vec<Annotation>>,
}

// --- Embeddings ---

/// Response from the embeddings endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
}

/// One embedding vector with its input index.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingData {
    pub index: usize,
    pub embedding: Vec<f32>,
}

// --- Errors ---

/// API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail within an API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    pub message: String,
}

/// Payload of a streaming `error` event.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamErrorEvent {
    pub error: ApiErrorDetail,
}
