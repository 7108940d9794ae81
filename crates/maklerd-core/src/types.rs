// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared between the gateway, the session actor, and the tools.

use serde::{Deserialize, Serialize};

/// Unique identifier for a conversation session.
///
/// Server-generated; never derived from the caller's network address, which
/// is not unique per browser tab or per user behind a NAT.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// One update pushed from a session task to the client-facing stream.
///
/// The sender half of the relay channel is dropped after `Completed` or
/// `Error`, which the consumer observes as end of stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamUpdate {
    /// Incremental text produced while the run is streaming.
    Delta { text: String },
    /// The interaction finished; carries the full accumulated text and
    /// follow-up suggestions.
    Completed {
        text: String,
        suggestions: Vec<String>,
    },
    /// The interaction failed; human-readable description only.
    Error { message: String },
}

impl StreamUpdate {
    /// Returns true for the terminal variants.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamUpdate::Completed { .. } | StreamUpdate::Error { .. }
        )
    }
}

/// A tool invocation requested by the hosted assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id; echoed back in the output.
    pub id: String,
    /// Name of the local function to run.
    pub name: String,
    /// JSON-encoded arguments as supplied by the model.
    pub arguments: serde_json::Value,
}

/// The result of servicing one [`ToolCall`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_update_terminal_classification() {
        assert!(!StreamUpdate::Delta { text: "x".into() }.is_terminal());
        assert!(
            StreamUpdate::Completed {
                text: "x".into(),
                suggestions: vec![]
            }
            .is_terminal()
        );
        assert!(
            StreamUpdate::Error {
                message: "x".into()
            }
            .is_terminal()
        );
    }

    #[test]
    fn stream_update_serializes_tagged() {
        let update = StreamUpdate::Delta {
            text: "Hallo".into(),
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["kind"], "delta");
        assert_eq!(json["text"], "Hallo");
    }

    #[test]
    fn tool_call_round_trips() {
        let call = ToolCall {
            id: "call_1".into(),
            name: "team_analyze".into(),
            arguments: serde_json::json!({"TeamID": "TE12345"}),
        };
        let json = serde_json::to_string(&call).unwrap();
        let back: ToolCall = serde_json::from_str(&json).unwrap();
        assert_eq!(back, call);
    }
}
