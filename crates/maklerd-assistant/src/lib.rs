// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hosted assistant-platform integration for Maklerd.
//!
//! Provides the HTTP client for threads, streaming runs, tool output
//! submission, knowledge-base provisioning, and embeddings, plus the typed
//! SSE event stream consumed by the agent.

pub mod client;
pub mod sse;
pub mod types;

pub use client::{AssistantClient, RunEventStream};
pub use sse::{parse_run_stream, RunEvent};
pub use types::{FunctionDefinition, Tool};
