// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Maklerd performance assistant.
//!
//! Provides the error taxonomy, common types, and the trait seams used
//! throughout the workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MaklerError;
pub use traits::Embedder;
pub use types::{SessionId, StreamUpdate, ToolCall, ToolOutput};
