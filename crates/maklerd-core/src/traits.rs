// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between crates.

use async_trait::async_trait;

use crate::error::MaklerError;

/// Produces embedding vectors for short texts.
///
/// Implemented by the assistant-platform client; the intent router depends
/// only on this trait so it can be tested with a deterministic stub.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed each input text, returning one vector per input in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MaklerError>;
}
