// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding-based intent router.
//!
//! Compares each incoming utterance against a fixed set of reference
//! intents. Reference embeddings are computed once at startup; routing a
//! message costs a single embedding call.

use std::sync::Arc;

use maklerd_core::{Embedder, MaklerError};
use tracing::debug;

use crate::similarity::cosine_similarity;

/// A reference utterance representing one routable intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceIntent {
    /// Stable intent identifier, e.g. `"quantitative-target-status"`.
    pub name: &'static str,
    /// The reference utterance embedded for comparison.
    pub text: &'static str,
}

/// The intent selected for an utterance, with its similarity score.
#[derive(Debug, Clone)]
pub struct IntentMatch {
    pub intent: ReferenceIntent,
    pub score: f32,
}

/// Routes utterances to reference intents by embedding similarity.
pub struct IntentRouter {
    embedder: Arc<dyn Embedder>,
    intents: Vec<ReferenceIntent>,
    threshold: f32,
    reference_embeddings: Vec<Vec<f32>>,
}

impl IntentRouter {
    /// Creates a router; call [`prepare`](Self::prepare) before routing.
    pub fn new(embedder: Arc<dyn Embedder>, intents: Vec<ReferenceIntent>, threshold: f32) -> Self {
        Self {
            embedder,
            intents,
            threshold,
            reference_embeddings: Vec::new(),
        }
    }

    /// Embeds the reference intents. Called once at startup so that routing
    /// never re-embeds the references.
    pub async fn prepare(&mut self) -> Result<(), MaklerError> {
        let texts: Vec<String> = self.intents.iter().map(|i| i.text.to_string()).collect();
        self.reference_embeddings = self.embedder.embed(&texts).await?;
        if self.reference_embeddings.len() != self.intents.len() {
            return Err(MaklerError::Internal(format!(
                "expected {} reference embeddings, got {}",
                self.intents.len(),
                self.reference_embeddings.len()
            )));
        }
        Ok(())
    }

    /// Routes an utterance.
    ///
    /// Returns `Ok(None)` when no reference intent strictly exceeds the
    /// similarity threshold, or when the utterance is empty (which skips the
    /// embedding call entirely). Ties resolve to the first-listed intent.
    pub async fn route(&self, utterance: &str) -> Result<Option<IntentMatch>, MaklerError> {
        if utterance.trim().is_empty() {
            return Ok(None);
        }
        if self.reference_embeddings.is_empty() {
            return Err(MaklerError::Internal(
                "intent router used before prepare()".into(),
            ));
        }

        let embedded = self.embedder.embed(&[utterance.to_string()]).await?;
        let query = embedded.first().ok_or_else(|| {
            MaklerError::provider_permanent("embedding response contained no vector")
        })?;

        let mut best: Option<(usize, f32)> = None;
        for (idx, reference) in self.reference_embeddings.iter().enumerate() {
            let score = cosine_similarity(query, reference);
            // Strictly greater keeps the first-listed intent on ties.
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((idx, score));
            }
        }

        match best {
            Some((idx, score)) if score > self.threshold => {
                let intent = self.intents[idx].clone();
                debug!(intent = intent.name, score, "utterance matched reference intent");
                Ok(Some(IntentMatch { intent, score }))
            }
            Some((idx, score)) => {
                debug!(
                    nearest = self.intents[idx].name,
                    score,
                    threshold = self.threshold,
                    "utterance below intent threshold"
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
