// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding-based intent routing.
//!
//! Routes broker utterances to pre-defined guided conversation flows when
//! their embedding is close enough to a reference utterance.

pub mod router;
pub mod similarity;

pub use router::{IntentMatch, IntentRouter, ReferenceIntent};
pub use similarity::cosine_similarity;
