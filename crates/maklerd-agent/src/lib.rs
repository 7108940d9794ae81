// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation session logic: intent routing, guided prompt sequences,
//! run streaming, tool-call servicing, and follow-up suggestions.

pub mod prompts;
pub mod session;
pub mod suggestions;

pub use prompts::reference_intents;
pub use session::ChatSession;
pub use suggestions::follow_up_questions;
