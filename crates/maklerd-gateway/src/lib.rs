// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Maklerd.
//!
//! Exposes chat submission, SSE stream relay, status polling, document
//! upload, and health endpoints over axum.

pub mod handlers;
pub mod markdown;
pub mod relay;
pub mod server;

pub use relay::{StreamRegistry, StreamState};
pub use server::{build_router, start_server, GatewayState, SessionEntry};
