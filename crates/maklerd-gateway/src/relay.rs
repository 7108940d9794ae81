// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stream relay between session tasks and SSE consumers.
//!
//! Each chat request gets a bounded single-producer/single-consumer channel
//! registered under a server-generated stream id. The receiver is removed on
//! claim, so every stream has at most one consumer. A producer whose consumer
//! is gone sees a send error and abandons the run instead of leaking.
//! Completed statuses stay available for the poll fallback for a bounded
//! retention window, then get evicted together with any unclaimed receiver.

use std::time::Duration;

use dashmap::DashMap;
use maklerd_core::StreamUpdate;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Bounded capacity per stream; backpressure kicks in when the consumer lags.
const CHANNEL_CAPACITY: usize = 64;

/// How long a completed status (and a never-claimed receiver) is retained.
const COMPLETED_TTL: Duration = Duration::from_secs(900);

/// Lifecycle state of a registered stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Running,
    Completed,
}

struct StatusEntry {
    state: StreamState,
    completed_at: Option<Instant>,
}

/// Registry of in-flight response streams keyed by stream id.
#[derive(Default)]
pub struct StreamRegistry {
    receivers: DashMap<String, mpsc::Receiver<StreamUpdate>>,
    states: DashMap<String, StatusEntry>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new stream, returning the producer side. Entries past
    /// their retention window are evicted on the way in, keeping the maps
    /// bounded by the rate of recent requests.
    pub fn create(&self, stream_id: &str) -> mpsc::Sender<StreamUpdate> {
        self.evict_expired();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        self.receivers.insert(stream_id.to_string(), rx);
        self.states.insert(
            stream_id.to_string(),
            StatusEntry {
                state: StreamState::Running,
                completed_at: None,
            },
        );
        tx
    }

    /// Claims the receiver for a stream. The entry is removed, so a second
    /// claim of the same id returns `None`.
    pub fn claim(&self, stream_id: &str) -> Option<mpsc::Receiver<StreamUpdate>> {
        self.receivers.remove(stream_id).map(|(_, rx)| rx)
    }

    /// Current state of a stream, `None` for unknown ids.
    pub fn status(&self, stream_id: &str) -> Option<StreamState> {
        self.states.get(stream_id).map(|entry| entry.state)
    }

    /// Marks a stream's interaction as finished. The status entry stays
    /// available for the poll fallback endpoint until its retention expires.
    pub fn mark_completed(&self, stream_id: &str) {
        self.states.insert(
            stream_id.to_string(),
            StatusEntry {
                state: StreamState::Completed,
                completed_at: Some(Instant::now()),
            },
        );
    }

    fn evict_expired(&self) {
        self.states.retain(|stream_id, entry| {
            let keep = entry
                .completed_at
                .is_none_or(|at| at.elapsed() < COMPLETED_TTL);
            if !keep {
                self.receivers.remove(stream_id);
            }
            keep
        });
    }
}
