// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage-internal row types.
//!
//! The canonical domain types live in `tidings-core::types`; this module
//! holds rows that never cross the storage boundary in domain shape.

/// A crash-safe message queue entry.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    /// Auto-increment queue entry ID.
    pub id: i64,
    /// Queue name for routing.
    pub queue_name: String,
    /// JSON payload.
    pub payload: String,
    /// Status: "pending", "processing", "completed", "failed".
    pub status: String,
    /// Number of processing attempts so far.
    pub attempts: i32,
    /// Maximum allowed attempts before the entry becomes a dead letter.
    pub max_attempts: i32,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
    /// ISO 8601 last-update timestamp.
    pub updated_at: String,
    /// ISO 8601 timestamp until which this entry is locked for processing.
    pub locked_until: Option<String>,
    /// ISO 8601 timestamp before which a nacked entry is not redelivered.
    pub deliver_after: Option<String>,
}
