// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue operations for crash-safe, at-least-once message delivery.
//!
//! The queue table is the message bus between the source schedulers and
//! the enrichment dispatcher. Entries that exhaust their attempt budget
//! stay in status `failed`, forming the dead-letter sink.

use rusqlite::params;
use tidings_core::TidingsError;

use crate::database::{map_tr_err, Database};
use crate::models::QueueEntry;

fn entry_from_row(row: &rusqlite::Row<'_>) -> Result<QueueEntry, rusqlite::Error> {
    Ok(QueueEntry {
        id: row.get(0)?,
        queue_name: row.get(1)?,
        payload: row.get(2)?,
        status: row.get(3)?,
        attempts: row.get(4)?,
        max_attempts: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        locked_until: row.get(8)?,
        deliver_after: row.get(9)?,
    })
}

const ENTRY_COLUMNS: &str = "id, queue_name, payload, status, attempts, max_attempts,
     created_at, updated_at, locked_until, deliver_after";

/// Enqueue a new message. Returns the auto-generated queue entry ID.
pub async fn enqueue(
    db: &Database,
    queue_name: &str,
    payload: &str,
) -> Result<i64, TidingsError> {
    let queue_name = queue_name.to_string();
    let payload = payload.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO queue (queue_name, payload) VALUES (?1, ?2)",
                params![queue_name, payload],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Dequeue up to `limit` deliverable entries from the named queue.
///
/// Atomically selects the oldest pending entries whose `deliver_after`
/// has passed and marks them "processing" with a 5-minute lock timeout.
/// Returns an empty vec when nothing is deliverable.
pub async fn dequeue_batch(
    db: &Database,
    queue_name: &str,
    limit: usize,
) -> Result<Vec<QueueEntry>, TidingsError> {
    let queue_name = queue_name.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let entries = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {ENTRY_COLUMNS}
                     FROM queue
                     WHERE queue_name = ?1 AND status = 'pending'
                       AND (deliver_after IS NULL
                            OR deliver_after <= strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                     ORDER BY id ASC
                     LIMIT ?2"
                ))?;
                let rows = stmt.query_map(params![queue_name, limit as i64], entry_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            };

            for entry in &entries {
                tx.execute(
                    "UPDATE queue SET status = 'processing',
                     locked_until = strftime('%Y-%m-%dT%H:%M:%fZ', 'now', '+5 minutes'),
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?1",
                    params![entry.id],
                )?;
            }
            tx.commit()?;

            Ok(entries
                .into_iter()
                .map(|entry| QueueEntry {
                    status: "processing".to_string(),
                    ..entry
                })
                .collect())
        })
        .await
        .map_err(map_tr_err)
}

/// Acknowledge successful processing: marks the entry "completed".
pub async fn ack(db: &Database, id: i64) -> Result<(), TidingsError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE queue SET status = 'completed',
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Negative-acknowledge an entry, delaying redelivery by `delay_secs`.
///
/// Increments attempts. If attempts reach max_attempts, the entry becomes
/// a dead letter (status "failed"). Otherwise it returns to "pending" with
/// `deliver_after` pushed out so the dispatcher retries after the delay.
pub async fn nack(db: &Database, id: i64, delay_secs: u64) -> Result<(), TidingsError> {
    db.connection()
        .call(move |conn| {
            let (attempts, max_attempts): (i32, i32) = conn.query_row(
                "SELECT attempts, max_attempts FROM queue WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            let new_attempts = attempts + 1;
            if new_attempts >= max_attempts {
                conn.execute(
                    "UPDATE queue SET status = 'failed', attempts = ?1,
                     locked_until = NULL,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?2",
                    params![new_attempts, id],
                )?;
            } else {
                conn.execute(
                    &format!(
                        "UPDATE queue SET status = 'pending', attempts = ?1,
                         locked_until = NULL,
                         deliver_after = strftime('%Y-%m-%dT%H:%M:%fZ', 'now', '+{delay_secs} seconds'),
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?2"
                    ),
                    params![new_attempts, id],
                )?;
            }
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Return expired "processing" entries to "pending".
///
/// Covers the crash window between dequeue and ack: a dispatcher that died
/// mid-batch leaves locked entries behind, and the next poll reclaims them
/// once their lock expires. Returns the number of reclaimed entries.
pub async fn release_expired(db: &Database, queue_name: &str) -> Result<usize, TidingsError> {
    let queue_name = queue_name.to_string();
    db.connection()
        .call(move |conn| {
            let n = conn.execute(
                "UPDATE queue SET status = 'pending', locked_until = NULL,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE queue_name = ?1 AND status = 'processing'
                   AND locked_until < strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![queue_name],
            )?;
            Ok(n)
        })
        .await
        .map_err(map_tr_err)
}

/// List dead-lettered entries for operator inspection.
pub async fn dead_letters(
    db: &Database,
    queue_name: &str,
    limit: usize,
) -> Result<Vec<QueueEntry>, TidingsError> {
    let queue_name = queue_name.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS}
                 FROM queue
                 WHERE queue_name = ?1 AND status = 'failed'
                 ORDER BY id ASC
                 LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![queue_name, limit as i64], entry_from_row)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
        .map_err(map_tr_err)
}
