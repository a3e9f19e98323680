// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted per-scraper control blocks.
//!
//! Each scraper instance owns exactly one row keyed by its deterministic
//! scraper id; the row carries the state blob fields plus the single
//! pending alarm timestamp (`next_tick_at`).

use chrono::{DateTime, Utc};
use rusqlite::params;
use tidings_core::{SourceState, TidingsError};

use crate::database::{map_tr_err, Database};
use crate::timefmt;

/// A state row read back from storage: the control block plus its alarm.
#[derive(Debug, Clone)]
pub struct StoredState {
    pub state: SourceState,
    pub next_tick_at: Option<DateTime<Utc>>,
}

/// Insert or replace the control block for a scraper instance.
pub async fn upsert(
    db: &Database,
    state: &SourceState,
    next_tick_at: Option<DateTime<Utc>>,
) -> Result<(), TidingsError> {
    let state = state.clone();
    let next_tick_at = next_tick_at.map(timefmt::to_db);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO source_state
                     (scraper_id, source_id, url, scrape_frequency, last_checked, next_tick_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (scraper_id) DO UPDATE SET
                     source_id = excluded.source_id,
                     url = excluded.url,
                     scrape_frequency = excluded.scrape_frequency,
                     last_checked = excluded.last_checked,
                     next_tick_at = excluded.next_tick_at",
                params![
                    state.scraper_id,
                    state.source_id,
                    state.url,
                    state.scrape_frequency,
                    state.last_checked.map(timefmt::to_db),
                    next_tick_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Load the control block for a scraper. `None` when never initialized or
/// destroyed.
pub async fn get(db: &Database, scraper_id: &str) -> Result<Option<StoredState>, TidingsError> {
    let scraper_id = scraper_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT scraper_id, source_id, url, scrape_frequency, last_checked, next_tick_at
                 FROM source_state WHERE scraper_id = ?1",
                params![scraper_id],
                |row| {
                    Ok(StoredState {
                        state: SourceState {
                            scraper_id: row.get(0)?,
                            source_id: row.get(1)?,
                            url: row.get(2)?,
                            scrape_frequency: row.get(3)?,
                            last_checked: timefmt::from_db_opt(row.get(4)?),
                        },
                        next_tick_at: timefmt::from_db_opt(row.get(5)?),
                    })
                },
            );
            match result {
                Ok(stored) => Ok(Some(stored)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Persist the single pending alarm for a scraper.
pub async fn set_next_tick(
    db: &Database,
    scraper_id: &str,
    next_tick_at: DateTime<Utc>,
) -> Result<(), TidingsError> {
    let scraper_id = scraper_id.to_string();
    let ts = timefmt::to_db(next_tick_at);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE source_state SET next_tick_at = ?1 WHERE scraper_id = ?2",
                params![ts, scraper_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Advance `last_checked` for a scraper's control block.
pub async fn set_last_checked(
    db: &Database,
    scraper_id: &str,
    ts: DateTime<Utc>,
) -> Result<(), TidingsError> {
    let scraper_id = scraper_id.to_string();
    let ts = timefmt::to_db(ts);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE source_state SET last_checked = ?1 WHERE scraper_id = ?2",
                params![ts, scraper_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Remove the control block entirely (scraper destroyed).
pub async fn delete(db: &Database, scraper_id: &str) -> Result<(), TidingsError> {
    let scraper_id = scraper_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM source_state WHERE scraper_id = ?1",
                params![scraper_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
