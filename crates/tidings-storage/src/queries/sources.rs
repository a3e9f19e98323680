// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source row operations.
//!
//! Sources are created by the admin surface and mutated by the scheduler
//! (`last_checked`, `do_initialized_at`). Deleting a source cascades to
//! its articles.

use chrono::{DateTime, Utc};
use rusqlite::params;
use tidings_core::{Source, TidingsError};

use crate::database::{map_tr_err, Database};
use crate::timefmt;

fn source_from_row(row: &rusqlite::Row<'_>) -> Result<Source, rusqlite::Error> {
    Ok(Source {
        id: row.get(0)?,
        url: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        paywall: row.get::<_, i64>(4)? != 0,
        scrape_frequency: row.get(5)?,
        last_checked: timefmt::from_db_opt(row.get(6)?),
        do_initialized_at: timefmt::from_db_opt(row.get(7)?),
    })
}

const SOURCE_COLUMNS: &str =
    "id, url, name, category, paywall, scrape_frequency, last_checked, do_initialized_at";

/// Create a source. Returns the stored row.
pub async fn create(
    db: &Database,
    url: &str,
    name: &str,
    category: Option<&str>,
    paywall: bool,
    scrape_frequency: i64,
) -> Result<Source, TidingsError> {
    let url = url.to_string();
    let name = name.to_string();
    let category = category.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sources (url, name, category, paywall, scrape_frequency)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![url, name, category, paywall as i64, scrape_frequency],
            )?;
            let id = conn.last_insert_rowid();
            let source = conn.query_row(
                &format!("SELECT {SOURCE_COLUMNS} FROM sources WHERE id = ?1"),
                params![id],
                source_from_row,
            )?;
            Ok(source)
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a source by id. Returns `None` when it has been deleted.
pub async fn get(db: &Database, id: i64) -> Result<Option<Source>, TidingsError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {SOURCE_COLUMNS} FROM sources WHERE id = ?1"),
                params![id],
                source_from_row,
            );
            match result {
                Ok(source) => Ok(Some(source)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List sources that have a scheduler instance initialized for them.
///
/// Used at startup to re-arm scraper instances after a restart.
pub async fn list_initialized(db: &Database) -> Result<Vec<Source>, TidingsError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SOURCE_COLUMNS} FROM sources
                 WHERE do_initialized_at IS NOT NULL
                 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map([], source_from_row)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
        .map_err(map_tr_err)
}

/// Advance a source's `last_checked` timestamp.
pub async fn set_last_checked(
    db: &Database,
    id: i64,
    ts: DateTime<Utc>,
) -> Result<(), TidingsError> {
    let ts = timefmt::to_db(ts);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE sources SET last_checked = ?1 WHERE id = ?2",
                params![ts, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Set or clear `do_initialized_at` on a source row.
pub async fn set_do_initialized_at(
    db: &Database,
    id: i64,
    ts: Option<DateTime<Utc>>,
) -> Result<(), TidingsError> {
    let ts = ts.map(timefmt::to_db);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE sources SET do_initialized_at = ?1 WHERE id = ?2",
                params![ts, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a source. Articles cascade via the foreign key.
pub async fn delete(db: &Database, id: i64) -> Result<bool, TidingsError> {
    db.connection()
        .call(move |conn| {
            let n = conn.execute("DELETE FROM sources WHERE id = ?1", params![id])?;
            Ok(n > 0)
        })
        .await
        .map_err(map_tr_err)
}
