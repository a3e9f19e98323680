// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::time::Duration;

use tidings_core::TidingsError;
use tokio_rusqlite::Connection;

use crate::migrations;

/// Handle to the SQLite database shared by every pipeline component.
///
/// Cloning is cheap; all clones funnel into the same background writer
/// thread, which is what makes concurrent scheduler/worker writes safe.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, applying PRAGMAs and any
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, TidingsError> {
        let conn = Connection::open(path).await.map_err(map_tr_err)?;

        conn.call(|conn| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.busy_timeout(Duration::from_secs(5))?;
            migrations::run_migrations(conn)
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        Ok(Self { conn })
    }

    /// Access the underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Flush and close the background connection.
    pub async fn close(&self) -> Result<(), TidingsError> {
        self.conn.clone().close().await.map_err(map_tr_err)
    }
}

/// Adapt a tokio-rusqlite error into the workspace error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> TidingsError {
    TidingsError::Storage {
        source: Box::new(e),
    }
}
