// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements run on tokio-rusqlite's single background thread. Do not
//! open additional connections for writes.

use std::path::Path;

use hintly_core::HintlyError;
use tracing::debug;

use crate::migrations;

/// Handle to the SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` and apply migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, HintlyError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(HintlyError::storage)?;
        }

        // Migrations run on a short-lived plain connection before the
        // background connection takes over.
        let migrate_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), HintlyError> {
            let mut conn =
                rusqlite::Connection::open(&migrate_path).map_err(HintlyError::storage)?;
            conn.execute_batch(&pragmas(wal_mode))
                .map_err(HintlyError::storage)?;
            migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(|e| HintlyError::Internal(format!("migration task failed: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| HintlyError::Storage { source: Box::new(e) })?;
        let batch = pragmas(wal_mode);
        conn.call(move |conn| -> Result<(), rusqlite::Error> { conn.execute_batch(&batch) })
            .await
            .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The background connection all queries go through.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }
}

fn pragmas(wal_mode: bool) -> String {
    let journal = if wal_mode { "WAL" } else { "DELETE" };
    format!(
        "PRAGMA journal_mode = {journal};
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;"
    )
}

/// Convert a tokio-rusqlite error into a storage error.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> HintlyError {
    HintlyError::Storage {
        source: Box::new(e),
    }
}
