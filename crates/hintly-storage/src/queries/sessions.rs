// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session reads and the row-level writes used by turn commits.

use hintly_core::HintlyError;
use hintly_core::types::{Session, SessionSummary};
use rusqlite::{Connection, Row, params};

use crate::database::Database;

const SESSION_COLUMNS: &str =
    "id, user_id, title, created_at, updated_at, last_topic, current_topic_length";

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
        last_topic: row.get(5)?,
        current_topic_length: row.get(6)?,
    })
}

/// Get a session by ID.
pub async fn get_session(db: &Database, id: &str) -> Result<Option<Session>, HintlyError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Session>, rusqlite::Error> {
            let mut stmt =
                conn.prepare(&format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"))?;
            match stmt.query_row(params![id], session_from_row) {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List a user's sessions with their message counts, newest update first.
pub async fn list_sessions_for_user(
    db: &Database,
    user_id: &str,
) -> Result<Vec<SessionSummary>, HintlyError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<SessionSummary>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT s.id, s.title, s.created_at, s.updated_at, COUNT(m.id)
                 FROM sessions s
                 LEFT JOIN messages m ON m.session_id = s.id
                 WHERE s.user_id = ?1
                 GROUP BY s.id
                 ORDER BY s.updated_at DESC, s.rowid DESC",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                let count: i64 = row.get(4)?;
                Ok(SessionSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    created_at: row.get(2)?,
                    updated_at: row.get(3)?,
                    message_count: count.max(0) as u64,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a brand new session row.
pub(crate) fn insert_session_row(conn: &Connection, session: &Session) -> rusqlite::Result<()> {
    conn.execute(
        &format!("INSERT INTO sessions ({SESSION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
        params![
            session.id,
            session.user_id,
            session.title,
            session.created_at,
            session.updated_at,
            session.last_topic,
            session.current_topic_length,
        ],
    )?;
    Ok(())
}

/// Update the mutable session fields if `updated_at` still equals `expected`.
///
/// Returns `false` when another writer got there first.
pub(crate) fn update_session_row(
    conn: &Connection,
    session: &Session,
    expected_updated_at: &str,
) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE sessions
         SET updated_at = ?1, last_topic = ?2, current_topic_length = ?3
         WHERE id = ?4 AND user_id = ?5 AND updated_at = ?6",
        params![
            session.updated_at,
            session.last_topic,
            session.current_topic_length,
            session.id,
            session.user_id,
            expected_updated_at,
        ],
    )?;
    Ok(changed == 1)
}
