// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message reads and inserts.

use hintly_core::HintlyError;
use hintly_core::types::{Message, Role, SyntaxDiagnostic};
use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};

use crate::database::Database;

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    let role: String = row.get(2)?;
    let role = role
        .parse::<Role>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    let syntax_errors: Option<String> = row.get(6)?;
    let syntax_errors = syntax_errors
        .map(|json| serde_json::from_str::<SyntaxDiagnostic>(&json))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

    Ok(Message {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role,
        content: row.get(3)?,
        problem: row.get(4)?,
        code: row.get(5)?,
        syntax_errors,
        frustration_score: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// All messages of a session in creation order.
///
/// Rows sharing a timestamp keep insertion order.
pub async fn get_messages_for_session(
    db: &Database,
    session_id: &str,
) -> Result<Vec<Message>, HintlyError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<Message>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, role, content, problem, code, syntax_errors,
                        frustration_score, created_at
                 FROM messages
                 WHERE session_id = ?1
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt.query_map(params![session_id], message_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a message row.
pub(crate) fn insert_message_row(conn: &Connection, message: &Message) -> rusqlite::Result<()> {
    let syntax_errors = message
        .syntax_errors
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    conn.execute(
        "INSERT INTO messages (id, session_id, role, content, problem, code, syntax_errors,
                               frustration_score, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            message.id,
            message.session_id,
            message.role.to_string(),
            message.content,
            message.problem,
            message.code,
            syntax_errors,
            message.frustration_score,
            message.created_at,
        ],
    )?;
    Ok(())
}
