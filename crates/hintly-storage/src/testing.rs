// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixtures shared by the query tests.

use hintly_core::types::{Message, Role, Session};
use tempfile::TempDir;

use crate::database::Database;

pub(crate) async fn setup_db() -> (Database, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
    (db, dir)
}

pub(crate) fn make_session(id: &str, user_id: &str) -> Session {
    Session {
        id: id.into(),
        user_id: user_id.into(),
        title: Some("Loop never terminates".into()),
        created_at: "2026-03-01T10:00:00.000000Z".into(),
        updated_at: "2026-03-01T10:00:00.000000Z".into(),
        last_topic: None,
        current_topic_length: 0,
    }
}

pub(crate) fn make_message(id: &str, session_id: &str, role: Role) -> Message {
    Message {
        id: id.into(),
        session_id: session_id.into(),
        role,
        content: format!("{role} says hi"),
        problem: None,
        code: None,
        syntax_errors: None,
        frustration_score: None,
        created_at: "2026-03-01T10:00:00.000000Z".into(),
    }
}
