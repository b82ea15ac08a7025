// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Atomic persistence of one conversation turn.

use hintly_core::HintlyError;
use hintly_core::types::{Role, TurnCommit};
use tracing::debug;

use crate::database::Database;
use crate::queries::{messages, sessions};

/// Write the session state and the user/assistant pair in one transaction.
///
/// New sessions (`expected_updated_at == None`) are inserted. Existing
/// sessions are updated only if their `updated_at` still matches; otherwise
/// the transaction rolls back and [`HintlyError::Conflict`] is returned.
pub async fn commit_turn(db: &Database, commit: TurnCommit) -> Result<(), HintlyError> {
    if !commit.session.topic_invariant_holds() {
        return Err(HintlyError::Internal(format!(
            "session {} has topic length {} without a topic",
            commit.session.id, commit.session.current_topic_length
        )));
    }
    if commit.user_message.role != Role::User || commit.assistant_message.role != Role::Assistant
    {
        return Err(HintlyError::Internal(
            "turn must consist of a user message followed by an assistant message".into(),
        ));
    }

    let session_id = commit.session.id.clone();
    let applied = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;

            match &commit.expected_updated_at {
                None => sessions::insert_session_row(&tx, &commit.session)?,
                Some(expected) => {
                    if !sessions::update_session_row(&tx, &commit.session, expected)? {
                        // Dropping the transaction rolls it back.
                        return Ok(false);
                    }
                }
            }

            messages::insert_message_row(&tx, &commit.user_message)?;
            messages::insert_message_row(&tx, &commit.assistant_message)?;

            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if !applied {
        return Err(HintlyError::Conflict(format!(
            "session {session_id} was modified by a concurrent request"
        )));
    }

    debug!(session_id = %session_id, "turn committed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::messages::get_messages_for_session;
    use crate::queries::sessions::get_session;
    use crate::testing::{make_message, make_session, setup_db};

    fn new_turn(session_id: &str, n: u32) -> TurnCommit {
        TurnCommit {
            session: make_session(session_id, "ada"),
            expected_updated_at: None,
            user_message: make_message(&format!("u{n}"), session_id, Role::User),
            assistant_message: make_message(&format!("a{n}"), session_id, Role::Assistant),
        }
    }

    #[tokio::test]
    async fn follow_up_turn_updates_topic_fields() {
        let (db, _dir) = setup_db().await;
        commit_turn(&db, new_turn("s1", 1)).await.unwrap();

        let mut session = get_session(&db, "s1").await.unwrap().unwrap();
        let expected = session.updated_at.clone();
        session.updated_at = "2026-03-01T10:05:00.000000Z".into();
        session.last_topic = Some("Infinite while loops.".into());
        session.current_topic_length = 2;

        let mut turn = new_turn("s1", 2);
        turn.session = session.clone();
        turn.expected_updated_at = Some(expected);
        commit_turn(&db, turn).await.unwrap();

        assert_eq!(get_session(&db, "s1").await.unwrap().unwrap(), session);
        assert_eq!(get_messages_for_session(&db, "s1").await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn stale_update_conflicts_and_writes_nothing() {
        let (db, _dir) = setup_db().await;
        commit_turn(&db, new_turn("s1", 1)).await.unwrap();

        let mut turn = new_turn("s1", 2);
        turn.session.updated_at = "2026-03-01T11:00:00.000000Z".into();
        turn.expected_updated_at = Some("1999-01-01T00:00:00.000000Z".into());

        let err = commit_turn(&db, turn).await.unwrap_err();
        assert!(matches!(err, HintlyError::Conflict(_)), "{err}");
        assert_eq!(get_messages_for_session(&db, "s1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_message_insert_rolls_back_new_session() {
        let (db, _dir) = setup_db().await;
        commit_turn(&db, new_turn("s1", 1)).await.unwrap();

        // Reusing message id u1 violates the primary key after the session row is written.
        let turn = new_turn("s2", 1);
        assert!(commit_turn(&db, turn).await.is_err());
        assert!(get_session(&db, "s2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn inconsistent_topic_state_is_rejected() {
        let (db, _dir) = setup_db().await;
        let mut turn = new_turn("s1", 1);
        turn.session.current_topic_length = 1;

        let err = commit_turn(&db, turn).await.unwrap_err();
        assert!(matches!(err, HintlyError::Internal(_)));
        assert!(get_session(&db, "s1").await.unwrap().is_none());
    }
}
