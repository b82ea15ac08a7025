// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only projections over a user's sessions.

use hintly_core::error::HintlyError;
use hintly_core::traits::StorageAdapter;
use hintly_core::types::{Message, Role, SessionSummary, SyntaxDiagnostic};
use serde::{Deserialize, Serialize};

/// One message as shown in a session's history.
///
/// `problem`, `code` and `syntax_errors` only appear on user messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax_errors: Option<SyntaxDiagnostic>,
}

impl From<Message> for HistoryMessage {
    fn from(message: Message) -> Self {
        let user = message.role == Role::User;
        Self {
            id: message.id,
            role: message.role,
            content: message.content,
            created_at: message.created_at,
            problem: message.problem.filter(|_| user),
            code: message.code.filter(|_| user),
            syntax_errors: message.syntax_errors.filter(|_| user),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionHistory {
    pub session_id: String,
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub messages: Vec<HistoryMessage>,
}

pub async fn list_sessions(
    storage: &dyn StorageAdapter,
    user_id: &str,
) -> Result<Vec<SessionSummary>, HintlyError> {
    storage.list_sessions_for_user(user_id).await
}

/// History of `session_id`, which must belong to `user_id`.
pub async fn session_history(
    storage: &dyn StorageAdapter,
    user_id: &str,
    session_id: &str,
) -> Result<SessionHistory, HintlyError> {
    let session = storage
        .get_session(session_id)
        .await?
        .ok_or_else(|| HintlyError::NotFound(format!("session {session_id}")))?;
    if session.user_id != user_id {
        return Err(HintlyError::Forbidden {
            session_id: session.id,
        });
    }

    let messages = storage
        .get_messages(&session.id)
        .await?
        .into_iter()
        .map(HistoryMessage::from)
        .collect();

    Ok(SessionHistory {
        session_id: session.id,
        title: session.title,
        created_at: session.created_at,
        updated_at: session.updated_at,
        messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_messages_drop_user_fields() {
        let message = Message {
            id: "m".into(),
            session_id: "s".into(),
            role: Role::Assistant,
            content: "hint".into(),
            problem: Some("leaked".into()),
            code: None,
            syntax_errors: None,
            frustration_score: None,
            created_at: "2026-01-01T00:00:00.000000Z".into(),
        };
        let projected = HistoryMessage::from(message);
        assert_eq!(projected.problem, None);
        let json = serde_json::to_value(&projected).unwrap();
        assert!(json.get("problem").is_none());
        assert_eq!(json["role"], "assistant");
    }
}
