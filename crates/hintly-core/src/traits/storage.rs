// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for session and message persistence.

use async_trait::async_trait;

use crate::error::HintlyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Message, Session, SessionSummary, TurnCommit};

/// Persistence gateway for sessions and their messages.
///
/// Messages are append-only and sessions are never deleted through this
/// interface.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), HintlyError>;

    /// Closes the storage backend, flushing pending writes and releasing connections.
    async fn close(&self) -> Result<(), HintlyError>;

    /// Loads a session by id.
    async fn get_session(&self, id: &str) -> Result<Option<Session>, HintlyError>;

    /// Lists a user's sessions, most recently updated first.
    async fn list_sessions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<SessionSummary>, HintlyError>;

    /// Returns the messages of a session in creation order.
    async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>, HintlyError>;

    /// Atomically writes the session state and the user/assistant message
    /// pair of one turn.
    ///
    /// Returns [`HintlyError::Conflict`] when `expected_updated_at` no longer
    /// matches the stored session, in which case nothing is written.
    async fn commit_turn(&self, commit: TurnCommit) -> Result<(), HintlyError>;
}
