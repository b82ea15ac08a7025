// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use hintly_config::model::StorageConfig;
use hintly_core::types::{Message, Session, SessionSummary, TurnCommit};
use hintly_core::{AdapterType, HealthStatus, HintlyError, PluginAdapter, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, HintlyError> {
        self.db.get().ok_or_else(|| HintlyError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(&self) -> Result<(), HintlyError> {
        if !self.config.wal_mode {
            return Ok(());
        }
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, HintlyError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("storage not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch("SELECT 1;") })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), HintlyError> {
        if self.db.get().is_some() {
            self.checkpoint().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), HintlyError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| HintlyError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), HintlyError> {
        self.checkpoint().await
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, HintlyError> {
        queries::sessions::get_session(self.db()?, id).await
    }

    async fn list_sessions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<SessionSummary>, HintlyError> {
        queries::sessions::list_sessions_for_user(self.db()?, user_id).await
    }

    async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>, HintlyError> {
        queries::messages::get_messages_for_session(self.db()?, session_id).await
    }

    async fn commit_turn(&self, commit: TurnCommit) -> Result<(), HintlyError> {
        queries::turns::commit_turn(self.db()?, commit).await
    }
}
