// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end orchestrator testing.
//!
//! `TestHarness` assembles an orchestrator over a temp SQLite database, a
//! [`MockGenerator`] and an optional [`MockClassifier`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hintly_config::model::StorageConfig;
use hintly_core::traits::ClassifierAdapter;
use hintly_core::{HintlyError, StorageAdapter};
use hintly_storage::SqliteStorage;
use hintly_tutor::{ConversationOrchestrator, TurnReply, TurnRequest, TutorSettings};

use crate::mock_classifier::MockClassifier;
use crate::mock_generator::MockGenerator;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    settings: TutorSettings,
    classifier: Option<MockClassifier>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            settings: TutorSettings::default(),
            classifier: None,
        }
    }

    /// Replace the tutor settings.
    pub fn with_settings(mut self, settings: TutorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Attach a classifier. Without one, fusion is always skipped.
    pub fn with_classifier(mut self, classifier: MockClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Build the harness, creating a temp database.
    pub async fn build(self) -> Result<TestHarness, HintlyError> {
        let temp_dir = tempfile::TempDir::new().map_err(HintlyError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        }));
        storage.initialize().await?;

        let generator = Arc::new(MockGenerator::new());
        let classifier = self.classifier.map(Arc::new);

        let orchestrator = ConversationOrchestrator::new(
            generator.clone(),
            classifier
                .clone()
                .map(|c| c as Arc<dyn ClassifierAdapter>),
            storage.clone(),
            self.settings,
        );

        Ok(TestHarness {
            generator,
            classifier,
            storage,
            orchestrator: Arc::new(orchestrator),
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock adapters and temp storage.
pub struct TestHarness {
    /// The mock generation service.
    pub generator: Arc<MockGenerator>,
    /// The mock classifier, if one was attached.
    pub classifier: Option<Arc<MockClassifier>>,
    /// SQLite storage (temp DB, removed on drop).
    pub storage: Arc<SqliteStorage>,
    pub orchestrator: Arc<ConversationOrchestrator>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Submit a turn for `user_id` at the current time.
    pub async fn submit(
        &self,
        user_id: &str,
        problem: &str,
        code: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<TurnReply, HintlyError> {
        self.orchestrator
            .submit_turn(user_id, request(problem, code, session_id))
            .await
    }

    /// Submit a turn for `user_id` with a fixed clock.
    pub async fn submit_at(
        &self,
        user_id: &str,
        problem: &str,
        code: Option<&str>,
        session_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TurnReply, HintlyError> {
        self.orchestrator
            .submit_turn_at(user_id, request(problem, code, session_id), now)
            .await
    }
}

fn request(problem: &str, code: Option<&str>, session_id: Option<&str>) -> TurnRequest {
    TurnRequest {
        problem: problem.to_string(),
        code: code.map(str::to_string),
        session_id: session_id.map(str::to_string),
    }
}
