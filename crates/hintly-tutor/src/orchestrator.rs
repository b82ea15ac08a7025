// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation orchestrator: one tutoring turn from request to reply.
//!
//! A turn runs through the stages resolve_session -> evaluate_topic ->
//! fuse_frustration -> generate_reply -> persist -> respond. Every write
//! happens in the persist stage as one storage transaction, so a turn that
//! fails earlier leaves no trace.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use dashmap::DashMap;
use hintly_config::model::{AgentsConfig, HintlyConfig};
use hintly_core::error::HintlyError;
use hintly_core::traits::{ClassifierAdapter, GenerationAdapter, StorageAdapter};
use hintly_core::types::{
    FrustrationAnalysis, GenerationPurpose, HealthStatus, Message, Role, Session,
    SessionSummary, TurnCommit,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::{build_conversation, format_user_turn, with_syntax_errors};
use crate::frustration::fuse_analysis;
use crate::history::{self, SessionHistory};
use crate::prompt::PromptVariant;
use crate::syntax;
use crate::title::derive_title;
use crate::topic::{TopicEvaluator, TopicState, after_reply, request_for};

/// Stages of a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStage {
    ResolveSession,
    EvaluateTopic,
    FuseFrustration,
    GenerateReply,
    Persist,
    Respond,
}

impl std::fmt::Display for TurnStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnStage::ResolveSession => write!(f, "resolve_session"),
            TurnStage::EvaluateTopic => write!(f, "evaluate_topic"),
            TurnStage::FuseFrustration => write!(f, "fuse_frustration"),
            TurnStage::GenerateReply => write!(f, "generate_reply"),
            TurnStage::Persist => write!(f, "persist"),
            TurnStage::Respond => write!(f, "respond"),
        }
    }
}

/// Tunables the orchestrator reads on every turn.
#[derive(Debug, Clone)]
pub struct TutorSettings {
    /// Idle time after which the next message starts a fresh topic.
    pub idle_timeout: Duration,
    /// Fused scores strictly above this select the escalated prompt.
    pub frustration_threshold: f64,
    pub agents: AgentsConfig,
}

impl TutorSettings {
    pub fn from_config(config: &HintlyConfig) -> Self {
        Self {
            idle_timeout: Duration::from_secs(config.tutor.idle_timeout_secs),
            frustration_threshold: config.tutor.frustration_threshold,
            agents: config.agents.clone(),
        }
    }
}

impl Default for TutorSettings {
    fn default() -> Self {
        Self::from_config(&HintlyConfig::default())
    }
}

/// A learner's submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRequest {
    pub problem: String,
    #[serde(default)]
    pub code: Option<String>,
    /// Session to continue. Unknown ids start a new session.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// What the learner gets back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReply {
    pub reply: String,
    pub session_id: String,
    pub current_topic_length: u32,
    /// Raw classifier output; absent when no classifier answered.
    pub frustration_analysis: Option<FrustrationAnalysis>,
}

/// Sequences topic evaluation, frustration fusion, prompt selection,
/// generation and persistence for each turn.
pub struct ConversationOrchestrator {
    generator: Arc<dyn GenerationAdapter>,
    classifier: Option<Arc<dyn ClassifierAdapter>>,
    storage: Arc<dyn StorageAdapter>,
    settings: TutorSettings,
    /// One async lock per session id with a turn in flight.
    session_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ConversationOrchestrator {
    pub fn new(
        generator: Arc<dyn GenerationAdapter>,
        classifier: Option<Arc<dyn ClassifierAdapter>>,
        storage: Arc<dyn StorageAdapter>,
        settings: TutorSettings,
    ) -> Self {
        info!(
            classifier = classifier.is_some(),
            idle_timeout_secs = settings.idle_timeout.as_secs(),
            threshold = settings.frustration_threshold,
            "conversation orchestrator initialized"
        );
        Self {
            generator,
            classifier,
            storage,
            settings,
            session_locks: DashMap::new(),
        }
    }

    pub fn settings(&self) -> &TutorSettings {
        &self.settings
    }

    /// Run one turn for `user_id`.
    pub async fn submit_turn(
        &self,
        user_id: &str,
        request: TurnRequest,
    ) -> Result<TurnReply, HintlyError> {
        self.submit(user_id, request, None).await
    }

    /// Run one turn as if the clock read `now`.
    pub async fn submit_turn_at(
        &self,
        user_id: &str,
        request: TurnRequest,
        now: DateTime<Utc>,
    ) -> Result<TurnReply, HintlyError> {
        self.submit(user_id, request, Some(now)).await
    }

    async fn submit(
        &self,
        user_id: &str,
        request: TurnRequest,
        now: Option<DateTime<Utc>>,
    ) -> Result<TurnReply, HintlyError> {
        if let HealthStatus::Unhealthy(reason) = self.generator.health_check().await? {
            return Err(HintlyError::Config(reason));
        }

        let requested = request
            .session_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        let Some(session_id) = requested else {
            let now = now.unwrap_or_else(Utc::now);
            return self.run_turn(user_id, None, &request, now).await;
        };

        let lock = self.lock_for(&session_id);
        let result = {
            let _guard = lock.lock().await;
            // Read the clock under the lock so turns on one session are stamped in order.
            let now = now.unwrap_or_else(Utc::now);
            self.run_turn(user_id, Some(&session_id), &request, now).await
        };
        drop(lock);
        self.session_locks
            .remove_if(&session_id, |_, l| Arc::strong_count(l) == 1);
        result
    }

    /// Sessions owned by `user_id`, most recently updated first.
    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<SessionSummary>, HintlyError> {
        history::list_sessions(self.storage.as_ref(), user_id).await
    }

    /// Messages of one of `user_id`'s sessions.
    pub async fn session_history(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<SessionHistory, HintlyError> {
        history::session_history(self.storage.as_ref(), user_id, session_id).await
    }

    fn lock_for(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.session_locks
            .entry(session_id.to_string())
            .or_default()
            .value()
            .clone()
    }

    async fn run_turn(
        &self,
        user_id: &str,
        session_id: Option<&str>,
        request: &TurnRequest,
        now: DateTime<Utc>,
    ) -> Result<TurnReply, HintlyError> {
        let stamp = timestamp(now);
        let problem = request.problem.as_str();
        let code = request.code.as_deref().unwrap_or_default();

        debug!(stage = %TurnStage::ResolveSession, user_id, "turn stage");
        let existing = match session_id {
            Some(id) => self.storage.get_session(id).await?,
            None => None,
        };
        let (session, history, expected_updated_at) = match existing {
            Some(session) if session.user_id != user_id => {
                warn!(session_id = %session.id, user_id, "session owned by another user");
                return Err(HintlyError::Forbidden {
                    session_id: session.id,
                });
            }
            Some(session) => {
                let history = self.storage.get_messages(&session.id).await?;
                let expected = session.updated_at.clone();
                (session, history, Some(expected))
            }
            None => {
                if let Some(id) = session_id {
                    debug!(session_id = id, "unknown session id, starting a new session");
                }
                let title = derive_title(
                    self.generator.as_ref(),
                    &self.settings.agents.title,
                    problem,
                    code,
                )
                .await;
                (new_session(user_id, title, &stamp), Vec::new(), None)
            }
        };

        let diagnostic = syntax::diagnose(code);
        let user_turn = format_user_turn(problem, code);
        let model_turn = with_syntax_errors(&user_turn, diagnostic.as_ref());

        debug!(stage = %TurnStage::EvaluateTopic, session_id = %session.id, "turn stage");
        let evaluator = TopicEvaluator::new(
            self.generator.as_ref(),
            &self.settings.agents.continuity,
            &self.settings.agents.topic,
            self.settings.idle_timeout,
        );
        let evaluation = evaluator
            .evaluate(&TopicState::of(&session), &session.updated_at, &user_turn, now)
            .await;

        debug!(stage = %TurnStage::FuseFrustration, session_id = %session.id, "turn stage");
        let analysis = self.analyze(problem).await;
        let fused = fuse_analysis(analysis.as_ref(), evaluation.state.current_topic_length);
        let variant = PromptVariant::select(fused, self.settings.frustration_threshold);
        info!(
            session_id = %session.id,
            outcome = %evaluation.outcome,
            topic_length = evaluation.state.current_topic_length,
            fused = ?fused,
            %variant,
            "turn evaluated"
        );

        debug!(stage = %TurnStage::GenerateReply, session_id = %session.id, "turn stage");
        let generation = request_for(
            variant.profile(&self.settings.agents),
            GenerationPurpose::Reply,
            build_conversation(&history, &model_turn),
        );
        let reply = self.generator.generate(generation).await?.text_or_default();

        debug!(stage = %TurnStage::Persist, session_id = %session.id, "turn stage");
        let topic = after_reply(&evaluation.state);
        let session = Session {
            updated_at: stamp.clone(),
            last_topic: topic.last_topic,
            current_topic_length: topic.current_topic_length,
            ..session
        };
        let user_message = Message {
            id: Uuid::new_v4().to_string(),
            session_id: session.id.clone(),
            role: Role::User,
            content: model_turn,
            problem: Some(problem.to_string()),
            code: request.code.clone(),
            syntax_errors: diagnostic,
            frustration_score: fused,
            created_at: stamp.clone(),
        };
        let assistant_message = Message {
            id: Uuid::new_v4().to_string(),
            session_id: session.id.clone(),
            role: Role::Assistant,
            content: reply.clone(),
            problem: None,
            code: None,
            syntax_errors: None,
            frustration_score: None,
            created_at: stamp,
        };
        let session_id = session.id.clone();
        let current_topic_length = session.current_topic_length;
        self.storage
            .commit_turn(TurnCommit {
                session,
                expected_updated_at,
                user_message,
                assistant_message,
            })
            .await?;

        debug!(stage = %TurnStage::Respond, %session_id, "turn stage");
        Ok(TurnReply {
            reply,
            session_id,
            current_topic_length,
            frustration_analysis: analysis,
        })
    }

    /// Classifier output for `text`, or `None` when there is no classifier
    /// or it failed.
    async fn analyze(&self, text: &str) -> Option<FrustrationAnalysis> {
        let classifier = self.classifier.as_ref()?;
        match classifier.analyze(text).await {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                warn!(error = %e, "frustration classifier unavailable, skipping fusion");
                None
            }
        }
    }
}

fn new_session(user_id: &str, title: String, stamp: &str) -> Session {
    Session {
        id: Uuid::new_v4().simple().to_string(),
        user_id: user_id.to_string(),
        title: Some(title),
        created_at: stamp.to_string(),
        updated_at: stamp.to_string(),
        last_topic: None,
        current_topic_length: 0,
    }
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names() {
        assert_eq!(TurnStage::ResolveSession.to_string(), "resolve_session");
        assert_eq!(TurnStage::FuseFrustration.to_string(), "fuse_frustration");
    }

    #[test]
    fn timestamps_are_fixed_width_utc() {
        let now = DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(timestamp(now), "2026-03-01T10:00:00.000000Z");
    }

    #[test]
    fn request_accepts_missing_optionals() {
        let request: TurnRequest =
            serde_json::from_str(r#"{"problem": "loop never terminates"}"#).unwrap();
        assert_eq!(request.code, None);
        assert_eq!(request.session_id, None);
    }

    #[test]
    fn settings_follow_config() {
        let mut config = HintlyConfig::default();
        config.tutor.idle_timeout_secs = 60;
        config.tutor.frustration_threshold = 0.7;
        let settings = TutorSettings::from_config(&config);
        assert_eq!(settings.idle_timeout, Duration::from_secs(60));
        assert_eq!(settings.frustration_threshold, 0.7);
    }
}
