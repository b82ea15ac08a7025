// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Hintly backend.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Reply used when the generation service returns no usable text at all.
pub const DEFAULT_REPLY_TEXT: &str =
    "I'm sorry, I couldn't come up with a response. Could you rephrase your question?";

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Generation,
    Classifier,
    Storage,
    Auth,
}

// --- Conversation records ---

/// A tutoring conversation owned by one user.
///
/// `last_topic` and `current_topic_length` are driven exclusively by topic
/// evaluation: whenever `last_topic` is `None` the length is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub last_topic: Option<String>,
    pub current_topic_length: u32,
}

impl Session {
    /// Returns `true` when the topic fields are mutually consistent.
    pub fn topic_invariant_holds(&self) -> bool {
        self.last_topic.is_some() || self.current_topic_length == 0
    }
}

/// Author of a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single appended message in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    /// Raw problem statement (user messages only).
    pub problem: Option<String>,
    /// Submitted source code (user messages only).
    pub code: Option<String>,
    pub syntax_errors: Option<SyntaxDiagnostic>,
    /// Fused frustration score in [0, 1] (user messages only).
    pub frustration_score: Option<f64>,
    pub created_at: String,
}

/// Session listing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub message_count: u64,
}

/// Everything written at the end of one successful turn.
#[derive(Debug, Clone)]
pub struct TurnCommit {
    /// Session state after the turn, including the new `updated_at`.
    pub session: Session,
    /// `None` for a session created during this turn, otherwise the
    /// `updated_at` value observed when the session was loaded.
    pub expected_updated_at: Option<String>,
    pub user_message: Message,
    pub assistant_message: Message,
}

/// Static syntax error found in submitted code.
///
/// Positions are 1-based. Field names follow the familiar
/// `SyntaxError` attribute names so front-ends can render them directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxDiagnostic {
    pub msg: String,
    pub lineno: usize,
    pub col: Option<usize>,
    pub end_line: Option<usize>,
    pub end_col: Option<usize>,
    pub text: Option<String>,
}

// --- Frustration ---

/// Raw output of the frustration classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrustrationAnalysis {
    pub frustration_probability: f64,
    pub is_frustrated: bool,
}

// --- Topic continuity ---

/// Result of comparing a new message with the session's current topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TopicOutcome {
    /// No topic was active, or the session sat idle too long.
    Fresh,
    /// The message extends the active topic.
    Continued,
    /// The message moved away from the active topic.
    Drifted,
}

// --- Generation ---

/// Which part of the turn a generation call serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GenerationPurpose {
    /// The tutoring reply shown to the learner.
    Reply,
    /// Short session title.
    Title,
    /// 2-3 sentence summary that becomes the active topic.
    TopicSummary,
    /// Forced yes/no topic continuity question.
    Continuity,
}

/// A single call to the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub purpose: GenerationPurpose,
    pub model: String,
    pub system_instruction: String,
    pub prompt: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

/// One candidate completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationCandidate {
    /// Text parts in order. Non-text parts are dropped by the adapter.
    pub parts: Vec<String>,
    pub finish_reason: Option<String>,
}

/// Typed result of a generation call.
///
/// Use [`GenerationResponse::extract_text`] rather than reading fields
/// directly: it applies the extraction order top-level text, then the
/// concatenated parts of the first candidate carrying text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: Option<String>,
    pub finish_reason: Option<String>,
    pub candidates: Vec<GenerationCandidate>,
}

impl GenerationResponse {
    /// Builds a response carrying only top-level text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            finish_reason: Some("STOP".into()),
            candidates: Vec::new(),
        }
    }

    /// Returns the first non-blank text found, trimmed.
    pub fn extract_text(&self) -> Option<String> {
        let top_level = self.text.as_deref().map(str::trim).unwrap_or_default();
        if !top_level.is_empty() {
            return Some(top_level.to_string());
        }

        self.candidates.iter().find_map(|candidate| {
            let joined = candidate.parts.concat();
            let joined = joined.trim();
            (!joined.is_empty()).then(|| joined.to_string())
        })
    }

    /// Like [`extract_text`](Self::extract_text) but falls back to
    /// [`DEFAULT_REPLY_TEXT`].
    pub fn text_or_default(&self) -> String {
        self.extract_text().unwrap_or_else(|| {
            tracing::warn!(
                finish_reason = ?self.finish_reason,
                candidates = self.candidates.len(),
                "generation returned no text, using default reply"
            );
            DEFAULT_REPLY_TEXT.to_string()
        })
    }
}

// --- Auth ---

/// A bearer token presented by a client.
#[derive(Clone)]
pub struct AuthToken(pub String);

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AuthToken").field(&"[REDACTED]").finish()
    }
}

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_prefers_top_level_text() {
        let response = GenerationResponse {
            text: Some("  top  ".into()),
            finish_reason: None,
            candidates: vec![GenerationCandidate {
                parts: vec!["part".into()],
                finish_reason: None,
            }],
        };
        assert_eq!(response.extract_text().as_deref(), Some("top"));
    }

    #[test]
    fn extract_falls_back_to_concatenated_parts() {
        let response = GenerationResponse {
            text: Some("   ".into()),
            finish_reason: Some("MAX_TOKENS".into()),
            candidates: vec![
                GenerationCandidate::default(),
                GenerationCandidate {
                    parts: vec!["Check ".into(), "line 2.".into()],
                    finish_reason: Some("MAX_TOKENS".into()),
                },
            ],
        };
        assert_eq!(response.extract_text().as_deref(), Some("Check line 2."));
    }

    #[test]
    fn empty_response_uses_default_reply() {
        let response = GenerationResponse::default();
        assert!(response.extract_text().is_none());
        assert_eq!(response.text_or_default(), DEFAULT_REPLY_TEXT);
    }

    #[test]
    fn topic_invariant() {
        let mut session = Session {
            id: "s".into(),
            user_id: "u".into(),
            title: None,
            created_at: "2026-01-01T00:00:00.000000Z".into(),
            updated_at: "2026-01-01T00:00:00.000000Z".into(),
            last_topic: None,
            current_topic_length: 0,
        };
        assert!(session.topic_invariant_holds());
        session.current_topic_length = 2;
        assert!(!session.topic_invariant_holds());
        session.last_topic = Some("loops".into());
        assert!(session.topic_invariant_holds());
    }

    #[test]
    fn role_round_trips_through_strings() {
        use std::str::FromStr;
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::from_str("assistant").unwrap(), Role::Assistant);
        assert!(Role::from_str("system").is_err());
    }

    #[test]
    fn auth_token_debug_is_redacted() {
        let token = AuthToken("secret-token".into());
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret-token"));
    }
}
