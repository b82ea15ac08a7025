// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Topic continuity evaluation.
//!
//! A turn is FRESH when the session has no active topic or sat idle past the
//! configured timeout, CONTINUED when the generation service confirms the new
//! message extends the active topic, and DRIFTED otherwise. FRESH and DRIFTED
//! both reset the topic to a newly generated summary with length zero.

use std::time::Duration;

use chrono::{DateTime, Utc};
use hintly_config::model::AgentProfile;
use hintly_core::traits::GenerationAdapter;
use hintly_core::types::{GenerationPurpose, GenerationRequest, Session, TopicOutcome};
use tracing::{debug, warn};

/// Topic fields of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopicState {
    pub last_topic: Option<String>,
    pub current_topic_length: u32,
}

impl TopicState {
    pub fn of(session: &Session) -> Self {
        Self {
            last_topic: session.last_topic.clone(),
            current_topic_length: session.current_topic_length,
        }
    }

    /// State of a session that has never discussed anything.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Result of evaluating one incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicEvaluation {
    pub outcome: TopicOutcome,
    /// Topic fields in effect for the rest of the turn.
    pub state: TopicState,
}

/// Decide FRESH without any model call, if possible.
///
/// Returns `Some(Fresh)` when there is no topic, the last update cannot be
/// parsed, or the idle time exceeds `idle_timeout`. `None` means continuity
/// has to be asked.
pub fn precheck(
    state: &TopicState,
    updated_at: &str,
    now: DateTime<Utc>,
    idle_timeout: Duration,
) -> Option<TopicOutcome> {
    if state.last_topic.is_none() {
        return Some(TopicOutcome::Fresh);
    }
    let Ok(last) = DateTime::parse_from_rfc3339(updated_at) else {
        warn!(updated_at, "unparseable session timestamp, treating topic as fresh");
        return Some(TopicOutcome::Fresh);
    };
    let idle = now.signed_duration_since(last.with_timezone(&Utc));
    match idle.to_std() {
        Ok(idle) if idle > idle_timeout => Some(TopicOutcome::Fresh),
        _ => None,
    }
}

/// `true` when a continuity answer means "yes".
///
/// Non-alphabetic characters are dropped and case is folded before the
/// comparison, so `"Yes."` and `" YES\n"` both count.
pub fn is_affirmative(answer: &str) -> bool {
    let normalized: String = answer
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    normalized == "yes"
}

/// Apply an outcome to the previous state.
///
/// CONTINUED keeps the state untouched; the length is only bumped after a
/// successful reply. FRESH and DRIFTED start over at length zero with
/// `new_summary` as topic.
pub fn transition(
    previous: &TopicState,
    outcome: TopicOutcome,
    new_summary: Option<String>,
) -> TopicState {
    match outcome {
        TopicOutcome::Continued => previous.clone(),
        TopicOutcome::Fresh | TopicOutcome::Drifted => TopicState {
            last_topic: new_summary,
            current_topic_length: 0,
        },
    }
}

/// State persisted after a successful reply.
///
/// Any active topic has now been discussed for one more turn; a turn whose
/// summary failed keeps the session topic-less.
pub fn after_reply(evaluated: &TopicState) -> TopicState {
    match &evaluated.last_topic {
        Some(topic) => TopicState {
            last_topic: Some(topic.clone()),
            current_topic_length: evaluated.current_topic_length.saturating_add(1),
        },
        None => TopicState::empty(),
    }
}

/// Runs the continuity question and topic summaries against a generator.
pub struct TopicEvaluator<'a> {
    generator: &'a dyn GenerationAdapter,
    continuity: &'a AgentProfile,
    summary: &'a AgentProfile,
    idle_timeout: Duration,
}

impl<'a> TopicEvaluator<'a> {
    pub fn new(
        generator: &'a dyn GenerationAdapter,
        continuity: &'a AgentProfile,
        summary: &'a AgentProfile,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            generator,
            continuity,
            summary,
            idle_timeout,
        }
    }

    /// Evaluate `message` against the session's current topic.
    ///
    /// Never fails: a failed continuity call counts as drift and a failed
    /// summary leaves the session without a topic.
    pub async fn evaluate(
        &self,
        previous: &TopicState,
        updated_at: &str,
        message: &str,
        now: DateTime<Utc>,
    ) -> TopicEvaluation {
        let outcome = match precheck(previous, updated_at, now, self.idle_timeout) {
            Some(outcome) => outcome,
            None => self.ask_continuity(previous, message).await,
        };
        debug!(%outcome, "topic outcome decided");

        let summary = match outcome {
            TopicOutcome::Continued => None,
            TopicOutcome::Fresh | TopicOutcome::Drifted => self.summarize(message).await,
        };

        TopicEvaluation {
            outcome,
            state: transition(previous, outcome, summary),
        }
    }

    async fn ask_continuity(&self, previous: &TopicState, message: &str) -> TopicOutcome {
        let topic = previous.last_topic.as_deref().unwrap_or_default();
        let request = request_for(
            self.continuity,
            GenerationPurpose::Continuity,
            format!(
                "Current topic:\n{topic}\n\nNew message:\n{message}\n\nDoes the new message continue the current topic? Answer yes or no."
            ),
        );
        match self.generator.generate(request).await {
            Ok(response) => {
                let answer = response.extract_text().unwrap_or_default();
                if is_affirmative(&answer) {
                    TopicOutcome::Continued
                } else {
                    TopicOutcome::Drifted
                }
            }
            Err(e) => {
                warn!(error = %e, "continuity check failed, treating topic as drifted");
                TopicOutcome::Drifted
            }
        }
    }

    async fn summarize(&self, message: &str) -> Option<String> {
        let request = request_for(self.summary, GenerationPurpose::TopicSummary, message.to_string());
        match self.generator.generate(request).await {
            Ok(response) => {
                let summary = response.extract_text();
                if summary.is_none() {
                    warn!("topic summary came back empty");
                }
                summary
            }
            Err(e) => {
                warn!(error = %e, "topic summary failed, session keeps no topic");
                None
            }
        }
    }
}

/// Build a generation request from an agent profile.
pub(crate) fn request_for(
    profile: &AgentProfile,
    purpose: GenerationPurpose,
    prompt: String,
) -> GenerationRequest {
    GenerationRequest {
        purpose,
        model: profile.model.clone(),
        system_instruction: profile.system_prompt.clone(),
        prompt,
        temperature: profile.temperature,
        top_p: profile.top_p,
        max_tokens: profile.max_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hintly_config::model::AgentsConfig;
    use hintly_test_utils::MockGenerator;
    use tracing_test::traced_test;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_780_000_000 + secs, 0).single().unwrap()
    }

    fn stamp(secs: i64) -> String {
        at(secs).to_rfc3339()
    }

    fn topical(len: u32) -> TopicState {
        TopicState {
            last_topic: Some("Infinite while loop.".into()),
            current_topic_length: len,
        }
    }

    const IDLE: Duration = Duration::from_secs(1800);

    #[test]
    fn no_topic_is_fresh() {
        assert_eq!(
            precheck(&TopicState::empty(), &stamp(0), at(1), IDLE),
            Some(TopicOutcome::Fresh)
        );
    }

    #[test]
    fn idle_session_is_fresh() {
        assert_eq!(
            precheck(&topical(3), &stamp(0), at(1801), IDLE),
            Some(TopicOutcome::Fresh)
        );
        assert_eq!(precheck(&topical(3), &stamp(0), at(1800), IDLE), None);
    }

    #[test]
    fn garbage_timestamp_is_fresh() {
        assert_eq!(
            precheck(&topical(1), "yesterday", at(0), IDLE),
            Some(TopicOutcome::Fresh)
        );
    }

    #[test]
    fn clock_skew_does_not_count_as_idle() {
        assert_eq!(precheck(&topical(1), &stamp(100), at(0), IDLE), None);
    }

    #[test]
    fn affirmative_normalization() {
        assert!(is_affirmative("yes"));
        assert!(is_affirmative(" Yes.\n"));
        assert!(is_affirmative("YES!"));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("yes, mostly"));
        assert!(!is_affirmative(""));
    }

    #[test]
    fn continued_keeps_state() {
        let state = topical(4);
        assert_eq!(transition(&state, TopicOutcome::Continued, None), state);
    }

    #[test]
    fn drift_resets_to_new_summary() {
        let next = transition(&topical(4), TopicOutcome::Drifted, Some("Recursion.".into()));
        assert_eq!(next.last_topic.as_deref(), Some("Recursion."));
        assert_eq!(next.current_topic_length, 0);
    }

    #[test]
    fn repeated_drift_without_summary_stays_reset() {
        let once = transition(&topical(4), TopicOutcome::Drifted, None);
        let twice = transition(&once, TopicOutcome::Drifted, None);
        assert_eq!(twice, TopicState::empty());
        assert_eq!(after_reply(&twice), TopicState::empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_continuity_check_counts_as_drift() {
        let generator = MockGenerator::new();
        generator.push_failure(GenerationPurpose::Continuity).await;
        let agents = AgentsConfig::default();
        let evaluator = TopicEvaluator::new(&generator, &agents.continuity, &agents.topic, IDLE);

        let evaluation = evaluator.evaluate(&topical(3), &stamp(0), "next", at(60)).await;
        assert_eq!(evaluation.outcome, TopicOutcome::Drifted);
        assert_eq!(evaluation.state.last_topic.as_deref(), Some("Mock topic summary."));
        assert_eq!(evaluation.state.current_topic_length, 0);
        assert!(logs_contain("continuity check failed"));
    }

    #[tokio::test]
    async fn continuity_prompt_names_topic_and_message() {
        let generator = MockGenerator::new();
        let agents = AgentsConfig::default();
        let evaluator = TopicEvaluator::new(&generator, &agents.continuity, &agents.topic, IDLE);

        let evaluation = evaluator
            .evaluate(&topical(2), &stamp(0), "Problem:\nstill stuck", at(60))
            .await;
        assert_eq!(evaluation.outcome, TopicOutcome::Continued);
        assert_eq!(evaluation.state, topical(2));

        let requests = generator.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].purpose, GenerationPurpose::Continuity);
        assert!(requests[0].prompt.contains("Infinite while loop."));
        assert!(requests[0].prompt.contains("still stuck"));
        assert_eq!(requests[0].max_tokens, agents.continuity.max_tokens);
    }

    #[test]
    fn after_reply_counts_the_turn() {
        assert_eq!(after_reply(&topical(0)).current_topic_length, 1);
        assert_eq!(after_reply(&topical(5)).current_topic_length, 6);
    }
}
