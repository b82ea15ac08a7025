// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation continuity and escalation for the Hintly tutoring backend.
//!
//! The [`ConversationOrchestrator`] drives each turn:
//! - resolves or creates the session (with a generated title)
//! - decides whether the message continues the current topic
//! - fuses the classifier score with how long the topic has run
//! - picks the standard or escalated tutoring instruction
//! - generates the reply and persists the turn atomically

pub mod context;
pub mod frustration;
pub mod history;
pub mod orchestrator;
pub mod prompt;
pub mod syntax;
pub mod title;
pub mod topic;

pub use history::{HistoryMessage, SessionHistory};
pub use orchestrator::{ConversationOrchestrator, TurnReply, TurnRequest, TurnStage, TutorSettings};
pub use prompt::PromptVariant;
pub use topic::{TopicEvaluation, TopicEvaluator, TopicState};
