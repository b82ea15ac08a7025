// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation adapter for deterministic testing.
//!
//! `MockGenerator` keeps one FIFO queue of scripted replies per
//! [`GenerationPurpose`]. When a queue is empty, a fixed per-purpose default
//! is returned, so tests only script the calls they care about. Every request
//! is recorded for later assertions.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use hintly_core::traits::{GenerationAdapter, PluginAdapter};
use hintly_core::types::{
    AdapterType, GenerationPurpose, GenerationRequest, GenerationResponse, HealthStatus,
};
use hintly_core::HintlyError;

/// One scripted answer.
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Successful response with this top-level text.
    Text(String),
    /// Successful response carrying no text at all.
    Empty,
    /// Provider error with this message.
    Fail(String),
}

/// A generation adapter returning scripted replies.
pub struct MockGenerator {
    scripts: Mutex<HashMap<GenerationPurpose, VecDeque<MockReply>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    healthy: AtomicBool,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            healthy: AtomicBool::new(true),
        }
    }

    /// Queue a reply for the next call with `purpose`.
    pub async fn push(&self, purpose: GenerationPurpose, reply: MockReply) {
        self.scripts
            .lock()
            .await
            .entry(purpose)
            .or_default()
            .push_back(reply);
    }

    /// Queue a text reply for the next call with `purpose`.
    pub async fn push_text(&self, purpose: GenerationPurpose, text: &str) {
        self.push(purpose, MockReply::Text(text.to_string())).await;
    }

    /// Queue a failure for the next call with `purpose`.
    pub async fn push_failure(&self, purpose: GenerationPurpose) {
        self.push(purpose, MockReply::Fail(format!("mock {purpose} failure")))
            .await;
    }

    /// Make health checks report unhealthy (as a provider without a key does).
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// All requests received so far, in order.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }

    /// Requests received for `purpose`, in order.
    pub async fn requests_for(&self, purpose: GenerationPurpose) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|r| r.purpose == purpose)
            .cloned()
            .collect()
    }

    /// Forget recorded requests.
    pub async fn clear_requests(&self) {
        self.requests.lock().await.clear();
    }

    async fn next_reply(&self, purpose: GenerationPurpose) -> MockReply {
        self.scripts
            .lock()
            .await
            .get_mut(&purpose)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| MockReply::Text(default_text(purpose).to_string()))
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn default_text(purpose: GenerationPurpose) -> &'static str {
    match purpose {
        GenerationPurpose::Reply => "mock reply",
        GenerationPurpose::Title => "Mock title",
        GenerationPurpose::TopicSummary => "Mock topic summary.",
        GenerationPurpose::Continuity => "yes",
    }
}

#[async_trait]
impl PluginAdapter for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, HintlyError> {
        Ok(if self.healthy.load(Ordering::SeqCst) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy("mock generator has no API key".into())
        })
    }

    async fn shutdown(&self) -> Result<(), HintlyError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationAdapter for MockGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, HintlyError> {
        let purpose = request.purpose;
        self.requests.lock().await.push(request);
        match self.next_reply(purpose).await {
            MockReply::Text(text) => Ok(GenerationResponse::from_text(text)),
            MockReply::Empty => Ok(GenerationResponse::default()),
            MockReply::Fail(message) => Err(HintlyError::provider(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(purpose: GenerationPurpose) -> GenerationRequest {
        GenerationRequest {
            purpose,
            model: "mock".into(),
            system_instruction: String::new(),
            prompt: "p".into(),
            temperature: 0.0,
            top_p: 1.0,
            max_tokens: 8,
        }
    }

    #[tokio::test]
    async fn scripted_then_default() {
        let generator = MockGenerator::new();
        generator.push_text(GenerationPurpose::Continuity, "no").await;

        let first = generator.generate(request(GenerationPurpose::Continuity)).await.unwrap();
        let second = generator.generate(request(GenerationPurpose::Continuity)).await.unwrap();
        assert_eq!(first.extract_text().as_deref(), Some("no"));
        assert_eq!(second.extract_text().as_deref(), Some("yes"));
        assert_eq!(generator.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn queues_are_per_purpose() {
        let generator = MockGenerator::new();
        generator.push_failure(GenerationPurpose::Title).await;

        assert!(generator.generate(request(GenerationPurpose::Reply)).await.is_ok());
        assert!(generator.generate(request(GenerationPurpose::Title)).await.is_err());
        assert_eq!(generator.requests_for(GenerationPurpose::Title).await.len(), 1);
    }
}
