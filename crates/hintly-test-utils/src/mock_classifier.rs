// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock frustration classifier.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use hintly_core::traits::{ClassifierAdapter, PluginAdapter};
use hintly_core::types::{AdapterType, FrustrationAnalysis, HealthStatus};
use hintly_core::HintlyError;

/// A classifier returning scripted probabilities.
///
/// Scripted values are consumed in order; afterwards the fallback value is
/// returned on every call. A failing classifier errors on every call.
pub struct MockClassifier {
    scripted: Mutex<VecDeque<f64>>,
    fallback: f64,
    failing: bool,
    texts: Mutex<Vec<String>>,
}

impl MockClassifier {
    /// Always answers `probability`.
    pub fn constant(probability: f64) -> Self {
        Self::sequence(Vec::new(), probability)
    }

    /// Answers `probabilities` in order, then `fallback`.
    pub fn sequence(probabilities: Vec<f64>, fallback: f64) -> Self {
        Self {
            scripted: Mutex::new(probabilities.into()),
            fallback,
            failing: false,
            texts: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call, like an unreachable scoring service.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::constant(0.0)
        }
    }

    /// Texts submitted for analysis, in order.
    pub async fn analyzed_texts(&self) -> Vec<String> {
        self.texts.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockClassifier {
    fn name(&self) -> &str {
        "mock-classifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Classifier
    }

    async fn health_check(&self) -> Result<HealthStatus, HintlyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), HintlyError> {
        Ok(())
    }
}

#[async_trait]
impl ClassifierAdapter for MockClassifier {
    async fn analyze(&self, text: &str) -> Result<FrustrationAnalysis, HintlyError> {
        self.texts.lock().await.push(text.to_string());
        if self.failing {
            return Err(HintlyError::classifier("mock classifier unavailable"));
        }
        let probability = self
            .scripted
            .lock()
            .await
            .pop_front()
            .unwrap_or(self.fallback);
        Ok(FrustrationAnalysis {
            frustration_probability: probability,
            is_frustrated: probability > 0.5,
        })
    }
}
