// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frustration classifier adapter over an HTTP scoring endpoint.
//!
//! The scoring service is opaque: it receives `{"text": ...}` and answers
//! with a probability and a boolean verdict. Any failure surfaces as
//! [`HintlyError::Classifier`], which the orchestrator treats as non-fatal.

use std::time::Duration;

use async_trait::async_trait;
use hintly_config::model::ClassifierConfig;
use hintly_core::types::{AdapterType, FrustrationAnalysis, HealthStatus};
use hintly_core::{ClassifierAdapter, HintlyError, PluginAdapter};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(alias = "frustrationProbability")]
    frustration_probability: f64,
    #[serde(alias = "isFrustrated")]
    is_frustrated: bool,
}

/// HTTP client for the frustration scoring service.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpClassifier {
    /// Builds a classifier from configuration.
    ///
    /// Returns `Ok(None)` when no endpoint is configured, which disables
    /// frustration fusion.
    pub fn from_config(config: &ClassifierConfig) -> Result<Option<Self>, HintlyError> {
        match &config.endpoint {
            Some(endpoint) => {
                Self::new(endpoint, Duration::from_secs(config.timeout_secs)).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Creates a classifier posting to `endpoint`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, HintlyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HintlyError::Classifier {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl PluginAdapter for HttpClassifier {
    fn name(&self) -> &str {
        "http-classifier"
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
impl ClassifierAdapter for HttpClassifier {
    async fn analyze(&self, text: &str) -> Result<FrustrationAnalysis, HintlyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnalyzeRequest { text })
            .send()
            .await
            .map_err(|e| HintlyError::Classifier {
                message: format!("classifier request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HintlyError::classifier(format!(
                "classifier returned {status}: {body}"
            )));
        }

        let parsed: AnalyzeResponse = response.json().await.map_err(|e| HintlyError::Classifier {
            message: format!("invalid classifier response: {e}"),
            source: Some(Box::new(e)),
        })?;

        let p = parsed.frustration_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(HintlyError::classifier(format!(
                "classifier probability {p} is outside [0, 1]"
            )));
        }

        debug!(probability = p, is_frustrated = parsed.is_frustrated, "frustration scored");
        Ok(FrustrationAnalysis {
            frustration_probability: p,
            is_frustrated: parsed.is_frustrated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn classifier(server: &MockServer) -> HttpClassifier {
        HttpClassifier::new(&format!("{}/analyze", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn disabled_without_endpoint() {
        let config = ClassifierConfig::default();
        assert!(HttpClassifier::from_config(&config).unwrap().is_none());
    }

    #[tokio::test]
    async fn analyze_posts_text_and_parses_score() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(body_json(serde_json::json!({"text": "why is this STILL broken"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "frustration_probability": 0.82,
                "is_frustrated": true
            })))
            .mount(&server)
            .await;

        let analysis = classifier(&server)
            .await
            .analyze("why is this STILL broken")
            .await
            .unwrap();
        assert_eq!(analysis.frustration_probability, 0.82);
        assert!(analysis.is_frustrated);
    }

    #[tokio::test]
    async fn server_error_is_classifier_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let err = classifier(&server).await.analyze("hi").await.unwrap_err();
        assert!(matches!(err, HintlyError::Classifier { .. }));
        assert!(err.to_string().contains("500"), "{err}");
    }

    #[tokio::test]
    async fn out_of_range_probability_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "frustrationProbability": 1.7,
                "isFrustrated": true
            })))
            .mount(&server)
            .await;

        let err = classifier(&server).await.analyze("hi").await.unwrap_err();
        assert!(err.to_string().contains("outside"), "{err}");
    }
}
