// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini generation adapter for the Hintly tutoring backend.
//!
//! Implements [`GenerationAdapter`] over the Gemini `generateContent` REST
//! API. A provider without an API key still constructs; it reports itself
//! unhealthy and every generation call fails with a configuration error, so
//! the server can start and surface the problem per request.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use hintly_config::model::GeminiConfig;
use hintly_core::error::HintlyError;
use hintly_core::traits::{GenerationAdapter, PluginAdapter};
use hintly_core::types::{
    AdapterType, GenerationCandidate, GenerationRequest, GenerationResponse, HealthStatus,
};
use tracing::{debug, info, warn};

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};

const MISSING_KEY: &str = "Gemini API key not found. Set gemini.api_key in config or the GEMINI_API_KEY environment variable.";

/// Gemini provider implementing [`GenerationAdapter`].
///
/// API key resolution order: config, `GEMINI_API_KEY`, `GOOGLE_API_KEY`.
pub struct GeminiProvider {
    client: Option<GeminiClient>,
}

impl GeminiProvider {
    /// Creates a provider from configuration.
    ///
    /// Fails only when a key is present but unusable.
    pub fn new(config: &GeminiConfig) -> Result<Self, HintlyError> {
        let client = match resolve_api_key(&config.api_key) {
            Some(key) => {
                let client = GeminiClient::new(
                    &key,
                    &config.api_base,
                    Duration::from_secs(config.timeout_secs),
                    config.max_retries,
                )?;
                info!(api_base = %config.api_base, "Gemini provider initialized");
                Some(client)
            }
            None => {
                warn!("{MISSING_KEY}");
                None
            }
        };
        Ok(Self { client })
    }

    /// Creates a provider around an existing client.
    pub fn with_client(client: GeminiClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    fn client(&self) -> Result<&GeminiClient, HintlyError> {
        self.client
            .as_ref()
            .ok_or_else(|| HintlyError::Config(MISSING_KEY.into()))
    }
}

fn resolve_api_key(config_key: &Option<String>) -> Option<String> {
    if let Some(key) = config_key
        && !key.trim().is_empty()
    {
        return Some(key.clone());
    }
    ["GEMINI_API_KEY", "GOOGLE_API_KEY"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|key| !key.trim().is_empty())
}

fn to_wire_request(request: &GenerationRequest) -> GenerateContentRequest {
    let system_instruction = (!request.system_instruction.trim().is_empty())
        .then(|| Content::text(None, request.system_instruction.clone()));

    GenerateContentRequest {
        contents: vec![Content::text(Some("user"), request.prompt.clone())],
        system_instruction,
        generation_config: GenerationConfig {
            temperature: request.temperature,
            top_p: request.top_p,
            max_output_tokens: request.max_tokens,
        },
    }
}

/// Maps the wire response onto the typed [`GenerationResponse`].
///
/// Top-level `text` is only set for a first candidate that finished
/// normally; truncated or filtered candidates are left to the parts fallback.
fn from_wire_response(response: GenerateContentResponse) -> Result<GenerationResponse, HintlyError> {
    if response.candidates.is_empty()
        && let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_ref())
    {
        return Err(HintlyError::provider(format!("prompt blocked by Gemini: {reason}")));
    }

    let candidates: Vec<GenerationCandidate> = response
        .candidates
        .iter()
        .map(|c| GenerationCandidate {
            parts: c.text_parts(),
            finish_reason: c.finish_reason.clone(),
        })
        .collect();

    let first = candidates.first();
    let finish_reason = first.and_then(|c| c.finish_reason.clone());
    let text = first
        .filter(|c| c.finish_reason.as_deref() == Some("STOP"))
        .map(|c| c.parts.concat());

    if let Some(usage) = &response.usage_metadata {
        debug!(
            prompt_tokens = usage.prompt_token_count,
            output_tokens = usage.candidates_token_count,
            total_tokens = usage.total_token_count,
            "Gemini usage"
        );
    }

    Ok(GenerationResponse {
        text,
        finish_reason,
        candidates,
    })
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, HintlyError> {
        // No API call: health checks should not spend quota.
        Ok(match self.client {
            Some(_) => HealthStatus::Healthy,
            None => HealthStatus::Unhealthy(MISSING_KEY.into()),
        })
    }

    async fn shutdown(&self) -> Result<(), HintlyError> {
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl GenerationAdapter for GeminiProvider {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, HintlyError> {
        let client = self.client()?;
        debug!(purpose = %request.purpose, model = %request.model, "sending generation request");
        let response = client
            .generate_content(&request.model, &to_wire_request(&request))
            .await?;
        from_wire_response(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hintly_core::types::GenerationPurpose;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(purpose: GenerationPurpose) -> GenerationRequest {
        GenerationRequest {
            purpose,
            model: "gemini-2.5-flash".into(),
            system_instruction: "Answer yes or no.".into(),
            prompt: "Is this related?".into(),
            temperature: 0.0,
            top_p: 1.0,
            max_tokens: 8,
        }
    }

    fn provider(server: &MockServer) -> GeminiProvider {
        let client = GeminiClient::new("k", &server.uri(), Duration::from_secs(5), 0).unwrap();
        GeminiProvider::with_client(client)
    }

    #[tokio::test]
    async fn provider_without_key_is_unhealthy_and_refuses() {
        let provider = GeminiProvider { client: None };
        assert!(matches!(
            provider.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
        let err = provider
            .generate(request(GenerationPurpose::Reply))
            .await
            .unwrap_err();
        assert!(matches!(err, HintlyError::Config(_)), "{err}");
    }

    #[tokio::test]
    async fn complete_candidate_sets_top_level_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Is this related?"}]}],
                "generationConfig": {"temperature": 0.0, "topP": 1.0, "maxOutputTokens": 8}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Ye"}, {"text": "s."}]},
                    "finishReason": "STOP"
                }]
            })))
            .mount(&server)
            .await;

        let response = provider(&server)
            .generate(request(GenerationPurpose::Continuity))
            .await
            .unwrap();
        assert_eq!(response.text.as_deref(), Some("Yes."));
        assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(response.extract_text().as_deref(), Some("Yes."));
    }

    #[tokio::test]
    async fn truncated_candidate_falls_back_to_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Look at how "}, {"text": "i changes"}]},
                    "finishReason": "MAX_TOKENS"
                }]
            })))
            .mount(&server)
            .await;

        let response = provider(&server)
            .generate(request(GenerationPurpose::Reply))
            .await
            .unwrap();
        assert!(response.text.is_none());
        assert_eq!(response.extract_text().as_deref(), Some("Look at how i changes"));
    }

    #[tokio::test]
    async fn blocked_prompt_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate(request(GenerationPurpose::Reply))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("SAFETY"), "{err}");
    }

    #[test]
    fn empty_system_instruction_is_omitted() {
        let mut req = request(GenerationPurpose::Reply);
        req.system_instruction = "  ".into();
        assert!(to_wire_request(&req).system_instruction.is_none());
    }

    #[test]
    fn config_key_wins_over_env() {
        assert_eq!(
            resolve_api_key(&Some("from-config".into())).as_deref(),
            Some("from-config")
        );
    }
}
