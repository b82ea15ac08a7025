// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation adapter trait for text-generation backends (Gemini, mocks).

use async_trait::async_trait;

use crate::error::HintlyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{GenerationRequest, GenerationResponse};

/// Adapter for a text-generation service.
///
/// Implementations own their retry policy. The orchestrator calls
/// `generate` once per call site and never retries on its own.
#[async_trait]
pub trait GenerationAdapter: PluginAdapter {
    /// Sends a single-turn request and returns the typed response.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, HintlyError>;
}
