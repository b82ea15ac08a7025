// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frustration classifier adapter trait.

use async_trait::async_trait;

use crate::error::HintlyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::FrustrationAnalysis;

/// Opaque scoring service estimating how frustrated the author of a text is.
///
/// Failures are reported as [`HintlyError::Classifier`]; callers degrade to
/// the unfused path instead of aborting.
#[async_trait]
pub trait ClassifierAdapter: PluginAdapter {
    /// Scores `text`. The returned probability is in [0, 1].
    async fn analyze(&self, text: &str) -> Result<FrustrationAnalysis, HintlyError>;
}
