// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Choice between the standard and the empathy-escalated tutoring prompt.

use hintly_config::model::{AgentProfile, AgentsConfig};
use serde::Serialize;

/// Behavioral variant of the tutoring reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptVariant {
    Standard,
    Escalated,
}

impl PromptVariant {
    /// Escalate only when a fused score exists and strictly exceeds `threshold`.
    pub fn select(fused: Option<f64>, threshold: f64) -> Self {
        match fused {
            Some(score) if score > threshold => Self::Escalated,
            _ => Self::Standard,
        }
    }

    /// The agent profile carrying this variant's instruction and sampling.
    pub fn profile(self, agents: &AgentsConfig) -> &AgentProfile {
        match self {
            Self::Standard => &agents.support,
            Self::Escalated => &agents.escalated,
        }
    }
}

impl std::fmt::Display for PromptVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Escalated => write!(f, "escalated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_strict() {
        assert_eq!(PromptVariant::select(Some(0.5), 0.5), PromptVariant::Standard);
        assert_eq!(PromptVariant::select(Some(0.51), 0.5), PromptVariant::Escalated);
    }

    #[test]
    fn no_score_means_standard() {
        assert_eq!(PromptVariant::select(None, 0.0), PromptVariant::Standard);
    }

    #[test]
    fn variants_map_to_their_profiles() {
        let agents = AgentsConfig::default();
        assert_eq!(
            PromptVariant::Standard.profile(&agents).system_prompt,
            agents.support.system_prompt
        );
        assert_eq!(
            PromptVariant::Escalated.profile(&agents).system_prompt,
            agents.escalated.system_prompt
        );
    }
}
