// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session title derivation.

use hintly_config::model::AgentProfile;
use hintly_core::traits::GenerationAdapter;
use hintly_core::types::GenerationPurpose;
use tracing::warn;

use crate::topic::request_for;

/// Longest generated title accepted as is.
pub const MAX_TITLE_CHARS: usize = 100;

/// Length of the literal excerpt used when summarization is not usable.
const FALLBACK_EXCERPT_CHARS: usize = 50;

/// Ask the title agent for a title, falling back to an excerpt of `problem`.
pub async fn derive_title(
    generator: &dyn GenerationAdapter,
    profile: &AgentProfile,
    problem: &str,
    code: &str,
) -> String {
    let request = request_for(
        profile,
        GenerationPurpose::Title,
        format!("Problem:\n\n{problem}\n\nCode:\n\n{code}"),
    );

    match generator.generate(request).await {
        Ok(response) => match response.extract_text() {
            Some(title) if title.chars().count() <= MAX_TITLE_CHARS => title,
            Some(title) => {
                warn!(chars = title.chars().count(), "generated title too long, using excerpt");
                fallback_title(problem)
            }
            None => {
                warn!("generated title was empty, using excerpt");
                fallback_title(problem)
            }
        },
        Err(e) => {
            warn!(error = %e, "title summarization failed, using excerpt");
            fallback_title(problem)
        }
    }
}

/// First 50 characters of the problem, with an ellipsis when cut.
pub fn fallback_title(problem: &str) -> String {
    let problem = problem.trim();
    if problem.chars().count() > FALLBACK_EXCERPT_CHARS {
        let excerpt: String = problem.chars().take(FALLBACK_EXCERPT_CHARS).collect();
        format!("{excerpt}...")
    } else {
        problem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hintly_config::model::AgentsConfig;
    use hintly_test_utils::{MockGenerator, MockReply};

    #[tokio::test]
    async fn generated_title_is_trimmed_and_kept() {
        let generator = MockGenerator::new();
        generator
            .push_text(GenerationPurpose::Title, "  Infinite while loop  \n")
            .await;
        let agents = AgentsConfig::default();
        let title = derive_title(&generator, &agents.title, "loop never terminates", "while True: pass").await;
        assert_eq!(title, "Infinite while loop");

        let request = &generator.requests().await[0];
        assert_eq!(
            request.prompt,
            "Problem:\n\nloop never terminates\n\nCode:\n\nwhile True: pass"
        );
        assert_eq!(request.system_instruction, agents.title.system_prompt);
    }

    #[tokio::test]
    async fn empty_or_long_titles_fall_back() {
        let generator = MockGenerator::new();
        generator.push(GenerationPurpose::Title, MockReply::Empty).await;
        generator
            .push_text(GenerationPurpose::Title, &"x".repeat(MAX_TITLE_CHARS + 1))
            .await;
        let agents = AgentsConfig::default();

        assert_eq!(derive_title(&generator, &agents.title, "p1", "").await, "p1");
        assert_eq!(derive_title(&generator, &agents.title, "p2", "").await, "p2");
    }

    #[test]
    fn short_problem_is_used_verbatim() {
        assert_eq!(fallback_title("loop never terminates"), "loop never terminates");
    }

    #[test]
    fn long_problem_is_cut_on_char_boundary() {
        let problem = "é".repeat(60);
        let title = fallback_title(&problem);
        assert!(title.ends_with("..."));
        assert_eq!(title.chars().count(), 53);
    }
}
