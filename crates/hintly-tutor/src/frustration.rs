// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frustration fusion: classifier score plus a topic-persistence penalty.
//!
//! The longer a learner stays on one topic, the more likely they are stuck.
//! The penalty grows by 0.1 per turn on the topic and caps at 0.5 from the
//! fifth turn on. The fused score is clamped to [0, 1].

use hintly_core::types::FrustrationAnalysis;

/// Topic length from which the penalty stops growing.
const PENALTY_CAP_LENGTH: u32 = 5;
const PENALTY_CAP: f64 = 0.5;

/// Penalty for having spent `topic_length` turns on the current topic.
///
/// Negative for a topic that was just (re)started.
pub fn topic_penalty(topic_length: u32) -> f64 {
    if topic_length < PENALTY_CAP_LENGTH {
        // Tenths by division: 0.2 + 3/10 is exactly 0.5, 0.2 + 0.1 * 3 is not.
        (f64::from(topic_length) - 1.0) / 10.0
    } else {
        PENALTY_CAP
    }
}

/// Fuse a raw classifier probability with the topic penalty.
pub fn fuse(raw: f64, topic_length: u32) -> f64 {
    (raw + topic_penalty(topic_length)).clamp(0.0, 1.0)
}

/// Fuse an optional analysis. `None` means the classifier was skipped or
/// unavailable, and no score is produced.
pub fn fuse_analysis(analysis: Option<&FrustrationAnalysis>, topic_length: u32) -> Option<f64> {
    analysis.map(|a| fuse(a.frustration_probability, topic_length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn penalty_steps_then_caps() {
        assert!(approx(topic_penalty(0), -0.1));
        assert!(approx(topic_penalty(1), 0.0));
        assert!(approx(topic_penalty(4), 0.3));
        assert!(approx(topic_penalty(5), 0.5));
        assert!(approx(topic_penalty(500), 0.5));
    }

    #[test]
    fn long_topic_with_mild_score_escalates() {
        assert!(approx(fuse(0.2, 5), 0.7));
        assert!(approx(fuse(0.2, 4), 0.5));
    }

    #[test]
    fn score_on_threshold_is_not_above_it() {
        assert!(fuse(0.2, 4) <= 0.5);
    }

    #[test]
    fn clamps_at_both_ends() {
        assert_eq!(fuse(1.0, 10), 1.0);
        assert_eq!(fuse(0.0, 0), 0.0);
    }

    #[test]
    fn missing_analysis_skips_fusion() {
        assert_eq!(fuse_analysis(None, 7), None);
        let analysis = FrustrationAnalysis {
            frustration_probability: 0.4,
            is_frustrated: false,
        };
        assert!(approx(fuse_analysis(Some(&analysis), 2).unwrap(), 0.5));
    }

    proptest! {
        #[test]
        fn fused_score_stays_in_unit_interval(raw in 0.0f64..=1.0, len in any::<u32>()) {
            let fused = fuse(raw, len);
            prop_assert!((0.0..=1.0).contains(&fused));
        }

        #[test]
        fn fusion_never_lowers_score_on_established_topic(raw in 0.0f64..=1.0, len in 1u32..1000) {
            prop_assert!(fuse(raw, len) >= raw);
        }
    }
}
