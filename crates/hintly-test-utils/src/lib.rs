// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Hintly integration tests.
//!
//! Provides mock adapters and a test harness for deterministic, CI-runnable
//! tests without network access.

pub mod harness;
pub mod mock_classifier;
pub mod mock_generator;

pub use harness::TestHarness;
pub use mock_classifier::MockClassifier;
pub use mock_generator::{MockGenerator, MockReply};
