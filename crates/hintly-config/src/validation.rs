// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: sampling ranges,
//! thresholds, non-empty prompts, unique API tokens.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{AgentProfile, HintlyConfig};

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &HintlyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("server.host must not be empty"));
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host.chars().all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::validation(format!(
            "server.host `{host}` is not a valid IP address or hostname"
        )));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    let threshold = config.tutor.frustration_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        errors.push(ConfigError::validation(format!(
            "tutor.frustration_threshold must be between 0 and 1, got {threshold}"
        )));
    }

    if config.tutor.idle_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "tutor.idle_timeout_secs must be greater than 0",
        ));
    }

    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    if !LEVELS.contains(&config.logging.level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::validation(format!(
            "logging.level `{}` must be one of {}",
            config.logging.level,
            LEVELS.join(", ")
        )));
    }

    if let Some(endpoint) = &config.classifier.endpoint
        && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
    {
        errors.push(ConfigError::validation(format!(
            "classifier.endpoint `{endpoint}` must be an http(s) URL"
        )));
    }

    if !(config.gemini.api_base.starts_with("http://")
        || config.gemini.api_base.starts_with("https://"))
    {
        errors.push(ConfigError::validation(format!(
            "gemini.api_base `{}` must be an http(s) URL",
            config.gemini.api_base
        )));
    }

    let agents = &config.agents;
    for (name, profile) in [
        ("support", &agents.support),
        ("escalated", &agents.escalated),
        ("title", &agents.title),
        ("topic", &agents.topic),
        ("continuity", &agents.continuity),
    ] {
        validate_profile(name, profile, &mut errors);
    }

    let mut tokens = HashSet::new();
    let mut user_ids = HashSet::new();
    for (i, user) in config.auth.users.iter().enumerate() {
        if user.user_id.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "auth.users[{i}].user_id must not be empty"
            )));
        } else if !user_ids.insert(user.user_id.as_str()) {
            errors.push(ConfigError::validation(format!(
                "duplicate user_id `{}` in [[auth.users]]",
                user.user_id
            )));
        }

        if user.token.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "auth.users[{i}].token must not be empty"
            )));
        } else if !tokens.insert(user.token.as_str()) {
            // Never echo the token itself.
            errors.push(ConfigError::validation(format!(
                "auth.users[{i}].token is already assigned to another user"
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_profile(name: &str, profile: &AgentProfile, errors: &mut Vec<ConfigError>) {
    if profile.model.trim().is_empty() {
        errors.push(ConfigError::validation(format!(
            "agents.{name}.model must not be empty"
        )));
    }
    if profile.system_prompt.trim().is_empty() {
        errors.push(ConfigError::validation(format!(
            "agents.{name}.system_prompt must not be empty"
        )));
    }
    if !(0.0..=2.0).contains(&profile.temperature) {
        errors.push(ConfigError::validation(format!(
            "agents.{name}.temperature must be between 0 and 2, got {}",
            profile.temperature
        )));
    }
    if !(profile.top_p > 0.0 && profile.top_p <= 1.0) {
        errors.push(ConfigError::validation(format!(
            "agents.{name}.top_p must be in (0, 1], got {}",
            profile.top_p
        )));
    }
    if profile.max_tokens == 0 {
        errors.push(ConfigError::validation(format!(
            "agents.{name}.max_tokens must be greater than 0"
        )));
    }
}
