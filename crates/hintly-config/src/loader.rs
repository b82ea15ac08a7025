// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./hintly.toml` > `~/.config/hintly/hintly.toml` > `/etc/hintly/hintly.toml`
//! with environment variable overrides via `HINTLY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::HintlyConfig;

/// Top-level sections, used to turn `HINTLY_SECTION_KEY` into `section.key`.
const SECTIONS: &[&str] = &[
    "server",
    "auth",
    "gemini",
    "classifier",
    "storage",
    "tutor",
    "logging",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/hintly/hintly.toml` (system-wide)
/// 3. `~/.config/hintly/hintly.toml` (user XDG config)
/// 4. `./hintly.toml` (local directory)
/// 5. `HINTLY_*` environment variables
pub fn load_config() -> Result<HintlyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<HintlyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HintlyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HintlyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HintlyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(HintlyConfig::default()))
        .merge(Toml::file("/etc/hintly/hintly.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("hintly/hintly.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("hintly.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `HINTLY_TUTOR_IDLE_TIMEOUT_SECS` maps to `tutor.idle_timeout_secs`.
fn env_provider() -> Env {
    Env::prefixed("HINTLY_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(map_env_key("tutor_idle_timeout_secs"), "tutor.idle_timeout_secs");
        assert_eq!(map_env_key("gemini_api_key"), "gemini.api_key");
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
        assert_eq!(map_env_key("unknown_key"), "unknown_key");
    }

    #[test]
    fn partial_agent_profile_keeps_profile_defaults() {
        let config = load_config_from_str("[agents.title]\nmax_tokens = 40\n").unwrap();
        assert_eq!(config.agents.title.max_tokens, 40);
        assert!(!config.agents.title.system_prompt.is_empty());
        assert_eq!(config.agents.title.temperature, 0.2);
    }
}
