// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Hintly tutoring backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Hintly configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HintlyConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Bearer token to user mapping.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Gemini generation service settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Frustration classifier settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Topic tracking and escalation thresholds.
    #[serde(default)]
    pub tutor: TutorConfig,

    /// Per call-site model, sampling and system prompt.
    #[serde(default)]
    pub agents: AgentsConfig,

    /// Log level and optional log directory.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Browser origins allowed by CORS.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

/// Static API token table.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Users allowed to call the API. Empty means every request is rejected.
    #[serde(default)]
    pub users: Vec<ApiUserConfig>,
}

/// One API user and the bearer token identifying them.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiUserConfig {
    pub user_id: String,
    pub token: String,
}

impl std::fmt::Debug for ApiUserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiUserConfig")
            .field("user_id", &self.user_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Gemini API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. `None` falls back to `GEMINI_API_KEY` / `GOOGLE_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the `generateContent` REST API.
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_gemini_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries on transient HTTP status codes (429, 500, 503).
    #[serde(default = "default_gemini_max_retries")]
    pub max_retries: u32,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_gemini_api_base(),
            timeout_secs: default_gemini_timeout_secs(),
            max_retries: default_gemini_max_retries(),
        }
    }
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_timeout_secs() -> u64 {
    60
}

fn default_gemini_max_retries() -> u32 {
    1
}

/// Frustration classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Scoring endpoint URL. `None` disables frustration fusion entirely.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_classifier_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_classifier_timeout_secs(),
        }
    }
}

fn default_classifier_timeout_secs() -> u64 {
    10
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("hintly").join("hintly.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("hintly.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Topic tracking and escalation thresholds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TutorConfig {
    /// Seconds of inactivity after which the next message starts a fresh topic.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Fused frustration score above which the escalated prompt is used.
    #[serde(default = "default_frustration_threshold")]
    pub frustration_threshold: f64,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            frustration_threshold: default_frustration_threshold(),
        }
    }
}

fn default_idle_timeout_secs() -> u64 {
    30 * 60
}

fn default_frustration_threshold() -> f64 {
    0.5
}

/// Model, sampling and instruction for one generation call site.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentProfile {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_top_p")]
    pub top_p: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// System instruction sent verbatim with every request from this call site.
    #[serde(default)]
    pub system_prompt: String,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_temperature() -> f64 {
    0.25
}

fn default_top_p() -> f64 {
    0.95
}

fn default_max_tokens() -> u32 {
    512
}

/// Generation call sites.
///
/// Each profile has its own defaults; a partially specified profile in a
/// config file keeps the remaining defaults when loaded through the loader.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentsConfig {
    /// Standard tutoring reply.
    #[serde(default = "default_support_profile")]
    pub support: AgentProfile,

    /// Tutoring reply once the learner appears frustrated.
    #[serde(default = "default_escalated_profile")]
    pub escalated: AgentProfile,

    /// Session title summarization.
    #[serde(default = "default_title_profile")]
    pub title: AgentProfile,

    /// Topic summary for a fresh or drifted topic.
    #[serde(default = "default_topic_profile")]
    pub topic: AgentProfile,

    /// Yes/no topic continuity question.
    #[serde(default = "default_continuity_profile")]
    pub continuity: AgentProfile,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            support: default_support_profile(),
            escalated: default_escalated_profile(),
            title: default_title_profile(),
            topic: default_topic_profile(),
            continuity: default_continuity_profile(),
        }
    }
}

const SUPPORT_PROMPT: &str = "You are a code feedback mentor helping a learner debug their own program.
If a Syntax Errors section is present, acknowledge those errors in your reply.
Give hints and one guiding question; never write out a full corrected solution.
Reply in plain text without markdown, code fences, titles or headers.
Be concise and polite, and point to line numbers when it helps.
If the problem is unclear, ask a clarifying question instead of guessing.
If the learner asks whether their answer is now correct, start with Yes or No and explain briefly.";

const ESCALATED_PROMPT: &str = "You are a patient code feedback mentor. The learner has been stuck on this problem for a while and is getting frustrated.
Start by briefly and warmly acknowledging that this part is tricky.
Narrow the next step down to one small, concrete thing to check, and point to the exact line when you can.
If a Syntax Errors section is present, explain the first error in simple words.
You may show a single line illustrating the idea, but never write out a full corrected solution.
Reply in plain text without markdown, code fences, titles or headers, and keep it short.";

const TITLE_PROMPT: &str = "Write a short title, at most eight words, for a tutoring session about the learner's problem below. Reply with the title only, without quotes or trailing punctuation.";

const TOPIC_PROMPT: &str = "Summarize what the learner's message is about in two or three sentences. Name the programming concept or bug being discussed, not the learner. Reply in plain text.";

const CONTINUITY_PROMPT: &str = "You decide whether a new tutoring message continues an ongoing topic. Answer with exactly one word: yes or no.";

fn default_support_profile() -> AgentProfile {
    AgentProfile {
        model: default_model(),
        temperature: default_temperature(),
        top_p: default_top_p(),
        max_tokens: default_max_tokens(),
        system_prompt: SUPPORT_PROMPT.to_string(),
    }
}

fn default_escalated_profile() -> AgentProfile {
    AgentProfile {
        temperature: 0.4,
        system_prompt: ESCALATED_PROMPT.to_string(),
        ..default_support_profile()
    }
}

fn default_title_profile() -> AgentProfile {
    AgentProfile {
        model: default_model(),
        temperature: 0.2,
        top_p: default_top_p(),
        max_tokens: 64,
        system_prompt: TITLE_PROMPT.to_string(),
    }
}

fn default_topic_profile() -> AgentProfile {
    AgentProfile {
        model: default_model(),
        temperature: 0.2,
        top_p: default_top_p(),
        max_tokens: 200,
        system_prompt: TOPIC_PROMPT.to_string(),
    }
}

fn default_continuity_profile() -> AgentProfile {
    AgentProfile {
        model: default_model(),
        temperature: 0.0,
        top_p: 1.0,
        max_tokens: 8,
        system_prompt: CONTINUITY_PROMPT.to_string(),
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files. `None` logs to stderr only.
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tutoring_profile() {
        let config = HintlyConfig::default();
        assert_eq!(config.agents.support.temperature, 0.25);
        assert_eq!(config.agents.support.top_p, 0.95);
        assert_eq!(config.agents.support.max_tokens, 512);
        assert_eq!(config.tutor.frustration_threshold, 0.5);
        assert_eq!(config.tutor.idle_timeout_secs, 1800);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
        assert!(config.classifier.endpoint.is_none());
    }

    #[test]
    fn escalated_profile_differs_only_in_tone() {
        let agents = AgentsConfig::default();
        assert_ne!(agents.support.system_prompt, agents.escalated.system_prompt);
        assert_eq!(agents.support.model, agents.escalated.model);
        assert_eq!(agents.support.max_tokens, agents.escalated.max_tokens);
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let user = ApiUserConfig {
            user_id: "ada".into(),
            token: "tok-secret".into(),
        };
        let gemini = GeminiConfig {
            api_key: Some("AIza-secret".into()),
            ..GeminiConfig::default()
        };
        let debug = format!("{user:?} {gemini:?}");
        assert!(debug.contains("ada"));
        assert!(!debug.contains("tok-secret"));
        assert!(!debug.contains("AIza-secret"));
    }

    #[test]
    fn partial_section_uses_field_defaults() {
        let config: HintlyConfig = toml::from_str("[tutor]\nidle_timeout_secs = 60\n").unwrap();
        assert_eq!(config.tutor.idle_timeout_secs, 60);
        assert_eq!(config.tutor.frustration_threshold, 0.5);
    }
}
