//! Configuration loading, validation, and management for TaskBot.
//!
//! Loads configuration from `~/.taskbot/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Placeholder credential shipped in the sample `.env`; treated as absent.
pub const PLACEHOLDER_API_KEY: &str = "sua_chave_aqui";

/// The root configuration structure.
///
/// Maps directly to `~/.taskbot/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key (`GEMINI_API_KEY` fills it in when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model passed to the generation endpoint
    #[serde(default = "default_model")]
    pub model: String,

    /// HTTP server configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Upstream generation service configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Conversation history limits
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Prompt configuration
    #[serde(default)]
    pub prompt: PromptConfig,
}

fn default_model() -> String {
    "gemini-pro".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("gateway", &self.gateway)
            .field("provider", &self.provider)
            .field("conversation", &self.conversation)
            .field("prompt", &self.prompt)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Maximum accepted request body in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_port() -> u16 {
    5001
}
fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deadline for a single generation call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_temperature() -> f32 {
    0.7
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Turns kept per user
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Turns rendered into each prompt
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Also record canned fallback replies as bot turns
    #[serde(default)]
    pub record_fallback_replies: bool,

    /// Distinct user identifiers kept in memory
    #[serde(default = "default_max_users")]
    pub max_users: usize,

    /// Conversations idle longer than this are purged
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,

    /// How often the idle sweep runs (0 disables it)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_max_turns() -> usize {
    10
}
fn default_history_window() -> usize {
    6
}
fn default_max_users() -> usize {
    10_000
}
fn default_idle_ttl_secs() -> u64 {
    24 * 60 * 60
}
fn default_sweep_interval_secs() -> u64 {
    300
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            history_window: default_history_window(),
            record_fallback_replies: false,
            max_users: default_max_users(),
            idle_ttl_secs: default_idle_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl ConversationConfig {
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Replace the built-in system prompt entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.taskbot/config.toml).
    ///
    /// Environment variable overrides:
    /// - `GEMINI_API_KEY` (used when the file has no `api_key`)
    /// - `TASKBOT_MODEL`
    /// - `TASKBOT_HOST`
    /// - `TASKBOT_PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through a lookup function.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if self.api_key.is_none() {
            self.api_key = lookup("GEMINI_API_KEY");
        }

        if let Some(model) = lookup("TASKBOT_MODEL") {
            self.model = model;
        }

        if let Some(host) = lookup("TASKBOT_HOST") {
            self.gateway.host = host;
        }

        if let Some(port) = lookup("TASKBOT_PORT") {
            self.gateway.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("TASKBOT_PORT is not a valid port: {port}"))
            })?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".taskbot")
    }

    /// Path of the default config file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.temperature < 0.0 || self.provider.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "provider.timeout_secs must be at least 1".into(),
            ));
        }

        if self.conversation.max_turns == 0 {
            return Err(ConfigError::ValidationError(
                "conversation.max_turns must be at least 1".into(),
            ));
        }

        if self.conversation.history_window == 0 {
            return Err(ConfigError::ValidationError(
                "conversation.history_window must be at least 1".into(),
            ));
        }

        if self.conversation.max_users == 0 {
            return Err(ConfigError::ValidationError(
                "conversation.max_users must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// The API key, if present and not the sample placeholder.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != PLACEHOLDER_API_KEY)
    }

    /// Check if a usable API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.usable_api_key().is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            gateway: GatewayConfig::default(),
            provider: ProviderConfig::default(),
            conversation: ConversationConfig::default(),
            prompt: PromptConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
