//! Configuration loading, validation, and management for replybot.
//!
//! Loads configuration from `~/.replybot/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use replybot_core::model::ModelId;
use replybot_core::request::{DEFAULT_STOP_PATTERN, DEFAULT_TEMPERATURE, MAX_REPLY_TOKENS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reply sent when every generation in a request was rated unsafe.
pub const DEFAULT_FALLBACK_RESPONSE: &str = "*Yaaaawn*... eh, I dont really feel like it";

/// Regenerations allowed after an unsafe rating before giving up.
pub const DEFAULT_MAX_COMPLETION_RETRIES: u32 = 5;

pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

pub const DEFAULT_CLASSIFIER_MODEL: &str = "content-filter-alpha-c4";

pub const DEFAULT_CLASSIFIER_SENTINEL: &str = "<|endoftext|>";

/// Handle the bot replies from.
pub const DEFAULT_BOT_HANDLE: &str = "@rook_bot";

/// Handle of the user the bot is talking to.
pub const DEFAULT_USER_HANDLE: &str = "@replybot_user";

pub const DEFAULT_PREAMBLE: &str = "The following is a conversation on Twitter between a user (username @replybot_user) \
and their AI assistant Rook (username @rook_bot). Rook is helpful, creative, clever, knowledgeable about myths, \
legends, jokes, folk tales and storytelling from all cultures, and very friendly. Rook is also known to make \
the occasional sarcastic remark.

User:@rook_bot Rook, I can't decide if I should keep working on this project or relax and read a book.

Rook:@replybot_user You need to stop being so indecisive. Just pick one and you'll be all right in the end.

";

/// The root configuration structure.
///
/// Maps directly to `~/.replybot/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used for replies
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Sampling temperature used for replies
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Stop pattern applied to replies
    #[serde(default = "default_stop_pattern")]
    pub default_stop_pattern: String,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub safety: SafetyConfig,

    #[serde(default)]
    pub persona: PersonaConfig,
}

fn default_model() -> String {
    ModelId::Davinci.as_str().into()
}
fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}
fn default_stop_pattern() -> String {
    DEFAULT_STOP_PATTERN.into()
}

/// Redact a secret for Debug output.
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
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_stop_pattern", &self.default_stop_pattern)
            .field("engine", &self.engine)
            .field("pipeline", &self.pipeline)
            .field("safety", &self.safety)
            .field("persona", &self.persona)
            .finish()
    }
}

/// Where and how to reach the completion engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_engine_name")]
    pub name: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-call timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_engine_name() -> String {
    "openai".into()
}
fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: default_engine_name(),
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Queue and retry settings for the completion worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default = "default_max_completion_retries")]
    pub max_completion_retries: u32,

    /// Upper bound for a request's `max_tokens`
    #[serde(default = "default_max_reply_tokens")]
    pub max_reply_tokens: u32,

    #[serde(default = "default_fallback_response")]
    pub fallback_response: String,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}
fn default_max_completion_retries() -> u32 {
    DEFAULT_MAX_COMPLETION_RETRIES
}
fn default_max_reply_tokens() -> u32 {
    MAX_REPLY_TOKENS
}
fn default_fallback_response() -> String {
    DEFAULT_FALLBACK_RESPONSE.into()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            max_completion_retries: default_max_completion_retries(),
            max_reply_tokens: default_max_reply_tokens(),
            fallback_response: default_fallback_response(),
        }
    }
}

/// Content classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,

    /// Document separator placed before the text being classified
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
}

fn default_classifier_model() -> String {
    DEFAULT_CLASSIFIER_MODEL.into()
}
fn default_sentinel() -> String {
    DEFAULT_CLASSIFIER_SENTINEL.into()
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            classifier_model: default_classifier_model(),
            sentinel: default_sentinel(),
        }
    }
}

/// Persona framing used when rendering a thread into a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    #[serde(default = "default_preamble")]
    pub preamble: String,

    /// Speaker tag for the bot's own turns
    #[serde(default = "default_assistant_tag")]
    pub assistant_tag: String,

    /// Speaker tag for everyone else
    #[serde(default = "default_other_tag")]
    pub other_tag: String,

    /// Mention placed after the user's tag, addressing the bot
    #[serde(default = "default_bot_handle")]
    pub bot_handle: String,

    /// Mention placed after the bot's tag, addressing the user
    #[serde(default = "default_user_handle")]
    pub user_handle: String,
}

fn default_preamble() -> String {
    DEFAULT_PREAMBLE.into()
}
fn default_assistant_tag() -> String {
    "Rook:".into()
}
fn default_other_tag() -> String {
    "User:".into()
}
fn default_bot_handle() -> String {
    DEFAULT_BOT_HANDLE.into()
}
fn default_user_handle() -> String {
    DEFAULT_USER_HANDLE.into()
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            preamble: default_preamble(),
            assistant_tag: default_assistant_tag(),
            other_tag: default_other_tag(),
            bot_handle: default_bot_handle(),
            user_handle: default_user_handle(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.replybot/config.toml).
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load from `path`, then apply environment variable overrides:
    /// - `REPLYBOT_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `REPLYBOT_MODEL`
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("REPLYBOT_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("REPLYBOT_MODEL") {
            config.default_model = model;
            config.validate()?;
        }

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

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".replybot")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.default_temperature) {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 1.0".into(),
            ));
        }

        if !ModelId::is_valid(&self.default_model) {
            return Err(ConfigError::ValidationError(format!(
                "default_model '{}' is not a known model",
                self.default_model
            )));
        }

        if self.pipeline.queue_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.queue_capacity must be > 0".into(),
            ));
        }

        if self.pipeline.max_reply_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.max_reply_tokens must be > 0".into(),
            ));
        }

        if self.engine.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "engine.timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Render as TOML with secrets removed.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut redacted = self.clone();
        redacted.api_key = None;
        toml::to_string_pretty(&redacted)
            .map_err(|e| ConfigError::ValidationError(format!("cannot serialize config: {e}")))
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_stop_pattern: default_stop_pattern(),
            engine: EngineConfig::default(),
            pipeline: PipelineConfig::default(),
            safety: SafetyConfig::default(),
            persona: PersonaConfig::default(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_model, "davinci");
        assert_eq!(config.pipeline.queue_capacity, 10);
        assert_eq!(config.pipeline.max_completion_retries, 5);
        assert_eq!(config.pipeline.max_reply_tokens, 55);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_model, config.default_model);
        assert_eq!(parsed.persona.preamble, config.persona.preamble);
        assert_eq!(parsed.default_stop_pattern, DEFAULT_STOP_PATTERN);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 1.5,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_model_rejected() {
        let config = AppConfig {
            default_model: "gpt-4o".into(),
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("gpt-4o"));
    }

    #[test]
    fn zero_capacity_rejected() {
        let mut config = AppConfig::default();
        config.pipeline.queue_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.default_model, "davinci");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
default_model = "curie"

[pipeline]
max_completion_retries = 2

[persona]
assistant_tag = "Bot:"
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.default_model, "curie");
        assert_eq!(config.pipeline.max_completion_retries, 2);
        assert_eq!(config.pipeline.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.persona.assistant_tag, "Bot:");
        assert_eq!(config.persona.other_tag, "User:");
        assert_eq!(config.safety.classifier_model, DEFAULT_CLASSIFIER_MODEL);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_model = [").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn engine_section_parses() {
        let toml_str = r#"
[engine]
name = "selfhosted"
api_url = "http://localhost:8000/v1"
timeout_secs = 30
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine.name, "selfhosted");
        assert_eq!(config.engine.api_url, "http://localhost:8000/v1");
        assert_eq!(config.engine.timeout_secs, 30);
    }

    #[test]
    fn persona_handles_default_and_override() {
        let config: AppConfig = toml::from_str("[persona]\nuser_handle = \"@someone\"\n").unwrap();
        assert_eq!(config.persona.bot_handle, DEFAULT_BOT_HANDLE);
        assert_eq!(config.persona.user_handle, "@someone");
        assert!(DEFAULT_PREAMBLE.contains(DEFAULT_BOT_HANDLE));
        assert!(DEFAULT_PREAMBLE.contains(DEFAULT_USER_HANDLE));
    }

    #[test]
    fn debug_and_redacted_toml_hide_secrets() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };

        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));

        let rendered = config.to_redacted_toml().unwrap();
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("api.openai.com"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("davinci"));
        assert!(toml_str.contains("content-filter-alpha-c4"));
    }
}
