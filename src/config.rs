//! Configuration — TOML file defaults + environment variable overrides.
//!
//! Service parameters live in `config/default.toml`.
//! Secrets (bot token, LLM API key) come from environment variables.

use serde::Deserialize;
use std::env;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub tariffs: TariffsConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    /// Chat that receives lead and calculation alerts.
    pub admin_chat_id: Option<String>,
    #[serde(default = "default_telegram_api")]
    pub api_base_url: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Chats silent for this long lose their dialog state.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            admin_chat_id: None,
            api_base_url: default_telegram_api(),
            poll_interval_ms: default_poll_interval(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".into()
}
fn default_poll_interval() -> u64 {
    1000
}
fn default_session_ttl() -> u64 {
    86_400
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_max_tokens() -> u32 {
    800
}
fn default_temperature() -> f32 {
    0.7
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct TariffsConfig {
    /// TOML file with marketplace and service tariffs. The bundled table is
    /// used when the file does not exist.
    #[serde(default = "default_tariffs_path")]
    pub path: String,
}

impl Default for TariffsConfig {
    fn default() -> Self {
        Self {
            path: default_tariffs_path(),
        }
    }
}

fn default_tariffs_path() -> String {
    "config/tariffs.toml".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_port(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_output: false,
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from `config/default.toml` merged with env vars.
    /// Structured overrides use the `FF__SECTION__KEY` form.
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(
                config::Environment::with_prefix("FF")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: Config = builder.try_deserialize()?;
        cfg.apply_secret_env();
        Ok(cfg)
    }

    // Secrets should never be in TOML.
    fn apply_secret_env(&mut self) {
        if let Ok(v) = env::var("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = non_empty(v);
        }
        if let Ok(v) = env::var("TELEGRAM_ADMIN_CHAT_ID") {
            self.telegram.admin_chat_id = non_empty(v);
        }
        if let Ok(v) = env::var("OPENAI_API_KEY") {
            self.assistant.api_key = non_empty(v);
        }
        if let Ok(v) = env::var("OPENAI_BASE_URL") {
            if !v.trim().is_empty() {
                self.assistant.base_url = v;
            }
        }
    }
}

fn non_empty(v: String) -> Option<String> {
    let v = v.trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}
