//! Unified error types for the bot.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("tariff table error: {0}")]
    Tariffs(String),

    #[error("telegram {method} failed ({status}): {description}")]
    Telegram {
        method: String,
        status: u16,
        description: String,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BotError>;
