use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub gemini_api_key: String,
    /// Model for the live audio relay. Must be a native-audio live model.
    pub live_model: String,
    /// Model for the text-only chat endpoint.
    pub chat_model: String,
    pub voice: String,
    pub system_prompt: String,
    pub canvas_url: String,
    pub interpreter_url: String,
    pub summarizer_url: String,
    /// Attempt ceiling for the canvas validate-and-repair loop.
    pub canvas_retry_limit: u32,
    pub log_level: Level,
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful voice assistant. Keep spoken replies short \
and conversational. Use the available tools when they help; mention generated artifacts by title.";

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ConfigError::MissingVar("GEMINI_API_KEY".to_string()))?;

        let live_model = std::env::var("LIVE_MODEL")
            .unwrap_or_else(|_| "models/gemini-2.5-flash-native-audio-preview-09-2025".to_string());
        let chat_model = std::env::var("CHAT_MODEL")
            .unwrap_or_else(|_| "models/gemini-live-2.5-flash-preview".to_string());
        let voice = std::env::var("VOICE_NAME").unwrap_or_else(|_| "Puck".to_string());
        let system_prompt =
            std::env::var("SYSTEM_PROMPT").unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_string());

        let canvas_url =
            std::env::var("CANVAS_URL").unwrap_or_else(|_| "http://127.0.0.1:8801".to_string());
        let interpreter_url = std::env::var("INTERPRETER_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8802".to_string());
        let summarizer_url = std::env::var("SUMMARIZER_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8803".to_string());

        let canvas_retry_limit = match std::env::var("CANVAS_RETRY_LIMIT") {
            Err(_) => 3,
            Ok(raw) => raw.parse::<u32>().ok().filter(|n| *n >= 1).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "CANVAS_RETRY_LIMIT".to_string(),
                    format!("'{raw}' is not a positive attempt count"),
                )
            })?,
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            gemini_api_key,
            live_model,
            chat_model,
            voice,
            system_prompt,
            canvas_url,
            interpreter_url,
            summarizer_url,
            canvas_retry_limit,
            log_level,
        })
    }
}
