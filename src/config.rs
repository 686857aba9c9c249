use crate::completion::CompletionConfig;
use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Default chat-completions endpoint (GroqCloud, OpenAI-compatible).
pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
/// Default model identifier requested from the provider.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

const DEFAULT_CHUNK_SIZE: usize = 2000;
const DEFAULT_CHUNK_OVERLAP: usize = 200;
const DEFAULT_MAP_WORKERS: usize = 4;
const DEFAULT_MAX_TOKENS: u32 = 300;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_RETRIES: usize = 1;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the docbrief server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Chat-completions endpoint URL.
    pub completion_api_url: String,
    /// Bearer credential for the completion provider, when configured.
    pub completion_api_key: Option<String>,
    /// Model identifier passed to the provider.
    pub completion_model: String,
    /// Output token budget per completion call.
    pub completion_max_tokens: u32,
    /// Sampling temperature per completion call.
    pub completion_temperature: f32,
    /// Retries applied by the pipeline to retryable completion failures.
    pub completion_max_retries: usize,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
    /// Bounded concurrency for map-step completion calls.
    pub map_workers: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            completion_api_url: load_env_optional("COMPLETION_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            completion_api_key: load_env_optional("COMPLETION_API_KEY"),
            completion_model: load_env_optional("COMPLETION_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            completion_max_tokens: parse_env("COMPLETION_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            completion_temperature: parse_env("COMPLETION_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            completion_max_retries: parse_env("COMPLETION_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            chunk_size: parse_env("CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            chunk_overlap: parse_env("CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?,
            map_workers: parse_env("MAP_WORKERS", DEFAULT_MAP_WORKERS)?,
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }

    /// Produce the explicit provider settings handed to the completion client.
    ///
    /// The client never reads configuration ambiently; everything it needs is
    /// captured in this value at construction time.
    pub fn completion(&self) -> CompletionConfig {
        CompletionConfig {
            api_url: self.completion_api_url.clone(),
            api_key: self.completion_api_key.clone(),
            model: self.completion_model.clone(),
        }
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
        .map(|parsed| parsed.unwrap_or(default))
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        api_url = %config.completion_api_url,
        model = %config.completion_model,
        chunk_size = config.chunk_size,
        chunk_overlap = config.chunk_overlap,
        map_workers = config.map_workers,
        has_api_key = config.completion_api_key.is_some(),
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_falls_back_to_default() {
        let value: usize = parse_env("DOCBRIEF_UNSET_TEST_VAR", 7).expect("default");
        assert_eq!(value, 7);
    }
}
