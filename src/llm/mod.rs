//! LLM client abstraction.
//!
//! The narrator is whatever [`LlmProvider`] the session is given: the prompt
//! goes in, the generated text comes back verbatim. Decoding parameters are
//! fixed per client through [`GenerationOptions`].

mod ollama;

pub use ollama::OllamaClient;

use crate::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Trait for LLM providers.
pub trait LlmProvider: Send + Sync {
    /// The provider name.
    fn name(&self) -> &'static str;

    /// Generates a completion for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transport`] if the request fails for any reason.
    /// There is no retry and no partial response.
    fn complete(&self, prompt: &str) -> Result<String>;
}

impl<P: LlmProvider + ?Sized> LlmProvider for Arc<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt)
    }
}

impl<P: LlmProvider + ?Sized> LlmProvider for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt)
    }
}

/// Fixed decoding parameters sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// How long the server keeps the model loaded; negative keeps it forever.
    pub keep_alive: i64,
}

impl GenerationOptions {
    /// Default sampling temperature.
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Keep the model loaded between commands.
    pub const KEEP_LOADED: i64 = -1;
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: Self::DEFAULT_TEMPERATURE,
            keep_alive: Self::KEEP_LOADED,
        }
    }
}

/// Model options block of a generation request.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct ModelOptions {
    pub(crate) temperature: f32,
}

/// HTTP client configuration for LLM and embedding requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmHttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for LlmHttpConfig {
    fn default() -> Self {
        // Local generation can take minutes; only the connect phase is bounded.
        Self {
            timeout_ms: 0,
            connect_timeout_ms: 3_000,
        }
    }
}

impl LlmHttpConfig {
    /// Loads HTTP configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Loads HTTP configuration from config file settings.
    #[must_use]
    pub fn from_config(config: &crate::config::LlmConfig) -> Self {
        let mut settings = Self::default();
        if let Some(timeout_ms) = config.timeout_ms {
            settings.timeout_ms = timeout_ms;
        }
        if let Some(connect_timeout_ms) = config.connect_timeout_ms {
            settings.connect_timeout_ms = connect_timeout_ms;
        }
        settings
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(timeout_ms) = env_u64("TODO_RPG_LLM_TIMEOUT_MS") {
            self.timeout_ms = timeout_ms;
        }
        if let Some(connect_timeout_ms) = env_u64("TODO_RPG_LLM_CONNECT_TIMEOUT_MS") {
            self.connect_timeout_ms = connect_timeout_ms;
        }
        self
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Builds a blocking HTTP client with configured timeouts.
#[must_use]
pub fn build_http_client(config: LlmHttpConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder();
    builder = if config.timeout_ms > 0 {
        builder.timeout(Duration::from_millis(config.timeout_ms))
    } else {
        builder.timeout(None)
    };
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}

/// Normalizes an endpoint such as `OLLAMA_HOST`, which may omit the scheme.
#[must_use]
pub fn normalize_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}

/// Classifies a transport failure for logs and error messages.
#[must_use]
pub fn describe_reqwest_error(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_decode() {
        "decode"
    } else if e.is_request() {
        "request"
    } else {
        "unknown"
    }
}
