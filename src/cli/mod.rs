//! Command-line interface.
//!
//! ```bash
//! # One command, then exit
//! todo-rpg complete task 2
//!
//! # Interactive session
//! todo-rpg
//! ```
//!
//! The factory functions here build the narrator and embedder from
//! [`RpgConfig`]; [`repl`] holds the command loop itself.

pub mod repl;

pub use repl::{
    Console, LineSource, MetaCommand, RustylineSource, ScriptedLines, handle_command,
    run_interactive, run_single,
};

use crate::config::{EmbeddingProvider, LlmConfig, RpgConfig};
use crate::embedding::{Embedder, HashEmbedder, OllamaEmbedder};
use crate::llm::{LlmHttpConfig, OllamaClient};

/// Builds HTTP configuration from LLM config with environment overrides.
#[must_use]
pub fn build_http_config(llm_config: &LlmConfig) -> LlmHttpConfig {
    LlmHttpConfig::from_config(llm_config).with_env_overrides()
}

/// Builds the narrator client from configuration.
#[must_use]
pub fn build_llm_client(config: &RpgConfig) -> OllamaClient {
    let llm_config = &config.llm;
    let mut client = OllamaClient::new().with_options(llm_config.options);
    if let Some(ref model) = llm_config.model {
        client = client.with_model(model);
    }
    if let Some(ref endpoint) = llm_config.endpoint {
        client = client.with_endpoint(endpoint);
    }
    client.with_http_config(build_http_config(llm_config))
}

/// Builds the embedder selected by configuration.
#[must_use]
pub fn build_embedder(config: &RpgConfig) -> Box<dyn Embedder> {
    match config.embedding.provider {
        EmbeddingProvider::Hash => Box::new(HashEmbedder::new()),
        EmbeddingProvider::Ollama => {
            let mut embedder = OllamaEmbedder::new();
            if let Some(ref model) = config.embedding.model {
                embedder = embedder.with_model(model);
            }
            if let Some(endpoint) = config.embedding_endpoint() {
                embedder = embedder.with_endpoint(endpoint);
            }
            Box::new(embedder.with_http_config(build_http_config(&config.llm)))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_llm_client_uses_config_model() {
        let mut config = RpgConfig::new();
        config.llm.model = Some("llama3-tdm".to_string());
        assert_eq!(build_llm_client(&config).model(), "llama3-tdm");
    }

    #[test]
    fn test_build_embedder_by_provider() {
        let mut config = RpgConfig::new();
        config.embedding.provider = EmbeddingProvider::Hash;
        assert_eq!(build_embedder(&config).name(), "hash");

        config.embedding.provider = EmbeddingProvider::Ollama;
        assert_eq!(build_embedder(&config).name(), "ollama");
    }

    #[test]
    fn test_http_config_from_llm_config() {
        let llm = LlmConfig {
            connect_timeout_ms: Some(500),
            ..LlmConfig::default()
        };
        assert_eq!(build_http_config(&llm).connect_timeout_ms, 500);
    }
}
