//! Ollama embedding client.

use super::Embedder;
use crate::llm::{LlmHttpConfig, build_http_client, describe_reqwest_error, normalize_endpoint};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Embedder backed by Ollama's `/api/embed` endpoint.
pub struct OllamaEmbedder {
    /// API endpoint.
    endpoint: String,
    /// Embedding model.
    model: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl OllamaEmbedder {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "http://localhost:11434";

    /// Default embedding model.
    pub const DEFAULT_MODEL: &'static str = "nomic-embed-text";

    /// Creates a new embedder from `OLLAMA_HOST` / `TODO_RPG_EMBED_MODEL` or defaults.
    #[must_use]
    pub fn new() -> Self {
        let endpoint = std::env::var("OLLAMA_HOST")
            .map_or_else(|_| Self::DEFAULT_ENDPOINT.to_string(), |h| normalize_endpoint(&h));
        let model = std::env::var("TODO_RPG_EMBED_MODEL")
            .unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string());

        Self {
            endpoint,
            model,
            client: build_http_client(LlmHttpConfig::from_env()),
        }
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = normalize_endpoint(&endpoint.into());
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets HTTP client timeouts.
    #[must_use]
    pub fn with_http_config(mut self, config: LlmHttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    /// Returns the model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let expected = input.len();
        let request = EmbedRequest {
            model: &self.model,
            input,
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.endpoint.trim_end_matches('/')))
            .json(&request)
            .send()
            .map_err(|e| {
                let error_kind = describe_reqwest_error(&e);
                tracing::error!(
                    provider = "ollama",
                    model = %self.model,
                    error = %e,
                    error_kind,
                    "Embedding request failed"
                );
                Error::Transport {
                    operation: "ollama_embed".to_string(),
                    cause: format!("{error_kind} error: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            tracing::error!(
                provider = "ollama",
                model = %self.model,
                status = %status,
                body = %body,
                "Embedding API returned error status"
            );
            return Err(Error::Transport {
                operation: "ollama_embed".to_string(),
                cause: format!("API returned status: {status} - {body}"),
            });
        }

        let response: EmbedResponse = response.json().map_err(|e| Error::Transport {
            operation: "ollama_embed_response".to_string(),
            cause: e.to_string(),
        })?;

        if response.embeddings.len() != expected {
            return Err(Error::Transport {
                operation: "ollama_embed_response".to_string(),
                cause: format!(
                    "expected {expected} embeddings, got {}",
                    response.embeddings.len()
                ),
            });
        }

        Ok(response.embeddings)
    }
}

impl Default for OllamaEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for OllamaEmbedder {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("Cannot embed empty text".to_string()));
        }
        self.request(vec![text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Transport {
                operation: "ollama_embed_response".to_string(),
                cause: "No embedding returned from model".to_string(),
            })
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(Error::InvalidInput("Cannot embed empty text".to_string()));
        }
        self.request(texts.iter().map(|t| (*t).to_string()).collect())
    }
}

/// Request to the Embed API.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<String>,
}

/// Response from the Embed API.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_configuration() {
        let embedder = OllamaEmbedder::new()
            .with_endpoint("http://ada.local:11434")
            .with_model("mxbai-embed-large");

        assert_eq!(embedder.endpoint, "http://ada.local:11434");
        assert_eq!(embedder.model(), "mxbai-embed-large");
        assert_eq!(embedder.name(), "ollama");
    }

    #[test]
    fn test_request_serialization() {
        let request = EmbedRequest {
            model: "nomic-embed-text",
            input: vec!["Buy sword".to_string()],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "nomic-embed-text");
        assert_eq!(json["input"][0], "Buy sword");
    }

    #[test]
    fn test_response_parsing() {
        let response: EmbedResponse =
            serde_json::from_str(r#"{"model":"m","embeddings":[[0.1,0.2],[0.3,0.4]]}"#).unwrap();
        assert_eq!(response.embeddings.len(), 2);
    }

    #[test]
    fn test_empty_text_rejected_without_request() {
        let embedder = OllamaEmbedder::new().with_endpoint("http://127.0.0.1:9");
        assert!(matches!(embedder.embed(" "), Err(Error::InvalidInput(_))));
        assert!(embedder.embed_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_unreachable_endpoint_is_transport_error() {
        let embedder = OllamaEmbedder::new()
            .with_endpoint("http://127.0.0.1:9")
            .with_http_config(LlmHttpConfig {
                timeout_ms: 500,
                connect_timeout_ms: 200,
            });
        assert!(matches!(embedder.embed("Train"), Err(Error::Transport { .. })));
    }
}
