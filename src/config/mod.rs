//! Configuration management.
//!
//! Configuration is read from a TOML file and then overridden by environment
//! variables (a `.env` file in the working directory is honoured too).
//!
//! # Example TOML
//!
//! ```toml
//! data_dir = "./game-data"
//! retrieval_k = 3
//! auto_apply_edits = false
//!
//! [llm]
//! endpoint = "http://ada.local:11434"
//! model = "llama3-tdm"
//! temperature = 0.7
//! keep_alive = -1
//!
//! [embedding]
//! provider = "ollama"
//! model = "nomic-embed-text"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! file = "/tmp/todo-rpg.log"
//! ```

use crate::llm::GenerationOptions;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "TODO_RPG_CONFIG";

/// Main configuration for todo-rpg.
#[derive(Debug, Clone, PartialEq)]
pub struct RpgConfig {
    /// Directory holding the game files.
    pub data_dir: PathBuf,
    /// Number of context blocks retrieved per command.
    pub retrieval_k: usize,
    /// Apply narrator file edits without asking.
    pub auto_apply_edits: bool,
    /// Narrator configuration.
    pub llm: LlmConfig,
    /// Embedding configuration.
    pub embedding: EmbeddingConfig,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Narrator (LLM) configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// Ollama endpoint.
    pub endpoint: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// Fixed decoding parameters.
    pub options: GenerationOptions,
    /// Request timeout in milliseconds (0 disables).
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds (0 disables).
    pub connect_timeout_ms: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: None,
            options: GenerationOptions::default(),
            timeout_ms: None,
            connect_timeout_ms: None,
        }
    }
}

/// Available embedding providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingProvider {
    /// Ollama `/api/embed`.
    #[default]
    Ollama,
    /// Offline hash-based pseudo-embeddings.
    Hash,
}

impl EmbeddingProvider {
    /// Parses a provider string; unknown names fall back to Ollama.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "hash" | "offline" | "none" => Self::Hash,
            _ => Self::Ollama,
        }
    }
}

/// Embedding configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddingConfig {
    /// Which embedder to use.
    pub provider: EmbeddingProvider,
    /// Ollama endpoint; defaults to the LLM endpoint.
    pub endpoint: Option<String>,
    /// Embedding model name.
    pub model: Option<String>,
}

/// Logging settings as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `todo_rpg=debug`.
    pub level: Option<String>,
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Log file path; stderr when unset.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Context blocks per command.
    pub retrieval_k: Option<usize>,
    /// Apply edits without asking.
    pub auto_apply_edits: Option<bool>,
    /// LLM configuration.
    pub llm: Option<ConfigFileLlm>,
    /// Embedding configuration.
    pub embedding: Option<ConfigFileEmbedding>,
    /// Logging configuration.
    pub logging: Option<LoggingSettings>,
}

/// LLM section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLlm {
    /// Endpoint URL.
    pub endpoint: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Model keep-alive.
    pub keep_alive: Option<i64>,
    /// Request timeout.
    pub timeout_ms: Option<u64>,
    /// Connect timeout.
    pub connect_timeout_ms: Option<u64>,
}

/// Embedding section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileEmbedding {
    /// Provider name.
    pub provider: Option<String>,
    /// Endpoint URL.
    pub endpoint: Option<String>,
    /// Model name.
    pub model: Option<String>,
}

impl Default for RpgConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(Self::DEFAULT_DATA_DIR),
            retrieval_k: Self::DEFAULT_RETRIEVAL_K,
            auto_apply_edits: false,
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl RpgConfig {
    /// Default data directory, relative to the working directory.
    pub const DEFAULT_DATA_DIR: &'static str = "./game-data";

    /// Default number of context blocks retrieved per command.
    pub const DEFAULT_RETRIEVAL_K: usize = 3;

    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration the way the binary does.
    ///
    /// An explicit path wins, then `$TODO_RPG_CONFIG`, then the default
    /// locations. Environment overrides are applied last.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let config = if let Some(path) = path {
            Self::load_from_file(path)?
        } else if let Some(path) = std::env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
        {
            Self::load_from_file(Path::new(&path))?
        } else {
            Self::load_default()
        };

        Ok(config.with_env_overrides())
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::parse_toml(&contents).map_err(|e| match e {
            Error::OperationFailed { operation, cause } => Error::OperationFailed {
                operation,
                cause: format!("{}: {cause}", path.display()),
            },
            other => other,
        })
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration TOML.
    pub fn parse_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the platform config dir, then `~/.config/todo-rpg/`. Returns
    /// defaults if no readable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("todo-rpg").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("todo-rpg")
                .join("config.toml"),
        ];

        for candidate in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(candidate) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(path = %candidate.display(), error = %e, "Ignoring config file"),
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `RpgConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(k) = file.retrieval_k {
            config.retrieval_k = k;
        }
        if let Some(auto_apply) = file.auto_apply_edits {
            config.auto_apply_edits = auto_apply;
        }
        if let Some(llm) = file.llm {
            config.llm.endpoint = llm.endpoint;
            config.llm.model = llm.model;
            if let Some(temperature) = llm.temperature {
                config.llm.options.temperature = temperature;
            }
            if let Some(keep_alive) = llm.keep_alive {
                config.llm.options.keep_alive = keep_alive;
            }
            config.llm.timeout_ms = llm.timeout_ms;
            config.llm.connect_timeout_ms = llm.connect_timeout_ms;
        }
        if let Some(embedding) = file.embedding {
            if let Some(provider) = embedding.provider {
                config.embedding.provider = EmbeddingProvider::parse(&provider);
            }
            config.embedding.endpoint = embedding.endpoint;
            config.embedding.model = embedding.model;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }

    /// Applies overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from a variable lookup.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get("TODO_RPG_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(host) = get("OLLAMA_HOST") {
            self.llm.endpoint = Some(host);
        }
        if let Some(model) = get("TODO_RPG_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(timeout) = get("TODO_RPG_LLM_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.llm.timeout_ms = Some(timeout);
        }
        if let Some(provider) = get("TODO_RPG_EMBEDDER") {
            self.embedding.provider = EmbeddingProvider::parse(&provider);
        }
        if let Some(model) = get("TODO_RPG_EMBED_MODEL") {
            self.embedding.model = Some(model);
        }
        if let Some(level) = get("TODO_RPG_LOG") {
            self.logging.level = Some(level);
        }
        if let Some(format) = get("TODO_RPG_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        if let Some(file) = get("TODO_RPG_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }

        self
    }

    /// Returns the endpoint the embedder should use.
    #[must_use]
    pub fn embedding_endpoint(&self) -> Option<&str> {
        self.embedding
            .endpoint
            .as_deref()
            .or(self.llm.endpoint.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RpgConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./game-data"));
        assert_eq!(config.retrieval_k, 3);
        assert!(!config.auto_apply_edits);
        assert_eq!(config.embedding.provider, EmbeddingProvider::Ollama);
        assert_eq!(config.llm.options.keep_alive, -1);
    }

    #[test]
    fn test_parse_toml() {
        let config = RpgConfig::parse_toml(
            r#"
            data_dir = "/srv/quest"
            retrieval_k = 2
            auto_apply_edits = true

            [llm]
            endpoint = "http://ada.local:11434"
            model = "llama3-tdm"
            temperature = 0.2

            [embedding]
            provider = "hash"

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/quest"));
        assert_eq!(config.retrieval_k, 2);
        assert!(config.auto_apply_edits);
        assert_eq!(config.llm.model.as_deref(), Some("llama3-tdm"));
        assert!((config.llm.options.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.llm.options.keep_alive, -1);
        assert_eq!(config.embedding.provider, EmbeddingProvider::Hash);
        assert_eq!(config.embedding_endpoint(), Some("http://ada.local:11434"));
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_parse_toml_rejects_garbage() {
        assert!(RpgConfig::parse_toml("data_dir = [").is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TODO_RPG_DATA_DIR", "/tmp/quest"),
            ("OLLAMA_HOST", "http://gpu:11434"),
            ("TODO_RPG_EMBEDDER", "hash"),
            ("TODO_RPG_LOG", " "),
        ]
        .into_iter()
        .collect();

        let config = RpgConfig::default()
            .with_overrides(|key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.data_dir, PathBuf::from("/tmp/quest"));
        assert_eq!(config.llm.endpoint.as_deref(), Some("http://gpu:11434"));
        assert_eq!(config.embedding.provider, EmbeddingProvider::Hash);
        assert_eq!(config.logging.level, None);
    }

    #[test]
    fn test_embedding_endpoint_prefers_own() {
        let mut config = RpgConfig::default();
        assert_eq!(config.embedding_endpoint(), None);
        config.llm.endpoint = Some("http://llm:11434".to_string());
        config.embedding.endpoint = Some("http://embed:11434".to_string());
        assert_eq!(config.embedding_endpoint(), Some("http://embed:11434"));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = RpgConfig::load_from_file(Path::new("/nonexistent/todo-rpg.toml")).unwrap_err();
        assert!(err.to_string().contains("read_config_file"));
    }
}
