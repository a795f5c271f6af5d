//! Configuration management for localrag.
//!
//! Settings are assembled once per process from, in increasing priority:
//! - Built-in defaults
//! - The workspace config file (`.localrag/config.yaml`)
//! - `LOCALRAG_*` environment variables
//! - Command-line flags
//!
//! The resulting `AppConfig` is immutable for the lifetime of the process;
//! a restart is required to pick up changes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Embedding providers the knowledge crate knows how to build.
pub const EMBEDDING_PROVIDERS: [&str; 2] = ["ollama", "trigram"];

/// Web search adapters the knowledge crate knows how to build.
pub const SEARCH_PROVIDERS: [&str; 3] = ["duckduckgo", "google", "none"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .localrag/, data/, index/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Data root holding the `pdf/` and `txt/` subdirectories
    pub data_dir: PathBuf,

    /// Directory holding the persisted vector store
    pub persist_dir: PathBuf,

    /// Vector store collection name
    pub collection: String,

    /// Language model settings
    pub llm: LlmSettings,

    /// Embedding model settings
    pub embedding: EmbeddingSettings,

    /// Default retrieval parameters for new sessions
    pub retrieval: RetrievalDefaults,

    /// Chunking parameters used at ingestion time
    pub chunking: ChunkingSettings,

    /// Web fallback search settings
    pub search: SearchSettings,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Language model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LlmSettings {
    /// Provider name (only "ollama" is supported)
    pub provider: String,

    /// Ollama base URL
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature, kept low for determinism-leaning answers
    pub temperature: f32,

    /// Context window passed to the model server
    pub context_size: u32,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            model: "gemma3n:e2b".to_string(),
            temperature: 0.2,
            context_size: 4096,
            timeout: 300,
        }
    }
}

/// Embedding model settings.
///
/// The same model must be used at ingestion and query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingSettings {
    /// Provider name: "ollama" or "trigram" (offline)
    pub provider: String,

    /// Ollama base URL
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// Expected vector dimensions
    pub dimensions: usize,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            timeout: 30,
        }
    }
}

/// Retrieval defaults; each query may override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrievalDefaults {
    /// Number of chunks to retrieve
    pub k: usize,

    /// Whether the relevance threshold is applied
    pub use_threshold: bool,

    /// Minimum cosine similarity when the threshold is enabled
    pub threshold: f32,

    /// Number of web results requested on fallback
    pub web_k: usize,
}

impl Default for RetrievalDefaults {
    fn default() -> Self {
        Self {
            k: 5,
            use_threshold: false,
            threshold: 0.65,
            web_k: 5,
        }
    }
}

/// Chunking parameters (characters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1200,
            chunk_overlap: 200,
        }
    }
}

/// Web fallback search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchSettings {
    /// Adapter: "duckduckgo", "google" or "none"
    pub provider: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Environment variable holding the Google API key
    pub google_api_key_env: String,

    /// Google Programmable Search engine id
    pub google_engine_id: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            provider: "duckduckgo".to_string(),
            timeout: 10,
            google_api_key_env: "GOOGLE_SEARCH_API_KEY".to_string(),
            google_engine_id: None,
        }
    }
}

impl SearchSettings {
    /// Resolve the Google API key from the configured environment variable.
    pub fn google_api_key(&self) -> Option<String> {
        std::env::var(&self.google_api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    paths: Option<PathsConfig>,
    collection: Option<String>,
    llm: Option<LlmSettings>,
    embedding: Option<EmbeddingSettings>,
    retrieval: Option<RetrievalDefaults>,
    chunking: Option<ChunkingSettings>,
    search: Option<SearchSettings>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PathsConfig {
    data: Option<PathBuf>,
    index: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_workspace(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

impl AppConfig {
    /// Default configuration rooted at the given workspace.
    pub fn for_workspace(workspace: impl Into<PathBuf>) -> Self {
        let workspace = workspace.into();
        Self {
            data_dir: workspace.join("data"),
            persist_dir: workspace.join("index"),
            workspace,
            config_file: None,
            collection: "local_docs".to_string(),
            llm: LlmSettings::default(),
            embedding: EmbeddingSettings::default(),
            retrieval: RetrievalDefaults::default(),
            chunking: ChunkingSettings::default(),
            search: SearchSettings::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }

    /// Load configuration for a workspace.
    ///
    /// Environment variables:
    /// - `LOCALRAG_MODEL`: LLM model identifier
    /// - `LOCALRAG_EMBEDDING_MODEL`: embedding model identifier
    /// - `LOCALRAG_OLLAMA_URL`: Ollama base URL for both LLM and embeddings
    /// - `LOCALRAG_SEARCH_PROVIDER`: web search adapter
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use localrag_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Data: {:?}", config.data_dir);
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = match workspace {
            Some(workspace) => Self::for_workspace(workspace),
            None => Self::default(),
        };
        config.config_file = config_file;

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.localrag_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        config.apply_env();
        config.log_level = config.log_level.or_else(|| std::env::var("RUST_LOG").ok());

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        Ok(self.merge(config_file))
    }

    fn merge(&self, file: ConfigFile) -> Self {
        let mut result = self.clone();

        if let Some(paths) = file.paths {
            if let Some(data) = paths.data {
                result.data_dir = result.workspace.join(data);
            }
            if let Some(index) = paths.index {
                result.persist_dir = result.workspace.join(index);
            }
        }

        if let Some(collection) = file.collection {
            result.collection = collection;
        }
        if let Some(llm) = file.llm {
            result.llm = llm;
        }
        if let Some(embedding) = file.embedding {
            result.embedding = embedding;
        }
        if let Some(retrieval) = file.retrieval {
            result.retrieval = retrieval;
        }
        if let Some(chunking) = file.chunking {
            result.chunking = chunking;
        }
        if let Some(search) = file.search {
            result.search = search;
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        result
    }

    /// Environment variables override the config file.
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("LOCALRAG_OLLAMA_URL") {
            self.llm.endpoint = url.clone();
            self.embedding.endpoint = url;
        }
        if let Ok(model) = std::env::var("LOCALRAG_MODEL") {
            self.llm.model = model;
        }
        if let Ok(model) = std::env::var("LOCALRAG_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Ok(provider) = std::env::var("LOCALRAG_SEARCH_PROVIDER") {
            self.search.provider = provider;
        }
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and
    /// the config file.
    pub fn with_overrides(
        mut self,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(model) = model {
            self.llm.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .localrag directory.
    pub fn localrag_dir(&self) -> PathBuf {
        self.workspace.join(".localrag")
    }

    /// Directory scanned for PDF files.
    pub fn pdf_dir(&self) -> PathBuf {
        self.data_dir.join("pdf")
    }

    /// Directory scanned for text and markdown files.
    pub fn txt_dir(&self) -> PathBuf {
        self.data_dir.join("txt")
    }

    /// Validate provider names and numeric ranges.
    pub fn validate(&self) -> AppResult<()> {
        if self.llm.provider != "ollama" {
            return Err(AppError::Config(format!(
                "Unknown LLM provider: {}. Supported: ollama",
                self.llm.provider
            )));
        }

        if !EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if !SEARCH_PROVIDERS.contains(&self.search.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown search provider: {}. Supported: {}",
                self.search.provider,
                SEARCH_PROVIDERS.join(", ")
            )));
        }

        if self.search.provider == "google" {
            if self.search.google_engine_id.is_none() {
                return Err(AppError::Config(
                    "Google search requires search.googleEngineId".to_string(),
                ));
            }
            if self.search.google_api_key().is_none() {
                return Err(AppError::Config(format!(
                    "API key not found in environment variable: {}",
                    self.search.google_api_key_env
                )));
            }
        }

        if self.chunking.chunk_size == 0 || self.chunking.chunk_overlap >= self.chunking.chunk_size
        {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }

        if !(0.0..=1.0).contains(&self.retrieval.threshold) {
            return Err(AppError::Config(format!(
                "Relevance threshold must be within 0.0..=1.0, got {}",
                self.retrieval.threshold
            )));
        }

        if self.retrieval.k == 0 || self.retrieval.web_k == 0 {
            return Err(AppError::Config(
                "retrieval.k and retrieval.webK must be at least 1".to_string(),
            ));
        }

        if self.collection.trim().is_empty() {
            return Err(AppError::Config("Collection name is empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::for_workspace("/tmp/ws");
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model, "gemma3n:e2b");
        assert_eq!(config.embedding.model, "nomic-embed-text");
        assert_eq!(config.collection, "local_docs");
        assert_eq!(config.retrieval.k, 5);
        assert!(!config.retrieval.use_threshold);
        assert_eq!(config.chunking.chunk_size, 1200);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.pdf_dir(), PathBuf::from("/tmp/ws/data/pdf"));
        assert_eq!(config.txt_dir(), PathBuf::from("/tmp/ws/data/txt"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::for_workspace("/tmp/ws");
        let overridden = config.with_overrides(Some("llama3.2".to_string()), None, true, false);

        assert_eq!(overridden.llm.model, "llama3.2");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml_partial_sections() {
        let temp = TempDir::new().unwrap();
        let yaml = r#"
paths:
  data: docs
collection: notes
retrieval:
  k: 3
  useThreshold: true
search:
  provider: none
logging:
  color: false
"#;
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, yaml).unwrap();

        let config = AppConfig::for_workspace(temp.path()).merge_yaml(&path).unwrap();

        assert_eq!(config.data_dir, temp.path().join("docs"));
        assert_eq!(config.persist_dir, temp.path().join("index"));
        assert_eq!(config.collection, "notes");
        assert_eq!(config.retrieval.k, 3);
        assert!(config.retrieval.use_threshold);
        // Unspecified fields of a section fall back to defaults
        assert_eq!(config.retrieval.threshold, 0.65);
        assert_eq!(config.search.provider, "none");
        assert_eq!(config.search.timeout, 10);
        assert!(config.no_color);
    }

    #[test]
    fn test_load_missing_explicit_config_file() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load(
            Some(temp.path().to_path_buf()),
            Some(temp.path().join("missing.yaml")),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_missing_workspace() {
        let result = AppConfig::load(Some(PathBuf::from("/definitely/not/here")), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_unknown_providers() {
        let mut config = AppConfig::for_workspace("/tmp/ws");
        config.embedding.provider = "openai".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::for_workspace("/tmp/ws");
        config.search.provider = "bing".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_chunk_overlap() {
        let mut config = AppConfig::for_workspace("/tmp/ws");
        config.chunking.chunk_overlap = 1200;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_threshold_range() {
        let mut config = AppConfig::for_workspace("/tmp/ws");
        config.retrieval.threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_google_requires_engine_id() {
        let mut config = AppConfig::for_workspace("/tmp/ws");
        config.search.provider = "google".to_string();
        config.search.google_engine_id = None;
        assert!(config.validate().is_err());
    }
}
