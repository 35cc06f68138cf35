//! Configuration for the observe/reflect pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;

/// Environment override for [`Config::llm_provider`]
pub const LLM_PROVIDER_ENV: &str = "OBSMEM_LLM_PROVIDER";
/// Environment override for [`Config::search_backend`]
pub const SEARCH_BACKEND_ENV: &str = "OBSMEM_SEARCH_BACKEND";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAi,
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackendKind {
    Bm25,
    None,
}

impl FromStr for SearchBackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bm25" => Ok(Self::Bm25),
            "none" => Ok(Self::None),
            other => Err(ConfigError::UnknownSearchBackend(other.to_string())),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Observer skips transcripts with fewer new messages than this
    pub min_messages: usize,

    /// Observation sections older than this many days are trimmed after reflecting
    pub retention_days: u32,

    /// Estimated input tokens above which the reflector folds in chunks
    pub max_input_tokens: usize,

    /// Characters per token used for every size estimate
    pub chars_per_token: f64,

    /// Share of the input budget given to each chunk's observations
    pub chunk_budget_ratio: f64,

    /// Output token cap for observer calls
    pub observer_max_output_tokens: u32,

    /// Output token cap for reflector calls
    pub reflector_max_output_tokens: u32,

    /// Messages per oracle call when backfilling historical transcripts
    pub backfill_chunk_size: usize,

    /// Explicit provider; auto-detected from API keys when unset
    pub llm_provider: Option<LlmProvider>,

    pub anthropic_model: String,

    pub openai_model: String,

    /// Per-request timeout for oracle HTTP calls
    pub request_timeout_secs: u64,

    pub search_backend: SearchBackendKind,

    /// Directory holding `observer.md` / `reflector.md` prompt overrides
    pub prompts_dir: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            min_messages: 5,
            retention_days: 7,
            max_input_tokens: 30_000,
            chars_per_token: obsmem_store::DEFAULT_CHARS_PER_TOKEN,
            chunk_budget_ratio: 0.6,
            observer_max_output_tokens: 4096,
            reflector_max_output_tokens: 8192,
            backfill_chunk_size: 200,
            llm_provider: None,
            anthropic_model: "claude-sonnet-4-5-20250929".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            request_timeout_secs: 120,
            search_backend: SearchBackendKind::Bm25,
            prompts_dir: None,
        }
    }

    /// Load `config.json`, then apply environment overrides. A missing,
    /// unreadable or malformed file yields defaults.
    pub fn load(path: &Path) -> Self {
        let mut config = Self::from_file(path);
        config.apply_env();
        config.sanitize();
        config
    }

    fn from_file(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable config, using defaults");
                return Self::new();
            }
        };

        match serde_json::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "malformed config, using defaults");
                Self::new()
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(LLM_PROVIDER_ENV) {
            match value.parse() {
                Ok(provider) => self.llm_provider = Some(provider),
                Err(e) => tracing::warn!(error = %e, "ignoring {}", LLM_PROVIDER_ENV),
            }
        }
        if let Ok(value) = std::env::var(SEARCH_BACKEND_ENV) {
            match value.parse() {
                Ok(kind) => self.search_backend = kind,
                Err(e) => tracing::warn!(error = %e, "ignoring {}", SEARCH_BACKEND_ENV),
            }
        }
    }

    /// Reset budget knobs that would zero out token estimates or chunk sizes
    fn sanitize(&mut self) {
        let defaults = Self::new();
        if !(self.chars_per_token.is_finite() && self.chars_per_token > 0.0) {
            tracing::warn!(value = self.chars_per_token, "chars_per_token must be positive, using default");
            self.chars_per_token = defaults.chars_per_token;
        }
        if !(self.chunk_budget_ratio.is_finite()
            && self.chunk_budget_ratio > 0.0
            && self.chunk_budget_ratio <= 1.0)
        {
            tracing::warn!(value = self.chunk_budget_ratio, "chunk_budget_ratio must be in (0, 1], using default");
            self.chunk_budget_ratio = defaults.chunk_budget_ratio;
        }
    }

    /// Character budget for the observation body of one reflector chunk
    pub fn chunk_budget_chars(&self) -> usize {
        (self.max_input_tokens as f64 * self.chars_per_token * self.chunk_budget_ratio) as usize
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
