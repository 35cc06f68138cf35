use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown llm provider: {0} (expected anthropic or openai)")]
    UnknownProvider(String),

    #[error("unknown search backend: {0} (expected bm25 or none)")]
    UnknownSearchBackend(String),
}
