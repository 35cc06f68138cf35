use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("no llm api key found; set ANTHROPIC_API_KEY or OPENAI_API_KEY")]
    MissingApiKey,

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("llm provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("llm provider returned an empty response")]
    EmptyResponse,

    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("compressor unavailable: {0}")]
    Unavailable(String),
}
