//! Shared document model: config, date sections, metadata stamping, prompts

mod config;
mod error;
mod message;
mod prompts;
pub mod sections;
pub mod stamp;

pub use config::{Config, LlmProvider, SearchBackendKind, LLM_PROVIDER_ENV, SEARCH_BACKEND_ENV};
pub use error::ConfigError;
pub use message::{Message, Role, ToolCall};
pub use prompts::{DefaultPrompts, DirPrompts, PromptProvider};
pub use sections::{DateSection, SplitDocument};
