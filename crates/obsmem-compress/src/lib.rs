//! Compression oracle: system prompt + content in, condensed text out

mod api;
mod error;
mod scripted;

pub use api::{compress_via_api, detect_provider, ApiCompressor};
pub use error::CompressError;
pub use scripted::{CompressCall, ScriptedCompressor};

/// A blocking text-compression call. One attempt per invocation; retry
/// policy belongs to the caller.
pub trait Compressor {
    /// Short identifier for logs
    fn name(&self) -> &str;

    fn compress(
        &self,
        system_prompt: &str,
        user_content: &str,
        max_output_tokens: u32,
    ) -> Result<String, CompressError>;
}
