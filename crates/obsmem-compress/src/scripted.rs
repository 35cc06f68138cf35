//! Deterministic oracle for tests and offline dry runs.
//!
//! Returns queued responses in order without any network access and records
//! every call for later assertions.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::{CompressError, Compressor};

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressCall {
    pub system_prompt: String,
    pub user_content: String,
    pub max_output_tokens: u32,
}

#[derive(Default)]
pub struct ScriptedCompressor {
    responses: Mutex<VecDeque<Result<String, String>>>,
    /// Returned once the queue is drained
    fallback: Option<String>,
    calls: Mutex<Vec<CompressCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedCompressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call with `text`
    pub fn repeating(text: impl Into<String>) -> Self {
        Self {
            fallback: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        lock(&self.responses).push_back(Ok(text.into()));
        self
    }

    /// Queue a provider failure
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        lock(&self.responses).push_back(Err(message.into()));
        self
    }

    pub fn calls(&self) -> Vec<CompressCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

impl Compressor for ScriptedCompressor {
    fn name(&self) -> &str {
        "scripted"
    }

    fn compress(
        &self,
        system_prompt: &str,
        user_content: &str,
        max_output_tokens: u32,
    ) -> Result<String, CompressError> {
        lock(&self.calls).push(CompressCall {
            system_prompt: system_prompt.to_string(),
            user_content: user_content.to_string(),
            max_output_tokens,
        });

        match lock(&self.responses).pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(CompressError::Unavailable(message)),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| CompressError::Unavailable("no scripted response left".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responses_in_order_then_fallback() {
        let oracle = ScriptedCompressor::repeating("later")
            .with_response("first")
            .with_response("second");

        assert_eq!(oracle.compress("s", "u", 10).unwrap(), "first");
        assert_eq!(oracle.compress("s", "u", 10).unwrap(), "second");
        assert_eq!(oracle.compress("s", "u", 10).unwrap(), "later");
        assert_eq!(oracle.call_count(), 3);
    }

    #[test]
    fn test_failure_and_exhaustion() {
        let oracle = ScriptedCompressor::new().with_failure("rate limited");

        let err = oracle.compress("s", "u", 10).unwrap_err();
        assert!(err.to_string().contains("rate limited"));
        assert!(oracle.compress("s", "u", 10).is_err());
    }

    #[test]
    fn test_records_arguments() {
        let oracle = ScriptedCompressor::repeating("ok");
        oracle.compress("system", "user", 8192).unwrap();

        let calls = oracle.calls();
        assert_eq!(
            calls[0],
            CompressCall {
                system_prompt: "system".into(),
                user_content: "user".into(),
                max_output_tokens: 8192,
            }
        );
    }
}
