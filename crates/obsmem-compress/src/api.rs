use obsmem_core::{Config, LlmProvider};
use std::time::Duration;

use crate::{CompressError, Compressor};

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const ANTHROPIC_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn key_env_for(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Anthropic => ANTHROPIC_KEY_ENV,
        LlmProvider::OpenAi => OPENAI_KEY_ENV,
    }
}

/// Configured provider, else whichever API key is present (Anthropic first)
pub fn detect_provider(config: &Config) -> Result<LlmProvider, CompressError> {
    if let Some(provider) = config.llm_provider {
        return Ok(provider);
    }
    if env_key(ANTHROPIC_KEY_ENV).is_some() {
        return Ok(LlmProvider::Anthropic);
    }
    if env_key(OPENAI_KEY_ENV).is_some() {
        return Ok(LlmProvider::OpenAi);
    }
    Err(CompressError::MissingApiKey)
}

fn build_request_body(
    provider: LlmProvider,
    model: &str,
    system_prompt: &str,
    user_content: &str,
    max_tokens: u32,
) -> serde_json::Value {
    match provider {
        LlmProvider::Anthropic => serde_json::json!({
            "model": model,
            "max_tokens": max_tokens,
            "system": system_prompt,
            "messages": [{"role": "user", "content": user_content}]
        }),
        LlmProvider::OpenAi => serde_json::json!({
            "model": model,
            "max_tokens": max_tokens,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_content}
            ]
        }),
    }
}

fn extract_text(provider: LlmProvider, body: &serde_json::Value) -> Option<String> {
    let text = match provider {
        LlmProvider::Anthropic => body["content"]
            .as_array()?
            .iter()
            .filter(|block| block["type"].as_str().unwrap_or("text") == "text")
            .filter_map(|block| block["text"].as_str())
            .collect::<Vec<_>>()
            .join(""),
        LlmProvider::OpenAi => body["choices"][0]["message"]["content"].as_str()?.to_string(),
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Single request against the provider's HTTP API
pub async fn compress_via_api(
    client: &reqwest::Client,
    provider: LlmProvider,
    model: &str,
    api_key: &str,
    system_prompt: &str,
    user_content: &str,
    max_tokens: u32,
) -> Result<String, CompressError> {
    let body = build_request_body(provider, model, system_prompt, user_content, max_tokens);

    let request = match provider {
        LlmProvider::Anthropic => client
            .post(ANTHROPIC_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01"),
        LlmProvider::OpenAi => client.post(OPENAI_URL).bearer_auth(api_key),
    };

    let response = request
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CompressError::Provider {
            status: status.as_u16(),
            body,
        });
    }

    let body: serde_json::Value = response.json().await?;
    extract_text(provider, &body).ok_or(CompressError::EmptyResponse)
}

/// Blocking oracle backed by the Anthropic or OpenAI API
pub struct ApiCompressor {
    provider: LlmProvider,
    model: String,
    api_key: String,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl ApiCompressor {
    pub fn new(
        provider: LlmProvider,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CompressError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            provider,
            model: model.into(),
            api_key: api_key.into(),
            client,
            runtime,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, CompressError> {
        let provider = detect_provider(config)?;
        let api_key = env_key(key_env_for(provider)).ok_or(CompressError::MissingApiKey)?;
        let model = match provider {
            LlmProvider::Anthropic => config.anthropic_model.clone(),
            LlmProvider::OpenAi => config.openai_model.clone(),
        };
        Self::new(
            provider,
            model,
            api_key,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Compressor for ApiCompressor {
    fn name(&self) -> &str {
        match self.provider {
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::OpenAi => "openai",
        }
    }

    fn compress(
        &self,
        system_prompt: &str,
        user_content: &str,
        max_output_tokens: u32,
    ) -> Result<String, CompressError> {
        tracing::debug!(
            provider = self.name(),
            model = %self.model,
            input_chars = system_prompt.len() + user_content.len(),
            max_output_tokens,
            "calling compression oracle"
        );
        self.runtime.block_on(compress_via_api(
            &self.client,
            self.provider,
            &self.model,
            &self.api_key,
            system_prompt,
            user_content,
            max_output_tokens,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_anthropic_body_uses_system_field() {
        let body = build_request_body(LlmProvider::Anthropic, "m", "sys", "user", 8192);
        assert_eq!(body["system"], "sys");
        assert_eq!(body["max_tokens"], 8192);
        assert_eq!(body["messages"][0]["content"], "user");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_openai_body_uses_system_message() {
        let body = build_request_body(LlmProvider::OpenAi, "m", "sys", "user", 4096);
        assert!(body.get("system").is_none());
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user");
    }

    #[test]
    fn test_extract_anthropic_text_joins_blocks() {
        let body = serde_json::json!({
            "content": [
                {"type": "text", "text": "# Reflections\n"},
                {"type": "text", "text": "## Core Identity"}
            ]
        });
        assert_eq!(
            extract_text(LlmProvider::Anthropic, &body).as_deref(),
            Some("# Reflections\n## Core Identity")
        );
    }

    #[test]
    fn test_extract_openai_text() {
        let body = serde_json::json!({"choices": [{"message": {"content": "## 2026-02-10"}}]});
        assert_eq!(
            extract_text(LlmProvider::OpenAi, &body).as_deref(),
            Some("## 2026-02-10")
        );
    }

    #[test]
    fn test_extract_empty_is_none() {
        let body = serde_json::json!({"content": [{"type": "text", "text": "  \n"}]});
        assert!(extract_text(LlmProvider::Anthropic, &body).is_none());
        assert!(extract_text(LlmProvider::OpenAi, &serde_json::json!({})).is_none());
    }

    #[test]
    #[serial]
    fn test_detect_provider_prefers_config() {
        let mut config = Config::new();
        config.llm_provider = Some(LlmProvider::OpenAi);
        assert_eq!(detect_provider(&config).unwrap(), LlmProvider::OpenAi);
    }

    #[test]
    #[serial]
    fn test_detect_provider_from_env() {
        let saved_anthropic = std::env::var(ANTHROPIC_KEY_ENV).ok();
        let saved_openai = std::env::var(OPENAI_KEY_ENV).ok();
        std::env::remove_var(ANTHROPIC_KEY_ENV);
        std::env::set_var(OPENAI_KEY_ENV, "sk-test");

        let detected = detect_provider(&Config::new());

        std::env::remove_var(OPENAI_KEY_ENV);
        let missing = detect_provider(&Config::new());

        if let Some(v) = saved_anthropic {
            std::env::set_var(ANTHROPIC_KEY_ENV, v);
        }
        if let Some(v) = saved_openai {
            std::env::set_var(OPENAI_KEY_ENV, v);
        }

        assert_eq!(detected.unwrap(), LlmProvider::OpenAi);
        assert!(matches!(missing, Err(CompressError::MissingApiKey)));
    }
}
