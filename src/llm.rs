//! Blocking text-completion client for the LLM-backed collaborators.
//!
//! Two providers are supported:
//!
//! - **openai**: `POST https://api.openai.com/v1/chat/completions`, key from
//!   the `OPENAI_API_KEY` environment variable.
//! - **ollama**: `POST {url}/api/generate` with `stream = false`
//!   (default url `http://localhost:11434`).
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (other than 429) → fail immediately
//! - Network errors → retry
//!
//! Delays grow 1s, 2s, 4s, ... capped at 32s, for at most `max_retries`
//! retries after the first attempt.

use std::time::Duration;

use anyhow::{bail, Result};
use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::config::ServiceConfig;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provider {
    OpenAI,
    Ollama,
}

impl Provider {
    fn label(self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Ollama => "Ollama",
        }
    }
}

pub struct LlmClient {
    provider: Provider,
    model: String,
    url: String,
    api_key: Option<String>,
    max_retries: u32,
    http: Client,
}

impl LlmClient {
    /// Build a client from a service section.
    ///
    /// # Errors
    ///
    /// Fails when the provider is not an LLM provider, when `model` is
    /// missing, or when `OPENAI_API_KEY` is unset for the OpenAI provider.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let provider = match config.provider.as_str() {
            "openai" => Provider::OpenAI,
            "ollama" => Provider::Ollama,
            other => bail!("'{}' is not an LLM provider", other),
        };
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("model required for {} provider", provider.label()))?;

        let api_key = match provider {
            Provider::OpenAI => Some(
                std::env::var("OPENAI_API_KEY")
                    .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?,
            ),
            Provider::Ollama => None,
        };

        let url = match provider {
            Provider::OpenAI => OPENAI_CHAT_URL.to_string(),
            Provider::Ollama => format!(
                "{}/api/generate",
                config
                    .url
                    .as_deref()
                    .unwrap_or(DEFAULT_OLLAMA_URL)
                    .trim_end_matches('/')
            ),
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            provider,
            model,
            url,
            api_key,
            max_retries: config.max_retries,
            http,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `prompt` and return the model's reply text.
    pub fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let body = match self.provider {
            Provider::OpenAI => serde_json::json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }],
                "max_tokens": max_tokens,
                "temperature": 0.0,
            }),
            Provider::Ollama => serde_json::json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
                "options": { "num_predict": max_tokens, "temperature": 0.0 },
            }),
        };
        let label = self.provider.label();

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                debug!(attempt, delay_secs = delay.as_secs(), "retrying {} request", label);
                std::thread::sleep(delay);
            }

            let mut request = self
                .http
                .post(&self.url)
                .header("Content-Type", "application/json")
                .json(&body);
            if let Some(key) = &self.api_key {
                request = request.header("Authorization", format!("Bearer {}", key));
            }

            match request.send() {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json()?;
                        return match self.provider {
                            Provider::OpenAI => parse_openai_reply(&json),
                            Provider::Ollama => parse_ollama_reply(&json),
                        };
                    }

                    let body_text = response.text().unwrap_or_default();
                    if status.as_u16() == 429 || status.is_server_error() {
                        warn!(%status, attempt, "{} request failed, will retry", label);
                        last_err = Some(anyhow::anyhow!(
                            "{} API error {}: {}",
                            label,
                            status,
                            body_text
                        ));
                        continue;
                    }

                    bail!("{} API error {}: {}", label, status, body_text);
                }
                Err(e) => {
                    warn!(error = %e, attempt, "{} request failed, will retry", label);
                    last_err = Some(match self.provider {
                        Provider::Ollama => anyhow::anyhow!(
                            "Ollama connection error (is Ollama running at {}?): {}",
                            self.url,
                            e
                        ),
                        Provider::OpenAI => e.into(),
                    });
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("{} request failed after retries", label)))
    }
}

/// Delay before retry number `attempt` (1-based).
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 << (attempt.saturating_sub(1)).min(5))
}

fn parse_openai_reply(json: &serde_json::Value) -> Result<String> {
    json.pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            anyhow::anyhow!("Invalid OpenAI response: missing choices[0].message.content")
        })
}

fn parse_ollama_reply(json: &serde_json::Value) -> Result<String> {
    json.get("response")
        .and_then(|r| r.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid Ollama response: missing response field"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(2), Duration::from_secs(2));
        assert_eq!(backoff_delay(4), Duration::from_secs(8));
        assert_eq!(backoff_delay(6), Duration::from_secs(32));
        assert_eq!(backoff_delay(12), Duration::from_secs(32));
    }

    #[test]
    fn test_parse_openai_reply() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Proteins" } }]
        });
        assert_eq!(parse_openai_reply(&json).unwrap(), "Proteins");
        assert!(parse_openai_reply(&serde_json::json!({ "choices": [] })).is_err());
    }

    #[test]
    fn test_parse_ollama_reply() {
        let json = serde_json::json!({
            "model": "llama3.2",
            "response": "{\"name\": \"egg\"}",
            "done": true
        });
        assert_eq!(parse_ollama_reply(&json).unwrap(), "{\"name\": \"egg\"}");
        assert!(parse_ollama_reply(&serde_json::json!({ "done": true })).is_err());
    }

    #[test]
    fn test_ollama_url_and_provider_checks() {
        let mut config = ServiceConfig::with_provider("ollama");
        config.model = Some("llama3.2".to_string());
        config.url = Some("http://127.0.0.1:11434/".to_string());
        let client = LlmClient::new(&config).unwrap();
        assert_eq!(client.url, "http://127.0.0.1:11434/api/generate");
        assert_eq!(client.model(), "llama3.2");

        config.model = None;
        assert!(LlmClient::new(&config).is_err());
        assert!(LlmClient::new(&ServiceConfig::with_provider("heuristic")).is_err());
    }
}
