use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::core::config::Settings;

const MAX_RETRIES: u32 = 2;

#[derive(Debug, Clone)]
pub(crate) struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_tokens: u32,
}

impl LlmClient {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.ai().ai_request_timeout);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.ai().openai_api_key.clone(),
            base_url: settings.ai().openai_base_url.trim_end_matches('/').to_string(),
            max_tokens: settings.ai().ai_max_tokens,
        })
    }

    pub(crate) async fn chat_json(&self, model: &str, system: &str, user: &str) -> Result<Value> {
        let payload = json!({
            "model": model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "max_completion_tokens": self.max_tokens,
            "response_format": {"type": "json_object"}
        });

        let content = self.complete(model, &payload).await?;
        serde_json::from_str(&content).context("Failed to parse model JSON")
    }

    pub(crate) async fn chat_text(&self, model: &str, system: &str, user: &str) -> Result<String> {
        let payload = json!({
            "model": model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "max_completion_tokens": self.max_tokens
        });

        self.complete(model, &payload).await
    }

    async fn complete(&self, model: &str, payload: &Value) -> Result<String> {
        let timer = Instant::now();
        let url = format!("{}/chat/completions", self.base_url);
        let mut last_error = None;
        let mut body = Value::Null;

        for attempt in 0..=MAX_RETRIES {
            let response =
                self.client.post(&url).bearer_auth(&self.api_key).json(payload).send().await;

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    body = resp.json().await.unwrap_or(Value::Null);
                    if status.is_success() {
                        last_error = None;
                        break;
                    }
                    last_error = Some(anyhow::anyhow!("LLM API error ({status}): {body}"));
                }
                Err(err) => {
                    last_error = Some(anyhow::anyhow!(err).context("Failed to call LLM API"));
                }
            }

            if attempt < MAX_RETRIES {
                tokio::time::sleep(Duration::from_secs(2_u64.pow(attempt))).await;
            }
        }

        if let Some(err) = last_error {
            return Err(err);
        }

        let content = message_content(&body).context("Missing LLM response content")?;
        let tokens_used = body
            .get("usage")
            .and_then(|usage| usage.get("total_tokens"))
            .and_then(|value| value.as_u64());

        tracing::debug!(
            model,
            duration_seconds = timer.elapsed().as_secs_f64(),
            tokens_used,
            "LLM request completed"
        );

        Ok(content.to_string())
    }
}

fn message_content(body: &Value) -> Option<&str> {
    body.get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|value| value.as_str())
}
