use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::config::OracleConfig;

use super::{ChatCompletionSource, ContentPart, OracleRequest};

/// One candidate model behind an OpenRouter-compatible chat-completion API.
pub struct OpenRouterModel {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    referer: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    /// Providers report quota/availability problems in-band.
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenRouterModel {
    pub fn new(
        config: &OracleConfig,
        api_key: SecretString,
        model: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build oracle HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            referer: config.referer.clone(),
            title: config.title.clone(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn user_content(parts: &[ContentPart]) -> serde_json::Value {
        parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => json!({ "type": "text", "text": text }),
                ContentPart::ImageUrl(url) => {
                    json!({ "type": "image_url", "image_url": { "url": url } })
                }
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl ChatCompletionSource for OpenRouterModel {
    async fn complete(&self, request: &OracleRequest) -> Result<String> {
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": Self::user_content(&request.user_parts) },
            ],
        });
        if request.json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request to model {} failed", self.model))?
            .error_for_status()?
            .json::<CompletionResponse>()
            .await
            .with_context(|| format!("model {} returned a malformed body", self.model))?;

        if let Some(error) = response.error {
            bail!("model {} reported an error: {error}", self.model);
        }

        match response.choices.into_iter().next().and_then(|c| c.message.content) {
            Some(content) => Ok(content),
            None => bail!("model {} returned no choices", self.model),
        }
    }

    fn name(&self) -> &str {
        &self.model
    }
}
