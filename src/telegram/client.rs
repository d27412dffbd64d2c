use anyhow::{bail, Context, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use super::ChatApi;

/// Telegram Bot API client.
pub struct TelegramClient {
    client: Client,
    base_url: String,
    token: SecretString,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    file_path: String,
}

impl TelegramClient {
    pub fn new(token: SecretString) -> Self {
        Self::with_client(Client::new(), "https://api.telegram.org", token)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, token: SecretString) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.base_url,
            self.token.expose_secret(),
            method
        )
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let response: ApiResponse<T> = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .with_context(|| format!("telegram {method} request failed"))?
            .json()
            .await
            .with_context(|| format!("telegram {method} returned a malformed body"))?;

        if !response.ok {
            bail!(
                "telegram {method} rejected: {}",
                response.description.unwrap_or_else(|| "unknown".to_string())
            );
        }
        response
            .result
            .with_context(|| format!("telegram {method} returned no result"))
    }
}

#[async_trait::async_trait]
impl ChatApi for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.call::<serde_json::Value>(
            "sendMessage",
            &json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "Markdown",
            }),
        )
        .await?;
        Ok(())
    }

    async fn send_contact_request(&self, chat_id: i64, text: &str) -> Result<()> {
        self.call::<serde_json::Value>(
            "sendMessage",
            &json!({
                "chat_id": chat_id,
                "text": text,
                "reply_markup": {
                    "keyboard": [[{ "text": "📱 Compartilhar Contato", "request_contact": true }]],
                    "one_time_keyboard": true,
                    "resize_keyboard": true,
                },
            }),
        )
        .await?;
        Ok(())
    }

    async fn file_url(&self, file_id: &str) -> Result<String> {
        let info: FileInfo = self
            .call("getFile", &json!({ "file_id": file_id }))
            .await?;
        Ok(format!(
            "{}/file/bot{}/{}",
            self.base_url,
            self.token.expose_secret(),
            info.file_path
        ))
    }
}
