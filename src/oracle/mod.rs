mod openrouter;
pub mod prompt;

pub use openrouter::OpenRouterModel;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error, warn};

use crate::models::ClassificationResult;

/// Reply used when every candidate model fails in structured mode.
pub const FALLBACK_APOLOGY: &str =
    "Desculpe, estou com problemas técnicos. Tente novamente em alguns minutos.";

/// Reply used when every candidate model fails in free-text (analyst) mode.
pub const FALLBACK_ANALYSIS: &str = "Erro ao analisar os dados.";

/// One piece of user content forwarded to the oracle.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    ImageUrl(String),
}

#[derive(Debug, Clone)]
pub struct OracleRequest {
    pub system_prompt: String,
    pub user_parts: Vec<ContentPart>,
    /// When set, the provider is asked for a JSON object response.
    pub json_mode: bool,
}

/// A single chat-completion candidate (one model id at one provider).
#[async_trait::async_trait]
pub trait ChatCompletionSource: Send + Sync {
    /// Returns the raw message content on success.
    async fn complete(&self, request: &OracleRequest) -> Result<String>;

    fn name(&self) -> &str;
}

/// Ordered fallback chain over candidate models: first success wins, no
/// retries against the same candidate, no backoff. A provider-side rate
/// limit simply moves the chain to the next model.
pub struct OracleChain {
    sources: Vec<Arc<dyn ChatCompletionSource>>,
}

impl OracleChain {
    pub fn new(sources: Vec<Arc<dyn ChatCompletionSource>>) -> Self {
        Self { sources }
    }

    /// Classify user content in structured mode.
    ///
    /// A candidate that answers with unparsable or unusably-shaped JSON is
    /// treated like a transport failure: the chain moves on. When the chain
    /// is exhausted the defined fallback (an apologetic chat reply) is
    /// returned, so callers never see a raw provider error.
    pub async fn classify(
        &self,
        system_prompt: &str,
        user_parts: Vec<ContentPart>,
    ) -> ClassificationResult {
        let request = OracleRequest {
            system_prompt: system_prompt.to_string(),
            user_parts,
            json_mode: true,
        };

        for source in &self.sources {
            debug!(model = source.name(), "trying classification model");
            let content = match source.complete(&request).await {
                Ok(content) => content,
                Err(err) => {
                    warn!(model = source.name(), error = %err, "model failed");
                    continue;
                }
            };

            let value: serde_json::Value = match serde_json::from_str(&content) {
                Ok(value) => value,
                Err(err) => {
                    warn!(model = source.name(), error = %err, "unparsable model output");
                    continue;
                }
            };

            match ClassificationResult::from_json(&value) {
                Some(result) => return result,
                None => {
                    warn!(model = source.name(), "model output failed coercion");
                    continue;
                }
            }
        }

        error!("all classification models failed");
        ClassificationResult::Chat {
            message: Some(FALLBACK_APOLOGY.to_string()),
        }
    }

    /// Free-text mode for the analyst follow-up. The first successful
    /// candidate's text is relayed verbatim.
    pub async fn answer(&self, system_prompt: &str) -> String {
        let request = OracleRequest {
            system_prompt: system_prompt.to_string(),
            user_parts: Vec::new(),
            json_mode: false,
        };

        for source in &self.sources {
            match source.complete(&request).await {
                Ok(content) => return content,
                Err(err) => {
                    warn!(model = source.name(), error = %err, "model failed");
                }
            }
        }

        error!("all analyst models failed");
        FALLBACK_ANALYSIS.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedSource {
        name: &'static str,
        reply: Result<&'static str, &'static str>,
    }

    #[async_trait::async_trait]
    impl ChatCompletionSource for ScriptedSource {
        async fn complete(&self, _request: &OracleRequest) -> Result<String> {
            match self.reply {
                Ok(content) => Ok(content.to_string()),
                Err(message) => Err(anyhow::anyhow!(message)),
            }
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn chain(sources: Vec<ScriptedSource>) -> OracleChain {
        OracleChain::new(
            sources
                .into_iter()
                .map(|s| Arc::new(s) as Arc<dyn ChatCompletionSource>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn first_success_wins() {
        let chain = chain(vec![
            ScriptedSource {
                name: "a",
                reply: Err("rate limited"),
            },
            ScriptedSource {
                name: "b",
                reply: Ok(r#"{"action":"chat","message":"oi"}"#),
            },
            ScriptedSource {
                name: "c",
                reply: Ok(r#"{"action":"chat","message":"never reached"}"#),
            },
        ]);

        let result = chain.classify("prompt", Vec::new()).await;
        assert_eq!(
            result,
            ClassificationResult::Chat {
                message: Some("oi".to_string())
            }
        );
    }

    #[tokio::test]
    async fn unparsable_output_moves_to_next_candidate() {
        let chain = chain(vec![
            ScriptedSource {
                name: "a",
                reply: Ok("I am not JSON"),
            },
            ScriptedSource {
                name: "b",
                reply: Ok(r#"{"action":"delete","tx_code":"AB12C"}"#),
            },
        ]);

        let result = chain.classify("prompt", Vec::new()).await;
        assert_eq!(
            result,
            ClassificationResult::Delete {
                tx_code: "AB12C".to_string()
            }
        );
    }

    #[tokio::test]
    async fn exhausted_chain_returns_apology() {
        let chain = chain(vec![
            ScriptedSource {
                name: "a",
                reply: Err("down"),
            },
            ScriptedSource {
                name: "b",
                reply: Err("also down"),
            },
        ]);

        let result = chain.classify("prompt", Vec::new()).await;
        assert_eq!(
            result,
            ClassificationResult::Chat {
                message: Some(FALLBACK_APOLOGY.to_string())
            }
        );
    }

    #[tokio::test]
    async fn exhausted_chain_in_text_mode_returns_analysis_fallback() {
        let chain = chain(vec![ScriptedSource {
            name: "a",
            reply: Err("down"),
        }]);
        assert_eq!(chain.answer("prompt").await, FALLBACK_ANALYSIS);
    }
}
