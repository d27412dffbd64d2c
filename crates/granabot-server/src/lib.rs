//! HTTP surface for the intake pipeline.
//!
//! The webhook handler always answers 200 with a short plain-text body;
//! anything else makes the chat platform retry the update and the user see
//! duplicated replies. Failures are logged and acked.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::warn;

use granabot::config::{Config, ConfigStatus};
use granabot::intake::IntakePipeline;
use granabot::oracle::{ChatCompletionSource, OpenRouterModel, OracleChain};
use granabot::storage::RestStore;
use granabot::telegram::{TelegramClient, Update};

#[derive(Clone)]
pub struct AppState {
    /// Absent while credentials are incomplete; the webhook still acks so
    /// the platform does not queue retries against a half-configured deploy.
    pipeline: Option<Arc<IntakePipeline>>,
    status: ConfigStatus,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            pipeline: build_pipeline(config)?.map(Arc::new),
            status: config.status(),
        })
    }
}

/// Wire the production collaborators, or `None` when credentials are missing.
pub fn build_pipeline(config: &Config) -> Result<Option<IntakePipeline>> {
    let (Some(bot_token), Some(api_key), Some(base_url), Some(service_key)) = (
        config.telegram.bot_token.clone(),
        config.oracle.api_key.clone(),
        config.store.base_url.clone(),
        config.store.service_key.clone(),
    ) else {
        return Ok(None);
    };

    let chat = TelegramClient::with_client(
        reqwest::Client::new(),
        config.telegram.api_base.clone(),
        bot_token,
    );
    let store = RestStore::new(base_url, service_key);

    let mut sources: Vec<Arc<dyn ChatCompletionSource>> = Vec::new();
    for model in &config.oracle.models {
        let source = OpenRouterModel::new(&config.oracle, api_key.clone(), model)
            .with_context(|| format!("failed to build oracle candidate {model}"))?;
        sources.push(Arc::new(source));
    }

    Ok(Some(IntakePipeline::new(
        Arc::new(store),
        OracleChain::new(sources),
        Arc::new(chat),
    )))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/webhook", post(webhook))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<ConfigStatus> {
    Json(state.status)
}

async fn webhook(State(state): State<AppState>, Json(payload): Json<serde_json::Value>) -> &'static str {
    let Some(pipeline) = state.pipeline.as_ref() else {
        warn!("webhook hit with incomplete configuration");
        return "Config Error";
    };

    let update: Update = match serde_json::from_value(payload) {
        Ok(update) => update,
        Err(err) => {
            warn!(error = %err, "malformed webhook payload, acking anyway");
            return "OK";
        }
    };

    if let Err(err) = pipeline.handle_update(&update).await {
        warn!(error = %err, "update processing failed");
    }
    "OK"
}
