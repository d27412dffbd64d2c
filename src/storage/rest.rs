//! PostgREST-style store client (Supabase REST surface).
//!
//! All filtering uses PostgREST query operators (`eq.`, `gte.`, `lte.`),
//! writes use `Prefer: return=minimal`, and upserts merge on the conflict
//! column. The service-role key is sent on every request; row-level security
//! is the hosted store's concern.

use anyhow::Result;
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::models::{Id, Transaction, TypeFilter, User, UserProfile};

use super::LedgerStore;

#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

pub struct RestStore {
    client: Client,
    base_url: String,
    service_key: SecretString,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, service_key: SecretString) -> Self {
        Self::with_client(Client::new(), base_url, service_key)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        service_key: SecretString,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key,
        }
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, table);
        self.client
            .request(method, url)
            .header("apikey", self.service_key.expose_secret())
            .bearer_auth(self.service_key.expose_secret())
    }

    async fn check(response: Response) -> Result<Response, RestError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RestError::Status { status, body })
    }
}

/// PostgREST `type=eq.…` filter for the optional type axis.
fn type_filter_param(filter: TypeFilter) -> Option<(&'static str, String)> {
    match filter {
        TypeFilter::Expense => Some(("type", "eq.expense".to_string())),
        TypeFilter::Income => Some(("type", "eq.income".to_string())),
        TypeFilter::All => None,
    }
}

#[async_trait::async_trait]
impl LedgerStore for RestStore {
    async fn find_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        let response = self
            .request(reqwest::Method::GET, "users")
            .query(&[
                ("telegram_id", format!("eq.{telegram_id}")),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(RestError::from)?;
        let rows: Vec<User> = Self::check(response).await?.json().await.map_err(RestError::from)?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_user(&self, profile: &UserProfile) -> Result<()> {
        debug!(telegram_id = profile.telegram_id, "upserting user");
        let response = self
            .request(reqwest::Method::POST, "users")
            .query(&[("on_conflict", "telegram_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[profile])
            .send()
            .await
            .map_err(RestError::from)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn set_password(&self, user_id: &Id, password: &str) -> Result<()> {
        let response = self
            .request(reqwest::Method::PATCH, "users")
            .query(&[("id", format!("eq.{user_id}"))])
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "password": password }))
            .send()
            .await
            .map_err(RestError::from)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn insert_transaction(&self, tx: &Transaction) -> Result<()> {
        debug!(tx_code = %tx.tx_code, user_id = %tx.user_id, "inserting transaction");
        let response = self
            .request(reqwest::Method::POST, "transactions")
            .header("Prefer", "return=minimal")
            .json(&[tx])
            .send()
            .await
            .map_err(RestError::from)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn find_transaction_by_code(
        &self,
        user_id: &Id,
        tx_code: &str,
    ) -> Result<Option<Transaction>> {
        let response = self
            .request(reqwest::Method::GET, "transactions")
            .query(&[
                ("user_id", format!("eq.{user_id}")),
                ("tx_code", format!("eq.{tx_code}")),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(RestError::from)?;
        let rows: Vec<Transaction> =
            Self::check(response).await?.json().await.map_err(RestError::from)?;
        Ok(rows.into_iter().next())
    }

    async fn delete_transaction(&self, id: &Id) -> Result<()> {
        let response = self
            .request(reqwest::Method::DELETE, "transactions")
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await
            .map_err(RestError::from)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn transactions_in_period(
        &self,
        user_id: &Id,
        filter: TypeFilter,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        let mut params: Vec<(&str, String)> = vec![("user_id", format!("eq.{user_id}"))];
        if let Some(param) = type_filter_param(filter) {
            params.push(param);
        }
        if let Some(start) = start {
            params.push(("date", format!("gte.{start}")));
        }
        if let Some(end) = end {
            params.push(("date", format!("lte.{end}")));
        }

        let response = self
            .request(reqwest::Method::GET, "transactions")
            .query(&params)
            .send()
            .await
            .map_err(RestError::from)?;
        let rows: Vec<Transaction> =
            Self::check(response).await?.json().await.map_err(RestError::from)?;
        Ok(rows)
    }
}
