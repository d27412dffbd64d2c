mod memory;
mod rest;

pub use memory::MemoryStore;
pub use rest::{RestError, RestStore};

use anyhow::Result;
use chrono::NaiveDate;

use crate::models::{Id, Transaction, TypeFilter, User, UserProfile};

/// The persistence collaborator: users and their ledger rows.
///
/// Only equality/range filters are needed; anything fancier belongs to the
/// dashboard, which talks to the store directly.
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    async fn find_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>>;

    /// Create-or-update keyed on the immutable telegram id. An existing
    /// user's password is left untouched.
    async fn upsert_user(&self, profile: &UserProfile) -> Result<()>;

    /// Stores the password exactly as given; set-once is enforced by the
    /// pipeline, which only reaches this call for users without one.
    async fn set_password(&self, user_id: &Id, password: &str) -> Result<()>;

    async fn insert_transaction(&self, tx: &Transaction) -> Result<()>;

    /// Lookup by the human-shareable code. Callers pass the code uppercased;
    /// stored codes are always uppercase.
    async fn find_transaction_by_code(
        &self,
        user_id: &Id,
        tx_code: &str,
    ) -> Result<Option<Transaction>>;

    async fn delete_transaction(&self, id: &Id) -> Result<()>;

    /// Owner-scoped period query with an optional type filter. Open-ended
    /// bounds are allowed on either side.
    async fn transactions_in_period(
        &self,
        user_id: &Id,
        filter: TypeFilter,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>>;
}
