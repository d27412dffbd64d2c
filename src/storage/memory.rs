//! In-memory store implementation for testing.

use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::models::{Id, Transaction, TypeFilter, User, UserProfile};

use super::LedgerStore;

/// In-memory store for testing purposes.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Id, User>>,
    transactions: Mutex<HashMap<Id, Transaction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a fully-formed user, bypassing the contact flow.
    pub async fn seed_user(&self, user: User) {
        let mut users = self.users.lock().await;
        users.insert(user.id.clone(), user);
    }

    pub async fn transaction_count(&self) -> usize {
        self.transactions.lock().await.len()
    }

    pub async fn all_transactions(&self) -> Vec<Transaction> {
        self.transactions.lock().await.values().cloned().collect()
    }
}

#[async_trait::async_trait]
impl LedgerStore for MemoryStore {
    async fn find_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        let users = self.users.lock().await;
        Ok(users
            .values()
            .find(|u| u.telegram_id == telegram_id)
            .cloned())
    }

    async fn upsert_user(&self, profile: &UserProfile) -> Result<()> {
        let mut users = self.users.lock().await;
        match users
            .values_mut()
            .find(|u| u.telegram_id == profile.telegram_id)
        {
            Some(existing) => {
                existing.phone_number = profile.phone_number.clone();
                existing.full_name = Some(profile.full_name.clone());
            }
            None => {
                let user = User {
                    id: Id::new(),
                    telegram_id: profile.telegram_id,
                    phone_number: profile.phone_number.clone(),
                    full_name: Some(profile.full_name.clone()),
                    password: None,
                    family_id: None,
                };
                users.insert(user.id.clone(), user);
            }
        }
        Ok(())
    }

    async fn set_password(&self, user_id: &Id, password: &str) -> Result<()> {
        let mut users = self.users.lock().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| anyhow::anyhow!("User {user_id} not found"))?;
        user.password = Some(password.to_string());
        Ok(())
    }

    async fn insert_transaction(&self, tx: &Transaction) -> Result<()> {
        let mut transactions = self.transactions.lock().await;
        transactions.insert(tx.id.clone(), tx.clone());
        Ok(())
    }

    async fn find_transaction_by_code(
        &self,
        user_id: &Id,
        tx_code: &str,
    ) -> Result<Option<Transaction>> {
        let transactions = self.transactions.lock().await;
        Ok(transactions
            .values()
            .find(|t| &t.user_id == user_id && t.tx_code == tx_code)
            .cloned())
    }

    async fn delete_transaction(&self, id: &Id) -> Result<()> {
        let mut transactions = self.transactions.lock().await;
        transactions.remove(id);
        Ok(())
    }

    async fn transactions_in_period(
        &self,
        user_id: &Id,
        filter: TypeFilter,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        let transactions = self.transactions.lock().await;
        let mut rows: Vec<Transaction> = transactions
            .values()
            .filter(|t| &t.user_id == user_id)
            .filter(|t| match filter {
                TypeFilter::All => true,
                TypeFilter::Expense => t.tx_type == crate::models::TxType::Expense,
                TypeFilter::Income => t.tx_type == crate::models::TxType::Income,
            })
            .filter(|t| start.is_none_or(|s| t.date >= s))
            .filter(|t| end.is_none_or(|e| t.date <= e))
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.date);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TxType, User};
    use rust_decimal::Decimal;

    fn seedable_user() -> User {
        User {
            id: Id::from_string("u1"),
            telegram_id: 42,
            phone_number: "+55".to_string(),
            full_name: Some("Ana Souza".to_string()),
            password: Some("123456".to_string()),
            family_id: None,
        }
    }

    fn tx(code: &str, amount: i64, tx_type: TxType, date: (i32, u32, u32)) -> Transaction {
        Transaction::new(
            Id::from_string("u1"),
            code,
            Decimal::from(amount),
            "test",
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        )
        .with_type(tx_type)
    }

    #[tokio::test]
    async fn upsert_preserves_existing_password() -> Result<()> {
        let store = MemoryStore::new();
        store.seed_user(seedable_user()).await;

        store
            .upsert_user(&UserProfile {
                telegram_id: 42,
                phone_number: "+5511".to_string(),
                full_name: "Ana M Souza".to_string(),
            })
            .await?;

        let user = store.find_user_by_telegram_id(42).await?.unwrap();
        assert_eq!(user.password.as_deref(), Some("123456"));
        assert_eq!(user.phone_number, "+5511");
        assert_eq!(user.full_name.as_deref(), Some("Ana M Souza"));
        Ok(())
    }

    #[tokio::test]
    async fn upsert_creates_user_without_password() -> Result<()> {
        let store = MemoryStore::new();
        store
            .upsert_user(&UserProfile {
                telegram_id: 7,
                phone_number: "+55".to_string(),
                full_name: "Bruno Lima".to_string(),
            })
            .await?;

        let user = store.find_user_by_telegram_id(7).await?.unwrap();
        assert!(user.password.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn period_query_filters_by_type_and_range() -> Result<()> {
        let store = MemoryStore::new();
        store.seed_user(seedable_user()).await;
        store
            .insert_transaction(&tx("AAAAA", 50, TxType::Expense, (2025, 10, 5)))
            .await?;
        store
            .insert_transaction(&tx("BBBBB", 100, TxType::Income, (2025, 10, 10)))
            .await?;
        store
            .insert_transaction(&tx("CCCCC", 70, TxType::Expense, (2025, 11, 1)))
            .await?;

        let october = store
            .transactions_in_period(
                &Id::from_string("u1"),
                TypeFilter::All,
                NaiveDate::from_ymd_opt(2025, 10, 1),
                NaiveDate::from_ymd_opt(2025, 10, 31),
            )
            .await?;
        assert_eq!(october.len(), 2);

        let expenses_only = store
            .transactions_in_period(&Id::from_string("u1"), TypeFilter::Expense, None, None)
            .await?;
        assert_eq!(expenses_only.len(), 2);
        assert!(expenses_only.iter().all(|t| t.tx_type == TxType::Expense));
        Ok(())
    }

    #[tokio::test]
    async fn delete_by_id_removes_the_row() -> Result<()> {
        let store = MemoryStore::new();
        let row = tx("AAAAA", 50, TxType::Expense, (2025, 10, 5));
        store.insert_transaction(&row).await?;
        store.delete_transaction(&row.id).await?;
        assert_eq!(store.transaction_count().await, 0);
        Ok(())
    }
}
