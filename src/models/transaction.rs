use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Id;

/// Category used when the classifier does not extract one.
pub const DEFAULT_CATEGORY: &str = "Outros";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxType {
    Expense,
    Income,
}

/// Whether the money has actually moved yet.
///
/// Status is independent of type: a pending income and a pending expense are
/// both valid and both feed the projected (not the current) balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Paid,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    None,
    Monthly,
    Weekly,
    Yearly,
}

/// A ledger row.
///
/// `tx_code` is a short human-shareable handle (5 uppercase alphanumerics)
/// the user can quote later to delete the row from chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Id,
    pub user_id: Id,
    pub tx_code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub status: TxStatus,
    pub recurrence: Recurrence,
    pub is_fixed: bool,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl Transaction {
    /// A paid expense in the default category; adjust with the `with_*`
    /// builders.
    pub fn new(
        user_id: Id,
        tx_code: impl Into<String>,
        amount: Decimal,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Id::new(),
            user_id,
            tx_code: tx_code.into(),
            amount,
            description: description.into(),
            category: DEFAULT_CATEGORY.to_string(),
            subcategory: String::new(),
            tx_type: TxType::Expense,
            status: TxStatus::Paid,
            recurrence: Recurrence::None,
            is_fixed: false,
            date,
            due_date: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = subcategory.into();
        self
    }

    pub fn with_type(mut self, tx_type: TxType) -> Self {
        self.tx_type = tx_type;
        self
    }

    pub fn with_status(mut self, status: TxStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn with_is_fixed(mut self, is_fixed: bool) -> Self {
        self.is_fixed = is_fixed;
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction::new(
            Id::from_string("u1"),
            "AB12C",
            Decimal::new(5000, 2),
            "mercado",
            NaiveDate::from_ymd_opt(2025, 12, 5).unwrap(),
        )
    }

    #[test]
    fn new_transaction_defaults_match_the_classifier_contract() {
        let tx = sample();
        assert_eq!(tx.category, DEFAULT_CATEGORY);
        assert_eq!(tx.tx_type, TxType::Expense);
        assert_eq!(tx.status, TxStatus::Paid);
        assert_eq!(tx.recurrence, Recurrence::None);
        assert!(!tx.is_fixed);
        assert!(tx.subcategory.is_empty());
        assert!(tx.due_date.is_none());
    }

    #[test]
    fn enums_serialize_snake_case() {
        let tx = sample()
            .with_type(TxType::Income)
            .with_status(TxStatus::Pending)
            .with_recurrence(Recurrence::Monthly)
            .with_due_date(NaiveDate::from_ymd_opt(2025, 12, 20).unwrap());
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "income");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["recurrence"], "monthly");
        assert_eq!(json["date"], "2025-12-05");
        assert_eq!(json["due_date"], "2025-12-20");
    }

    #[test]
    fn amount_serializes_as_a_number() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json["amount"].is_number());
    }

    #[test]
    fn row_deserializes_from_store_shape() {
        let tx: Transaction = serde_json::from_str(
            r#"{
                "id": "t1",
                "user_id": "u1",
                "tx_code": "XY9Z0",
                "amount": 1500,
                "description": "salário",
                "category": "Salário",
                "type": "income",
                "status": "paid",
                "recurrence": "monthly",
                "is_fixed": true,
                "date": "2025-12-01"
            }"#,
        )
        .unwrap();
        assert_eq!(tx.tx_type, TxType::Income);
        assert_eq!(tx.amount, Decimal::from(1500));
        assert!(tx.subcategory.is_empty());
    }
}
