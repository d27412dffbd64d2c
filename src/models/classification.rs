use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use super::{Recurrence, TxStatus, TxType};

/// What the classifier understood from one inbound message.
///
/// The oracle returns loosely-shaped JSON; [`ClassificationResult::from_json`]
/// coerces it into this closed union at the boundary. A response that cannot
/// be coerced is treated the same as a provider failure so the fallback chain
/// can move on.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationResult {
    Transaction(ParsedTransaction),
    Query(ParsedQuery),
    Delete { tx_code: String },
    Chat { message: Option<String> },
}

/// Transaction fields as extracted; everything the user did not say is
/// `None` and defaulted by the pipeline (date=today, category="Outros",
/// expense/paid/none/not-fixed).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedTransaction {
    pub amount: Decimal,
    pub description: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub tx_type: Option<TxType>,
    pub status: Option<TxStatus>,
    pub recurrence: Option<Recurrence>,
    pub is_fixed: Option<bool>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Sum,
    List,
    Compare,
    Analysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFilter {
    Expense,
    Income,
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPeriod {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub query_type: QueryType,
    pub periods: Vec<QueryPeriod>,
    pub filter_type: TypeFilter,
}

impl ClassificationResult {
    /// Coerce the oracle's raw JSON into the union.
    ///
    /// Returns `None` when the discriminant is missing/unknown or a required
    /// field cannot be read, rather than trusting the oracle's shape.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value.get("action").and_then(Value::as_str)? {
            "transaction" => Some(Self::Transaction(ParsedTransaction {
                amount: decimal_field(value, "amount")?,
                description: non_empty_str(value, "description").unwrap_or_default(),
                category: non_empty_str(value, "category"),
                subcategory: non_empty_str(value, "subcategory"),
                tx_type: non_empty_str(value, "type").and_then(|s| tx_type(&s)),
                status: non_empty_str(value, "status").and_then(|s| status(&s)),
                recurrence: non_empty_str(value, "recurrence").and_then(|s| recurrence(&s)),
                is_fixed: value.get("is_fixed").and_then(Value::as_bool),
                date: date_field(value, "date"),
            })),
            "delete" => Some(Self::Delete {
                tx_code: non_empty_str(value, "tx_code")?,
            }),
            "query" => Some(Self::Query(ParsedQuery {
                query_type: non_empty_str(value, "query_type")
                    .and_then(|s| query_type(&s))
                    .unwrap_or(QueryType::Analysis),
                periods: periods_field(value),
                filter_type: non_empty_str(value, "filter_type")
                    .and_then(|s| type_filter(&s))
                    .unwrap_or(TypeFilter::All),
            })),
            "chat" => Some(Self::Chat {
                message: non_empty_str(value, "message"),
            }),
            _ => None,
        }
    }
}

fn non_empty_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Amounts arrive as JSON numbers, but some models quote them.
fn decimal_field(value: &Value, key: &str) -> Option<Decimal> {
    match value.get(key)? {
        Value::Number(n) => Decimal::try_from(n.as_f64()?).ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn date_field(value: &Value, key: &str) -> Option<NaiveDate> {
    value
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
}

/// Periods come as an array; older model outputs put a single
/// start_date/end_date at the top level instead.
fn periods_field(value: &Value) -> Vec<QueryPeriod> {
    let parsed: Vec<QueryPeriod> = value
        .get("periods")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(|entry| QueryPeriod {
                    start_date: date_field(entry, "start_date"),
                    end_date: date_field(entry, "end_date"),
                    label: non_empty_str(entry, "label").unwrap_or_else(|| "Período".to_string()),
                })
                .collect()
        })
        .unwrap_or_default();

    if !parsed.is_empty() {
        return parsed;
    }

    vec![QueryPeriod {
        start_date: date_field(value, "start_date"),
        end_date: date_field(value, "end_date"),
        label: "Período".to_string(),
    }]
}

fn tx_type(raw: &str) -> Option<TxType> {
    match raw.trim().to_lowercase().as_str() {
        "expense" => Some(TxType::Expense),
        "income" => Some(TxType::Income),
        _ => None,
    }
}

fn status(raw: &str) -> Option<TxStatus> {
    match raw.trim().to_lowercase().as_str() {
        "paid" => Some(TxStatus::Paid),
        "pending" => Some(TxStatus::Pending),
        _ => None,
    }
}

fn recurrence(raw: &str) -> Option<Recurrence> {
    match raw.trim().to_lowercase().as_str() {
        "none" => Some(Recurrence::None),
        "monthly" => Some(Recurrence::Monthly),
        "weekly" => Some(Recurrence::Weekly),
        "yearly" => Some(Recurrence::Yearly),
        _ => None,
    }
}

fn query_type(raw: &str) -> Option<QueryType> {
    match raw.trim().to_lowercase().as_str() {
        "sum" => Some(QueryType::Sum),
        "list" => Some(QueryType::List),
        "compare" => Some(QueryType::Compare),
        "analysis" => Some(QueryType::Analysis),
        _ => None,
    }
}

fn type_filter(raw: &str) -> Option<TypeFilter> {
    match raw.trim().to_lowercase().as_str() {
        "expense" => Some(TypeFilter::Expense),
        "income" => Some(TypeFilter::Income),
        "all" => Some(TypeFilter::All),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transaction_with_minimal_fields_coerces() {
        let result = ClassificationResult::from_json(&json!({
            "action": "transaction",
            "amount": 50,
            "description": "mercado",
            "type": "expense"
        }))
        .unwrap();

        let ClassificationResult::Transaction(tx) = result else {
            panic!("expected transaction");
        };
        assert_eq!(tx.amount, Decimal::from(50));
        assert_eq!(tx.description, "mercado");
        assert_eq!(tx.tx_type, Some(TxType::Expense));
        assert_eq!(tx.category, None);
        assert_eq!(tx.date, None);
    }

    #[test]
    fn transaction_amount_accepts_quoted_numbers() {
        let result = ClassificationResult::from_json(&json!({
            "action": "transaction",
            "amount": "1234.56",
            "description": "salário"
        }))
        .unwrap();
        let ClassificationResult::Transaction(tx) = result else {
            panic!("expected transaction");
        };
        assert_eq!(tx.amount, Decimal::from_str_exact("1234.56").unwrap());
    }

    #[test]
    fn transaction_without_amount_is_rejected() {
        let result = ClassificationResult::from_json(&json!({
            "action": "transaction",
            "description": "mercado"
        }));
        assert!(result.is_none());
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(ClassificationResult::from_json(&json!({"action": "dance"})).is_none());
        assert!(ClassificationResult::from_json(&json!({"amount": 10})).is_none());
    }

    #[test]
    fn garbage_enum_values_fall_back_to_none() {
        let result = ClassificationResult::from_json(&json!({
            "action": "transaction",
            "amount": 10,
            "type": "sideways",
            "status": 7,
            "recurrence": "sometimes"
        }))
        .unwrap();
        let ClassificationResult::Transaction(tx) = result else {
            panic!("expected transaction");
        };
        assert_eq!(tx.tx_type, None);
        assert_eq!(tx.status, None);
        assert_eq!(tx.recurrence, None);
    }

    #[test]
    fn delete_requires_a_code() {
        let result = ClassificationResult::from_json(&json!({
            "action": "delete",
            "tx_code": "ab12c"
        }))
        .unwrap();
        assert_eq!(
            result,
            ClassificationResult::Delete {
                tx_code: "ab12c".to_string()
            }
        );
        assert!(ClassificationResult::from_json(&json!({"action": "delete"})).is_none());
    }

    #[test]
    fn query_defaults_and_periods_parse() {
        let result = ClassificationResult::from_json(&json!({
            "action": "query",
            "query_type": "compare",
            "filter_type": "income",
            "periods": [
                {"start_date": "2025-10-01", "end_date": "2025-10-31", "label": "Outubro"},
                {"start_date": "2025-07-01", "end_date": "2025-07-31", "label": "Julho"}
            ]
        }))
        .unwrap();
        let ClassificationResult::Query(q) = result else {
            panic!("expected query");
        };
        assert_eq!(q.query_type, QueryType::Compare);
        assert_eq!(q.filter_type, TypeFilter::Income);
        assert_eq!(q.periods.len(), 2);
        assert_eq!(q.periods[0].label, "Outubro");
        assert_eq!(
            q.periods[1].start_date,
            NaiveDate::from_ymd_opt(2025, 7, 1)
        );
    }

    #[test]
    fn query_without_periods_synthesizes_one_from_top_level_dates() {
        let result = ClassificationResult::from_json(&json!({
            "action": "query",
            "start_date": "2025-10-01",
            "end_date": "2025-10-31"
        }))
        .unwrap();
        let ClassificationResult::Query(q) = result else {
            panic!("expected query");
        };
        assert_eq!(q.periods.len(), 1);
        assert_eq!(q.periods[0].label, "Período");
        assert_eq!(q.query_type, QueryType::Analysis);
        assert_eq!(q.filter_type, TypeFilter::All);
    }

    #[test]
    fn chat_with_blank_message_yields_none_message() {
        let result =
            ClassificationResult::from_json(&json!({"action": "chat", "message": "  "})).unwrap();
        assert_eq!(result, ClassificationResult::Chat { message: None });
    }
}
