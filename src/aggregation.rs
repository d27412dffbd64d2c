//! Pure KPI math over an already-fetched transaction list.
//!
//! Type and status are independent axes: paid rows feed the current balance,
//! pending rows only feed the projection. Everything here is synchronous and
//! allocation-light; callers fetch, this module computes.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::models::{QueryPeriod, QueryType, Transaction, TxStatus, TxType, TypeFilter};

/// Raw-row sample cap in the analyst summary.
pub const QUERY_SAMPLE_LIMIT: usize = 30;

/// Dashboard KPI block for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KpiSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub received_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub pending_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub paid_expense: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub pending_expense: Decimal,
    /// Realized income − realized expense, plus the opening balance.
    #[serde(with = "rust_decimal::serde::float")]
    pub current_balance: Decimal,
    /// Current balance adjusted by everything still pending in the window.
    #[serde(with = "rust_decimal::serde::float")]
    pub projected_balance: Decimal,
    pub transaction_count: usize,
}

impl KpiSummary {
    /// `opening_balance` is the carried-over previous-period balance; pass
    /// `Decimal::ZERO` when unavailable.
    pub fn compute(transactions: &[Transaction], opening_balance: Decimal) -> Self {
        let sum = |tx_type: TxType, status: TxStatus| -> Decimal {
            transactions
                .iter()
                .filter(|t| t.tx_type == tx_type && t.status == status)
                .map(|t| t.amount)
                .sum()
        };

        let received_income = sum(TxType::Income, TxStatus::Paid);
        let pending_income = sum(TxType::Income, TxStatus::Pending);
        let paid_expense = sum(TxType::Expense, TxStatus::Paid);
        let pending_expense = sum(TxType::Expense, TxStatus::Pending);

        let current_balance = opening_balance + received_income - paid_expense;
        let projected_balance = current_balance + pending_income - pending_expense;

        Self {
            received_income,
            pending_income,
            paid_expense,
            pending_expense,
            current_balance,
            projected_balance,
            transaction_count: transactions.len(),
        }
    }

    /// Explicit "no data" signal for the presentation layer.
    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }
}

/// One slice of the category chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySlice {
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Share of the filtered total, in percent. 0 when the total is zero.
    #[serde(with = "rust_decimal::serde::float")]
    pub share_pct: Decimal,
}

/// Per-category totals restricted to one type axis (the chart filter),
/// sorted descending by amount.
pub fn category_breakdown(transactions: &[Transaction], chart_filter: TxType) -> Vec<CategorySlice> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for tx in transactions.iter().filter(|t| t.tx_type == chart_filter) {
        *totals.entry(tx.category.as_str()).or_default() += tx.amount;
    }

    let grand_total: Decimal = totals.values().copied().sum();

    let mut slices: Vec<CategorySlice> = totals
        .into_iter()
        .map(|(category, total)| CategorySlice {
            category: category.to_string(),
            total,
            share_pct: if grand_total.is_zero() {
                Decimal::ZERO
            } else {
                (total * Decimal::from(100) / grand_total).round_dp(2)
            },
        })
        .collect();
    slices.sort_by(|a, b| b.total.cmp(&a.total).then(a.category.cmp(&b.category)));
    slices
}

/// A fetched row tagged with the label of the period that matched it.
#[derive(Debug, Clone, Serialize)]
pub struct LabeledTransaction {
    pub period_label: String,
    #[serde(flatten)]
    pub transaction: Transaction,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodTotals {
    pub label: String,
    pub count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub expense: Decimal,
}

/// Compact numeric context handed to the analyst prompt: per-period and
/// overall totals plus a capped sample of raw rows.
#[derive(Debug, Clone, Serialize)]
pub struct QuerySummary {
    pub query_type: QueryType,
    pub filter_type: TypeFilter,
    pub periods: Vec<QueryPeriod>,
    pub total_transactions: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expense: Decimal,
    pub by_period: Vec<PeriodTotals>,
    pub transactions: Vec<LabeledTransaction>,
}

impl QuerySummary {
    pub fn build(
        query_type: QueryType,
        filter_type: TypeFilter,
        periods: &[QueryPeriod],
        rows: Vec<LabeledTransaction>,
    ) -> Self {
        let type_total = |label: Option<&str>, tx_type: TxType| -> Decimal {
            rows.iter()
                .filter(|r| label.is_none_or(|l| r.period_label == l))
                .filter(|r| r.transaction.tx_type == tx_type)
                .map(|r| r.transaction.amount)
                .sum()
        };

        let by_period = periods
            .iter()
            .map(|p| PeriodTotals {
                label: p.label.clone(),
                count: rows.iter().filter(|r| r.period_label == p.label).count(),
                income: type_total(Some(&p.label), TxType::Income),
                expense: type_total(Some(&p.label), TxType::Expense),
            })
            .collect();

        let total_income = type_total(None, TxType::Income);
        let total_expense = type_total(None, TxType::Expense);
        let total_transactions = rows.len();

        let mut transactions = rows;
        transactions.truncate(QUERY_SAMPLE_LIMIT);

        Self {
            query_type,
            filter_type,
            periods: periods.to_vec(),
            total_transactions,
            total_income,
            total_expense,
            by_period,
            transactions,
        }
    }
}
