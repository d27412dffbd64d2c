use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{Recurrence, Transaction, TxStatus, TxType};

/// Format a monetary amount in Brazilian style: `R$ 1.234,56`.
///
/// Always two decimal places, '.' as the thousands separator and ',' as the
/// decimal separator.
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs();

    let raw = format!("{abs:.2}");
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        grouped.push(ch);
        let remaining = len - i - 1;
        if remaining > 0 && remaining % 3 == 0 {
            grouped.push('.');
        }
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac_part}")
}

/// `DD/MM/YYYY`, the way dates read in the chat replies.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// The confirmation receipt sent after a transaction is saved.
///
/// Lists every stored field plus the generated code and how to delete it.
pub fn receipt(tx: &Transaction) -> String {
    let (type_emoji, type_label) = match tx.tx_type {
        TxType::Income => ("🟢", "Receita"),
        TxType::Expense => ("🔴", "Despesa"),
    };
    let paid_emoji = match tx.status {
        TxStatus::Paid => "✅",
        TxStatus::Pending => "⏳",
    };
    let fixed_emoji = if tx.is_fixed { "✅" } else { "❌" };
    let recurrence_label = match tx.recurrence {
        Recurrence::None => "-",
        Recurrence::Monthly => "Mensal",
        Recurrence::Weekly => "Semanal",
        Recurrence::Yearly => "Anual",
    };
    let subcategory = if tx.subcategory.is_empty() {
        "-"
    } else {
        tx.subcategory.as_str()
    };

    format!(
        "*Transação registrada com sucesso!*\n{code}\n\n\
         📋 *Resumo da transação:*\n\n\
         ✏️ *Descrição:* {description}\n\
         💰 *Valor:* {amount}\n\
         {type_emoji} *Tipo:* {type_label}\n\
         🏷️ *Categoria:* {category}\n\
         🏷️ *Subcategoria:* {subcategory}\n\
         📅 *Data:* {date}\n\
         💳 *Pago:* {paid_emoji}\n\
         📌 *Despesa fixa:* {fixed_emoji}\n\
         🔄 *Recorrência:* {recurrence_label}\n\n\
         ❌ Para excluir diga: \"Excluir transação {code}\".",
        code = tx.tx_code,
        description = tx.description,
        amount = format_currency(tx.amount),
        category = tx.category,
        date = format_date(tx.date),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Id;

    #[test]
    fn currency_uses_brazilian_separators() {
        assert_eq!(format_currency(Decimal::new(123456, 2)), "R$ 1.234,56");
        assert_eq!(format_currency(Decimal::from(50)), "R$ 50,00");
        assert_eq!(format_currency(Decimal::ZERO), "R$ 0,00");
        assert_eq!(
            format_currency(Decimal::from(1_000_000)),
            "R$ 1.000.000,00"
        );
    }

    #[test]
    fn currency_rounds_half_away_from_zero() {
        assert_eq!(format_currency(Decimal::new(10005, 3)), "R$ 10,01");
        assert_eq!(format_currency(Decimal::new(-10005, 3)), "-R$ 10,01");
    }

    #[test]
    fn date_is_day_month_year() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 5).unwrap();
        assert_eq!(format_date(date), "05/12/2025");
    }

    #[test]
    fn receipt_includes_code_and_delete_hint() {
        let tx = Transaction::new(
            Id::from_string("u1"),
            "AB12C",
            Decimal::from(50),
            "mercado",
            NaiveDate::from_ymd_opt(2025, 12, 5).unwrap(),
        );
        let text = receipt(&tx);
        assert!(text.contains("AB12C"));
        assert!(text.contains("R$ 50,00"));
        assert!(text.contains("mercado"));
        assert!(text.contains("Excluir transação AB12C"));
        assert!(text.contains("Despesa"));
    }
}
