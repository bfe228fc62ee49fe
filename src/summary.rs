use rust_decimal::Decimal;
use serde::Serialize;

use crate::{Flow, Transaction};

/// Total spent or received under one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CategorySummary {
    pub category: String,
    pub total_amount: Decimal,
}

/// Total the amounts of a batch per category.
///
/// Categories appear in the order they are first seen in the batch.
pub fn summarize(transactions: &[Transaction]) -> Vec<CategorySummary> {
    let mut summaries: Vec<CategorySummary> = vec![];
    for txn in transactions {
        match summaries.iter_mut().find(|s| s.category == txn.category) {
            Some(summary) => summary.total_amount += txn.amount,
            None => summaries.push(CategorySummary {
                category: txn.category.to_owned(),
                total_amount: txn.amount,
            }),
        }
    }
    summaries
}

/// Sum of the amounts moving in the given direction.
pub fn total_by_flow(transactions: &[Transaction], flow: Flow) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.flow == flow)
        .map(|t| t.amount)
        .sum()
}

/// The part of a batch moving in the given direction.
pub fn filter_by_flow(transactions: &[Transaction], flow: Flow) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| t.flow == flow)
        .cloned()
        .collect()
}

/// Render an amount with two decimal places and thousands separators.
pub fn format_amount(amount: Decimal) -> String {
    let text = format!("{:.2}", amount.abs().round_dp(2));
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction}")
}
