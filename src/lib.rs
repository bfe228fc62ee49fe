mod categorize;
mod dates;
mod error;
mod file_io;
mod learn;
mod review;
mod rules;
mod settings;
mod statement;
mod summary;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use categorize::categorize;
pub use dates::{parse_statement_date, STATEMENT_DATE_FORMAT};
pub use error::{Error, Result};
pub use learn::{find_corrections, learn as apply_user_corrections, Correction};
pub use review::{export_csv, read_reviewed, use_stored_names};
pub use rules::{
    add_category, normalize_category_name, normalize_keyword, RuleStore, UNCATEGORIZED,
};
pub use settings::{normalize_path, settings_path, Settings, STARTER_SETTINGS};
pub use statement::{parse_records, parse_statement, parse_statement_file, REQUIRED_COLUMNS};
pub use summary::{filter_by_flow, format_amount, summarize, total_by_flow, CategorySummary};

use dates::{deserialize_date, serialize_date};

/// Direction of money for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flow {
    Debit,
    Credit,
}

impl Flow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flow::Debit => "Debit",
            Flow::Credit => "Credit",
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only the exact spellings used by the bank are accepted.
impl FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "Debit" => Ok(Flow::Debit),
            "Credit" => Ok(Flow::Credit),
            other => Err(format!("{other:?} is neither Debit nor Credit")),
        }
    }
}

/// One line of a bank statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Transaction {
    #[serde(serialize_with = "serialize_date", deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    pub details: String,
    /// Always a non-negative magnitude; the direction lives in `flow`.
    #[serde(
        serialize_with = "serialize_amount",
        deserialize_with = "deserialize_amount"
    )]
    pub amount: Decimal,
    #[serde(rename = "Debit/Credit")]
    pub flow: Flow,
    pub category: String,
}

impl Transaction {
    /// Create an uncategorized transaction.
    pub fn new(date: NaiveDate, details: impl Into<String>, amount: Decimal, flow: Flow) -> Self {
        Transaction {
            date,
            details: details.into(),
            amount: amount.abs(),
            flow,
            category: UNCATEGORIZED.to_owned(),
        }
    }

    /// Return a copy of this transaction filed under the given category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Convert a statement amount into its magnitude.
///
/// Thousands separators are dropped before conversion, so "1,234.50"
/// reads as 1234.50. Anything else that is not a plain decimal number
/// yields None.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    Decimal::from_str_exact(cleaned.trim())
        .ok()
        .map(|amt| amt.abs())
}

/// Amounts are written with two decimal places.
fn serialize_amount<S>(amount: &Decimal, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    format!("{:.2}", amount.round_dp(2)).serialize(serializer)
}

/// Amounts are read back the same way a statement amount is.
fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_amount(&s).ok_or_else(|| serde::de::Error::custom(format!("{s:?} is not an amount")))
}
