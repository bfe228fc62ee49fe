use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The date layout banks use in statement exports, e.g. "05 Jan 2024".
pub const STATEMENT_DATE_FORMAT: &str = "%d %b %Y";

/// Read a statement date, tolerating surrounding whitespace.
///
/// The year must be written with exactly four digits.
pub fn parse_statement_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let year = raw.split_whitespace().last()?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(raw, STATEMENT_DATE_FORMAT).ok()
}

/// Instructions on how to serialize a date object.
pub fn serialize_date<S>(dt: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    dt.format(STATEMENT_DATE_FORMAT)
        .to_string()
        .serialize(serializer)
}

/// Instructions on how to deserialize a date object.
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_statement_date(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("{s:?} is not a statement date")))
}
