use crate::error::{Error, Result};
use crate::{RuleStore, Transaction};

/// Return a string containing the CSV representation of the transactions.
pub fn export_csv(transactions: &[Transaction]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for transaction in transactions {
        wtr.serialize(transaction)?;
    }
    wtr.flush()?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read back a batch the user reviewed as CSV.
///
/// Only the categories may differ from the exported batch. Rows are
/// paired with the export by position, so a row whose date, details,
/// amount or direction was edited, or that was moved, is refused rather
/// than learned from.
pub fn read_reviewed(text: &str, exported: &[Transaction]) -> Result<Vec<Transaction>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());
    let reviewed = reader
        .deserialize()
        .collect::<std::result::Result<Vec<Transaction>, csv::Error>>()?;
    if reviewed.len() != exported.len() {
        return Err(Error::BatchMismatch {
            original: exported.len(),
            edited: reviewed.len(),
        });
    }

    for (i, (before, after)) in exported.iter().zip(&reviewed).enumerate() {
        if let Some(column) = edited_column(before, after) {
            return Err(Error::ReviewedRowChanged {
                row: i + 1,
                column: column.to_owned(),
            });
        }
    }

    Ok(reviewed
        .into_iter()
        .map(|txn| {
            let category = txn.category.trim().to_owned();
            txn.with_category(category)
        })
        .collect())
}

/// Name the first column other than the category that differs.
fn edited_column(before: &Transaction, after: &Transaction) -> Option<&'static str> {
    if before.date != after.date {
        Some("Date")
    } else if before.details.trim() != after.details.trim() {
        Some("Details")
    } else if before.amount != after.amount {
        Some("Amount")
    } else if before.flow != after.flow {
        Some("Debit/Credit")
    } else {
        None
    }
}

/// Spell every reviewed category the way the store does.
///
/// A category typed as "dining" during review is filed under the stored
/// "Dining", so it is grouped with the rows already labeled that way.
pub fn use_stored_names(
    reviewed: Vec<Transaction>,
    store: &RuleStore,
) -> Result<Vec<Transaction>> {
    reviewed
        .into_iter()
        .map(|txn| {
            let category = store
                .canonical_name(&txn.category)
                .ok_or_else(|| Error::UnknownCategory(txn.category.clone()))?
                .to_owned();
            Ok(txn.with_category(category))
        })
        .collect()
}
