use crate::error::{Error, Result};
use crate::rules::{RuleStore, UNCATEGORIZED};
use crate::Transaction;

/// A reviewed transaction whose category the user changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    /// Position of the transaction in the batch.
    pub index: usize,
    /// The category the user chose.
    pub category: String,
    /// The details to remember for that category.
    pub keyword: String,
}

/// Compare a labeled batch with its reviewed copy and list what changed.
///
/// Moving a transaction back to "Uncategorized", or relabeling one with
/// blank details, teaches nothing and is left out.
pub fn find_corrections(original: &[Transaction], edited: &[Transaction]) -> Result<Vec<Correction>> {
    if original.len() != edited.len() {
        return Err(Error::BatchMismatch {
            original: original.len(),
            edited: edited.len(),
        });
    }

    Ok(original
        .iter()
        .zip(edited)
        .enumerate()
        .filter(|(_, (before, after))| before.category != after.category)
        .filter(|(_, (_, after))| after.category != UNCATEGORIZED)
        .filter(|(_, (_, after))| !after.details.trim().is_empty())
        .map(|(index, (_, after))| Correction {
            index,
            category: after.category.to_owned(),
            keyword: after.details.trim().to_owned(),
        })
        .collect())
}

/// Turn the user's category changes into keyword rules and persist them.
///
/// Each changed transaction's details become a keyword of the category it
/// was moved to. The categories must already exist; if any does not,
/// nothing is learned. Returns the number of keywords added.
pub fn learn(original: &[Transaction], edited: &[Transaction], store: &mut RuleStore) -> Result<usize> {
    let corrections = find_corrections(original, edited)?;
    if corrections.is_empty() {
        return Ok(0);
    }
    store.add_keywords(
        corrections
            .iter()
            .map(|c| (c.category.as_str(), c.keyword.as_str())),
    )
}
