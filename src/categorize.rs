use std::collections::HashMap;

use crate::rules::{normalize_keyword, RuleStore, UNCATEGORIZED};
use crate::Transaction;

/// Keyword to category lookup for one pass over a batch.
struct KeywordLookup<'a> {
    categories: HashMap<String, &'a str>,
}

impl<'a> KeywordLookup<'a> {
    fn new(store: &'a RuleStore) -> Self {
        let mut categories = HashMap::new();
        for (category, keywords) in store.iter() {
            if category == UNCATEGORIZED || keywords.is_empty() {
                continue;
            }
            // Categories come in insertion order, so the first claim on a
            // keyword is the one that sticks.
            for keyword in keywords {
                categories
                    .entry(normalize_keyword(keyword))
                    .or_insert(category);
            }
        }
        KeywordLookup { categories }
    }

    fn category_for(&self, details: &str) -> &'a str {
        self.categories
            .get(&normalize_keyword(details))
            .copied()
            .unwrap_or(UNCATEGORIZED)
    }
}

/// Label each transaction with the category whose keyword equals its details.
///
/// Details and keywords are compared trimmed and without regard to case.
/// A transaction matching no keyword is "Uncategorized", whatever label it
/// carried before. The store is only read.
pub fn categorize(transactions: &[Transaction], store: &RuleStore) -> Vec<Transaction> {
    let lookup = KeywordLookup::new(store);
    transactions
        .iter()
        .map(|txn| {
            let category = lookup.category_for(&txn.details);
            txn.clone().with_category(category)
        })
        .collect()
}
