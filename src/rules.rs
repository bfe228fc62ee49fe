mod document;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::file_io::write_atomically;
use crate::rules::document::CategoryRules;

/// The category every transaction starts in. It never holds keywords.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Canonical display form of a category name: trimmed, lowercased,
/// with the first character uppercased ("  DINING out" -> "Dining out").
pub fn normalize_category_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The form in which keywords and transaction details are compared.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

/// Add a category to the store, saving it if the category is new.
pub fn add_category(store: &mut RuleStore, name: &str) -> Result<bool> {
    store.add_category(name)
}

/// The keyword rules, bound to the JSON document they persist to.
#[derive(Debug, PartialEq)]
pub struct RuleStore {
    /// Location of the rule document.
    path: PathBuf,
    /// Keywords for each category, in insertion order.
    rules: CategoryRules,
}

impl RuleStore {
    /// Read the rule document at the given path.
    ///
    /// A missing document gives the default store holding only
    /// "Uncategorized"; nothing is written until the first mutation.
    /// A document that cannot be read as a map of category names to
    /// keyword lists, or that lacks "Uncategorized", is reported as
    /// corrupt rather than replaced.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no rule document yet, starting empty");
                return Ok(Self::empty(path));
            }
            Err(e) => return Err(corrupt(&path, e.to_string())),
        };

        let rules: CategoryRules =
            serde_json::from_str(&raw).map_err(|e| corrupt(&path, e.to_string()))?;
        if !rules.contains(UNCATEGORIZED) {
            return Err(corrupt(
                &path,
                format!("the {UNCATEGORIZED:?} category is missing"),
            ));
        }

        debug!(path = %path.display(), categories = rules.len(), "loaded rule document");
        Ok(RuleStore { path, rules })
    }

    /// A store holding only the reserved category.
    fn empty(path: PathBuf) -> Self {
        let mut rules = CategoryRules::default();
        rules.push(UNCATEGORIZED.to_owned(), vec![]);
        RuleStore { path, rules }
    }

    /// Location of the rule document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Category names in insertion order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(category, _)| category)
    }

    /// Categories with their keywords, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.rules.iter()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.rules.contains(category)
    }

    pub fn keywords(&self, category: &str) -> Option<&[String]> {
        self.rules.get(category)
    }

    /// Add a category, if not already present, and persist the store.
    ///
    /// Returns whether the category was new. Adding an existing name,
    /// after normalization, changes nothing and writes nothing.
    pub fn add_category(&mut self, name: &str) -> Result<bool> {
        let category = normalize_category_name(name);
        if category.is_empty() {
            return Err(Error::InvalidCategoryName(name.to_owned()));
        }
        if self.rules.contains(&category) {
            return Ok(false);
        }

        self.mutate(|rules| rules.push(category.clone(), vec![]))?;
        debug!(category = %category, "added category");
        Ok(true)
    }

    /// Append a keyword to an existing category and persist the store.
    ///
    /// Returns whether the keyword was new to that category.
    pub fn add_keyword(&mut self, category: &str, keyword: &str) -> Result<bool> {
        Ok(self.add_keywords([(category, keyword)])? == 1)
    }

    /// Append several keywords and persist the store once.
    ///
    /// Every entry is checked before anything changes, so one bad entry
    /// leaves the store untouched. Keywords a category already holds
    /// (ignoring case and surrounding whitespace) are not repeated.
    /// Returns the number of keywords appended.
    pub fn add_keywords<'a>(
        &mut self,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<usize> {
        let mut resolved = vec![];
        for (category, keyword) in entries {
            let category = self.resolve(category)?;
            let keyword = keyword.trim();
            if keyword.is_empty() {
                return Err(Error::EmptyKeyword(category));
            }
            resolved.push((category, keyword.to_owned()));
        }

        let mut pending = CategoryRules::default();
        let mut added = 0;
        for (category, keyword) in resolved {
            let known = self.rules.get(&category).unwrap_or_default();
            let queued = pending.get(&category).unwrap_or_default();
            let wanted = normalize_keyword(&keyword);
            if known
                .iter()
                .chain(queued.iter())
                .any(|k| normalize_keyword(k) == wanted)
            {
                continue;
            }
            match pending.get_mut(&category) {
                Some(keywords) => keywords.push(keyword),
                None => pending.push(category, vec![keyword]),
            }
            added += 1;
        }

        if added == 0 {
            return Ok(0);
        }

        self.mutate(|rules| {
            for (category, keywords) in pending.iter() {
                if let Some(existing) = rules.get_mut(category) {
                    existing.extend(keywords.iter().cloned());
                }
            }
        })?;
        debug!(added, "added keywords");
        Ok(added)
    }

    /// Write the whole store to its document, replacing it atomically.
    pub fn save(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.rules)?;
        write_atomically(&self.path, text + "\n")?;
        debug!(path = %self.path.display(), "saved rule document");
        Ok(())
    }

    /// The stored spelling of a category, trying the name as written
    /// before its normalized form.
    pub fn canonical_name(&self, category: &str) -> Option<&str> {
        let normalized = normalize_category_name(category);
        self.categories()
            .find(|stored| *stored == category)
            .or_else(|| self.categories().find(|stored| *stored == normalized))
    }

    /// Find the stored name for a category that may hold keywords.
    fn resolve(&self, category: &str) -> Result<String> {
        let name = self
            .canonical_name(category)
            .ok_or_else(|| Error::UnknownCategory(category.to_owned()))?;
        if name == UNCATEGORIZED {
            return Err(Error::ReservedCategory(name.to_owned()));
        }
        Ok(name.to_owned())
    }

    /// Apply a change and persist it, undoing the change if saving fails.
    fn mutate(&mut self, change: impl FnOnce(&mut CategoryRules)) -> Result<()> {
        let before = self.rules.clone();
        change(&mut self.rules);
        if let Err(e) = self.save() {
            self.rules = before;
            return Err(e);
        }
        Ok(())
    }
}

fn corrupt(path: &Path, reason: String) -> Error {
    Error::CorruptStore {
        path: path.to_owned(),
        reason,
    }
}
