use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Category names mapped to their keywords, kept in insertion order.
///
/// The order matters: when two categories claim the same keyword the one
/// inserted first wins, so the on-disk document must round trip it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryRules(Vec<(String, Vec<String>)>);

impl CategoryRules {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.position(category).is_some()
    }

    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.position(category).map(|i| self.0[i].1.as_slice())
    }

    pub fn get_mut(&mut self, category: &str) -> Option<&mut Vec<String>> {
        let i = self.position(category)?;
        Some(&mut self.0[i].1)
    }

    /// Append a new category at the end. The caller checks for duplicates.
    pub fn push(&mut self, category: String, keywords: Vec<String>) {
        self.0.push((category, keywords));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(c, k)| (c.as_str(), k.as_slice()))
    }

    fn position(&self, category: &str) -> Option<usize> {
        self.0.iter().position(|(c, _)| c == category)
    }
}

impl Serialize for CategoryRules {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, keywords) in &self.0 {
            map.serialize_entry(category, keywords)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryRules {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Walk the map entry by entry so the document order survives.
        struct OrderedRules;

        impl<'de> Visitor<'de> for OrderedRules {
            type Value = CategoryRules;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of category names to lists of keywords")
            }

            fn visit_map<M>(self, mut map: M) -> Result<CategoryRules, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut rules = CategoryRules::default();
                while let Some((category, keywords)) = map.next_entry::<String, Vec<String>>()? {
                    if rules.contains(&category) {
                        return Err(serde::de::Error::custom(format!(
                            "the category {category:?} appears more than once"
                        )));
                    }
                    rules.push(category, keywords);
                }
                Ok(rules)
            }
        }

        deserializer.deserialize_map(OrderedRules)
    }
}
