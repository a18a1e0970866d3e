//! Display labels for dataset names.
//!
//! Districts and regions arrive in Russian and are shown in English. Lookups
//! are exact: no trimming, no case folding. A name without an entry passes
//! through unchanged.

use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelTranslationTable {
    entries: HashMap<String, String>,
}

impl LabelTranslationTable {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(source, label)| (source.to_string(), label.to_string()))
                .collect(),
        }
    }

    /// Returns the label for `name`, or `name` itself when there is none.
    pub fn translate<'a>(&'a self, name: &'a str) -> &'a str {
        self.entries.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of `other` win over existing ones.
    fn extend(&mut self, other: LabelTranslationTable) {
        self.entries.extend(other.entries);
    }
}

/// Named translation tables, built once at startup and shared read-only.
#[derive(Clone, Debug, Default)]
pub struct LabelCatalog {
    tables: HashMap<String, Arc<LabelTranslationTable>>,
}

impl LabelCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog holding the built-in district and region tables.
    pub fn builtin() -> Self {
        let mut labels = Self::empty();
        labels.insert(
            catalog::FEDERAL_DISTRICTS,
            LabelTranslationTable::from_pairs(catalog::federal_district_labels()),
        );
        labels.insert(
            catalog::FEDERAL_DISTRICTS_LONG,
            LabelTranslationTable::from_pairs(catalog::federal_district_long_labels()),
        );
        labels.insert(
            catalog::REGIONS,
            LabelTranslationTable::from_pairs(
                catalog::region_labels()
                    .into_iter()
                    .chain(catalog::federal_district_labels()),
            ),
        );
        labels
    }

    pub fn insert(&mut self, name: &str, table: LabelTranslationTable) {
        self.tables.insert(name.to_string(), Arc::new(table));
    }

    /// Merges `table` into the table called `name`, creating it if needed.
    pub fn merge(&mut self, name: &str, table: LabelTranslationTable) {
        let mut merged = self
            .tables
            .get(name)
            .map(|existing| (**existing).clone())
            .unwrap_or_default();
        merged.extend(table);
        self.insert(name, merged);
    }

    pub fn get(&self, name: &str) -> Option<Arc<LabelTranslationTable>> {
        self.tables.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }
}
