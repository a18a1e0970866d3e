use crate::catalog;
use crate::translation::{LabelCatalog, LabelTranslationTable};
use crate::types::{Brand, NullPolicy};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("report {0} has no brand columns")]
    EmptyBrands(String),

    #[error("report {report} lists brand {brand} twice")]
    DuplicateBrand { report: String, brand: Brand },

    #[error("report {0} trusts the upstream total but has no total column")]
    MissingTotalColumn(String),

    #[error("report {report} references unknown ordering: {ordering}")]
    UnknownOrdering { report: String, ordering: String },

    #[error("report {report} references unknown label table: {table}")]
    UnknownLabelTable { report: String, table: String },

    #[error("report {0} has an empty district ordering")]
    EmptyOrdering(String),

    #[error("report {0} has an empty summary label")]
    EmptySummaryLabel(String),

    #[error("report {report} orders a district under its summary label {label}")]
    SummaryLabelInOrdering { report: String, label: String },
}

/// Column shape of the upstream result set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// `district, region, brands..., total?`, one row per region plus
    /// optional per-district subtotal rows.
    #[default]
    Regional,
    /// `district, brands..., total?`, one row per federal district.
    District,
}

/// What to do with a row whose region label equals its district label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtotalPolicy {
    /// Hold it back and append it after the district's region rows.
    Trailing,
    /// Add it to the grand total only; it never shows up in a district.
    Folded,
    /// Keep it where the upstream put it.
    #[default]
    InPlace,
}

/// Where the synthesized totals go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryPolicy {
    #[default]
    None,
    /// Grand total under its own key, ahead of every district.
    Front,
    /// A total row at the end of each district.
    PerDistrict,
    Both,
}

impl SummaryPolicy {
    pub fn front(&self) -> bool {
        matches!(self, SummaryPolicy::Front | SummaryPolicy::Both)
    }

    pub fn per_district(&self) -> bool {
        matches!(self, SummaryPolicy::PerDistrict | SummaryPolicy::Both)
    }
}

/// Where a row's `total` comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalSource {
    /// The total column of the query.
    #[default]
    Upstream,
    /// Sum of the brand columns, nulls counted as zero.
    Recomputed,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OrderingRef {
    Named(String),
    Inline(Vec<String>),
}

impl Default for OrderingRef {
    fn default() -> Self {
        OrderingRef::Named(catalog::FEDERAL_DISTRICT_ORDER.to_string())
    }
}

fn default_district_labels() -> String {
    catalog::FEDERAL_DISTRICTS.to_string()
}

fn default_region_labels() -> String {
    catalog::REGIONS.to_string()
}

fn default_summary_label() -> String {
    "Summary".to_string()
}

fn default_true() -> bool {
    true
}

/// Per-report knobs as written in the config file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ReportConfig {
    /// Brand columns, in result-set and output order.
    pub brands: Vec<Brand>,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default = "default_true")]
    pub has_total_column: bool,
    #[serde(default)]
    pub ordering: OrderingRef,
    #[serde(default = "default_district_labels")]
    pub district_labels: String,
    #[serde(default = "default_region_labels")]
    pub region_labels: String,
    #[serde(default)]
    pub subtotal: SubtotalPolicy,
    #[serde(default)]
    pub summary: SummaryPolicy,
    #[serde(default = "default_summary_label")]
    pub summary_label: String,
    #[serde(default)]
    pub total: TotalSource,
    /// Also publish the recomputed sum as `total_market`.
    #[serde(default)]
    pub total_market: bool,
    #[serde(default)]
    pub nulls: NullPolicy,
}

/// Column description handed to row sources for decoding.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnLayout {
    pub shape: Layout,
    pub brands: Vec<Brand>,
    pub has_total: bool,
}

impl ColumnLayout {
    /// Number of columns in one record.
    pub fn width(&self) -> usize {
        let label_columns = match self.shape {
            Layout::Regional => 2,
            Layout::District => 1,
        };
        label_columns + self.brands.len() + usize::from(self.has_total)
    }
}

/// Named district orderings.
#[derive(Clone, Debug, Default)]
pub struct OrderingCatalog {
    orderings: HashMap<String, Arc<[String]>>,
}

impl OrderingCatalog {
    pub fn builtin() -> Self {
        let mut orderings = Self::default();
        orderings.insert(
            catalog::FEDERAL_DISTRICT_ORDER,
            catalog::federal_district_order()
                .iter()
                .map(|d| d.to_string())
                .collect(),
        );
        orderings.insert(
            catalog::FEDERAL_DISTRICT_LONG_ORDER,
            catalog::federal_district_long_order()
                .iter()
                .map(|d| d.to_string())
                .collect(),
        );
        orderings
    }

    pub fn insert(&mut self, name: &str, districts: Vec<String>) {
        self.orderings.insert(name.to_string(), districts.into());
    }

    pub fn get(&self, name: &str) -> Option<Arc<[String]>> {
        self.orderings.get(name).cloned()
    }
}

/// A report whose references have been resolved against the catalogs. Cheap
/// to share between requests; nothing in it changes after startup.
#[derive(Clone, Debug)]
pub struct ReportDefinition {
    pub name: String,
    pub columns: ColumnLayout,
    pub ordering: Arc<[String]>,
    pub district_labels: Arc<LabelTranslationTable>,
    pub region_labels: Arc<LabelTranslationTable>,
    pub subtotal: SubtotalPolicy,
    pub summary: SummaryPolicy,
    pub summary_label: String,
    pub total: TotalSource,
    pub total_market: bool,
    pub nulls: NullPolicy,
}

impl ReportDefinition {
    pub fn brands(&self) -> &[Brand] {
        &self.columns.brands
    }
}

impl ReportConfig {
    pub fn validate(&self, name: &str) -> Result<(), ValidationError> {
        if self.brands.is_empty() {
            return Err(ValidationError::EmptyBrands(name.to_string()));
        }

        let mut seen = HashSet::new();
        for brand in &self.brands {
            if !seen.insert(brand) {
                return Err(ValidationError::DuplicateBrand {
                    report: name.to_string(),
                    brand: *brand,
                });
            }
        }

        if self.total == TotalSource::Upstream && !self.has_total_column {
            return Err(ValidationError::MissingTotalColumn(name.to_string()));
        }

        if let OrderingRef::Inline(districts) = &self.ordering
            && districts.is_empty()
        {
            return Err(ValidationError::EmptyOrdering(name.to_string()));
        }

        if self.summary.front() && self.summary_label.is_empty() {
            return Err(ValidationError::EmptySummaryLabel(name.to_string()));
        }

        Ok(())
    }

    /// Validates the config and resolves its named references.
    pub fn resolve(
        &self,
        name: &str,
        labels: &LabelCatalog,
        orderings: &OrderingCatalog,
    ) -> Result<ReportDefinition, ValidationError> {
        self.validate(name)?;

        let ordering = match &self.ordering {
            OrderingRef::Named(ordering) => {
                orderings
                    .get(ordering)
                    .ok_or_else(|| ValidationError::UnknownOrdering {
                        report: name.to_string(),
                        ordering: ordering.clone(),
                    })?
            }
            OrderingRef::Inline(districts) => districts.clone().into(),
        };
        if ordering.is_empty() {
            return Err(ValidationError::EmptyOrdering(name.to_string()));
        }
        if self.summary.front() && ordering.contains(&self.summary_label) {
            return Err(ValidationError::SummaryLabelInOrdering {
                report: name.to_string(),
                label: self.summary_label.clone(),
            });
        }

        let table = |table: &str| {
            labels
                .get(table)
                .ok_or_else(|| ValidationError::UnknownLabelTable {
                    report: name.to_string(),
                    table: table.to_string(),
                })
        };

        Ok(ReportDefinition {
            name: name.to_string(),
            columns: ColumnLayout {
                shape: self.layout,
                brands: self.brands.clone(),
                has_total: self.has_total_column,
            },
            ordering,
            district_labels: table(&self.district_labels)?,
            region_labels: table(&self.region_labels)?,
            subtotal: self.subtotal,
            summary: self.summary,
            summary_label: self.summary_label.clone(),
            total: self.total,
            total_market: self.total_market,
            nulls: self.nulls,
        })
    }
}
