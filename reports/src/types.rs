use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Truck manufacturers tracked by the registration dataset.
///
/// `Other` collects every brand a report does not break out on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Brand {
    Dongfeng,
    Faw,
    Foton,
    Jac,
    Shacman,
    Sitrak,
    Howo,
    Sany,
    Gaz,
    Isuzu,
    Kamaz,
    Ural,
    Daewoo,
    Other,
}

impl Brand {
    /// Key used for this brand in report rows.
    pub const fn json_key(&self) -> &'static str {
        match self {
            Brand::Dongfeng => "dongfeng",
            Brand::Faw => "faw",
            Brand::Foton => "foton",
            Brand::Jac => "jac",
            Brand::Shacman => "shacman",
            Brand::Sitrak => "sitrak",
            Brand::Howo => "howo",
            Brand::Sany => "sany",
            Brand::Gaz => "gaz",
            Brand::Isuzu => "isuzu",
            Brand::Kamaz => "kamaz",
            Brand::Ural => "ural",
            Brand::Daewoo => "daewoo",
            Brand::Other => "other",
        }
    }

    /// Upper-case code as it appears in the dataset.
    pub const fn code(&self) -> &'static str {
        match self {
            Brand::Dongfeng => "DONGFENG",
            Brand::Faw => "FAW",
            Brand::Foton => "FOTON",
            Brand::Jac => "JAC",
            Brand::Shacman => "SHACMAN",
            Brand::Sitrak => "SITRAK",
            Brand::Howo => "HOWO",
            Brand::Sany => "SANY",
            Brand::Gaz => "GAZ",
            Brand::Isuzu => "ISUZU",
            Brand::Kamaz => "KAMAZ",
            Brand::Ural => "URAL",
            Brand::Daewoo => "DAEWOO",
            Brand::Other => "OTHER",
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How null brand counts leave the aggregator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    /// Keep "no registrations" as `null` in the output.
    #[default]
    Preserve,
    /// Report "no registrations" as `0`.
    Zero,
}

/// Registration count for one brand. `None` means the upstream had no
/// registrations at all, which is not the same as a reported zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandCount(Option<i64>);

impl BrandCount {
    pub const NULL: BrandCount = BrandCount(None);
    pub const ZERO: BrandCount = BrandCount(Some(0));

    pub const fn new(count: i64) -> Self {
        BrandCount(Some(count))
    }

    pub const fn get(&self) -> Option<i64> {
        self.0
    }

    pub const fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Null-as-zero coercion used for every sum.
    pub fn or_zero(&self) -> i64 {
        self.0.unwrap_or(0)
    }

    /// Adds `other` into `self`. The result stays null only while every
    /// contribution so far was null. On overflow `self` is left unchanged.
    pub fn accumulate(&mut self, other: BrandCount) -> Result<(), CountOverflow> {
        self.0 = match (self.0, other.0) {
            (None, None) => None,
            (a, b) => Some(checked_add(a.unwrap_or(0), b.unwrap_or(0))?),
        };
        Ok(())
    }

    pub fn coerce(self, policy: NullPolicy) -> Self {
        match policy {
            NullPolicy::Preserve => self,
            NullPolicy::Zero => BrandCount(Some(self.or_zero())),
        }
    }
}

impl From<Option<i64>> for BrandCount {
    fn from(value: Option<i64>) -> Self {
        BrandCount(value)
    }
}

/// A running count no longer fits in an `i64`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("registration count overflows a 64-bit integer")]
pub struct CountOverflow;

fn checked_add(a: i64, b: i64) -> Result<i64, CountOverflow> {
    a.checked_add(b).ok_or(CountOverflow)
}

/// Brand columns of one row, in report column order.
pub type BrandCounts = IndexMap<Brand, BrandCount>;

/// One decoded row as delivered by a row source, before translation.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRow {
    pub district: String,
    /// Absent for query shapes that only group by federal district.
    pub region: Option<String>,
    pub counts: BrandCounts,
    /// Total computed by the query, when the query shape has one.
    pub total: Option<i64>,
}

impl RawRow {
    pub fn counts_sum(&self) -> Result<i64, CountOverflow> {
        self.counts
            .values()
            .try_fold(0, |sum, count| checked_add(sum, count.or_zero()))
    }
}

/// One output row of a report.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportRow {
    pub region_name: String,
    pub counts: BrandCounts,
    pub total: i64,
    /// Recomputed sum of the brand columns, for reports that publish it next
    /// to the upstream total.
    pub total_market: Option<i64>,
}

impl ReportRow {
    /// An all-null row over `brands`, used as the seed of running totals.
    pub fn empty<'a, I>(region_name: impl Into<String>, brands: I, nulls: NullPolicy) -> Self
    where
        I: IntoIterator<Item = &'a Brand>,
    {
        ReportRow {
            region_name: region_name.into(),
            counts: brands
                .into_iter()
                .map(|brand| (*brand, BrandCount::NULL.coerce(nulls)))
                .collect(),
            total: 0,
            total_market: None,
        }
    }

    pub fn accumulate(&mut self, other: &ReportRow) -> Result<(), CountOverflow> {
        for (brand, count) in &other.counts {
            self.counts.entry(*brand).or_default().accumulate(*count)?;
        }
        self.total = checked_add(self.total, other.total)?;
        if let Some(market) = other.total_market {
            self.total_market = Some(checked_add(self.total_market.unwrap_or(0), market)?);
        }
        Ok(())
    }
}

impl Serialize for ReportRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.counts.len() + 2 + usize::from(self.total_market.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("region_name", &self.region_name)?;
        for (brand, count) in &self.counts {
            map.serialize_entry(brand.json_key(), count)?;
        }
        map.serialize_entry("total", &self.total)?;
        if let Some(market) = self.total_market {
            map.serialize_entry("total_market", &market)?;
        }
        map.end()
    }
}

/// Report output: district display name to rows, in display order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OrderedGroups(IndexMap<String, Vec<ReportRow>>);

impl OrderedGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an empty group for every key, in order.
    pub fn seeded<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OrderedGroups(keys.into_iter().map(|k| (k.into(), Vec::new())).collect())
    }

    pub fn get(&self, district: &str) -> Option<&Vec<ReportRow>> {
        self.0.get(district)
    }

    pub fn get_mut(&mut self, district: &str) -> Option<&mut Vec<ReportRow>> {
        self.0.get_mut(district)
    }

    pub fn contains(&self, district: &str) -> bool {
        self.0.contains_key(district)
    }

    /// Places `rows` under `key` at the front, moving the key if it exists.
    pub fn insert_front(&mut self, key: String, rows: Vec<ReportRow>) {
        self.0.shift_insert(0, key, rows);
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<ReportRow>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
