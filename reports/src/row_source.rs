//! Where report rows come from.
//!
//! A dataset is the materialized result of one report query: a JSON array of
//! records, each record an array laid out as described by `ColumnLayout`.
//! Decoding is shared by every source so that they all reject the same
//! malformed records.

use crate::config::{ColumnLayout, Layout};
use crate::errors::{QueryError, ReportError};
use crate::metrics_defs::SOURCE_FETCH_DURATION;
use crate::types::{BrandCount, BrandCounts, RawRow};
use async_trait::async_trait;
use serde_json::Value;
use shared::histogram;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

#[async_trait]
pub trait RowSource: Send + Sync {
    /// Checks that the backing store can be reached.
    async fn ping(&self) -> Result<(), ReportError>;

    /// Fetches and decodes every record of `dataset`, in stored order.
    async fn fetch(&self, dataset: &str, layout: &ColumnLayout) -> Result<Vec<RawRow>, ReportError>;
}

/// Reads datasets from `<base_dir>/<dataset>.json`.
pub struct FilesystemRowSource {
    base_dir: PathBuf,
}

impl FilesystemRowSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        FilesystemRowSource {
            base_dir: base_dir.into(),
        }
    }

    fn dataset_path(&self, dataset: &str) -> Result<PathBuf, QueryError> {
        if dataset.is_empty()
            || dataset.contains(['/', '\\'])
            || dataset.split('.').any(str::is_empty)
        {
            return Err(QueryError::Execute(format!(
                "invalid dataset name: {dataset:?}"
            )));
        }
        Ok(self.base_dir.join(format!("{dataset}.json")))
    }
}

#[async_trait]
impl RowSource for FilesystemRowSource {
    async fn ping(&self) -> Result<(), ReportError> {
        match tokio::fs::metadata(&self.base_dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(ReportError::Connection(format!(
                "{} is not a directory",
                self.base_dir.display()
            ))),
            Err(e) => Err(ReportError::Connection(format!(
                "{}: {e}",
                self.base_dir.display()
            ))),
        }
    }

    async fn fetch(&self, dataset: &str, layout: &ColumnLayout) -> Result<Vec<RawRow>, ReportError> {
        let start = Instant::now();
        self.ping().await?;

        let path = self.dataset_path(dataset)?;
        let contents = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => QueryError::Execute(format!("unknown dataset: {dataset}")),
            _ => QueryError::Execute(format!("{}: {e}", path.display())),
        })?;

        let records: Vec<Value> = serde_json::from_slice(&contents)
            .map_err(|e| QueryError::Execute(format!("dataset {dataset} is malformed: {e}")))?;
        let rows = decode_records(&records, layout)?;

        histogram!(SOURCE_FETCH_DURATION, "dataset" => dataset.to_string())
            .record(start.elapsed().as_secs_f64());
        tracing::debug!(dataset, rows = rows.len(), "Fetched dataset");

        Ok(rows)
    }
}

/// In-process source for tests and embedding callers that already hold the
/// records.
#[derive(Default)]
pub struct MemoryRowSource {
    datasets: RwLock<HashMap<String, Vec<Value>>>,
    unavailable: AtomicBool,
}

impl MemoryRowSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, dataset: &str, records: Vec<Value>) {
        if let Ok(mut datasets) = self.datasets.write() {
            datasets.insert(dataset.to_string(), records);
        }
    }

    /// Makes every call fail with a connection error until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }
}

#[async_trait]
impl RowSource for MemoryRowSource {
    async fn ping(&self) -> Result<(), ReportError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(ReportError::Connection("memory source is unavailable".into()));
        }
        Ok(())
    }

    async fn fetch(&self, dataset: &str, layout: &ColumnLayout) -> Result<Vec<RawRow>, ReportError> {
        self.ping().await?;
        let datasets = self
            .datasets
            .read()
            .map_err(|_| ReportError::Connection("memory source lock poisoned".into()))?;
        let records = datasets
            .get(dataset)
            .ok_or_else(|| QueryError::Execute(format!("unknown dataset: {dataset}")))?;
        Ok(decode_records(records, layout)?)
    }
}

pub fn decode_records(records: &[Value], layout: &ColumnLayout) -> Result<Vec<RawRow>, QueryError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| decode_record(index, record, layout))
        .collect()
}

/// Decodes one positional record. The district must be a string, the region
/// a string or null, brand counts integers or null, and the total an integer.
pub fn decode_record(index: usize, record: &Value, layout: &ColumnLayout) -> Result<RawRow, QueryError> {
    let scan_error = |reason: String| QueryError::Scan { index, reason };

    let columns = record
        .as_array()
        .ok_or_else(|| scan_error(format!("expected an array, got {record}")))?;
    if columns.len() != layout.width() {
        return Err(scan_error(format!(
            "expected {} columns, got {}",
            layout.width(),
            columns.len()
        )));
    }

    let mut columns = columns.iter();
    let mut next = || columns.next().unwrap_or(&Value::Null);

    let district = match next() {
        Value::String(district) => district.clone(),
        other => return Err(scan_error(format!("district must be a string, got {other}"))),
    };

    let region = match layout.shape {
        Layout::District => None,
        Layout::Regional => match next() {
            Value::String(region) => Some(region.clone()),
            Value::Null => None,
            other => return Err(scan_error(format!("region must be a string, got {other}"))),
        },
    };

    let mut counts = BrandCounts::with_capacity(layout.brands.len());
    for brand in &layout.brands {
        let count = match next() {
            Value::Null => BrandCount::NULL,
            value => value.as_i64().map(BrandCount::new).ok_or_else(|| {
                scan_error(format!("{brand} must be an integer or null, got {value}"))
            })?,
        };
        counts.insert(*brand, count);
    }

    let total = if layout.has_total {
        let value = next();
        Some(
            value
                .as_i64()
                .ok_or_else(|| scan_error(format!("total must be an integer, got {value}")))?,
        )
    } else {
        None
    };

    Ok(RawRow {
        district,
        region,
        counts,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Brand;
    use serde_json::json;
    use std::fs;

    fn regional() -> ColumnLayout {
        ColumnLayout {
            shape: Layout::Regional,
            brands: vec![Brand::Faw, Brand::Howo],
            has_total: true,
        }
    }

    #[test]
    fn test_decode_regional_record() {
        let row = decode_record(0, &json!(["Volga", "Samara", 3, null, 3]), &regional()).unwrap();
        assert_eq!(row.district, "Volga");
        assert_eq!(row.region.as_deref(), Some("Samara"));
        assert_eq!(row.counts[&Brand::Faw].get(), Some(3));
        assert!(row.counts[&Brand::Howo].is_null());
        assert_eq!(row.total, Some(3));
    }

    #[test]
    fn test_decode_district_record_without_total() {
        let layout = ColumnLayout {
            shape: Layout::District,
            brands: vec![Brand::Gaz],
            has_total: false,
        };
        let row = decode_record(0, &json!(["Ural", 7]), &layout).unwrap();
        assert_eq!(row.region, None);
        assert_eq!(row.total, None);
        assert_eq!(row.counts[&Brand::Gaz].get(), Some(7));
    }

    #[test]
    fn test_decode_rejects_malformed_records() {
        let layout = regional();
        let cases = [
            json!({"district": "Volga"}),
            json!(["Volga", "Samara", 3, 3]),
            json!([1, "Samara", 3, null, 3]),
            json!(["Volga", "Samara", "three", null, 3]),
            json!(["Volga", "Samara", 3, null, null]),
            json!(["Volga", "Samara", 2.5, null, 3]),
        ];
        for record in cases {
            let err = decode_record(4, &record, &layout).unwrap_err();
            assert!(
                matches!(err, QueryError::Scan { index: 4, .. }),
                "{record} decoded as {err:?}"
            );
        }
    }

    #[test]
    fn test_decode_records_reports_failing_index() {
        let records = vec![json!(["Volga", null, 1, 1, 2]), json!(["Volga"])];
        let err = decode_records(&records, &regional()).unwrap_err();
        assert!(matches!(err, QueryError::Scan { index: 1, .. }));
    }

    #[tokio::test]
    async fn test_filesystem_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("dumpers.json"),
            r#"[["Volga", "Samara", 1, null, 1], ["Ural", "Ural", null, 2, 2]]"#,
        )
        .unwrap();
        fs::write(dir.path().join("broken.json"), "[[").unwrap();

        let source = FilesystemRowSource::new(dir.path());
        source.ping().await.unwrap();

        let rows = source.fetch("dumpers", &regional()).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].district, "Ural");

        let err = source.fetch("missing", &regional()).await.unwrap_err();
        assert!(matches!(err, ReportError::Query(QueryError::Execute(_))));

        let err = source.fetch("broken", &regional()).await.unwrap_err();
        assert!(matches!(err, ReportError::Query(QueryError::Execute(_))));

        for name in ["../dumpers", "a/b", "", ".."] {
            let err = source.fetch(name, &regional()).await.unwrap_err();
            assert!(matches!(err, ReportError::Query(QueryError::Execute(_))), "{name}");
        }
    }

    #[tokio::test]
    async fn test_filesystem_source_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let source = FilesystemRowSource::new(dir.path().join("nope"));

        assert!(matches!(source.ping().await, Err(ReportError::Connection(_))));
        let err = source.fetch("dumpers", &regional()).await.unwrap_err();
        assert_eq!(err.kind(), "connection");
    }

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemoryRowSource::new();
        source.insert("ldt", vec![json!(["Volga", "Samara", 1, 2, 3])]);

        let rows = source.fetch("ldt", &regional()).await.unwrap();
        assert_eq!(rows[0].total, Some(3));

        source.set_unavailable(true);
        assert!(matches!(
            source.fetch("ldt", &regional()).await,
            Err(ReportError::Connection(_))
        ));
        source.set_unavailable(false);

        assert!(matches!(
            source.fetch("mdt", &regional()).await,
            Err(ReportError::Query(QueryError::Execute(_)))
        ));
    }
}
