//! Metrics definitions for report building.

use shared::metrics_defs::{MetricDef, MetricType};

pub const ROWS_DROPPED: MetricDef = MetricDef {
    name: "report.rows.dropped",
    metric_type: MetricType::Counter,
    description: "Rows discarded because their district is not part of the report ordering. Tagged with report.",
};

pub const ROWS_SCANNED: MetricDef = MetricDef {
    name: "report.rows.scanned",
    metric_type: MetricType::Counter,
    description: "Rows consumed by the report builder. Tagged with report.",
};

pub const SOURCE_FETCH_DURATION: MetricDef = MetricDef {
    name: "row_source.fetch.duration",
    metric_type: MetricType::Histogram,
    description: "Time to fetch and decode a dataset in seconds",
};

pub const ALL_METRICS: &[MetricDef] = &[ROWS_DROPPED, ROWS_SCANNED, SOURCE_FETCH_DURATION];
