use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Request duration in seconds. Tagged with status, report.",
};

pub const REPORTS_BUILT: MetricDef = MetricDef {
    name: "reports.built",
    metric_type: MetricType::Counter,
    description: "Reports built and served. Tagged with report.",
};

pub const REPORTS_FAILED: MetricDef = MetricDef {
    name: "reports.failed",
    metric_type: MetricType::Counter,
    description: "Reports that failed with a connection or query error. Tagged with report, kind.",
};

pub const ALL_METRICS: &[MetricDef] = &[REQUEST_DURATION, REPORTS_BUILT, REPORTS_FAILED];
