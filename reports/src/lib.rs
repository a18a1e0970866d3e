pub mod aggregator;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod metrics_defs;
pub mod row_source;
pub mod translation;
pub mod types;

pub use aggregator::{ReportBuilder, build_report};
pub use config::{ReportConfig, ReportDefinition, ValidationError};
pub use errors::{QueryError, ReportError};
pub use row_source::{FilesystemRowSource, MemoryRowSource, RowSource};
pub use types::{Brand, BrandCount, OrderedGroups, RawRow, ReportRow};

/// Fetches `dataset` from `source` and builds the report described by `definition`.
pub async fn render(
    source: &dyn RowSource,
    dataset: &str,
    definition: &ReportDefinition,
) -> Result<OrderedGroups, ReportError> {
    let rows = source.fetch(dataset, &definition.columns).await?;
    build_report(rows, definition)
}
