/// Errors surfaced while producing a report. Neither kind is retried; the
/// HTTP layer turns both into a 500 with the message in the `error` field.
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("can't connect to dataset store: {0}")]
    Connection(String),

    #[error(transparent)]
    Query(#[from] QueryError),
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum QueryError {
    #[error("failed to execute query: {0}")]
    Execute(String),

    #[error("failed to scan row {index}: {reason}")]
    Scan { index: usize, reason: String },
}

impl ReportError {
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Connection(_) => "connection",
            ReportError::Query(_) => "query",
        }
    }
}
