use reports::config::{OrderingCatalog, ReportConfig, ReportDefinition};
use reports::row_source::{FilesystemRowSource, RowSource};
use reports::translation::{LabelCatalog, LabelTranslationTable};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Path of the built-in report listing.
pub const LISTING_PATH: &str = "/reports";

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Empty report name")]
    EmptyReportName,

    #[error("Duplicate report name: {0}")]
    DuplicateReportName(String),

    #[error("Duplicate report path: {0}")]
    DuplicatePath(String),

    #[error("Report path must start with '/': {0}")]
    InvalidPath(String),

    #[error("Report path is reserved: {0}")]
    ReservedPath(String),

    #[error("Empty dataset_store base_dir")]
    EmptyBaseDir,

    #[error(transparent)]
    Report(#[from] reports::ValidationError),
}

/// Report service configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener serving the report endpoints
    pub listener: Listener,
    /// Listener serving `/health` and `/ready`
    pub admin_listener: Listener,
    pub dataset_store: DatasetStore,
    /// Extra label tables, merged over the built-in tables of the same name.
    #[serde(default)]
    pub label_tables: HashMap<String, HashMap<String, String>>,
    /// Extra named district orderings.
    #[serde(default)]
    pub orderings: HashMap<String, Vec<String>>,
    pub reports: Vec<ReportEndpoint>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Where report datasets are read from.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DatasetStore {
    Filesystem { base_dir: String },
}

impl DatasetStore {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            DatasetStore::Filesystem { base_dir } if base_dir.is_empty() => {
                Err(ValidationError::EmptyBaseDir)
            }
            DatasetStore::Filesystem { .. } => Ok(()),
        }
    }

    pub fn build(&self) -> Arc<dyn RowSource> {
        match self {
            DatasetStore::Filesystem { base_dir } => Arc::new(FilesystemRowSource::new(base_dir)),
        }
    }
}

/// One served report.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ReportEndpoint {
    pub name: String,
    /// Request path, e.g. `/api/2024/10m/dumpers6x4`
    pub path: String,
    /// Dataset to read; defaults to the report name.
    pub dataset: Option<String>,
    #[serde(flatten)]
    pub report: ReportConfig,
}

impl ReportEndpoint {
    pub fn dataset(&self) -> &str {
        self.dataset.as_deref().unwrap_or(&self.name)
    }
}

/// A report endpoint with its definition resolved against the catalogs.
#[derive(Clone, Debug)]
pub struct ResolvedEndpoint {
    pub name: String,
    pub path: String,
    pub dataset: String,
    pub definition: ReportDefinition,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;
        self.dataset_store.validate()?;
        self.resolve_reports()?;
        Ok(())
    }

    /// Built-in catalogs extended with the configured tables and orderings.
    pub fn catalogs(&self) -> (LabelCatalog, OrderingCatalog) {
        let mut labels = LabelCatalog::builtin();
        for (name, entries) in &self.label_tables {
            labels.merge(name, LabelTranslationTable::new(entries.clone()));
        }

        let mut orderings = OrderingCatalog::builtin();
        for (name, districts) in &self.orderings {
            orderings.insert(name, districts.clone());
        }

        (labels, orderings)
    }

    /// Checks endpoint names and paths and resolves every report definition.
    pub fn resolve_reports(&self) -> Result<Vec<ResolvedEndpoint>, ValidationError> {
        let (labels, orderings) = self.catalogs();
        let mut names = HashSet::new();
        let mut paths = HashSet::new();

        self.reports
            .iter()
            .map(|endpoint| {
                if endpoint.name.is_empty() {
                    return Err(ValidationError::EmptyReportName);
                }
                if !names.insert(endpoint.name.as_str()) {
                    return Err(ValidationError::DuplicateReportName(endpoint.name.clone()));
                }
                if !endpoint.path.starts_with('/') {
                    return Err(ValidationError::InvalidPath(endpoint.path.clone()));
                }
                if endpoint.path == LISTING_PATH {
                    return Err(ValidationError::ReservedPath(endpoint.path.clone()));
                }
                if !paths.insert(endpoint.path.as_str()) {
                    return Err(ValidationError::DuplicatePath(endpoint.path.clone()));
                }

                let definition = endpoint.report.resolve(&endpoint.name, &labels, &orderings)?;
                Ok(ResolvedEndpoint {
                    name: endpoint.name.clone(),
                    path: endpoint.path.clone(),
                    dataset: endpoint.dataset().to_string(),
                    definition,
                })
            })
            .collect()
    }
}
