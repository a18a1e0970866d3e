use report_api::config::{Config as ReportApiConfig, ValidationError};
use serde::Deserialize;
use std::fs::File;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Deserialize)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
    #[serde(default = "default_metrics_prefix")]
    pub prefix: String,
}

fn default_metrics_prefix() -> String {
    "truckstat".to_string()
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub sentry_dsn: Option<String>,
    /// Default level when `RUST_LOG` is not set.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            sentry_dsn: None,
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.level.clone()))
    }
}

#[derive(Debug, Deserialize)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub report_api: ReportApiConfig,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.common.logging.level_filter()?;
        self.report_api.validate()?;
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_api::config::DatasetStore;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    const REPORT_API_YAML: &str = r#"
            report_api:
                listener:
                    host: 0.0.0.0
                    port: 8080
                admin_listener:
                    host: 127.0.0.1
                    port: 8081
                dataset_store:
                    type: filesystem
                    base_dir: /var/lib/truckstat/
                reports:
                    - name: ldt_2024_10m
                      path: /api/2024/10m/ldt
                      brands: [DONGFENG, FOTON, GAZ, ISUZU, JAC, KAMAZ, OTHER]
                      total: recomputed
            "#;

    #[test]
    fn report_api_config() {
        let tmp = write_tmp_file(REPORT_API_YAML);
        let config = Config::from_file(tmp.path()).expect("load config");

        assert!(config.common.metrics.is_none());
        assert_eq!(config.common.logging.level, "info");
        assert_eq!(
            config.report_api.dataset_store,
            DatasetStore::Filesystem {
                base_dir: "/var/lib/truckstat/".into()
            }
        );
        assert_eq!(config.report_api.reports[0].report.brands.len(), 7);
    }

    #[test]
    fn common_config() {
        let yaml = format!(
            r#"
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            logging:
                sentry_dsn: https://key@sentry.example.com/1
                level: debug
            {REPORT_API_YAML}"#
        );
        let tmp = write_tmp_file(&yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        let metrics = config.common.metrics.expect("metrics config");
        assert_eq!(metrics.statsd_port, 8125);
        assert_eq!(metrics.prefix, "truckstat");
        assert_eq!(
            config.common.logging.level_filter().unwrap(),
            LevelFilter::DEBUG
        );
        assert!(config.common.logging.sentry_dsn.is_some());
    }

    #[test]
    fn example_config() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../truckstat.example.yaml");
        let config = Config::from_file(&path).expect("load example config");

        let endpoints = config.report_api.resolve_reports().unwrap();
        assert_eq!(endpoints.len(), 40);
        let tractors = endpoints
            .iter()
            .find(|endpoint| endpoint.path == "/9m2023tractors4x2total")
            .unwrap();
        assert_eq!(tractors.definition.ordering[0], "Central Federal District");
    }

    #[test]
    fn config_errors() {
        let err = Config::from_file(std::path::Path::new("/nonexistent/truckstat.yaml"))
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::LoadError(_)));

        let tmp = write_tmp_file("report_api: [");
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::ParseError(_))
        ));

        let tmp = write_tmp_file(&REPORT_API_YAML.replace("port: 8080", "port: 0"));
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::Validation(ValidationError::InvalidPort))
        ));

        let yaml = format!("            logging:\n                level: loud\n{REPORT_API_YAML}");
        let tmp = write_tmp_file(&yaml);
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }
}
