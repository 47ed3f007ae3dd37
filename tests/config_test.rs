//! Tests for config module

use entsoe_cli::client::Client;
use entsoe_cli::config::{ResolvedConfig, ResolvedConfigFile};
use entsoe_cli::errors::AppError;
use entsoe_cli::models::Endpoint;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_config_file_drives_client() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("entsoe.toml");

    let config_content = r#"
endpoint = "dap"
eic = "10YCZ-CEPS-----N"
start = "2024-01-01 00:00"
end = "2024-01-08 00:00"
output = "data/prices.parquet"
psr_type = "B16"
security_token = "from-file"

base_url = "http://localhost:8080/api"
timeout_secs = 15
max_attempts = 4
retry_initial_delay_ms = 250
retry_max_delay_ms = 2000
source_timezone = "Europe/Brussels"
max_span_days = 31
"#;

    fs::write(&config_path, config_content).unwrap();

    let file = ResolvedConfigFile::from_toml_file(&config_path).unwrap();
    assert_eq!(file.endpoint.parse::<Endpoint>().unwrap(), Endpoint::DayAheadPrices);
    assert_eq!(file.output, Some(PathBuf::from("data/prices.parquet")));
    assert_eq!(file.psr_type.as_deref(), Some("B16"));
    assert_eq!(file.security_token.as_deref(), Some("from-file"));

    let client = Client::new(&file.resolved).unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080/api");
    assert_eq!(client.timezone(), chrono_tz::Europe::Brussels);
    assert_eq!(client.max_span_days(), 31);
    assert_eq!(client.retry_config().max_attempts, 4);
    assert_eq!(client.retry_config().initial_delay_ms, 250);
}

#[test]
fn test_config_defaults() {
    let config = ResolvedConfig::default();

    assert_eq!(config.timeout_secs, 60);
    assert_eq!(config.max_attempts, 3);
    assert_eq!(config.retry_initial_delay_ms, 1000);
    assert_eq!(config.retry_max_delay_ms, 10000);
    assert!(Client::new(&config).is_ok());
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(
        &config_path,
        r#"
endpoint = "load"
eic = "10YCZ-CEPS-----N"
start = "2024-01-01"
end = "2024-01-02"
base_url = "not a url"
"#,
    )
    .unwrap();

    let err = ResolvedConfigFile::from_toml_file(&config_path).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = ResolvedConfigFile::from_toml_file(&temp_dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, AppError::IoError(_)));
}
