use crate::constants::{BASE_URL, DEFAULT_SOURCE_TIMEZONE, MAX_PERIOD_SPAN_DAYS};
use crate::errors::{AppError, AppResult};
use chrono_tz::Tz;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Resolved configuration with all values filled in (no Options).
///
/// This struct represents the client defaults and can be deserialized by the TOML
/// loader. All fields have concrete values, making it safe to access directly without unwrapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolvedConfig {
    /// Base URL of the transparency platform REST API
    pub base_url: String,
    /// Per-request HTTP timeout in seconds
    pub timeout_secs: u64,
    /// Total number of attempts for transient failures (network errors, 5xx)
    pub max_attempts: u32,
    /// Initial delay in milliseconds before the first retry
    pub retry_initial_delay_ms: u64,
    /// Maximum delay in milliseconds between retries
    pub retry_max_delay_ms: u64,
    /// IANA timezone used to interpret naive timestamp inputs
    pub source_timezone: String,
    /// Longest period a single query may span, in days
    pub max_span_days: i64,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            timeout_secs: 60,
            max_attempts: 3,
            retry_initial_delay_ms: 1000,
            retry_max_delay_ms: 10000,
            source_timezone: DEFAULT_SOURCE_TIMEZONE.to_string(),
            max_span_days: MAX_PERIOD_SPAN_DAYS,
        }
    }
}

impl ResolvedConfig {
    /// Checks the values that cannot be expressed through the type system.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the base URL does not parse, the timezone is unknown,
    /// or any of `timeout_secs`, `max_attempts`, `max_span_days` is not positive.
    pub fn validate(&self) -> AppResult<()> {
        Url::parse(&self.base_url)?;
        self.timezone()?;
        if self.timeout_secs == 0 {
            return Err(AppError::InvalidInput(
                "Timeout must be greater than 0".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(AppError::InvalidInput(
                "Max attempts must be greater than 0".into(),
            ));
        }
        if self.max_span_days <= 0 {
            return Err(AppError::InvalidInput(
                "Max span days must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Parses `source_timezone` into a `chrono_tz` zone.
    pub fn timezone(&self) -> AppResult<Tz> {
        self.source_timezone.parse::<Tz>().map_err(|_| {
            AppError::InvalidInput(format!("Unknown timezone: {}", self.source_timezone))
        })
    }
}

/// A complete query run that can be loaded from a TOML file.
///
/// Deserializes the query (endpoint, areas, period) and optional client configuration.
/// The parser rejects unknown keys to catch typos.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolvedConfigFile {
    /// Endpoint name or alias, e.g. `"actual-load"` or `"dap"`
    pub endpoint: String,
    /// EIC code of the (first) area
    pub eic: String,
    /// EIC code of the second area for directional queries
    #[serde(default)]
    pub eic_to: Option<String>,
    /// Period start, any format accepted by the timestamp formatter
    pub start: String,
    /// Period end, any format accepted by the timestamp formatter
    pub end: String,
    /// Production type filter (`psrType`) for generation queries
    #[serde(default)]
    pub psr_type: Option<String>,
    /// Outage business type filter (`A53` planned, `A54` unplanned)
    #[serde(default)]
    pub business_type: Option<String>,
    /// Outage document status filter (`A05`, `A09`, `A13`)
    #[serde(default)]
    pub doc_status: Option<String>,
    /// Parquet file to write; the table is printed when absent
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Security token; falls back to the environment when absent
    #[serde(default)]
    pub security_token: Option<String>,
    /// Flattened resolved configuration with client defaults
    #[serde(flatten)]
    pub resolved: ResolvedConfig,
}

impl ResolvedConfigFile {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the TOML is malformed, required fields are missing,
    /// unknown keys are present, or the client configuration fails validation.
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ResolvedConfigFile = toml::from_str(&contents)
            .map_err(|e| AppError::InvalidInput(format!("Failed to parse config: {e}")))?;

        config.resolved.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_values() {
        let config = ResolvedConfig::default();
        assert_eq!(config.base_url, "https://web-api.tp.entsoe.eu/api");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.max_span_days, 366);
        assert_eq!(config.source_timezone, "CET");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn minimal_toml_is_parsed_and_defaults_apply() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"
            endpoint = "actual-load"
            eic = "10YCZ-CEPS-----N"
            start = "2024-01-01"
            end = "2024-01-02"
            "#,
        )
        .unwrap();

        let config = ResolvedConfigFile::from_toml_file(tmp.path()).unwrap();
        assert_eq!(config.endpoint, "actual-load");
        assert_eq!(config.eic, "10YCZ-CEPS-----N");
        assert!(config.eic_to.is_none());
        assert!(config.output.is_none());
        assert_eq!(config.resolved.max_attempts, 3);
        assert_eq!(config.resolved.timeout_secs, 60);
    }

    #[test]
    fn toml_overrides_client_settings() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"
            endpoint = "flows"
            eic = "10YCZ-CEPS-----N"
            eic_to = "10YSK-SEPS-----K"
            start = "2024-01-01"
            end = "2024-01-02"
            max_attempts = 5
            source_timezone = "Europe/Prague"
            "#,
        )
        .unwrap();

        let config = ResolvedConfigFile::from_toml_file(tmp.path()).unwrap();
        assert_eq!(config.eic_to.as_deref(), Some("10YSK-SEPS-----K"));
        assert_eq!(config.resolved.max_attempts, 5);
        assert_eq!(
            config.resolved.timezone().unwrap(),
            chrono_tz::Europe::Prague
        );
    }

    #[test]
    fn missing_required_toml_field_errors() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"
            endpoint = "load"
            eic = "10YCZ-CEPS-----N"
            start = "2024-01-01"
            "#,
        )
        .unwrap();

        assert!(ResolvedConfigFile::from_toml_file(tmp.path()).is_err());
    }

    #[test]
    fn unknown_key_errors() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"
            endpoint = "load"
            eic = "10YCZ-CEPS-----N"
            start = "2024-01-01"
            end = "2024-01-02"
            extra_flag = true
            "#,
        )
        .unwrap();

        assert!(ResolvedConfigFile::from_toml_file(tmp.path()).is_err());
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let config = ResolvedConfig {
            max_attempts: 0,
            ..ResolvedConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let config = ResolvedConfig {
            source_timezone: "Mars/Olympus_Mons".to_string(),
            ..ResolvedConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::InvalidInput(_))));
    }
}
