//! Safe request wrapper shared by every endpoint function.
//!
//! [`Client::send`] performs the GET, classifies the outcome into the [`AppError`]
//! taxonomy and retries transient failures with exponential backoff.

mod retry;

pub use retry::{calculate_backoff, should_retry, RetryConfig};

use crate::config::ResolvedConfig;
use crate::constants::ACKNOWLEDGEMENT_ROOT;
use crate::errors::{AppError, AppResult};
use crate::parser::{self, is_zip, peek_root_name, ResponseDocument, Table};
use crate::query::Query;
use chrono_tz::Tz;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Body and metadata of a successful provider answer.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_zip(&self) -> bool {
        is_zip(&self.body)
    }
}

/// HTTP client bound to one provider configuration.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    timezone: Tz,
    max_span_days: i64,
    retry: RetryConfig,
}

impl Client {
    /// Builds a client from a validated configuration.
    pub fn new(config: &ResolvedConfig) -> AppResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            timezone: config.timezone()?,
            max_span_days: config.max_span_days,
            retry: RetryConfig::from(config),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Timezone naive query timestamps are interpreted in.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn max_span_days(&self) -> i64 {
        self.max_span_days
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Sends `query` and normalizes the answer.
    pub async fn fetch(&self, query: &Query, flatten: bool) -> AppResult<Table> {
        let url = query.to_url(&self.base_url)?;
        let response = self.send(&url).await?;
        parser::normalize(&response.body, flatten)
    }

    /// GETs `url`, retrying network failures and 5xx answers.
    ///
    /// # Errors
    ///
    /// * `TransportError` when the network failure persists through every attempt
    /// * `ServiceUnavailableError` when every attempt got a 5xx status
    /// * `RequestRejectedError` for 4xx (and other non-success) statuses, never retried
    /// * `NoDataError` / `ProviderError` for a 200 carrying an acknowledgement document
    pub async fn send(&self, url: &Url) -> AppResult<RawResponse> {
        let redacted = redact_token(url);
        let mut last_error: Option<AppError> = None;

        for attempt in 0..self.retry.max_attempts {
            debug!(
                url = %redacted,
                attempt = attempt + 1,
                max_attempts = self.retry.max_attempts,
                "Sending request"
            );
            match self.send_once(url, attempt + 1).await {
                Ok(response) => {
                    debug!(
                        url = %redacted,
                        status = response.status,
                        bytes = response.body.len(),
                        "Received response"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    if attempt + 1 < self.retry.max_attempts && should_retry(&e) {
                        let delay_ms = calculate_backoff(attempt, &self.retry);
                        warn!(
                            url = %redacted,
                            attempt = attempt + 1,
                            max_attempts = self.retry.max_attempts,
                            delay_ms = delay_ms,
                            error = %e,
                            "Retrying request after error"
                        );
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            AppError::TransportError(format!(
                "Request failed after {} attempt(s) (no error recorded)",
                self.retry.max_attempts
            ))
        }))
    }

    async fn send_once(&self, url: &Url, attempt: u32) -> AppResult<RawResponse> {
        // The reqwest error text would otherwise carry the token-bearing URL
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AppError::TransportError(e.without_url().to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::TransportError(e.without_url().to_string()))?
            .to_vec();

        if status.is_server_error() {
            return Err(AppError::ServiceUnavailableError {
                status: status.as_u16(),
                attempts: attempt,
            });
        }
        if !status.is_success() {
            return Err(AppError::RequestRejectedError {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).trim().to_string(),
            });
        }

        if !is_zip(&body) && is_acknowledgement(&body) {
            if let ResponseDocument::Acknowledgement(ack) = parser::parse_document(&body)? {
                return Err(ack.into_error());
            }
        }

        Ok(RawResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

fn is_acknowledgement(body: &[u8]) -> bool {
    // Unreadable bodies are left for normalization to report
    matches!(peek_root_name(body), Ok(Some(name)) if name == ACKNOWLEDGEMENT_ROOT)
}

/// Renders `url` with the `securityToken` value masked.
pub fn redact_token(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k == "securityToken" {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), value)
        })
        .collect();
    if pairs.is_empty() {
        return redacted.to_string();
    }
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_security_token() {
        let url = Url::parse("https://example.org/api?documentType=A65&securityToken=secret-123")
            .unwrap();
        let redacted = redact_token(&url);
        assert!(!redacted.contains("secret-123"));
        assert!(redacted.contains("securityToken=***") || redacted.contains("securityToken=%2A%2A%2A"));
        assert!(redacted.contains("documentType=A65"));
    }

    #[test]
    fn client_takes_settings_from_config() {
        let config = ResolvedConfig {
            max_attempts: 5,
            source_timezone: "Europe/Madrid".to_string(),
            ..ResolvedConfig::default()
        };
        let client = Client::new(&config).unwrap();
        assert_eq!(client.retry_config().max_attempts, 5);
        assert_eq!(client.timezone(), chrono_tz::Europe::Madrid);
        assert_eq!(client.base_url(), crate::constants::BASE_URL);
    }

    #[test]
    fn acknowledgement_detection_ignores_garbage() {
        assert!(is_acknowledgement(b"<Acknowledgement_MarketDocument/>"));
        assert!(!is_acknowledgement(b"<GL_MarketDocument/>"));
        assert!(!is_acknowledgement(b"\x00\x01 not xml <"));
    }
}
