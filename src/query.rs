//! Query descriptors and request URL assembly.
//!
//! A [`Query`] is built once per call through [`QueryBuilder::build`], which performs every
//! input check (missing values, period span, token presence) before any network activity.

use crate::constants::{COMPACT_TIMESTAMP_FORMAT, MAX_PERIOD_SPAN_DAYS, SECURITY_TOKEN_ENV};
use crate::errors::{AppError, AppResult};
use crate::timestamp::{resolve_timestamp, TimeInput};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::fmt;
use url::Url;

/// The provider security token.
///
/// Resolved per call and passed explicitly through the query; never stored globally.
#[derive(Clone, PartialEq, Eq)]
pub struct SecurityToken(String);

impl SecurityToken {
    /// Wraps an explicit token, rejecting empty values.
    pub fn new(token: impl Into<String>) -> AppResult<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(AppError::MissingInputError("security token".to_string()));
        }
        Ok(Self(token.trim().to_string()))
    }

    /// Uses `explicit` when given, otherwise reads the `ENTSOE_PAT` environment variable.
    pub fn resolve(explicit: Option<&str>) -> AppResult<Self> {
        match explicit {
            Some(token) => Self::new(token),
            None => {
                let token = std::env::var(SECURITY_TOKEN_ENV).map_err(|_| {
                    AppError::MissingInputError(format!(
                        "security token ({SECURITY_TOKEN_ENV} is not set)"
                    ))
                })?;
                Self::new(token)
            }
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecurityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecurityToken(***)")
    }
}

/// Area parameters understood by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainParam {
    BiddingZone,
    OutBiddingZone,
    ControlArea,
    In,
    Out,
}

impl DomainParam {
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::BiddingZone => "biddingZone_Domain",
            Self::OutBiddingZone => "outBiddingZone_Domain",
            Self::ControlArea => "controlArea_Domain",
            Self::In => "in_Domain",
            Self::Out => "out_Domain",
        }
    }
}

/// A fully validated, immutable query.
#[derive(Debug, Clone)]
pub struct Query {
    document_type: String,
    process_type: Option<String>,
    business_type: Option<String>,
    extra_params: Vec<(String, String)>,
    domains: Vec<(DomainParam, String)>,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    period_start_update: Option<DateTime<Utc>>,
    period_end_update: Option<DateTime<Utc>>,
    doc_status: Option<String>,
    security_token: SecurityToken,
}

impl Query {
    pub fn builder(document_type: &str) -> QueryBuilder {
        QueryBuilder::new(document_type)
    }

    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    pub fn process_type(&self) -> Option<&str> {
        self.process_type.as_deref()
    }

    pub fn domains(&self) -> &[(DomainParam, String)] {
        &self.domains
    }

    pub fn period_start(&self) -> DateTime<Utc> {
        self.period_start
    }

    pub fn period_end(&self) -> DateTime<Utc> {
        self.period_end
    }

    /// Assembles the request URL against `base_url`.
    ///
    /// Parameters are emitted in a fixed order and only when applicable. Timestamps use
    /// the compact UTC form; values are percent-encoded by `url`.
    pub fn to_url(&self, base_url: &str) -> AppResult<Url> {
        let mut url = Url::parse(base_url)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("documentType", &self.document_type);
            if let Some(process_type) = &self.process_type {
                pairs.append_pair("processType", process_type);
            }
            if let Some(business_type) = &self.business_type {
                pairs.append_pair("businessType", business_type);
            }
            for (name, value) in &self.extra_params {
                pairs.append_pair(name, value);
            }
            for (param, eic) in &self.domains {
                pairs.append_pair(param.as_param(), eic);
            }
            pairs.append_pair("periodStart", &compact(&self.period_start));
            pairs.append_pair("periodEnd", &compact(&self.period_end));
            if let Some(start) = &self.period_start_update {
                pairs.append_pair("periodStartUpdate", &compact(start));
            }
            if let Some(end) = &self.period_end_update {
                pairs.append_pair("periodEndUpdate", &compact(end));
            }
            if let Some(doc_status) = &self.doc_status {
                pairs.append_pair("docStatus", doc_status);
            }
            pairs.append_pair("securityToken", self.security_token.expose());
        }
        Ok(url)
    }
}

fn compact(instant: &DateTime<Utc>) -> String {
    instant.format(COMPACT_TIMESTAMP_FORMAT).to_string()
}

/// Collects query parameters; validation happens in [`QueryBuilder::build`].
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    document_type: String,
    process_type: Option<String>,
    business_type: Option<String>,
    extra_params: Vec<(String, String)>,
    domains: Vec<(DomainParam, String)>,
    period_start: Option<TimeInput>,
    period_end: Option<TimeInput>,
    period_start_update: Option<TimeInput>,
    period_end_update: Option<TimeInput>,
    doc_status: Option<String>,
    security_token: Option<SecurityToken>,
    source_tz: Tz,
    max_span_days: i64,
}

impl QueryBuilder {
    pub fn new(document_type: &str) -> Self {
        Self {
            document_type: document_type.to_string(),
            process_type: None,
            business_type: None,
            extra_params: Vec::new(),
            domains: Vec::new(),
            period_start: None,
            period_end: None,
            period_start_update: None,
            period_end_update: None,
            doc_status: None,
            security_token: None,
            source_tz: chrono_tz::CET,
            max_span_days: MAX_PERIOD_SPAN_DAYS,
        }
    }

    pub fn process_type(mut self, code: &str) -> Self {
        self.process_type = Some(code.to_string());
        self
    }

    pub fn business_type(mut self, code: Option<&str>) -> Self {
        self.business_type = code.map(str::to_string);
        self
    }

    /// Adds a provider parameter outside the common set (e.g. `psrType`, `contract_MarketAgreement.Type`).
    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.extra_params.push((name.to_string(), value.to_string()));
        self
    }

    pub fn domain(mut self, param: DomainParam, eic: &str) -> Self {
        self.domains.push((param, eic.to_string()));
        self
    }

    pub fn period(mut self, start: Option<TimeInput>, end: Option<TimeInput>) -> Self {
        self.period_start = start;
        self.period_end = end;
        self
    }

    pub fn update_period(mut self, start: Option<TimeInput>, end: Option<TimeInput>) -> Self {
        self.period_start_update = start;
        self.period_end_update = end;
        self
    }

    pub fn doc_status(mut self, code: Option<&str>) -> Self {
        self.doc_status = code.map(str::to_string);
        self
    }

    pub fn security_token(mut self, token: SecurityToken) -> Self {
        self.security_token = Some(token);
        self
    }

    pub fn source_timezone(mut self, tz: Tz) -> Self {
        self.source_tz = tz;
        self
    }

    pub fn max_span_days(mut self, days: i64) -> Self {
        self.max_span_days = days;
        self
    }

    /// Validates every input and produces the immutable [`Query`].
    ///
    /// # Errors
    ///
    /// - `MissingInputError` for a missing token, period boundary, or empty domain code
    /// - `InvalidRangeError` when the end is not after the start, the span exceeds the
    ///   configured maximum, or a timestamp cannot be interpreted
    pub fn build(self) -> AppResult<Query> {
        let security_token = self
            .security_token
            .ok_or_else(|| AppError::MissingInputError("security token".to_string()))?;

        for (param, eic) in &self.domains {
            if eic.trim().is_empty() {
                return Err(AppError::MissingInputError(param.as_param().to_string()));
            }
        }

        let period_start = resolve_timestamp(self.period_start.as_ref(), self.source_tz)
            .map_err(|e| rename_missing(e, "periodStart"))?;
        let period_end = resolve_timestamp(self.period_end.as_ref(), self.source_tz)
            .map_err(|e| rename_missing(e, "periodEnd"))?;
        validate_span(period_start, period_end, self.max_span_days)?;

        let (period_start_update, period_end_update) =
            match (&self.period_start_update, &self.period_end_update) {
                (None, None) => (None, None),
                (start, end) => {
                    let start = resolve_timestamp(start.as_ref(), self.source_tz)
                        .map_err(|e| rename_missing(e, "periodStartUpdate"))?;
                    let end = resolve_timestamp(end.as_ref(), self.source_tz)
                        .map_err(|e| rename_missing(e, "periodEndUpdate"))?;
                    validate_span(start, end, self.max_span_days)?;
                    (Some(start), Some(end))
                }
            };

        Ok(Query {
            document_type: self.document_type,
            process_type: self.process_type,
            business_type: self.business_type,
            extra_params: self.extra_params,
            domains: self.domains,
            period_start,
            period_end,
            period_start_update,
            period_end_update,
            doc_status: self.doc_status,
            security_token,
        })
    }
}

fn rename_missing(err: AppError, field: &str) -> AppError {
    match err {
        AppError::MissingInputError(_) => AppError::MissingInputError(field.to_string()),
        other => other,
    }
}

fn validate_span(start: DateTime<Utc>, end: DateTime<Utc>, max_span_days: i64) -> AppResult<()> {
    if end <= start {
        return Err(AppError::InvalidRangeError(format!(
            "Period end {end} must be after period start {start}"
        )));
    }
    if end - start > Duration::days(max_span_days) {
        return Err(AppError::InvalidRangeError(format!(
            "Period from {start} to {end} exceeds {max_span_days} days"
        )));
    }
    Ok(())
}
