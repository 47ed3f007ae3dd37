use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// A required input (timestamp, EIC code, security token) was not supplied
    #[error("Missing input: {0}")]
    MissingInputError(String),
    /// Period span too long, end before start, or a timestamp that cannot be interpreted
    #[error("Invalid range: {0}")]
    InvalidRangeError(String),
    /// Network-level failure that persisted through every retry attempt
    #[error("Transport error: {0}")]
    TransportError(String),
    /// The provider answered with a 4xx status; the body holds the precise reason
    #[error("Request rejected (HTTP {status}): {body}")]
    RequestRejectedError { status: u16, body: String },
    /// The provider answered with a 5xx status on every attempt
    #[error("Service unavailable (HTTP {status}) after {attempts} attempt(s)")]
    ServiceUnavailableError { status: u16, attempts: u32 },
    /// The query was valid but the provider holds no matching data
    #[error("No data: {0}")]
    NoDataError(String),
    /// The provider returned an acknowledgement document rejecting the query
    #[error("Provider error{}: {reason}", code_suffix(.code))]
    ProviderError {
        code: Option<String>,
        reason: String,
    },
    /// The response body could not be parsed or violates the document schema
    #[error("Malformed response: {0}")]
    MalformedResponseError(String),
    /// A `resolution` value outside the supported ISO-8601 duration set
    #[error("Unsupported resolution: {0}")]
    UnsupportedResolutionError(String),
    /// Invalid configuration or command-line input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// IO operation failed
    #[error("IO error: {0}")]
    IoError(String),
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_ref().map(|c| format!(" [{c}]")).unwrap_or_default()
}

impl AppError {
    /// Returns `true` for failures worth another attempt with the same input.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::TransportError(_) | AppError::ServiceUnavailableError { .. }
        )
    }

    /// Returns `true` when the provider simply had nothing for the query window.
    pub fn is_no_data(&self) -> bool {
        matches!(self, AppError::NoDataError(_))
    }
}

// Conversion implementations for common errors
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::TransportError(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::InvalidInput(format!("Invalid URL: {err}"))
    }
}

impl From<quick_xml::Error> for AppError {
    fn from(err: quick_xml::Error) -> Self {
        AppError::MalformedResponseError(err.to_string())
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::MalformedResponseError(format!("Invalid ZIP archive: {err}"))
    }
}

impl From<polars::error::PolarsError> for AppError {
    fn from(err: polars::error::PolarsError) -> Self {
        AppError::IoError(format!("DataFrame operation failed: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

// Custom type alias for Results in this application
pub type AppResult<T> = Result<T, AppError>;
