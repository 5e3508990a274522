//! Error types for feedpoll
//!
//! One [`Error`] enum covers configuration, transport, RPC decoding and the
//! polling loop. Fetch failures inside the loop never surface through
//! `Result`; they are reported as events instead.

use thiserror::Error;

/// The main error type for feedpoll
#[derive(Error, Debug)]
pub enum Error {
    // configuration
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("`{field}` must be set")]
    MissingConfigField { field: String },

    #[error("Bad value for `{field}`: {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Config is not valid YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // transport
    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server answered {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Throttled by server, retry in {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("No response within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Malformed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // contract views
    #[error("RPC error: {message}")]
    Rpc { message: String },

    #[error("Could not decode view result: {message}")]
    Decode { message: String },

    // polling
    #[error("Fetch for page {page} did not resolve within {timeout_ms}ms")]
    FetchTimeout { page: u64, timeout_ms: u64 },

    #[error("Scheduler: {message}")]
    Scheduler { message: String },

    // io
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("No config file at {path}")]
    FileNotFound { path: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Error reported by the RPC node or by the contract itself
    pub fn rpc(message: impl Into<String>) -> Self {
        Self::Rpc {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn scheduler(message: impl Into<String>) -> Self {
        Self::Scheduler {
            message: message.into(),
        }
    }

    /// Whether the same request may succeed if sent again
    ///
    /// Throttling, timeouts, transport failures and 5xx gateway statuses are
    /// transient. Contract errors and 4xx answers are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_)
            | Error::RateLimited { .. }
            | Error::Timeout { .. }
            | Error::FetchTimeout { .. } => true,
            Error::HttpStatus { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Whether this was caught while validating settings
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingConfigField { .. }
                | Error::InvalidConfigValue { .. }
                | Error::YamlParse(_)
                | Error::InvalidUrl(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Prefix an error with what was being attempted
pub trait ResultExt<T> {
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Like `context`, but only builds the message on failure
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.with_context(|| message.into())
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::Other(format!("{}: {}", f(), e.into())))
    }
}
