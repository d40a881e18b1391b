//! Error types for parlance.

pub mod unified;

pub use unified::{
    describe_status, ErrorCategory, ErrorCode, ErrorDetails, RecoverySuggestion, StatusDescriptor,
};

use thiserror::Error;

/// Primary error type for all parlance operations.
#[derive(Error, Debug)]
pub enum ParlanceError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        details: Option<ErrorDetails>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Authentication error (status {status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited {
        retry_after_ms: Option<u64>,
        message: String,
    },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Stream line exceeded {limit} bytes without a newline ({buffered} buffered)")]
    BufferExceeded { limit: usize, buffered: usize },

    #[error("Generation cancelled")]
    Cancelled,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl ParlanceError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            source: None,
            details: None,
        }
    }

    /// Create an API error with full details.
    pub fn api_with_details(status: u16, message: impl Into<String>, details: ErrorDetails) -> Self {
        Self::Api {
            status,
            message: message.into(),
            source: None,
            details: Some(details),
        }
    }

    /// Build the error for a failed status, shared by transport and in-band failures.
    pub fn from_status(
        status: u16,
        message: impl Into<String>,
        retry_after_ms: Option<u64>,
        details: Option<ErrorDetails>,
    ) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Authentication { status, message },
            429 => Self::RateLimited {
                retry_after_ms,
                message,
            },
            _ => Self::Api {
                status,
                message,
                source: None,
                details,
            },
        }
    }

    /// HTTP status associated with this error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Authentication { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(err) if err.is_timeout() => ErrorCategory::Timeout,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Stream(_) | Self::BufferExceeded { .. } => ErrorCategory::Stream,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            _ => ErrorCategory::Unknown,
        }
    }

    /// Machine-readable kind.
    pub fn kind(&self) -> ErrorCode {
        match self {
            Self::Api {
                details: Some(ErrorDetails { code: Some(code), .. }),
                ..
            } => *code,
            Self::Api { status, .. } => ErrorCode::from_status(*status),
            Self::Authentication { .. } => ErrorCode::InvalidApiKey,
            Self::RateLimited { .. } => ErrorCode::RateLimitExceeded,
            Self::Network(err) if err.is_timeout() => ErrorCode::Timeout,
            Self::Network(_) => ErrorCode::NetworkError,
            Self::Timeout(_) => ErrorCode::Timeout,
            Self::ModelNotFound(_) => ErrorCode::ModelNotFound,
            Self::Stream(_) | Self::BufferExceeded { .. } => ErrorCode::StreamError,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::Configuration(_) => ErrorCode::InvalidConfiguration,
            Self::InvalidArgument(_) => ErrorCode::InvalidRequest,
            _ => ErrorCode::Unknown,
        }
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
        )
    }

    /// Deliberate cancellation is never surfaced to the user as a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Retry-after hint carried by rate-limit errors.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_ms, .. } => *retry_after_ms,
            _ => None,
        }
    }

    /// Diagnostic descriptor for the HTTP status, if well known.
    pub fn status_descriptor(&self) -> Option<&'static StatusDescriptor> {
        self.status().and_then(describe_status)
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        if self.status() == Some(402) {
            return RecoverySuggestion::AddCredits;
        }
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::RateLimit => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Network => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::Server => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Stream => RecoverySuggestion::ReduceInputSize,
            ErrorCategory::Cancelled => RecoverySuggestion::None,
            _ => RecoverySuggestion::ContactSupport,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ParlanceError>;
