//! Unified error classification and recovery.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCode {
    InvalidApiKey,
    InsufficientCredits,
    RateLimitExceeded,
    ModelNotFound,
    InvalidRequest,
    ContentFiltered,
    ContextLengthExceeded,
    ServerError,
    ServiceUnavailable,
    Timeout,
    NetworkError,
    StreamError,
    Cancelled,
    InvalidConfiguration,
    Unknown,
}

impl ErrorCode {
    /// Best-effort mapping from an HTTP status to a code.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 | 403 => Self::InvalidApiKey,
            402 => Self::InsufficientCredits,
            404 => Self::ModelNotFound,
            408 | 504 => Self::Timeout,
            413 => Self::ContextLengthExceeded,
            429 => Self::RateLimitExceeded,
            502 | 503 => Self::ServiceUnavailable,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    Stream,
    Cancelled,
    Unknown,
}

/// Structured details returned by a provider API.
///
/// Mirrors the `{"error": {"message", "code", "type", "param", "metadata"}}`
/// body most OpenAI-compatible gateways send alongside a non-2xx status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: Option<ErrorCode>,
    pub provider_code: Option<String>,
    pub error_type: Option<String>,
    pub param: Option<String>,
    pub request_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckCredentials,
    AddCredits,
    CheckConfiguration,
    IncreaseTimeout,
    ReduceInputSize,
    None,
    ContactSupport,
}

/// Human-readable description of a well-known HTTP status, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDescriptor {
    pub status: u16,
    pub name: &'static str,
    pub typical_cause: &'static str,
}

const STATUS_TABLE: &[StatusDescriptor] = &[
    StatusDescriptor {
        status: 400,
        name: "Bad Request",
        typical_cause: "Invalid or unsupported request parameters for this model",
    },
    StatusDescriptor {
        status: 401,
        name: "Unauthorized",
        typical_cause: "Missing, expired, or invalid API key",
    },
    StatusDescriptor {
        status: 402,
        name: "Payment Required",
        typical_cause: "Insufficient account credits for the requested generation",
    },
    StatusDescriptor {
        status: 403,
        name: "Forbidden",
        typical_cause: "Key lacks access to this model or input was flagged by moderation",
    },
    StatusDescriptor {
        status: 408,
        name: "Request Timeout",
        typical_cause: "The request took too long to process upstream",
    },
    StatusDescriptor {
        status: 429,
        name: "Too Many Requests",
        typical_cause: "Rate limit reached for the key or the upstream provider",
    },
    StatusDescriptor {
        status: 500,
        name: "Internal Server Error",
        typical_cause: "Unexpected failure on the provider side",
    },
    StatusDescriptor {
        status: 502,
        name: "Bad Gateway",
        typical_cause: "The chosen model is down or returned an invalid response",
    },
    StatusDescriptor {
        status: 503,
        name: "Service Unavailable",
        typical_cause: "No provider currently available for the requested model",
    },
];

/// Look up the diagnostic descriptor for a well-known status.
pub fn describe_status(status: u16) -> Option<&'static StatusDescriptor> {
    STATUS_TABLE.iter().find(|entry| entry.status == status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_status_covers_common_statuses() {
        for status in [400, 401, 402, 403, 408, 429, 500, 502, 503] {
            let descriptor = describe_status(status).expect("known status");
            assert_eq!(descriptor.status, status);
            assert!(!descriptor.typical_cause.is_empty());
        }
        assert!(describe_status(418).is_none());
    }

    #[test]
    fn error_code_from_status() {
        assert_eq!(ErrorCode::from_status(429), ErrorCode::RateLimitExceeded);
        assert_eq!(ErrorCode::from_status(503), ErrorCode::ServiceUnavailable);
        assert_eq!(ErrorCode::from_status(599), ErrorCode::ServerError);
        assert_eq!(ErrorCode::from_status(302), ErrorCode::Unknown);
        assert_eq!(ErrorCode::RateLimitExceeded.to_string(), "rate_limit_exceeded");
    }
}
