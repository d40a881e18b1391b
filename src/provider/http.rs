//! Shared HTTP client construction, headers, and error-body parsing.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use serde::Deserialize;
use serde_json::Value;

use crate::config::ProviderSettings;
use crate::error::{ErrorCode, ErrorDetails, ParlanceError, Result};

/// Build a client with the configured timeouts.
pub fn build_client(settings: &ProviderSettings) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout())
        .timeout(settings.request_timeout())
        .pool_max_idle_per_host(10)
        .build()?;
    Ok(client)
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Add optional app-attribution headers (`HTTP-Referer`, `X-Title`).
pub fn with_attribution(mut headers: HeaderMap, settings: &ProviderSettings) -> HeaderMap {
    if let Some(val) = settings
        .app_url
        .as_deref()
        .and_then(|v| HeaderValue::from_str(v).ok())
    {
        headers.insert("HTTP-Referer", val);
    }
    if let Some(val) = settings
        .app_title
        .as_deref()
        .and_then(|v| HeaderValue::from_str(v).ok())
    {
        headers.insert("X-Title", val);
    }
    headers
}

/// `Retry-After` header in milliseconds (delta-seconds form only).
pub fn retry_after_header(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| (secs * 1000.0) as u64)
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<Value>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    param: Option<String>,
    #[serde(default)]
    metadata: Option<Value>,
    #[serde(default)]
    retry_after: Option<f64>,
}

/// Map a non-2xx response to an error.
///
/// The `Retry-After` header wins over a `retry_after` field in the body.
pub fn status_to_error(status: u16, header_retry_after_ms: Option<u64>, body: &str) -> ParlanceError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error);

    let Some(error) = parsed else {
        let message = if body.trim().is_empty() {
            format!("HTTP {status}")
        } else {
            body.trim().to_string()
        };
        return ParlanceError::from_status(status, message, header_retry_after_ms, None);
    };

    let body_retry_after = error
        .retry_after
        .or_else(|| {
            error
                .metadata
                .as_ref()
                .and_then(|m| m.get("retry_after"))
                .and_then(Value::as_f64)
        })
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| (secs * 1000.0) as u64);

    let details = ErrorDetails {
        code: Some(ErrorCode::from_status(status)),
        provider_code: error.code.as_ref().map(|code| match code {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
        error_type: error.error_type,
        param: error.param,
        request_id: None,
        metadata: error.metadata,
    };
    let message = error.message.unwrap_or_else(|| format!("HTTP {status}"));
    ParlanceError::from_status(
        status,
        message,
        header_retry_after_ms.or(body_retry_after),
        Some(details),
    )
}
