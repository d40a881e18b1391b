//! Tests for the error system.

use parlance::aggregate::stream_error;
use parlance::error::unified::*;
use parlance::error::*;
use parlance::types::StreamError;

#[test]
fn error_api_creation() {
    let err = ParlanceError::api(404, "Not found");
    assert!(matches!(&err, ParlanceError::Api { status: 404, .. }));
    assert_eq!(err.to_string(), "API error (status 404): Not found");
    assert_eq!(err.kind(), ErrorCode::ModelNotFound);
}

#[test]
fn from_status_picks_the_typed_variant() {
    assert!(matches!(
        ParlanceError::from_status(401, "bad key", None, None),
        ParlanceError::Authentication { status: 401, .. }
    ));
    assert!(matches!(
        ParlanceError::from_status(403, "flagged", None, None),
        ParlanceError::Authentication { status: 403, .. }
    ));
    let limited = ParlanceError::from_status(429, "slow", Some(1500), None);
    assert_eq!(limited.retry_after_ms(), Some(1500));
    assert!(matches!(
        ParlanceError::from_status(502, "down", None, None),
        ParlanceError::Api { status: 502, .. }
    ));
}

#[test]
fn error_helper_mappings_are_stable_for_major_variants() {
    struct Case {
        error: ParlanceError,
        expected_category: ErrorCategory,
        expected_retryable: bool,
        expected_recovery: RecoverySuggestion,
    }

    let network_error = reqwest::Client::new()
        .get("http://[::1")
        .build()
        .unwrap_err();
    let io_error = std::io::Error::new(std::io::ErrorKind::Other, "disk");
    let serde_error = serde_json::from_str::<serde_json::Value>("{not-json}").unwrap_err();

    let cases = vec![
        Case {
            error: ParlanceError::Authentication {
                status: 401,
                message: "bad-key".to_string(),
            },
            expected_category: ErrorCategory::Authentication,
            expected_retryable: false,
            expected_recovery: RecoverySuggestion::CheckCredentials,
        },
        Case {
            error: ParlanceError::RateLimited {
                retry_after_ms: Some(1000),
                message: "slow down".to_string(),
            },
            expected_category: ErrorCategory::RateLimit,
            expected_retryable: true,
            expected_recovery: RecoverySuggestion::RetryWithBackoff,
        },
        Case {
            error: ParlanceError::Timeout(5000),
            expected_category: ErrorCategory::Timeout,
            expected_retryable: true,
            expected_recovery: RecoverySuggestion::IncreaseTimeout,
        },
        Case {
            error: ParlanceError::Configuration("bad-config".to_string()),
            expected_category: ErrorCategory::Configuration,
            expected_retryable: false,
            expected_recovery: RecoverySuggestion::CheckConfiguration,
        },
        Case {
            error: ParlanceError::Network(network_error),
            expected_category: ErrorCategory::Network,
            expected_retryable: true,
            expected_recovery: RecoverySuggestion::RetryWithBackoff,
        },
        Case {
            error: ParlanceError::Serialization(serde_error),
            expected_category: ErrorCategory::Serialization,
            expected_retryable: false,
            expected_recovery: RecoverySuggestion::ContactSupport,
        },
        Case {
            error: ParlanceError::api(402, "Insufficient credits"),
            expected_category: ErrorCategory::Api,
            expected_retryable: false,
            expected_recovery: RecoverySuggestion::AddCredits,
        },
        Case {
            error: ParlanceError::api(503, "Server unavailable"),
            expected_category: ErrorCategory::Server,
            expected_retryable: true,
            expected_recovery: RecoverySuggestion::RetryWithBackoff,
        },
        Case {
            error: ParlanceError::api(418, "Teapot"),
            expected_category: ErrorCategory::Api,
            expected_retryable: false,
            expected_recovery: RecoverySuggestion::ContactSupport,
        },
        Case {
            error: ParlanceError::BufferExceeded {
                limit: 1024,
                buffered: 2048,
            },
            expected_category: ErrorCategory::Stream,
            expected_retryable: false,
            expected_recovery: RecoverySuggestion::ReduceInputSize,
        },
        Case {
            error: ParlanceError::Cancelled,
            expected_category: ErrorCategory::Cancelled,
            expected_retryable: false,
            expected_recovery: RecoverySuggestion::None,
        },
        Case {
            error: ParlanceError::Io(io_error),
            expected_category: ErrorCategory::Unknown,
            expected_retryable: false,
            expected_recovery: RecoverySuggestion::ContactSupport,
        },
        Case {
            error: ParlanceError::ModelNotFound("missing".to_string()),
            expected_category: ErrorCategory::Unknown,
            expected_retryable: false,
            expected_recovery: RecoverySuggestion::ContactSupport,
        },
    ];

    for case in cases {
        assert_eq!(case.error.category(), case.expected_category, "{}", case.error);
        assert_eq!(case.error.is_retryable(), case.expected_retryable, "{}", case.error);
        assert_eq!(case.error.recovery_suggestion(), case.expected_recovery, "{}", case.error);
    }
}

#[test]
fn error_api_with_details_sets_detail_fields() {
    let details = ErrorDetails {
        code: Some(ErrorCode::InvalidRequest),
        provider_code: Some("invalid_request_error".to_string()),
        param: Some("messages".to_string()),
        request_id: Some("req-123".to_string()),
        ..Default::default()
    };
    let err = ParlanceError::api_with_details(400, "bad request", details);
    assert_eq!(err.kind(), ErrorCode::InvalidRequest);

    match err {
        ParlanceError::Api {
            status,
            message,
            details: Some(details),
            ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "bad request");
            assert_eq!(
                details.provider_code.as_deref(),
                Some("invalid_request_error")
            );
            assert_eq!(details.param.as_deref(), Some("messages"));
            assert_eq!(details.request_id.as_deref(), Some("req-123"));
        }
        other => panic!("expected api error with details, got {other:?}"),
    }
}

#[test]
fn in_band_errors_map_like_transport_failures() {
    let err = stream_error(StreamError {
        message: "Rate limit exceeded".to_string(),
        code: Some("429".to_string()),
    });
    assert!(matches!(err, ParlanceError::RateLimited { .. }));

    let err = stream_error(StreamError {
        message: "provider crashed".to_string(),
        code: Some("server_error".to_string()),
    });
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.kind(), ErrorCode::ServiceUnavailable);
    assert_eq!(
        err.status_descriptor().map(|d| d.name),
        Some("Bad Gateway")
    );

    let err = stream_error(StreamError {
        message: "no code".to_string(),
        code: None,
    });
    assert_eq!(err.status(), Some(502));
}

#[test]
fn kinds_for_local_failures() {
    assert_eq!(ParlanceError::Cancelled.kind(), ErrorCode::Cancelled);
    assert!(ParlanceError::Cancelled.is_cancellation());
    assert_eq!(
        ParlanceError::Configuration("x".into()).kind(),
        ErrorCode::InvalidConfiguration
    );
    assert_eq!(
        ParlanceError::Stream("eof".into()).kind(),
        ErrorCode::StreamError
    );
    assert_eq!(
        ParlanceError::InvalidArgument("x".into()).kind(),
        ErrorCode::InvalidRequest
    );
}
