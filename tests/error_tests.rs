//! Error handling module tests

use axum::http::StatusCode;
use axum::response::IntoResponse;
use talktome::utils::error::helpers::*;
use talktome::utils::error::*;

#[test]
fn test_classified_error_defaults() {
    let cases = [
        (ClassifiedError::transport_failure(), StatusCode::BAD_GATEWAY, "Upstream API error"),
        (ClassifiedError::upstream_malformed(), StatusCode::BAD_GATEWAY, "Invalid response from AI service"),
        (ClassifiedError::forbidden(), StatusCode::FORBIDDEN, "AI refused to answer"),
    ];

    for (error, expected_status, expected_message) in cases {
        assert_eq!(error.status_code(), expected_status);
        assert_eq!(error.message, expected_message);
        assert_eq!(error.to_string(), expected_message);
    }
}

#[test]
fn test_classified_error_serialization() {
    let json = serde_json::to_value(ClassifiedError::forbidden()).unwrap();

    assert_eq!(json["statusClass"], "forbidden");
    assert_eq!(json["message"], "AI refused to answer");
}

#[test]
fn test_app_error_status_codes() {
    let cases = vec![
        (AppError::from(ClassifiedError::transport_failure()), StatusCode::BAD_GATEWAY),
        (AppError::from(ClassifiedError::upstream_malformed()), StatusCode::BAD_GATEWAY),
        (AppError::from(ClassifiedError::forbidden()), StatusCode::FORBIDDEN),
        (validation_error("No prompt provided"), StatusCode::BAD_REQUEST),
        (AppError::PayloadTooLarge, StatusCode::PAYLOAD_TOO_LARGE),
        (misconfigured_error("no key"), StatusCode::INTERNAL_SERVER_ERROR),
        (internal_error("boom"), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (error, expected_status) in cases {
        assert_eq!(error.status_code(), expected_status);
    }
}

#[test]
fn test_public_messages() {
    assert_eq!(validation_error("Prompt too long").public_message(), "Prompt too long");
    assert_eq!(AppError::PayloadTooLarge.public_message(), "Request body too large");
    assert_eq!(misconfigured_error("OPENAI_API_KEY is not set").public_message(), "Server misconfiguration");
    assert_eq!(internal_error("stack trace here").public_message(), "Internal server error");
}

#[test]
fn test_should_log_details() {
    assert!(!validation_error("test").should_log_details());
    assert!(!AppError::PayloadTooLarge.should_log_details());
    assert!(AppError::from(ClassifiedError::forbidden()).should_log_details());
    assert!(internal_error("test").should_log_details());
}

#[tokio::test]
async fn test_into_response_body() {
    let response = AppError::from(ClassifiedError::forbidden()).into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json, serde_json::json!({"status": "error", "message": "AI refused to answer"}));
}
