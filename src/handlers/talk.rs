//! Prompt endpoint
//!
//! Forwards an end-user prompt to the upstream service once, normalizes the
//! answer and attaches an approximate token usage estimate

use crate::handlers::AppState;
use crate::models::api::{TalkRequest, TalkResponse};
use crate::models::upstream::incomplete_reason;
use crate::services::{normalize, shape_request};
use crate::utils::error::helpers::{misconfigured_error, validation_error};
use crate::utils::error::{AppError, AppResult};
use crate::utils::logging::create_request_log_summary;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Handle prompt requests
///
/// POST /api/talktome
pub async fn handle_talk(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TalkRequest>, JsonRejection>,
) -> AppResult<Json<TalkResponse>> {
    let Json(request) = payload.map_err(body_rejection)?;

    // Validate request
    validate_talk_request(&request, state.settings.request.max_prompt_length)?;

    if !state.settings.has_api_key() {
        return Err(misconfigured_error("OPENAI_API_KEY is not set"));
    }

    // Shape upstream payload
    let model = state.settings.openai.model.as_str();
    let upstream_request = shape_request(&request, model, &state.settings.payload_defaults())
        .ok_or_else(|| validation_error("No prompt provided"))?;

    if let Ok(summary) = serde_json::to_string(&create_request_log_summary(&upstream_request)) {
        debug!("Upstream request: {}", summary);
    }

    // Single upstream call, no retries
    let body = state.client.create_response(&upstream_request).await?;

    let incomplete = body.as_ref().and_then(incomplete_reason).map(str::to_string);
    if let Some(reason) = &incomplete {
        warn!("Upstream response is incomplete: {}", reason);
    }

    let message = normalize(body.as_ref())?;

    // Estimate usage against the model's context window
    let tokens = state
        .estimator
        .estimate(&upstream_request.input.flatten_text(), message.as_str(), model);
    let limit_status = tokens.limit_status();

    debug!("Request processing completed");
    Ok(Json(TalkResponse {
        status: "ok".to_string(),
        message: message.into_inner(),
        model: model.to_string(),
        tokens,
        limit_status,
        incomplete,
    }))
}

/// Map a body extraction failure to a client error
///
/// Bodies over the size limit answer 413; anything else that fails to parse is a 400.
fn body_rejection(rejection: JsonRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge;
    }
    validation_error(format!("Invalid request body: {}", rejection.body_text()))
}

/// Reject requests with no usable prompt, or a plain prompt over the length cap
pub fn validate_talk_request(request: &TalkRequest, max_prompt_length: usize) -> AppResult<()> {
    let has_input = request.input.as_ref().is_some_and(|input| !input.is_empty());
    if has_input {
        return Ok(());
    }

    let Some(prompt) = request.prompt.as_deref().filter(|p| !p.trim().is_empty()) else {
        return Err(validation_error("No prompt provided"));
    };

    if prompt.chars().count() > max_prompt_length {
        return Err(validation_error("Prompt too long"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::upstream::ResponsesInput;
    use crate::utils::error::AppError;

    #[test]
    fn test_validate_talk_request() {
        let request = TalkRequest {
            prompt: Some("Hello".to_string()),
            ..Default::default()
        };
        assert!(validate_talk_request(&request, 200).is_ok());

        assert!(matches!(
            validate_talk_request(&TalkRequest::default(), 200),
            Err(AppError::Validation(msg)) if msg == "No prompt provided"
        ));

        let long = TalkRequest {
            prompt: Some("x".repeat(201)),
            ..Default::default()
        };
        assert!(matches!(
            validate_talk_request(&long, 200),
            Err(AppError::Validation(msg)) if msg == "Prompt too long"
        ));
    }

    #[test]
    fn test_length_cap_only_applies_to_prompt() {
        let request = TalkRequest {
            prompt: Some("x".repeat(500)),
            input: Some(ResponsesInput::Text("y".repeat(500))),
            ..Default::default()
        };
        assert!(validate_talk_request(&request, 200).is_ok());
    }
}
