//! Request payload shaping
//!
//! Builds the upstream Responses API body from end-user fields

use crate::models::api::TalkRequest;
use crate::models::upstream::{ResponsesInput, ResponsesRequest, TextOptions};

/// Fallbacks for fields the caller left unset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayloadDefaults {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for PayloadDefaults {
    fn default() -> Self {
        Self {
            max_output_tokens: 100,
            temperature: 0.7,
        }
    }
}

/// Pick the prompt to send: `input` when usable, otherwise `prompt`
pub fn select_input(request: &TalkRequest) -> Option<ResponsesInput> {
    if let Some(input) = request.input.as_ref().filter(|input| !input.is_empty()) {
        return Some(input.clone());
    }

    request
        .prompt
        .as_deref()
        .filter(|prompt| !prompt.trim().is_empty())
        .map(|prompt| ResponsesInput::Text(prompt.to_string()))
}

/// Shape the upstream request body
///
/// Returns `None` when no prompt or input was provided; rejecting that is
/// up to the caller.
pub fn shape_request(
    request: &TalkRequest,
    model: &str,
    defaults: &PayloadDefaults,
) -> Option<ResponsesRequest> {
    let input = select_input(request)?;

    Some(ResponsesRequest {
        model: model.to_string(),
        input,
        max_output_tokens: request.max_output_tokens.unwrap_or(defaults.max_output_tokens),
        temperature: request.temperature.unwrap_or(defaults.temperature),
        text: request.format.clone().map(|format| TextOptions { format }),
    })
}
