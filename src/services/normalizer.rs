//! Response normalizer
//!
//! Turns a decoded upstream body into a single answer string. The body shape
//! is not guaranteed by the upstream, so every field is treated as optional:
//!
//! 1. `output` as an ordered list whose elements are strings, objects with a
//!    string `text`, or objects with a `content` list of `{ text }` entries
//! 2. legacy `choices[0].message.content`, then `choices[0].text`
//!
//! Text fragments from `output` are also checked for an embedded JSON content
//! marker (`{"type": "refusal"}` and friends) before they are joined.

use crate::utils::error::ClassifiedError;
use crate::utils::logging::payload_for_log;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, error, warn};

/// Normalized answer text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedMessage(String);

impl ExtractedMessage {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ExtractedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ExtractedMessage> for String {
    fn from(message: ExtractedMessage) -> Self {
        message.0
    }
}

/// Content-type marker embedded as JSON text in an output fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentMarker {
    Refusal,
    OutputText,
    Object,
    /// Any other `type` value, kept verbatim for the log
    Unknown(String),
}

impl ContentMarker {
    /// Parse a fragment and read its `type` field, if it is a JSON object carrying one
    pub fn detect(fragment: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(fragment) {
            Ok(parsed) => parsed.as_object()?.get("type").map(Self::from_kind),
            // Numbers past the f64 range fail a full parse; reread only the marker
            Err(_) if fragment.trim_start().starts_with('{') => {
                let marker: MarkerField = serde_json::from_str(fragment).ok()?;
                marker.kind.as_ref().map(Self::from_kind)
            }
            Err(_) => None,
        }
    }

    fn from_kind(kind: &Value) -> Self {
        match kind.as_str() {
            Some("refusal") => ContentMarker::Refusal,
            Some("output_text") => ContentMarker::OutputText,
            Some("object") => ContentMarker::Object,
            Some(other) => ContentMarker::Unknown(other.to_string()),
            None => ContentMarker::Unknown(kind.to_string()),
        }
    }
}

/// Object fragment read for its `type` field alone; other fields are skipped unparsed
#[derive(Deserialize)]
struct MarkerField {
    #[serde(rename = "type")]
    kind: Option<Value>,
}

/// How one element of `output` contributes text
#[derive(Debug, Clone, Copy, PartialEq)]
enum OutputElement<'a> {
    /// The element is itself a string
    Text(&'a str),
    /// Object with a string `text` field
    TextField(&'a str),
    /// Object with a `content` list
    Content(&'a [Value]),
    Unrecognized,
}

impl<'a> OutputElement<'a> {
    fn classify(element: &'a Value) -> Self {
        if let Some(text) = element.as_str() {
            return OutputElement::Text(text);
        }
        if let Some(text) = element.get("text").and_then(Value::as_str) {
            return OutputElement::TextField(text);
        }
        if let Some(content) = element.get("content").and_then(Value::as_array) {
            return OutputElement::Content(content);
        }
        OutputElement::Unrecognized
    }

    fn push_fragments(self, fragments: &mut Vec<&'a str>) {
        match self {
            OutputElement::Text(text) | OutputElement::TextField(text) => fragments.push(text),
            OutputElement::Content(entries) => fragments.extend(
                entries
                    .iter()
                    .filter_map(|entry| entry.get("text").and_then(Value::as_str)),
            ),
            OutputElement::Unrecognized => {}
        }
    }
}

/// Normalize a decoded upstream body into the answer text
///
/// `None` means the body was absent or not valid JSON. Any failure discards
/// fragments collected so far; the raw payload is logged, never returned.
pub fn normalize(body: Option<&Value>) -> Result<ExtractedMessage, ClassifiedError> {
    let Some(body) = body else {
        error!("Upstream returned no decodable body");
        return Err(ClassifiedError::upstream_malformed());
    };

    let fragments = output_fragments(body);
    if !fragments.is_empty() {
        check_markers(&fragments, body)?;

        let message = fragments.join("\n").trim().to_string();
        if !message.is_empty() {
            debug!("Extracted {} output fragments", fragments.len());
            return Ok(ExtractedMessage(message));
        }
    }

    if let Some(message) = legacy_choice_text(body) {
        debug!("Extracted message from legacy choices shape");
        return Ok(ExtractedMessage(message.to_string()));
    }

    error!(payload = %payload_for_log(Some(body)), "Unexpected upstream response shape");
    Err(ClassifiedError::upstream_malformed())
}

/// Collect text fragments from the `output` list, in order
fn output_fragments(body: &Value) -> Vec<&str> {
    let mut fragments = Vec::new();

    if let Some(output) = body.get("output").and_then(Value::as_array) {
        for element in output {
            OutputElement::classify(element).push_fragments(&mut fragments);
        }
    }

    fragments
}

/// Inspect the first fragment that carries a `type` marker
///
/// Fragments before it that are plain text or untyped JSON are skipped; the
/// scan stops at the first marker whatever its value.
fn check_markers(fragments: &[&str], body: &Value) -> Result<(), ClassifiedError> {
    let Some(marker) = fragments.iter().find_map(|fragment| ContentMarker::detect(fragment)) else {
        return Ok(());
    };

    match marker {
        ContentMarker::Refusal => {
            warn!(payload = %payload_for_log(Some(body)), "Upstream refused to answer");
            Err(ClassifiedError::forbidden())
        }
        ContentMarker::OutputText | ContentMarker::Object => Ok(()),
        ContentMarker::Unknown(kind) => {
            error!(
                marker = %kind,
                payload = %payload_for_log(Some(body)),
                "Unexpected upstream response content type"
            );
            Err(ClassifiedError::upstream_malformed())
        }
    }
}

/// `choices[0].message.content`, then `choices[0].text`; first non-empty wins
fn legacy_choice_text(body: &Value) -> Option<&str> {
    ["/choices/0/message/content", "/choices/0/text"]
        .iter()
        .filter_map(|pointer| body.pointer(pointer).and_then(Value::as_str))
        .find(|text| !text.is_empty())
}
