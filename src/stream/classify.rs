//! Classification of one decoded stream payload.
//!
//! Wire shapes are deserialised into typed structs whose unknown or
//! unexpected parts land in catch-all variants, so every payload maps to a
//! list of chunks (possibly empty) without guessing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::types::{ReasoningDetail, ReasoningDetailKind, StreamChunk, Usage};

#[derive(Debug, Default, Deserialize)]
struct WirePayload {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    choices: Vec<WireChoice>,
    #[serde(default, deserialize_with = "lenient")]
    usage: Option<Map<String, Value>>,
    #[serde(default)]
    error: Option<WireError>,
}

#[derive(Debug, Default, Deserialize)]
struct WireChoice {
    #[serde(default, deserialize_with = "lenient")]
    delta: Option<WireDelta>,
    /// Non-streaming responses carry `message` instead of `delta`.
    #[serde(default, deserialize_with = "lenient")]
    message: Option<WireDelta>,
    #[serde(default, deserialize_with = "lenient_string")]
    finish_reason: Option<String>,
    #[serde(default)]
    error: Option<WireError>,
}

#[derive(Debug, Default, Deserialize)]
struct WireDelta {
    #[serde(default)]
    content: Option<WireContent>,
    #[serde(default, deserialize_with = "lenient")]
    reasoning: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    reasoning_content: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    reasoning_details: Vec<WireReasoningDetail>,
    #[serde(default, deserialize_with = "lenient")]
    images: Vec<WireImage>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<WirePart>),
    Other(Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WirePart {
    Known {
        #[serde(rename = "type", default, deserialize_with = "lenient")]
        kind: Option<String>,
        #[serde(default, deserialize_with = "lenient")]
        text: Option<String>,
        #[serde(flatten)]
        image: WireImage,
    },
    Other(Value),
}

#[derive(Debug, Default, Deserialize)]
struct WireImage {
    #[serde(default)]
    image_url: Option<WireImageUrl>,
    #[serde(default, deserialize_with = "lenient")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireImageUrl {
    Url(String),
    Object { url: String },
    Other(Value),
}

#[derive(Debug, Deserialize)]
struct WireReasoningDetail {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    summary: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    data: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    format: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    index: Option<u32>,
}

/// Error objects, bare error strings, or anything else non-null under `error`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireError {
    Object {
        #[serde(default, deserialize_with = "lenient_string")]
        message: Option<String>,
        #[serde(default)]
        code: Option<Value>,
    },
    Message(String),
    Other(Value),
}

/// Falls back to the default when the field has an unexpected type.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_else(|err| {
        debug!(error = %err, "ignoring field with unexpected type");
        T::default()
    }))
}

/// Strings as-is, numbers in decimal form, anything else as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Map one decoded payload to canonical chunks.
///
/// An error object anywhere yields exactly one `Error` chunk. Otherwise the
/// order is reasoning details, reasoning text, images, text, then usage.
pub fn classify_payload(value: Value) -> Vec<StreamChunk> {
    let payload: WirePayload = match serde_json::from_value(value) {
        Ok(payload) => payload,
        Err(err) => {
            debug!(error = %err, "skipping payload with unrecognised shape");
            return Vec::new();
        }
    };

    if let Some(error) = find_error(&payload) {
        return vec![error];
    }

    let mut chunks = Vec::new();
    for choice in payload.choices {
        if let Some(delta) = choice.delta.or(choice.message) {
            delta_chunks(delta, &mut chunks);
        }
    }
    if let Some(usage) = payload.usage.filter(|u| !u.is_empty()) {
        chunks.push(StreamChunk::Usage(Usage::from_wire(&usage, payload.id)));
    }
    chunks
}

fn find_error(payload: &WirePayload) -> Option<StreamChunk> {
    if let Some(error) = &payload.error {
        return Some(error_chunk(error));
    }
    payload.choices.iter().find_map(|choice| match (&choice.error, choice.finish_reason.as_deref()) {
        (Some(error), _) => Some(error_chunk(error)),
        (None, Some("error")) => Some(StreamChunk::error(
            "generation ended with finish_reason=error",
            None,
        )),
        _ => None,
    })
}

fn error_chunk(error: &WireError) -> StreamChunk {
    match error {
        WireError::Object { message, code } => {
            let code = code.as_ref().and_then(|code| match code {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });
            let message = message
                .clone()
                .unwrap_or_else(|| "provider reported an error".to_string());
            StreamChunk::error(message, code)
        }
        WireError::Message(message) if !message.trim().is_empty() => {
            StreamChunk::error(message.clone(), None)
        }
        WireError::Message(_) => StreamChunk::error("provider reported an error", None),
        WireError::Other(other) => StreamChunk::error(format!("provider reported an error: {other}"), None),
    }
}

fn delta_chunks(delta: WireDelta, chunks: &mut Vec<StreamChunk>) {
    chunks.extend(
        delta
            .reasoning_details
            .into_iter()
            .map(|detail| StreamChunk::ReasoningDetail(reasoning_detail(detail))),
    );

    if let Some(text) = delta
        .reasoning
        .or(delta.reasoning_content)
        .filter(|t| !t.is_empty())
    {
        chunks.push(StreamChunk::reasoning_text(text));
    }

    chunks.extend(
        delta
            .images
            .into_iter()
            .filter_map(image_source)
            .map(StreamChunk::image),
    );

    match delta.content {
        Some(WireContent::Text(text)) if !text.is_empty() => chunks.push(StreamChunk::text(text)),
        Some(WireContent::Parts(parts)) => {
            for part in parts {
                if let Some(chunk) = part_chunk(part) {
                    chunks.push(chunk);
                }
            }
        }
        Some(WireContent::Other(other)) if !other.is_null() => {
            debug!(shape = %other, "ignoring unrecognised content shape");
        }
        _ => {}
    }
}

fn part_chunk(part: WirePart) -> Option<StreamChunk> {
    let WirePart::Known { kind, text, image } = part else {
        return None;
    };
    let is_image = kind.as_deref().is_some_and(|k| k.contains("image"));
    if is_image {
        return image_source(image).map(StreamChunk::image);
    }
    text.filter(|t| !t.is_empty()).map(StreamChunk::text)
}

fn image_source(image: WireImage) -> Option<String> {
    let url = match image.image_url {
        Some(WireImageUrl::Url(url)) | Some(WireImageUrl::Object { url }) => Some(url),
        _ => None,
    };
    url.or(image.url)
        .or(image.b64_json)
        .filter(|s| !s.trim().is_empty())
}

fn reasoning_detail(detail: WireReasoningDetail) -> ReasoningDetail {
    let kind = detail
        .kind
        .as_deref()
        .and_then(|k| k.parse().ok())
        .unwrap_or(ReasoningDetailKind::Unknown);
    ReasoningDetail {
        id: detail.id,
        kind,
        text: detail.text,
        summary: detail.summary,
        data: detail.data,
        format: detail.format,
        index: detail.index,
    }
}
