//! Envelope codec: JSON response bodies into core envelope types.
//!
//! Decoding is lenient in the same places the page script was: missing lists and
//! flags default to empty/false, empty URL strings count as absent, and a
//! non-numeric `percent` reads as 0. Text fields accept any JSON scalar.
use ragchat_core::{
    JobState, JobUrls, Percent, ProgressSnapshot, RecommendEnvelope, SendEnvelope,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::{TransportError, TransportErrorKind};

#[derive(Debug, Deserialize)]
struct SendWire {
    ok: Option<bool>,
    bot_messages: Option<Value>,
    need_rag_progress: Option<bool>,
    init_url: Option<String>,
    progress_url: Option<String>,
    recommend_url: Option<String>,
    redirect_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProgressWire {
    state: Option<Value>,
    percent: Option<Value>,
    message: Option<Value>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RecommendWire {
    redirect_url: Option<String>,
}

pub fn decode_send(bytes: &[u8]) -> Result<SendEnvelope, TransportError> {
    let wire: SendWire = parse(bytes, "send")?;
    Ok(SendEnvelope {
        ok: wire.ok.unwrap_or(false),
        bot_messages: wire.bot_messages.map(messages_from).unwrap_or_default(),
        need_rag_progress: wire.need_rag_progress.unwrap_or(false),
        job_urls: JobUrls {
            init_url: non_empty(wire.init_url),
            progress_url: non_empty(wire.progress_url),
            recommend_url: non_empty(wire.recommend_url),
        },
        redirect_url: non_empty(wire.redirect_url),
    })
}

pub fn decode_progress(bytes: &[u8]) -> Result<ProgressSnapshot, TransportError> {
    let wire: ProgressWire = parse(bytes, "progress")?;
    Ok(ProgressSnapshot {
        state: state_from(wire.state),
        percent: wire.percent.map(percent_from),
        message: wire.message.and_then(text_from),
        error: wire.error.and_then(text_from),
    })
}

pub fn decode_recommend(bytes: &[u8]) -> Result<RecommendEnvelope, TransportError> {
    let wire: RecommendWire = parse(bytes, "recommend")?;
    Ok(RecommendEnvelope {
        redirect_url: non_empty(wire.redirect_url),
    })
}

fn parse<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T, TransportError> {
    serde_json::from_slice(bytes).map_err(|err| {
        TransportError::new(
            TransportErrorKind::Decode,
            format!("{what} envelope: {err}"),
        )
    })
}

fn percent_from(value: Value) -> Percent {
    match value {
        Value::Number(number) => Percent::clamped(number.as_f64().unwrap_or(0.0)),
        _ => Percent::ZERO,
    }
}

fn state_from(value: Option<Value>) -> JobState {
    match value {
        Some(Value::String(raw)) => JobState::from_wire(&raw),
        None | Some(Value::Null) => JobState::Other(String::new()),
        Some(other) => JobState::Other(other.to_string()),
    }
}

/// Strings pass through; other values render as their JSON text; null is none.
fn text_from(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

/// A non-list `bot_messages` carries nothing to show.
fn messages_from(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.into_iter().filter_map(text_from).collect(),
        _ => Vec::new(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
