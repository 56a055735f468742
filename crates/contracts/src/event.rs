//! Event - the unit of work handed to an output
//!
//! An event carries a payload and the trace context of the producer that
//! emitted it. Templates never see the event itself, only its canonical
//! JSON object (see [`Event::json_object`]).

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::Span;

use crate::ContractError;

/// Event payload
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    /// Already structured payload
    Json(Value),
    /// JSON text as received from the producer, parsed lazily
    Raw(Bytes),
}

impl From<Value> for EventData {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Bytes> for EventData {
    fn from(raw: Bytes) -> Self {
        Self::Raw(raw)
    }
}

/// Generic structured event
#[derive(Debug, Clone)]
pub struct Event {
    /// Source channel (e.g. "k8s", "alertmanager")
    pub channel: String,

    /// Event type within the channel
    pub event_type: String,

    /// Time the event was produced
    pub time: DateTime<Utc>,

    /// Payload; `None` is never published
    pub data: Option<EventData>,

    /// Producer-side span, followed by the send span
    span: Span,
}

/// NDJSON wire shape of an event
#[derive(Debug, Deserialize)]
struct EventRecord {
    #[serde(default)]
    channel: String,
    #[serde(default, rename = "type")]
    event_type: String,
    #[serde(default)]
    time: Option<DateTime<Utc>>,
    #[serde(default)]
    data: Option<Value>,
}

impl Event {
    /// Create an event stamped with the current time and the current span
    pub fn new(
        channel: impl Into<String>,
        event_type: impl Into<String>,
        data: Option<EventData>,
    ) -> Self {
        Self {
            channel: channel.into(),
            event_type: event_type.into(),
            time: Utc::now(),
            data,
            span: Span::current(),
        }
    }

    /// Parse one JSON line (`{"channel", "type", "time", "data"}`)
    ///
    /// A missing or `null` `data` field yields an event without payload.
    pub fn from_json_line(line: &str) -> Result<Self, ContractError> {
        let record: EventRecord = serde_json::from_str(line)
            .map_err(|e| ContractError::event_conversion(format!("invalid event line: {e}")))?;

        let data = match record.data {
            None | Some(Value::Null) => None,
            Some(value) => Some(EventData::Json(value)),
        };

        Ok(Self {
            channel: record.channel,
            event_type: record.event_type,
            time: record.time.unwrap_or_else(Utc::now),
            data,
            span: Span::current(),
        })
    }

    /// Override the event time
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    /// Attach the producer span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Producer-side trace context
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Canonical structured object passed to templates
    ///
    /// Shape: `{ "channel": .., "type": .., "time": RFC 3339, "data": .. }`.
    ///
    /// # Errors
    /// Returns `EventConversion` when a raw payload is not valid JSON.
    pub fn json_object(&self) -> Result<Value, ContractError> {
        let data = match &self.data {
            None => Value::Null,
            Some(EventData::Json(value)) => value.clone(),
            Some(EventData::Raw(raw)) => serde_json::from_slice(raw)
                .map_err(|e| ContractError::event_conversion(format!("invalid payload: {e}")))?,
        };

        let mut object = Map::with_capacity(4);
        object.insert("channel".to_string(), Value::String(self.channel.clone()));
        object.insert("type".to_string(), Value::String(self.event_type.clone()));
        object.insert("time".to_string(), Value::String(self.time.to_rfc3339()));
        object.insert("data".to_string(), data);
        Ok(Value::Object(object))
    }
}
