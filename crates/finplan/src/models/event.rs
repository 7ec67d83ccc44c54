use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use super::tool::{ToolCall, ToolResult};

/// The participant name the runtime uses for the person asking the question
pub const USER_SOURCE: &str = "user";

const TYPE_FIELD: &str = "type";

/// The closed set of event tags, `Unknown` included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Message,
    ToolCallRequest,
    ToolCallResult,
    ToolCallSummary,
    MemoryQuery,
    TaskResult,
    Unknown,
}

impl EventKind {
    /// The `type` discriminator used on the wire
    pub fn type_name(&self) -> &'static str {
        match self {
            EventKind::Message => "TextMessage",
            EventKind::ToolCallRequest => "ToolCallRequestEvent",
            EventKind::ToolCallResult => "ToolCallExecutionEvent",
            EventKind::ToolCallSummary => "ToolCallSummaryMessage",
            EventKind::MemoryQuery => "MemoryQueryEvent",
            EventKind::TaskResult => "TaskResult",
            EventKind::Unknown => "Unknown",
        }
    }

    fn from_type_name(name: &str) -> Self {
        match name {
            "TextMessage" => EventKind::Message,
            "ToolCallRequestEvent" => EventKind::ToolCallRequest,
            "ToolCallExecutionEvent" => EventKind::ToolCallResult,
            "ToolCallSummaryMessage" => EventKind::ToolCallSummary,
            "MemoryQueryEvent" => EventKind::MemoryQuery,
            "TaskResult" => EventKind::TaskResult,
            _ => EventKind::Unknown,
        }
    }
}

/// Token usage reported by the model behind a participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl fmt::Display for ModelUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "prompt_tokens={} completion_tokens={}",
            self.prompt_tokens, self.completion_tokens
        )
    }
}

/// A free-text utterance; also the payload of a tool call summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMessage {
    pub source: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models_usage: Option<ModelUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub source: String,
    #[serde(rename = "content")]
    pub calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models_usage: Option<ModelUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub source: String,
    #[serde(rename = "content")]
    pub results: Vec<ToolResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    pub content: String,
    #[serde(default)]
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryQuery {
    pub source: String,
    #[serde(rename = "content")]
    pub items: Vec<MemoryItem>,
}

/// The terminal aggregate of a run: the whole transcript and why it stopped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    #[serde(default)]
    pub messages: Vec<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

impl TaskResult {
    /// The most recent non-empty message or tool call summary not written by the user.
    pub fn final_answer(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(Event::answer_text)
    }
}

/// An event whose shape did not match any known variant.
///
/// Keeps the discriminator, if there was one, and every other field as received.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    kind: Option<String>,
    value: Value,
}

impl RawEvent {
    pub fn new(kind: Option<String>, value: Value) -> Self {
        RawEvent { kind, value }
    }

    fn from_value(kind: Option<String>, mut value: Value) -> Self {
        if let Value::Object(fields) = &mut value {
            fields.remove(TYPE_FIELD);
        }
        RawEvent { kind, value }
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.value.as_object()?.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Named fields in the order they were received; empty for non-object values
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.value.as_object().into_iter().flatten()
    }

    fn to_value(&self) -> Value {
        let mut value = self.value.clone();
        if let (Some(kind), Value::Object(fields)) = (&self.kind, &mut value) {
            fields.insert(TYPE_FIELD.to_string(), Value::from(kind.as_str()));
        }
        value
    }
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "{}({})", kind, self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

/// One discrete occurrence in a conversation transcript
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Message(TextMessage),
    ToolCallRequest(ToolCallRequest),
    ToolCallResult(ToolCallResult),
    ToolCallSummary(TextMessage),
    MemoryQuery(MemoryQuery),
    TaskResult(TaskResult),
    Unknown(RawEvent),
}

impl Event {
    pub fn message<S: Into<String>, C: Into<String>>(source: S, content: C) -> Self {
        Event::Message(TextMessage {
            source: source.into(),
            content: content.into(),
            models_usage: None,
        })
    }

    pub fn tool_call_summary<S: Into<String>, C: Into<String>>(source: S, content: C) -> Self {
        Event::ToolCallSummary(TextMessage {
            source: source.into(),
            content: content.into(),
            models_usage: None,
        })
    }

    pub fn tool_call_request<S: Into<String>>(source: S, calls: Vec<ToolCall>) -> Self {
        Event::ToolCallRequest(ToolCallRequest {
            source: source.into(),
            calls,
            models_usage: None,
        })
    }

    pub fn tool_call_result<S: Into<String>>(source: S, results: Vec<ToolResult>) -> Self {
        Event::ToolCallResult(ToolCallResult {
            source: source.into(),
            results,
        })
    }

    pub fn memory_query<S: Into<String>>(source: S, items: Vec<MemoryItem>) -> Self {
        Event::MemoryQuery(MemoryQuery {
            source: source.into(),
            items,
        })
    }

    pub fn task_result(messages: Vec<Event>, stop_reason: Option<&str>) -> Self {
        Event::TaskResult(TaskResult {
            messages,
            stop_reason: stop_reason.map(str::to_string),
        })
    }

    /// Classify a wire value. Never fails: anything unrecognised becomes [`Event::Unknown`].
    pub fn from_value(value: Value) -> Self {
        let kind = value
            .get(TYPE_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string);

        let decoded = match kind.as_deref().map(EventKind::from_type_name) {
            Some(EventKind::Message) => decode(&value).map(Event::Message),
            Some(EventKind::ToolCallRequest) => decode(&value).map(Event::ToolCallRequest),
            Some(EventKind::ToolCallResult) => decode(&value).map(Event::ToolCallResult),
            Some(EventKind::ToolCallSummary) => decode(&value).map(Event::ToolCallSummary),
            Some(EventKind::MemoryQuery) => decode(&value).map(Event::MemoryQuery),
            Some(EventKind::TaskResult) => decode(&value).map(Event::TaskResult),
            Some(EventKind::Unknown) | None => None,
        };

        decoded.unwrap_or_else(|| Event::Unknown(RawEvent::from_value(kind, value)))
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        let mut value = match self {
            Event::Message(message) | Event::ToolCallSummary(message) => {
                serde_json::to_value(message)?
            }
            Event::ToolCallRequest(request) => serde_json::to_value(request)?,
            Event::ToolCallResult(result) => serde_json::to_value(result)?,
            Event::MemoryQuery(query) => serde_json::to_value(query)?,
            Event::TaskResult(result) => serde_json::to_value(result)?,
            Event::Unknown(raw) => return Ok(raw.to_value()),
        };
        if let Value::Object(fields) = &mut value {
            fields.insert(TYPE_FIELD.to_string(), Value::from(self.kind().type_name()));
        }
        Ok(value)
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Message(_) => EventKind::Message,
            Event::ToolCallRequest(_) => EventKind::ToolCallRequest,
            Event::ToolCallResult(_) => EventKind::ToolCallResult,
            Event::ToolCallSummary(_) => EventKind::ToolCallSummary,
            Event::MemoryQuery(_) => EventKind::MemoryQuery,
            Event::TaskResult(_) => EventKind::TaskResult,
            Event::Unknown(_) => EventKind::Unknown,
        }
    }

    /// The discriminator to show to people; unknown events keep their own.
    pub fn type_name(&self) -> &str {
        match self {
            Event::Unknown(raw) => raw.kind().unwrap_or(EventKind::Unknown.type_name()),
            other => other.kind().type_name(),
        }
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            Event::Message(message) | Event::ToolCallSummary(message) => Some(&message.source),
            Event::ToolCallRequest(request) => Some(&request.source),
            Event::ToolCallResult(result) => Some(&result.source),
            Event::MemoryQuery(query) => Some(&query.source),
            Event::TaskResult(_) => None,
            Event::Unknown(raw) => raw.str_field("source"),
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            Event::Unknown(raw) => raw.str_field("target"),
            _ => None,
        }
    }

    pub fn is_from_user(&self) -> bool {
        self.source() == Some(USER_SOURCE)
    }

    pub fn models_usage(&self) -> Option<&ModelUsage> {
        match self {
            Event::Message(message) | Event::ToolCallSummary(message) => {
                message.models_usage.as_ref()
            }
            Event::ToolCallRequest(request) => request.models_usage.as_ref(),
            _ => None,
        }
    }

    /// The content of a message that may serve as a final answer.
    fn answer_text(&self) -> Option<&str> {
        match self {
            Event::Message(message) | Event::ToolCallSummary(message)
                if message.source != USER_SOURCE && !message.content.is_empty() =>
            {
                Some(&message.content)
            }
            _ => None,
        }
    }
}

fn decode<T: DeserializeOwned>(value: &Value) -> Option<T> {
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            debug!("Event does not match its declared shape: {}", e);
            None
        }
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Event::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_known_events() {
        let cases = [
            (json!({"type": "TextMessage", "source": "a", "content": "hi"}), EventKind::Message),
            (
                json!({"type": "ToolCallRequestEvent", "source": "a", "content": [
                    {"id": "c1", "name": "search_tool", "arguments": "{}"}
                ]}),
                EventKind::ToolCallRequest,
            ),
            (
                json!({"type": "ToolCallExecutionEvent", "source": "a", "content": [
                    {"call_id": "c1", "content": "ok"}
                ]}),
                EventKind::ToolCallResult,
            ),
            (
                json!({"type": "ToolCallSummaryMessage", "source": "a", "content": "done"}),
                EventKind::ToolCallSummary,
            ),
            (
                json!({"type": "MemoryQueryEvent", "source": "a", "content": [
                    {"content": "likes ETFs", "mime_type": "text/plain"}
                ]}),
                EventKind::MemoryQuery,
            ),
            (json!({"type": "TaskResult", "messages": []}), EventKind::TaskResult),
        ];

        for (value, expected) in cases {
            assert_eq!(Event::from_value(value).kind(), expected);
        }
    }

    #[test]
    fn test_unrecognised_type_is_unknown() {
        let event = Event::from_value(json!({
            "type": "HandoffMessage",
            "source": "planner",
            "target": "advisor",
            "content": "over to you"
        }));

        let Event::Unknown(raw) = &event else {
            panic!("expected unknown event");
        };
        assert_eq!(raw.kind(), Some("HandoffMessage"));
        assert!(raw.field("type").is_none());
        assert_eq!(event.type_name(), "HandoffMessage");
        assert_eq!(event.source(), Some("planner"));
        assert_eq!(event.target(), Some("advisor"));
    }

    #[test]
    fn test_wrong_shape_is_unknown() {
        let event = Event::from_value(json!({"type": "TextMessage", "source": "a", "content": 42}));
        assert_eq!(event.kind(), EventKind::Unknown);
        assert_eq!(event.type_name(), "TextMessage");

        let event = Event::from_value(json!("just a string"));
        assert_eq!(event.kind(), EventKind::Unknown);
        assert_eq!(event.type_name(), "Unknown");
        assert_eq!(event.source(), None);
    }

    #[test]
    fn test_task_result_messages_decode_independently() {
        let event = Event::from_value(json!({
            "type": "TaskResult",
            "messages": [
                {"type": "TextMessage", "source": "user", "content": "hi"},
                {"type": "Mystery", "source": "advisor"},
                {"type": "TextMessage", "source": "advisor", "content": "Buy index funds."}
            ],
            "stop_reason": "max messages"
        }));

        let Event::TaskResult(result) = event else {
            panic!("expected task result");
        };
        assert_eq!(result.messages.len(), 3);
        assert_eq!(result.messages[1].kind(), EventKind::Unknown);
        assert_eq!(result.stop_reason.as_deref(), Some("max messages"));
    }

    #[test]
    fn test_final_answer_skips_user_and_empty_messages() {
        let result = TaskResult {
            messages: vec![
                Event::message("advisor", "Earlier advice"),
                Event::tool_call_summary("web_search_agent", "VOO tracks the S&P 500"),
                Event::message("advisor", ""),
                Event::message(USER_SOURCE, "thanks"),
            ],
            stop_reason: None,
        };
        assert_eq!(result.final_answer(), Some("VOO tracks the S&P 500"));

        let only_user = TaskResult {
            messages: vec![Event::message(USER_SOURCE, "hi")],
            stop_reason: None,
        };
        assert_eq!(only_user.final_answer(), None);
    }

    #[test]
    fn test_serialize_keeps_wire_names() {
        let event = Event::tool_call_request(
            "web_search_agent",
            vec![ToolCall::new("c1", "search_tool", r#"{"query":"VOO"}"#)],
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "ToolCallRequestEvent");
        assert_eq!(value["content"][0]["name"], "search_tool");

        let unknown = Event::from_value(json!({"type": "Mystery", "detail": 1}));
        let value = serde_json::to_value(&unknown).unwrap();
        assert_eq!(value, json!({"type": "Mystery", "detail": 1}));
    }

    #[test]
    fn test_raw_event_display() {
        let raw = RawEvent::new(Some("Mystery".to_string()), json!({"a": 1}));
        assert_eq!(raw.to_string(), r#"Mystery({"a":1})"#);
        let raw = RawEvent::new(None, json!(7));
        assert_eq!(raw.to_string(), "7");
        assert_eq!(raw.fields().count(), 0);
    }
}
