//! Turn a stream of conversation events into a readable transcript.
//!
//! A [`Renderer`] consumes events one at a time, in arrival order, and produces at most one
//! fragment per event. Which fragment depends on the [`Format`]: [`html::HtmlFormat`] produces
//! self-contained markup blocks for a live page, [`console::ConsoleFormat`] produces framed
//! panels for a terminal. The dispatch rules and the tool call correlation table are shared.
pub mod console;
mod correlation;
pub mod fence;
pub mod html;
pub mod labels;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{RenderError, RenderResult};
use crate::models::event::{Event, RawEvent, TaskResult, USER_SOURCE};

pub use correlation::{CallRecord, CorrelationTable};

/// Tool name shown for a result whose call was never seen
pub const UNKNOWN_TOOL: &str = "unknown_tool";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Drop messages written by the user instead of echoing them back
    pub suppress_user_messages: bool,
}

/// Who an event came from, and what to call it
#[derive(Debug, Clone, Copy)]
pub struct Header<'a> {
    pub type_name: &'a str,
    pub source: Option<&'a str>,
    pub target: Option<&'a str>,
}

impl<'a> Header<'a> {
    pub fn of(event: &'a Event) -> Self {
        Header {
            type_name: event.type_name(),
            source: event.source(),
            target: event.target(),
        }
    }
}

/// A requested tool call, ready for display
#[derive(Debug, Clone)]
pub struct CallLine<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub arguments: &'a str,
    pub query: String,
}

/// A tool call result, reunited with its request where possible
#[derive(Debug, Clone)]
pub struct ResultLine<'a> {
    pub call_id: &'a str,
    pub name: &'a str,
    pub query: &'a str,
}

/// One rendering target. Each method produces the fragment for one kind of event.
pub trait Format {
    type Fragment;

    fn message(&mut self, header: &Header<'_>, content: &str) -> Self::Fragment;

    fn tool_calls(&mut self, header: &Header<'_>, calls: &[CallLine<'_>]) -> Self::Fragment;

    fn tool_results(&mut self, header: &Header<'_>, results: &[ResultLine<'_>]) -> Self::Fragment;

    fn task_result(
        &mut self,
        header: &Header<'_>,
        result: &TaskResult,
        answer: Option<&str>,
    ) -> Self::Fragment;

    /// Best-effort rendering of anything without a dedicated method
    fn generic(&mut self, header: &Header<'_>, raw: &RawEvent) -> Self::Fragment;
}

/// Renders the events of a single conversation run.
///
/// Holds the run's correlation table, so a new renderer must be created for every run.
pub struct Renderer<F: Format> {
    format: F,
    calls: CorrelationTable,
    options: RenderOptions,
}

pub type HtmlRenderer = Renderer<html::HtmlFormat>;
pub type ConsoleRenderer = Renderer<console::ConsoleFormat>;

impl Renderer<html::HtmlFormat> {
    pub fn html() -> Self {
        Renderer::new(
            html::HtmlFormat::new(),
            RenderOptions {
                suppress_user_messages: true,
            },
        )
    }
}

impl Renderer<console::ConsoleFormat> {
    pub fn console() -> Self {
        Renderer::new(
            console::ConsoleFormat::new(),
            RenderOptions {
                suppress_user_messages: false,
            },
        )
    }
}

impl<F: Format> Renderer<F> {
    pub fn new(format: F, options: RenderOptions) -> Self {
        Renderer {
            format,
            calls: CorrelationTable::new(),
            options,
        }
    }

    pub fn correlation(&self) -> &CorrelationTable {
        &self.calls
    }

    /// Render one event. `None` means the event is deliberately not shown.
    pub fn render(&mut self, event: &Event) -> Option<F::Fragment> {
        let header = Header::of(event);
        match event {
            Event::TaskResult(result) => {
                Some(self.format.task_result(&header, result, result.final_answer()))
            }
            Event::ToolCallRequest(request) => {
                let mut lines = Vec::with_capacity(request.calls.len());
                for call in &request.calls {
                    let query = query_or_raw(&call.arguments);
                    self.calls.record(&call.id, &call.name, &query);
                    lines.push(CallLine {
                        id: &call.id,
                        name: &call.name,
                        arguments: &call.arguments,
                        query,
                    });
                }
                Some(self.format.tool_calls(&header, &lines))
            }
            Event::ToolCallResult(result) => {
                let lines: Vec<ResultLine<'_>> = result
                    .results
                    .iter()
                    .map(|r| match self.calls.get(&r.call_id) {
                        Some(record) => ResultLine {
                            call_id: &r.call_id,
                            name: &record.name,
                            query: &record.query,
                        },
                        None => {
                            warn!("No tool call recorded for result {}", r.call_id);
                            ResultLine {
                                call_id: &r.call_id,
                                name: UNKNOWN_TOOL,
                                query: "",
                            }
                        }
                    })
                    .collect();
                Some(self.format.tool_results(&header, &lines))
            }
            Event::Message(message) | Event::ToolCallSummary(message) => {
                if self.options.suppress_user_messages && message.source == USER_SOURCE {
                    return None;
                }
                Some(self.format.message(&header, &message.content))
            }
            Event::MemoryQuery(_) => None,
            Event::Unknown(raw) => {
                warn!("Rendering unrecognised event {}", event.type_name());
                Some(self.format.generic(&header, raw))
            }
        }
    }
}

/// Pull the `query` field out of a tool call's JSON arguments.
///
/// Arguments without a `query` field give an empty query.
pub fn extract_query(arguments: &str) -> RenderResult<String> {
    let value: Value = serde_json::from_str(arguments)?;
    let Value::Object(fields) = value else {
        return Err(RenderError::ArgumentsNotObject);
    };
    Ok(match fields.get("query") {
        Some(Value::String(query)) => query.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

fn query_or_raw(arguments: &str) -> String {
    extract_query(arguments).unwrap_or_else(|e| {
        debug!("Showing raw tool arguments: {}", e);
        arguments.to_string()
    })
}

/// Plain-text form of a JSON value: strings unquoted, everything else as JSON.
pub(crate) fn plain_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
