//! Console target: framed panels, printed by whoever owns the terminal.
use serde_json::Value;
use tracing::{debug, warn};

use super::fence::{extract_code_block, CodeBlock};
use super::{plain_value, CallLine, Format, Header, ResultLine};
use crate::models::event::{Event, MemoryItem, RawEvent, TaskResult};

const MEMORY_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelBody {
    Text(String),
    /// The first fenced code block found in the panel text, to be syntax highlighted
    Code(CodeBlock),
}

/// One framed block of terminal output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub title: String,
    pub body: PanelBody,
    /// Stretch to the full terminal width
    pub expand: bool,
}

impl Panel {
    pub fn body_text(&self) -> &str {
        match &self.body {
            PanelBody::Text(text) => text,
            PanelBody::Code(block) => &block.code,
        }
    }
}

#[derive(Debug, Default)]
pub struct ConsoleFormat;

impl ConsoleFormat {
    pub fn new() -> Self {
        ConsoleFormat
    }

    fn panel(&self, header: &Header<'_>, lines: Vec<String>) -> Panel {
        let text = lines.join("\n");
        let body = match extract_code_block(&text) {
            Some(block) => {
                debug!("Highlighting {} block in {}", block.language, header.type_name);
                PanelBody::Code(block)
            }
            None => PanelBody::Text(text),
        };
        Panel {
            title: title(header),
            body,
            expand: false,
        }
    }
}

fn title(header: &Header<'_>) -> String {
    let mut title = format!("Event: {}", header.type_name);
    if let Some(source) = header.source {
        title.push_str(&format!(" [Source: {}]", source));
    }
    if let Some(target) = header.target {
        title.push_str(&format!(" [Target: {}]", target));
    }
    title
}

impl Format for ConsoleFormat {
    type Fragment = Panel;

    fn message(&mut self, header: &Header<'_>, content: &str) -> Panel {
        self.panel(header, vec![format!("  Content: {}", content)])
    }

    fn tool_calls(&mut self, header: &Header<'_>, calls: &[CallLine<'_>]) -> Panel {
        let lines = calls
            .iter()
            .flat_map(|call| {
                [
                    format!("    - Function Call: {} (ID: {})", call.name, call.id),
                    format!("      Arguments: {}", call.arguments),
                    format!("      Query: {}", call.query),
                ]
            })
            .collect();
        self.panel(header, lines)
    }

    fn tool_results(&mut self, header: &Header<'_>, results: &[ResultLine<'_>]) -> Panel {
        let lines = results
            .iter()
            .flat_map(|result| {
                [
                    format!("    - Tool Response: {} (Call ID: {})", result.name, result.call_id),
                    "      ✓ Completed successfully".to_string(),
                    format!("      Query: {}", result.query),
                ]
            })
            .collect();
        self.panel(header, lines)
    }

    fn task_result(
        &mut self,
        header: &Header<'_>,
        result: &TaskResult,
        answer: Option<&str>,
    ) -> Panel {
        let mut lines = vec![match answer {
            Some(answer) => format!("Final Answer: {}", answer),
            None => "No final answer was provided by the agent.".to_string(),
        }];
        if let Some(reason) = result.stop_reason.as_deref().filter(|r| !r.is_empty()) {
            lines.push(format!("Stop Reason: {}", reason));
        }
        if !result.messages.is_empty() {
            lines.push("Transcript:".to_string());
            lines.extend(result.messages.iter().flat_map(format_message));
        }

        Panel {
            title: title(header),
            body: PanelBody::Text(lines.join("\n")),
            expand: true,
        }
    }

    fn generic(&mut self, header: &Header<'_>, raw: &RawEvent) -> Panel {
        self.panel(header, generic_lines(raw))
    }
}

/// Summary lines for one message inside a task result.
fn format_message(event: &Event) -> Vec<String> {
    let mut info = format!(
        "  - {} ({})",
        event.source().unwrap_or("Unknown Source"),
        event.type_name()
    );
    if let Some(usage) = event.models_usage() {
        info.push_str(&format!(" Models Usage: {}", usage));
    }

    let mut lines = vec![info];
    match event {
        Event::Message(message) | Event::ToolCallSummary(message) => {
            lines.push(format!("    Content: {}", message.content));
        }
        Event::ToolCallRequest(request) => {
            for call in &request.calls {
                lines.push(format!("    - Function Call: {} (ID: {})", call.name, call.id));
                lines.push(format!("      Arguments: {}", call.arguments));
            }
        }
        Event::ToolCallResult(result) => {
            for r in &result.results {
                lines.push(format!(
                    "    - Execution Result (Call ID: {}): {}",
                    r.call_id, r.content
                ));
            }
        }
        Event::MemoryQuery(query) => {
            lines.push(format!("    Memory Operation: {}", event.type_name()));
            lines.extend(query.items.iter().map(memory_preview));
        }
        Event::TaskResult(_) | Event::Unknown(_) => {
            warn!("Unexpected message type in task result: {}", event.type_name());
            lines.push(format!("    Unknown message type: {}", event.type_name()));
            if let Event::Unknown(raw) = event {
                lines.extend(generic_lines(raw).into_iter().map(|l| format!("  {}", l)));
            }
        }
    }
    lines
}

fn memory_preview(item: &MemoryItem) -> String {
    let mut preview: String = item.content.chars().take(MEMORY_PREVIEW_CHARS).collect();
    if item.content.chars().count() > MEMORY_PREVIEW_CHARS {
        preview.push_str("...");
    }
    format!("    - Memory Content: {} (Type: {})", preview, item.mime_type)
}

fn generic_lines(raw: &RawEvent) -> Vec<String> {
    let mut lines = Vec::new();
    match raw.field("content") {
        Some(Value::String(content)) => lines.push(format!("  Content: {}", content)),
        Some(Value::Array(items)) => {
            lines.extend(items.iter().map(|item| format!("  - {}", plain_value(item))));
        }
        Some(Value::Object(fields)) => {
            lines.extend(
                fields
                    .iter()
                    .map(|(key, value)| format!("   {}: {}", key, plain_value(value))),
            );
        }
        Some(other) => lines.push(format!("  Content: {}", other)),
        None => {}
    }

    for (key, value) in raw.fields() {
        if !matches!(key.as_str(), "content" | "source" | "target") {
            lines.push(format!("  {}: {}", key, plain_value(value)));
        }
    }

    if lines.is_empty() {
        warn!("No displayable attributes for event {}", raw);
        lines.push(format!("  Details: {}", raw));
    }
    lines
}
