//! Markup target: one self-contained `<div>` per event, appended to a live page.
use indoc::indoc;
use serde_json::Value;

use super::labels::{event_label, source_label};
use super::{plain_value, CallLine, Format, Header, ResultLine};
use crate::models::event::{RawEvent, TaskResult};

const STYLE_PROLOGUE: &str = indoc! {r#"
    <style>
        :root {
            --brand-warning: #f59e0b;
            --brand-info: #0ea5e9;
            --brand-success: #10b981;
            --brand-muted: #6b7280;
            --brand-error: #dc2626;
            --text-primary: #1e293b;
            --text-secondary: #64748b;
            --card-background: #ffffff;
        }
        .event-block {
            margin: 15px 0;
            padding: 20px;
            border-radius: 12px;
            box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1);
            background: var(--card-background);
            color: var(--text-primary);
            position: relative;
        }
        .gradient-bg-blue { background: linear-gradient(135deg, #eff6ff 0%, #dbeafe 100%); }
        .gradient-bg-green { background: linear-gradient(135deg, #f0fdf4 0%, #dcfce7 100%); }
        .gradient-bg-purple { background: linear-gradient(135deg, #f5f3ff 0%, #ede9fe 100%); }
        .gradient-bg-orange { background: linear-gradient(135deg, #fff7ed 0%, #ffedd5 100%); }
        .event-tool-request::before,
        .event-tool-execution::before,
        .event-task-result::before,
        .event-text-message::before,
        .event-error::before {
            content: "";
            position: absolute;
            left: 0;
            top: 0;
            bottom: 0;
            width: 5px;
            border-radius: 12px 0 0 12px;
        }
        .event-tool-request::before { background-color: var(--brand-warning); }
        .event-tool-execution::before { background-color: var(--brand-info); }
        .event-task-result::before { background-color: var(--brand-success); }
        .event-text-message::before { background-color: var(--brand-muted); }
        .event-error::before { background-color: var(--brand-error); }
        .event-meta {
            display: flex;
            align-items: center;
            margin-bottom: 10px;
            font-size: 14px;
            color: var(--text-secondary);
        }
        .event-icon { margin-right: 10px; font-size: 20px; }
        .event-type { font-weight: 600; color: var(--text-primary); }
        .event-content {
            background: rgba(255, 255, 255, 0.7);
            padding: 15px;
            border-radius: 8px;
            margin-top: 10px;
            white-space: pre-wrap;
        }
        .rotating-gear { animation: rotate 4s linear infinite; }
        @keyframes rotate {
            from { transform: rotate(0deg); }
            to { transform: rotate(360deg); }
        }
        .tool-call, .execution-result, .dict-item, .list-item { margin: 8px 0; }
        .query-text { margin-top: 5px; color: var(--text-secondary); }
        .success-text { color: var(--brand-success); margin: 5px 0; }
        .final-answer {
            background: rgba(255, 255, 255, 0.9);
            padding: 12px;
            border-radius: 6px;
        }
        .stop-reason { margin-top: 10px; color: var(--text-secondary); }
        .no-answer { color: var(--text-secondary); font-style: italic; }
    </style>
"#};

/// Escape `&`, `<` and `>` for insertion into markup.
///
/// Not idempotent: escape each field exactly once, where it is inserted.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// The block a streaming caller emits when the conversation fails part way through.
pub fn error_fragment(message: &str) -> String {
    format!(
        "<div class='event-block event-error'>\
         <div class='event-meta'><i class='bi bi-exclamation-octagon-fill me-2'></i>Processing Error</div>\
         <div class='event-content'>An error occurred during analysis: {}</div>\
         </div>",
        escape_html(message)
    )
}

struct Style {
    class: &'static str,
    icon: &'static str,
}

fn style_for(type_name: &str) -> Style {
    match type_name {
        "ToolCallRequestEvent" => Style {
            class: "event-block event-tool-request gradient-bg-blue",
            icon: "<i class='bi bi-gear rotating-gear'></i>",
        },
        "ToolCallExecutionEvent" => Style {
            class: "event-block event-tool-execution gradient-bg-green",
            icon: "<i class='bi bi-tools'></i>",
        },
        "TaskResult" => Style {
            class: "event-block event-task-result gradient-bg-purple",
            icon: "<i class='bi bi-check-circle'></i>",
        },
        "TextMessage" => Style {
            class: "event-block event-text-message gradient-bg-orange",
            icon: "<i class='bi bi-chat-left-text'></i>",
        },
        _ => Style {
            class: "event-block",
            icon: "<i class='bi bi-info-circle'></i>",
        },
    }
}

/// Markup fragments for a streamed page.
///
/// The first fragment of the run carries the style prologue.
#[derive(Debug, Default)]
pub struct HtmlFormat {
    styles_emitted: bool,
}

impl HtmlFormat {
    pub fn new() -> Self {
        Self::default()
    }

    fn block(&mut self, header: &Header<'_>, body: Option<String>) -> String {
        let style = style_for(header.type_name);
        let mut html = String::new();
        if !self.styles_emitted {
            html.push_str(STYLE_PROLOGUE);
            self.styles_emitted = true;
        }

        html.push_str(&format!("<div class='{}'>", style.class));
        html.push_str(&format!(
            "<div class='event-meta'><span class='event-icon'>{}</span><span class='event-type'>{}</span></div>",
            style.icon,
            escape_html(event_label(header.type_name))
        ));
        if let Some(source) = header.source {
            html.push_str(&format!(
                "<div class='event-meta'><span>From:</span>&nbsp;{}</div>",
                escape_html(source_label(source))
            ));
        }
        if let Some(target) = header.target {
            html.push_str(&format!(
                "<div class='event-meta'><span>Target:</span>&nbsp;{}</div>",
                escape_html(target)
            ));
        }
        if let Some(body) = body {
            html.push_str("<div class='event-content'>");
            html.push_str(&body);
            html.push_str("</div>");
        }
        html.push_str("</div>");
        html
    }
}

impl Format for HtmlFormat {
    type Fragment = String;

    fn message(&mut self, header: &Header<'_>, content: &str) -> String {
        self.block(header, Some(escape_html(content)))
    }

    fn tool_calls(&mut self, header: &Header<'_>, calls: &[CallLine<'_>]) -> String {
        let body = calls
            .iter()
            .map(|call| {
                format!(
                    "<div class='tool-call'><strong>{}</strong> \
                     <div class='query-text'>Query: <em>{}</em></div></div>",
                    escape_html(call.name),
                    escape_html(&call.query)
                )
            })
            .collect::<Vec<_>>()
            .join("<br>");
        self.block(header, Some(body))
    }

    fn tool_results(&mut self, header: &Header<'_>, results: &[ResultLine<'_>]) -> String {
        let body = results
            .iter()
            .map(|result| {
                format!(
                    "<div class='execution-result'><strong>{}</strong> \
                     <div class='success-text'>✓ Completed successfully</div>\
                     <div class='query-text'>Query: <em>{}</em></div></div>",
                    escape_html(result.name),
                    escape_html(result.query)
                )
            })
            .collect::<Vec<_>>()
            .join("<br>");
        self.block(header, Some(body))
    }

    fn task_result(
        &mut self,
        header: &Header<'_>,
        result: &TaskResult,
        answer: Option<&str>,
    ) -> String {
        let mut parts = Vec::with_capacity(2);
        match answer {
            Some(answer) => parts.push(format!(
                "<div class='final-answer'><strong>Final Answer:</strong>\
                 <div class='answer-content'>{}</div></div>",
                escape_html(answer)
            )),
            None => parts.push(
                "<div class='no-answer'><em>No final answer was provided by the agent.</em></div>"
                    .to_string(),
            ),
        }
        if let Some(reason) = result.stop_reason.as_deref().filter(|r| !r.is_empty()) {
            parts.push(format!(
                "<div class='stop-reason'><em>Reason: {}</em></div>",
                escape_html(reason)
            ));
        }
        self.block(header, Some(parts.join("<br>")))
    }

    fn generic(&mut self, header: &Header<'_>, raw: &RawEvent) -> String {
        let mut body = String::new();
        if let Some(content) = raw.field("content") {
            body.push_str(&render_value(content));
        }
        for (key, value) in raw.fields() {
            if matches!(key.as_str(), "content" | "source" | "target") {
                continue;
            }
            body.push_str(&dict_item(key, value));
        }
        if body.is_empty() {
            body = escape_html(&raw.to_string());
        }
        self.block(header, Some(body))
    }
}

fn dict_item(key: &str, value: &Value) -> String {
    format!(
        "<div class='dict-item'><strong>{}:</strong> {}</div>",
        escape_html(key),
        render_value(value)
    )
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| format!("<div class='list-item'>• {}</div>", escape_html(&plain_value(item))))
            .collect(),
        Value::Object(fields) => fields
            .iter()
            .map(|(key, value)| dict_item(key, value))
            .collect(),
        other => escape_html(&plain_value(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header<'a>(type_name: &'a str, source: Option<&'a str>) -> Header<'a> {
        Header {
            type_name,
            source,
            target: None,
        }
    }

    #[test]
    fn test_escape_html_order() {
        assert_eq!(escape_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_html("<"), "&lt;");
        assert_eq!(escape_html(&escape_html("<")), "&amp;lt;");
    }

    #[test]
    fn test_prologue_only_on_first_block() {
        let mut format = HtmlFormat::new();
        let first = format.message(&header("TextMessage", Some("advisor")), "one");
        let second = format.message(&header("TextMessage", Some("advisor")), "two");
        assert!(first.starts_with("<style>"));
        assert!(!second.contains("<style>"));
    }

    #[test]
    fn test_block_uses_friendly_names() {
        let mut format = HtmlFormat::new();
        let html = format.message(&header("TextMessage", Some("web_search_agent")), "hi");
        assert!(html.contains("event-text-message"));
        assert!(html.contains("<span class='event-type'>Message</span>"));
        assert!(html.contains("Market Researcher"));
    }

    #[test]
    fn test_generic_renders_nested_content() {
        let mut format = HtmlFormat::new();
        let raw = RawEvent::new(
            Some("Mystery".to_string()),
            json!({"source": "x", "content": ["<a>", 3], "detail": {"k": "v"}}),
        );
        let html = format.generic(&header("Mystery", Some("x")), &raw);
        assert!(html.contains("<div class='list-item'>• &lt;a&gt;</div>"));
        assert!(html.contains("<div class='list-item'>• 3</div>"));
        assert!(html.contains("<strong>detail:</strong> <div class='dict-item'><strong>k:</strong> v</div>"));
    }

    #[test]
    fn test_generic_scalar_uses_string_form() {
        let mut format = HtmlFormat::new();
        let raw = RawEvent::new(None, json!("<odd>"));
        let html = format.generic(&header("Unknown", None), &raw);
        assert!(html.contains("\"&lt;odd&gt;\""));
    }

    #[test]
    fn test_generic_without_fields_uses_string_form() {
        let mut format = HtmlFormat::new();
        let raw = RawEvent::new(Some("Heartbeat".to_string()), json!({"source": "x"}));
        let html = format.generic(&header("Heartbeat", Some("x")), &raw);
        assert!(html.contains(r#"Heartbeat({"source":"x"})"#));
    }

    #[test]
    fn test_error_fragment_escapes_message() {
        let html = error_fragment("bad <key>");
        assert!(html.contains("event-error"));
        assert!(html.contains("bad &lt;key&gt;"));
    }
}
