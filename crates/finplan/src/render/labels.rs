//! Friendly names for event kinds and participants in the markup transcript.

/// Display name for an event's wire type; unrecognised types are shown as-is.
pub fn event_label(type_name: &str) -> &str {
    match type_name {
        "TextMessage" => "Message",
        "ToolCallRequestEvent" => "Tool Request",
        "ToolCallExecutionEvent" => "Tool Response",
        "TaskResult" => "Final Result",
        other => other,
    }
}

/// Display name for a participant; unrecognised participants are shown as-is.
pub fn source_label(source: &str) -> &str {
    match source {
        "user" => "You",
        "MagenticOneOrchestrator" => "Team Coordinator",
        "financial_advisor_agent" => "Financial Advisor",
        "web_search_agent" => "Market Researcher",
        "code_writer_agent" => "Code Writer",
        "code_executor_agent" => "Code Executor",
        other => other,
    }
}
