use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // First fenced block with a language tag; non-greedy so it stops at the first closing fence.
    static ref FENCED_BLOCK: Regex =
        Regex::new(r"(?s)```(\w+)\s*(.*?)```").expect("fence pattern is valid");
}

/// A fenced code block pulled out of free text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
}

/// Extract the first fenced block from `text`.
///
/// Returns `None` when there is no tagged fence pair or the body is blank, in which case callers
/// keep the text as it was.
pub fn extract_code_block(text: &str) -> Option<CodeBlock> {
    if !text.contains("```") {
        return None;
    }
    let captures = FENCED_BLOCK.captures(text)?;
    let code = captures.get(2)?.as_str().trim();
    if code.is_empty() {
        return None;
    }
    Some(CodeBlock {
        language: captures.get(1)?.as_str().to_string(),
        code: code.to_string(),
    })
}
