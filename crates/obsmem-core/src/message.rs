//! Normalized transcript messages

use serde::{Deserialize, Serialize};

const MAX_TOOL_SUMMARY_CHARS: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A tool invocation attached to an assistant message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub input: serde_json::Value,
}

impl ToolCall {
    /// One-line rendering: the tool name plus its primary argument
    pub fn summary(&self) -> String {
        let primary = ["file_path", "notebook_path", "path", "command", "pattern", "url", "query"]
            .iter()
            .find_map(|key| self.input.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| match &self.input {
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            });

        let primary = single_line(&primary);
        if primary.is_empty() {
            self.name.clone()
        } else {
            format!("{}: {}", self.name, truncate_chars(&primary, MAX_TOOL_SUMMARY_CHARS))
        }
    }
}

/// One message from any agent transcript, after normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Stable identifier, when the source format has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: Role,
    pub content: String,
    /// ISO 8601
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Producing agent, e.g. "claude" or "codex"
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: None,
            role,
            content: content.into(),
            timestamp: None,
            source: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_tool_call(mut self, name: impl Into<String>, input: serde_json::Value) -> Self {
        self.tool_calls.push(ToolCall {
            name: name.into(),
            input,
        });
        self
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_minimal_json() {
        let msg: Message = serde_json::from_str(r#"{"role":"user","content":"hi"}"#).unwrap();
        assert_eq!(msg.role, Role::User);
        assert!(msg.timestamp.is_none());
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn test_tool_summary_prefers_file_path() {
        let call = ToolCall {
            name: "Edit".into(),
            input: json!({"file_path": "src/main.rs", "old_string": "a\nb", "new_string": "c"}),
        };
        assert_eq!(call.summary(), "Edit: src/main.rs");
    }

    #[test]
    fn test_tool_summary_collapses_multiline_command() {
        let call = ToolCall {
            name: "Bash".into(),
            input: json!({"command": "cargo test \\\n  --workspace"}),
        };
        assert_eq!(call.summary(), "Bash: cargo test \\ --workspace");
    }

    #[test]
    fn test_tool_summary_truncates_payload() {
        let long = "x".repeat(500);
        let call = ToolCall {
            name: "Write".into(),
            input: json!({"content": long}),
        };
        let summary = call.summary();
        assert!(summary.starts_with("Write: {"));
        assert!(summary.ends_with("..."));
        assert!(summary.chars().count() < 140);
    }

    #[test]
    fn test_tool_summary_without_input() {
        let call = ToolCall {
            name: "TodoRead".into(),
            input: serde_json::Value::Null,
        };
        assert_eq!(call.summary(), "TodoRead");
    }
}
