//! Normalized transcripts: loading, resume offsets, dialogue rendering

use anyhow::{Context, Result};
use obsmem_core::{Message, Role};
use obsmem_store::CursorPosition;
use std::path::Path;

/// Read a JSONL file with one [`Message`] per line; malformed lines are skipped
pub fn load_messages(path: &Path) -> Result<Vec<Message>> {
    obsmem_store::read_jsonl(path).with_context(|| format!("reading transcript {}", path.display()))
}

/// Index of the first message not yet consumed.
///
/// An index beyond the transcript, or an id that no longer appears in it,
/// means the file was rewritten; processing restarts from the beginning.
pub fn resume_offset(messages: &[Message], position: Option<&CursorPosition>) -> usize {
    match position {
        None => 0,
        Some(CursorPosition::Index(n)) => {
            let n = *n as usize;
            if n > messages.len() {
                tracing::warn!(cursor = n, messages = messages.len(), "transcript shrank, restarting");
                0
            } else {
                n
            }
        }
        Some(CursorPosition::MessageId(id)) => messages
            .iter()
            .position(|m| m.id.as_deref() == Some(id.as_str()))
            .map(|i| i + 1)
            .unwrap_or_else(|| {
                tracing::warn!(cursor = %id, "cursor message not found, restarting");
                0
            }),
    }
}

/// Cursor value marking everything in `messages` as consumed
pub fn position_after(messages: &[Message]) -> CursorPosition {
    match messages.last().and_then(|m| m.id.clone()) {
        Some(id) => CursorPosition::MessageId(id),
        None => CursorPosition::Index(messages.len() as u64),
    }
}

/// Human-readable dialogue for the observer oracle
pub fn render_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|msg| {
            let ts = msg
                .timestamp
                .as_deref()
                .map(|t| t.chars().take(19).collect::<String>())
                .unwrap_or_else(|| "??:??".to_string());
            let role = match msg.role {
                Role::User => "USER",
                Role::Assistant => "ASSISTANT",
            };
            let mut entry = match msg.source.as_deref() {
                Some(source) => format!("[{}] {} [{}]: {}", ts, role, source, msg.content),
                None => format!("[{}] {}: {}", ts, role, msg.content),
            };
            for call in &msg.tool_calls {
                entry.push_str("\n  -> tool ");
                entry.push_str(&call.summary());
            }
            entry
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
