//! Per-transcript resume markers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::io::{atomic_write, read_or_empty};

/// How far into a transcript processing has advanced. The meaning is owned
/// by whichever reader produced the messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CursorPosition {
    /// Number of messages already consumed
    Index(u64),
    /// Identifier of the last consumed message
    MessageId(String),
}

/// Transcript identity (absolute path) to resume position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor {
    entries: BTreeMap<String, CursorPosition>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, transcript: &str) -> Option<&CursorPosition> {
        self.entries.get(transcript)
    }

    pub fn contains(&self, transcript: &str) -> bool {
        self.entries.contains_key(transcript)
    }

    pub fn set(&mut self, transcript: impl Into<String>, position: CursorPosition) {
        self.entries.insert(transcript.into(), position);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// JSON file holding the whole [`Cursor`]. Saves replace the file.
#[derive(Debug, Clone)]
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cursor. A missing or corrupt file yields an empty cursor so
    /// that transcripts are reprocessed rather than the run failing.
    pub fn load(&self) -> std::io::Result<Cursor> {
        let content = read_or_empty(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Cursor::new());
        }

        match serde_json::from_str(&content) {
            Ok(cursor) => Ok(cursor),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt cursor file, starting fresh");
                Ok(Cursor::new())
            }
        }
    }

    pub fn save(&self, cursor: &Cursor) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(cursor)?;
        atomic_write(&self.path, format!("{}\n", json).as_bytes())
    }
}
