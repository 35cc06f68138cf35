//! System prompts for the observer and reflector

use anyhow::{Context, Result};
use std::path::Path;

const OBSERVER_PROMPT: &str = "\
You are the Observer. You compress coding-agent conversation transcripts into \
dense, dated observation notes.

Rules:
- Group notes under a `## YYYY-MM-DD` header for the day they happened.
- One bullet per fact, prefixed with a priority marker: 🔴 durable facts about \
the user, their projects and preferences; 🟡 useful working context; 🟢 minor detail.
- Start each bullet with the local time (HH:MM) when known.
- Record decisions, preferences, names, project facts and unresolved problems. \
Skip pleasantries, raw tool output and code listings.
- Output markdown only, no preamble.";

const REFLECTOR_PROMPT: &str = "\
You are the Reflector. You condense dated observation notes into a stable, \
long-term memory document about the user and their work.

Rules:
- Keep the document titled `# Reflections` with these sections: Core Identity, \
Preferences, Active Projects, Key Decisions, Recurring Problems, Archive.
- Merge duplicates, promote facts that keep recurring (🟡 → 🔴), demote stale \
ones, and move finished work to Archive.
- Aim for 200-600 lines. Prefer dense bullets over prose.
- Do not invent facts that are not supported by the observations or the \
existing reflections.
- Output the complete reflections document in markdown, nothing else.";

/// Source of the system prompts used for oracle calls
pub trait PromptProvider {
    fn observer_prompt(&self) -> &str;
    fn reflector_prompt(&self) -> &str;
}

/// Built-in prompts
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPrompts;

impl PromptProvider for DefaultPrompts {
    fn observer_prompt(&self) -> &str {
        OBSERVER_PROMPT
    }

    fn reflector_prompt(&self) -> &str {
        REFLECTOR_PROMPT
    }
}

/// Prompts read from `observer.md` and `reflector.md` in a directory
#[derive(Debug, Clone)]
pub struct DirPrompts {
    observer: String,
    reflector: String,
}

impl DirPrompts {
    /// Both files must exist; there is no fallback to the built-ins.
    pub fn load(dir: &Path) -> Result<Self> {
        let read = |name: &str| -> Result<String> {
            let path = dir.join(name);
            std::fs::read_to_string(&path)
                .with_context(|| format!("reading prompt {}", path.display()))
        };
        Ok(Self {
            observer: read("observer.md")?,
            reflector: read("reflector.md")?,
        })
    }
}

impl PromptProvider for DirPrompts {
    fn observer_prompt(&self) -> &str {
        &self.observer
    }

    fn reflector_prompt(&self) -> &str {
        &self.reflector
    }
}
