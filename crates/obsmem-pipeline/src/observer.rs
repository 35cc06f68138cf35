//! Observer: compress new transcript messages into dated observation notes

use anyhow::{Context, Result};
use obsmem_core::Message;
use obsmem_store::{atomic_write, read_or_empty, CursorStore};
use std::path::Path;

use crate::transcript::{load_messages, position_after, render_transcript, resume_offset};
use crate::MemoryContext;

const LIVE_NOTE: &str = "\n\n**MODE:** Live update. Merge the new transcript into the existing \
observations and return the complete updated observations document, existing sections included.";

const BACKFILL_NOTE: &str = "\n\n**MODE:** Backfill of a historical transcript. Existing \
observations are not shown. Output only the dated observation sections for this transcript.";

/// How an observer result lands in the observations document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// The result is the whole document
    Overwrite,
    /// The result is new sections to add at the end
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveMode {
    /// Recent session; the oracle sees existing observations and returns the merged document
    Live,
    /// Historical import; the oracle sees only the transcript
    Backfill,
}

impl ObserveMode {
    pub fn write_mode(self) -> WriteMode {
        match self {
            ObserveMode::Live => WriteMode::Overwrite,
            ObserveMode::Backfill => WriteMode::Append,
        }
    }

    fn prompt_note(self) -> &'static str {
        match self {
            ObserveMode::Live => LIVE_NOTE,
            ObserveMode::Backfill => BACKFILL_NOTE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserveOutcome {
    /// Too few new messages; nothing was sent or written
    BelowThreshold { messages: usize, min_messages: usize },
    Observed {
        /// Oracle output, as returned
        text: String,
        mode: WriteMode,
        /// False on dry runs
        written: bool,
    },
}

impl ObserveOutcome {
    pub fn is_observed(&self) -> bool {
        matches!(self, ObserveOutcome::Observed { .. })
    }
}

/// Totals for a chunked backfill
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub groups: usize,
    pub observed: usize,
    /// Groups smaller than `min_messages`
    pub skipped: usize,
    /// Characters of oracle output appended (or that would be, on dry runs)
    pub chars: usize,
}

pub struct Observer<'a> {
    ctx: MemoryContext<'a>,
}

impl<'a> Observer<'a> {
    pub fn new(ctx: MemoryContext<'a>) -> Self {
        Self { ctx }
    }

    /// Observe `messages`, which must already exclude anything consumed before
    pub fn observe(&self, messages: &[Message], mode: ObserveMode, dry_run: bool) -> Result<ObserveOutcome> {
        let min_messages = self.ctx.config.min_messages;
        if messages.len() < min_messages {
            tracing::debug!(messages = messages.len(), min_messages, "below observe threshold");
            return Ok(ObserveOutcome::BelowThreshold {
                messages: messages.len(),
                min_messages,
            });
        }

        let path = self.ctx.paths.observations_path();
        let transcript = render_transcript(messages);
        let user_content = match mode {
            ObserveMode::Live => {
                let existing = read_or_empty(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                format!(
                    "## Existing observations\n\n{}\n\n---\n\n## New transcript to process\n\n{}",
                    existing, transcript
                )
            }
            ObserveMode::Backfill => format!("## New transcript to process\n\n{}", transcript),
        };
        let system_prompt = format!("{}{}", self.ctx.prompts.observer_prompt(), mode.prompt_note());

        tracing::info!(
            messages = messages.len(),
            mode = ?mode,
            oracle = self.ctx.compressor.name(),
            "observing transcript"
        );
        let text = self
            .ctx
            .compressor
            .compress(&system_prompt, &user_content, self.ctx.config.observer_max_output_tokens)
            .context("observer oracle call failed")?;

        let write_mode = mode.write_mode();
        if dry_run {
            return Ok(ObserveOutcome::Observed {
                text,
                mode: write_mode,
                written: false,
            });
        }

        write_observations(&path, &text, write_mode)?;
        self.ctx.reindex_best_effort();
        Ok(ObserveOutcome::Observed {
            text,
            mode: write_mode,
            written: true,
        })
    }

    /// Backfill-mode observation in groups of at most `chunk_size` messages
    pub fn backfill(&self, messages: &[Message], chunk_size: usize, dry_run: bool) -> Result<BackfillReport> {
        self.backfill_groups(messages, chunk_size, dry_run, |_| Ok(()))
    }

    /// Observe whatever a transcript file gained since the last run and move
    /// its cursor past it. The cursor is untouched on dry runs, below-threshold
    /// results and failures.
    pub fn observe_transcript(&self, transcript: &Path, dry_run: bool) -> Result<ObserveOutcome> {
        let key = transcript_key(transcript)?;
        let store = CursorStore::new(self.ctx.paths.cursor_path());
        let mut cursor = store.load().context("loading cursor")?;

        let messages = load_messages(transcript)?;
        let offset = resume_offset(&messages, cursor.get(&key));
        let outcome = self.observe(&messages[offset..], ObserveMode::Live, dry_run)?;

        if outcome.is_observed() && !dry_run {
            cursor.set(key, position_after(&messages));
            store.save(&cursor).context("saving cursor")?;
        }
        Ok(outcome)
    }

    /// Backfill a transcript file from its cursor onwards. The cursor moves
    /// after every observed group, so an interrupted backfill resumes where
    /// it stopped and a finished one has nothing left to send.
    pub fn backfill_transcript(&self, transcript: &Path, chunk_size: usize, dry_run: bool) -> Result<BackfillReport> {
        let key = transcript_key(transcript)?;
        let store = CursorStore::new(self.ctx.paths.cursor_path());
        let mut cursor = store.load().context("loading cursor")?;

        let messages = load_messages(transcript)?;
        let offset = resume_offset(&messages, cursor.get(&key));
        if offset > 0 {
            tracing::debug!(path = %key, offset, "resuming backfill");
        }

        self.backfill_groups(&messages[offset..], chunk_size, dry_run, |consumed| {
            if dry_run {
                return Ok(());
            }
            cursor.set(key.clone(), position_after(&messages[..offset + consumed]));
            store.save(&cursor).context("saving cursor")
        })
    }

    /// `on_observed` receives how many messages are consumed so far
    fn backfill_groups(
        &self,
        messages: &[Message],
        chunk_size: usize,
        dry_run: bool,
        mut on_observed: impl FnMut(usize) -> Result<()>,
    ) -> Result<BackfillReport> {
        let mut report = BackfillReport::default();
        let mut consumed = 0;

        for group in messages.chunks(chunk_size.max(1)) {
            report.groups += 1;
            consumed += group.len();
            match self.observe(group, ObserveMode::Backfill, dry_run)? {
                ObserveOutcome::BelowThreshold { .. } => report.skipped += 1,
                ObserveOutcome::Observed { text, .. } => {
                    report.observed += 1;
                    report.chars += text.chars().count();
                    on_observed(consumed)?;
                }
            }
        }

        tracing::info!(
            groups = report.groups,
            observed = report.observed,
            skipped = report.skipped,
            chars = report.chars,
            "backfill finished"
        );
        Ok(report)
    }
}

pub(crate) fn transcript_key(transcript: &Path) -> Result<String> {
    let absolute = std::fs::canonicalize(transcript)
        .with_context(|| format!("resolving transcript {}", transcript.display()))?;
    Ok(absolute.to_string_lossy().into_owned())
}

fn write_observations(path: &Path, text: &str, mode: WriteMode) -> Result<()> {
    let new = text.trim_end();
    let content = match mode {
        WriteMode::Overwrite => format!("{}\n", new),
        WriteMode::Append => {
            let existing = read_or_empty(path).with_context(|| format!("reading {}", path.display()))?;
            let existing = existing.trim_end();
            if existing.is_empty() {
                format!("{}\n", new)
            } else {
                format!("{}\n\n{}\n", existing, new)
            }
        }
    };
    atomic_write(path, content.as_bytes()).with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(path = %path.display(), mode = ?mode, chars = content.len(), "observations written");
    Ok(())
}
