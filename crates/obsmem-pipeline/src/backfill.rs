//! Bulk import of historical transcripts
//!
//! Runs every transcript the cursor has never seen through the observer in
//! backfill mode, oldest first, and folds the growing observations into
//! reflections every few transcripts and once more at the end. A transcript
//! that fails is counted and skipped; the run carries on with the next one.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use obsmem_core::Config;
use obsmem_store::CursorStore;
use std::path::{Path, PathBuf};

use crate::observer::{transcript_key, Observer};
use crate::reflector::{ReflectOutcome, Reflector};
use crate::MemoryContext;

pub const DEFAULT_REFLECT_EVERY: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillOptions {
    /// Messages per oracle call
    pub chunk_size: usize,
    /// Stop after this many transcripts
    pub limit: Option<usize>,
    /// Reflect after every N transcripts; 0 only reflects at the end
    pub reflect_every: usize,
    /// List pending transcripts without processing them
    pub dry_run: bool,
}

impl BackfillOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chunk_size: config.backfill_chunk_size,
            limit: None,
            reflect_every: DEFAULT_REFLECT_EVERY,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    pub found: usize,
    /// Transcripts with no cursor entry
    pub pending: Vec<PathBuf>,
    pub processed: usize,
    /// Characters of observations produced
    pub chars: usize,
    pub failures: Vec<TranscriptFailure>,
    /// Reflector passes that rewrote the reflections
    pub reflections: usize,
    pub reflect_errors: usize,
    pub limit_reached: bool,
}

pub struct Backfill<'a> {
    ctx: MemoryContext<'a>,
}

impl<'a> Backfill<'a> {
    pub fn new(ctx: MemoryContext<'a>) -> Self {
        Self { ctx }
    }

    /// Transcripts without a cursor entry, in the given order. A path that
    /// cannot be resolved stays pending so the run reports it as a failure.
    pub fn pending(&self, transcripts: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let cursor = CursorStore::new(self.ctx.paths.cursor_path())
            .load()
            .context("loading cursor")?;

        Ok(transcripts
            .iter()
            .filter(|path| match transcript_key(path) {
                Ok(key) => !cursor.contains(&key),
                Err(_) => true,
            })
            .cloned()
            .collect())
    }

    pub fn run(&self, transcripts: &[PathBuf], options: &BackfillOptions) -> Result<BackfillSummary> {
        self.run_at(transcripts, options, Utc::now())
    }

    /// `now` is handed to every reflector pass
    pub fn run_at(
        &self,
        transcripts: &[PathBuf],
        options: &BackfillOptions,
        now: DateTime<Utc>,
    ) -> Result<BackfillSummary> {
        let mut summary = BackfillSummary {
            found: transcripts.len(),
            pending: self.pending(transcripts)?,
            ..BackfillSummary::default()
        };
        tracing::info!(found = summary.found, pending = summary.pending.len(), "starting backfill");

        if options.dry_run {
            if let Some(limit) = options.limit {
                summary.pending.truncate(limit);
            }
            return Ok(summary);
        }

        let observer = Observer::new(self.ctx);
        let pending = summary.pending.clone();
        for path in &pending {
            if options.limit.is_some_and(|limit| summary.processed >= limit) {
                summary.limit_reached = true;
                break;
            }
            summary.processed += 1;

            match observer.backfill_transcript(path, options.chunk_size, false) {
                Ok(report) => {
                    summary.chars += report.chars;
                    tracing::info!(
                        path = %path.display(),
                        n = summary.processed,
                        of = pending.len(),
                        chars = report.chars,
                        "transcript backfilled"
                    );
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %format!("{:#}", e), "transcript backfill failed");
                    summary.failures.push(TranscriptFailure {
                        path: path.clone(),
                        error: format!("{:#}", e),
                    });
                }
            }

            if options.reflect_every > 0 && summary.processed % options.reflect_every == 0 {
                self.reflect(&mut summary, now);
            }
        }

        if summary.processed > 0 {
            self.reflect(&mut summary, now);
        }

        tracing::info!(
            processed = summary.processed,
            chars = summary.chars,
            failures = summary.failures.len(),
            reflections = summary.reflections,
            "backfill complete"
        );
        Ok(summary)
    }

    fn reflect(&self, summary: &mut BackfillSummary, now: DateTime<Utc>) {
        match Reflector::new(self.ctx).run_at(now, false) {
            Ok(ReflectOutcome::Reflected(report)) => {
                if report.written {
                    summary.reflections += 1;
                }
            }
            Ok(ReflectOutcome::NothingToDo(reason)) => {
                tracing::debug!(reason = ?reason, "reflector had nothing to do");
            }
            Err(e) => {
                summary.reflect_errors += 1;
                tracing::warn!(error = %format!("{:#}", e), "reflector failed during backfill");
            }
        }
    }
}

/// Expand files and directories into JSONL transcripts, oldest first.
///
/// Directories are searched recursively. Files named explicitly are kept
/// whatever their extension.
pub fn discover_transcripts(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for root in roots {
        if root.is_dir() {
            collect_jsonl(root, &mut found)?;
        } else if root.exists() {
            found.push(root.clone());
        } else {
            anyhow::bail!("no such transcript or directory: {}", root.display());
        }
    }

    let mut dated: Vec<_> = found
        .into_iter()
        .map(|path| {
            let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
            (modified, path)
        })
        .collect();
    dated.sort();
    dated.dedup_by(|a, b| a.1 == b.1);
    Ok(dated.into_iter().map(|(_, path)| path).collect())
}

fn collect_jsonl(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_jsonl(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("jsonl") {
            out.push(path);
        }
    }
    Ok(())
}
