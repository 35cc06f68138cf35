//! Reflector: fold new observation sections into the reflections document
//!
//! One pass reads both memory files, keeps only the observation sections
//! dated on or after the "Last reflected" mark, and asks the oracle for an
//! updated reflections document. Inputs too large for one call are folded
//! chunk by chunk, each call seeing the reflections produced by the previous
//! one. The result is stamped, written, and the observations are trimmed to
//! the retention window.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use obsmem_core::{stamp, SplitDocument};
use obsmem_store::{atomic_write, char_len, estimate_tokens, read_or_empty};

use crate::chunk::chunk_sections;
use crate::trim::{trim_observations, TrimReport};
use crate::MemoryContext;

/// Why a reflect run made no oracle call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NothingToDo {
    /// Observations file missing or blank
    NoObservations,
    /// Every dated section is older than the mark
    AlreadyReflected { last_reflected: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReflectReport {
    /// Stamped reflections document
    pub text: String,
    /// Oracle calls made
    pub passes: usize,
    /// Observation sections sent
    pub sections: usize,
    pub last_reflected: Option<String>,
    pub written: bool,
    /// `None` on dry runs or when there was no observations file to trim
    pub trimmed: Option<TrimReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReflectOutcome {
    NothingToDo(NothingToDo),
    Reflected(ReflectReport),
}

pub struct Reflector<'a> {
    ctx: MemoryContext<'a>,
}

impl<'a> Reflector<'a> {
    pub fn new(ctx: MemoryContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn run(&self, dry_run: bool) -> Result<ReflectOutcome> {
        self.run_at(Utc::now(), dry_run)
    }

    /// Same as [`Reflector::run`] with an explicit clock, used for the
    /// "Last updated" stamp and the retention cutoff.
    pub fn run_at(&self, now: DateTime<Utc>, dry_run: bool) -> Result<ReflectOutcome> {
        let paths = self.ctx.paths;
        let config = self.ctx.config;

        let observations_path = paths.observations_path();
        let reflections_path = paths.reflections_path();
        let observations = read_or_empty(&observations_path)
            .with_context(|| format!("reading {}", observations_path.display()))?;
        if observations.trim().is_empty() {
            return Ok(ReflectOutcome::NothingToDo(NothingToDo::NoObservations));
        }
        let reflections = read_or_empty(&reflections_path)
            .with_context(|| format!("reading {}", reflections_path.display()))?;

        let previous = stamp::parse_last_reflected(&reflections);
        if previous.is_none() && !reflections.trim().is_empty() {
            tracing::warn!("reflections have no valid \"Last reflected\" line, using all observations");
        }

        let all = SplitDocument::parse(&observations);
        let pending = all.since(previous.as_deref());
        // The boundary day is re-sent with newer days, never on its own.
        let has_new = match previous.as_deref() {
            Some(mark) => pending.sections.iter().any(|s| s.date > mark),
            None => pending.has_sections(),
        };
        if !has_new {
            tracing::info!(last_reflected = ?previous, "no observations since last reflection");
            return Ok(ReflectOutcome::NothingToDo(NothingToDo::AlreadyReflected {
                last_reflected: previous,
            }));
        }

        let system_prompt = self.ctx.prompts.reflector_prompt();
        let filtered = pending.render();
        let estimated_tokens = estimate_tokens(
            char_len(system_prompt) + char_len(&reflections) + char_len(&filtered),
            config.chars_per_token,
        );

        let (result, passes) = if estimated_tokens <= config.max_input_tokens {
            tracing::info!(estimated_tokens, sections = pending.sections.len(), "reflecting in one pass");
            let user_content = format!(
                "## Current reflections\n\n{}\n\n---\n\n## Current observations\n\n{}",
                reflections, filtered
            );
            let text = self.call_oracle(system_prompt, &user_content)?;
            (text, 1)
        } else {
            self.fold_chunks(system_prompt, &reflections, &pending, estimated_tokens)?
        };

        // The mark never moves backwards, even if an older section was edited in.
        let last_reflected = match (previous, all.max_date()) {
            (Some(prev), Some(max)) => Some(if max > prev.as_str() { max.to_string() } else { prev }),
            (prev, max) => prev.or_else(|| max.map(str::to_string)),
        };
        let stamped = stamp::stamp(&result, now, last_reflected.as_deref());
        let text = format!("{}\n", stamped.trim_end());

        let mut report = ReflectReport {
            text,
            passes,
            sections: pending.sections.len(),
            last_reflected,
            written: false,
            trimmed: None,
        };
        if dry_run {
            return Ok(ReflectOutcome::Reflected(report));
        }

        atomic_write(&reflections_path, report.text.as_bytes())
            .with_context(|| format!("writing {}", reflections_path.display()))?;
        report.written = true;
        tracing::info!(
            passes = report.passes,
            last_reflected = ?report.last_reflected,
            "reflections updated"
        );

        report.trimmed = trim_observations(&observations_path, config.retention_days, now.date_naive())?;
        self.ctx.reindex_best_effort();

        Ok(ReflectOutcome::Reflected(report))
    }

    fn fold_chunks(
        &self,
        system_prompt: &str,
        reflections: &str,
        pending: &SplitDocument<'_>,
        estimated_tokens: usize,
    ) -> Result<(String, usize)> {
        let chunks = chunk_sections(pending, self.ctx.config.chunk_budget_chars());
        let total = chunks.len();
        tracing::info!(
            estimated_tokens,
            chunks = total,
            budget_chars = self.ctx.config.chunk_budget_chars(),
            "reflecting in chunks"
        );

        let mut running = reflections.to_string();
        for (i, chunk) in chunks.iter().enumerate() {
            let n = i + 1;
            let prompt = if n < total {
                format!(
                    "{}\n\n**NOTE:** This is chunk {} of {}. More observations follow. \
                     Focus on integrating these observations into the reflections. \
                     Produce the complete updated reflections document.",
                    system_prompt, n, total
                )
            } else {
                system_prompt.to_string()
            };
            let user_content = format!(
                "## Current reflections\n\n{}\n\n---\n\n## Observations (chunk {}/{})\n\n{}",
                running, n, total, chunk.text
            );
            tracing::debug!(chunk = n, of = total, dates = ?chunk.dates, "folding chunk");
            running = self
                .call_oracle(&prompt, &user_content)
                .with_context(|| format!("reflecting chunk {} of {}", n, total))?;
        }
        Ok((running, total))
    }

    fn call_oracle(&self, system_prompt: &str, user_content: &str) -> Result<String> {
        self.ctx
            .compressor
            .compress(system_prompt, user_content, self.ctx.config.reflector_max_output_tokens)
            .context("reflector oracle call failed")
    }
}
