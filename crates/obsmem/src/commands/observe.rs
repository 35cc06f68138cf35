use anyhow::Result;
use obsmem_compress::ApiCompressor;
use obsmem_pipeline::{MemoryContext, ObserveOutcome, Observer};
use std::path::Path;

use super::Workspace;

pub fn run(transcript: &Path, backfill: bool, chunk_size: Option<usize>, dry_run: bool) -> Result<()> {
    let ws = Workspace::load()?;
    let prompts = ws.prompts()?;
    let compressor = ApiCompressor::from_config(&ws.config)?;
    let search = ws.search();
    let observer = Observer::new(MemoryContext {
        config: &ws.config,
        paths: &ws.paths,
        compressor: &compressor,
        prompts: prompts.as_ref(),
        search: search.as_ref(),
    });

    if backfill {
        let chunk_size = chunk_size.unwrap_or(ws.config.backfill_chunk_size);
        let report = observer.backfill_transcript(transcript, chunk_size, dry_run)?;
        println!(
            "Backfilled {}: {} group(s), {} observed, {} below threshold, {} chars",
            transcript.display(),
            report.groups,
            report.observed,
            report.skipped,
            report.chars
        );
        return Ok(());
    }

    match observer.observe_transcript(transcript, dry_run)? {
        ObserveOutcome::BelowThreshold {
            messages,
            min_messages,
        } => println!(
            "Skipped: {} new message(s), need at least {}",
            messages, min_messages
        ),
        ObserveOutcome::Observed { text, written, .. } => {
            if written {
                println!("Observations updated ({} chars)", text.chars().count());
            } else {
                println!("{}", text.trim_end());
            }
        }
    }
    Ok(())
}
