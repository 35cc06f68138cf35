use anyhow::Result;
use obsmem_compress::ApiCompressor;
use obsmem_pipeline::{discover_transcripts, Backfill, BackfillOptions, BackfillSummary, MemoryContext};
use std::path::PathBuf;

use super::Workspace;

pub struct Args {
    pub roots: Vec<PathBuf>,
    pub limit: Option<usize>,
    pub reflect_every: usize,
    pub chunk_size: Option<usize>,
    pub dry_run: bool,
}

pub fn run(args: Args) -> Result<()> {
    let ws = Workspace::load()?;
    let transcripts = discover_transcripts(&args.roots)?;
    if transcripts.is_empty() {
        println!("No transcripts found.");
        return Ok(());
    }

    let prompts = ws.prompts()?;
    let compressor = ApiCompressor::from_config(&ws.config)?;
    let search = ws.search();
    let backfill = Backfill::new(MemoryContext {
        config: &ws.config,
        paths: &ws.paths,
        compressor: &compressor,
        prompts: prompts.as_ref(),
        search: search.as_ref(),
    });

    let options = BackfillOptions {
        chunk_size: args.chunk_size.unwrap_or(ws.config.backfill_chunk_size),
        limit: args.limit.filter(|&n| n > 0),
        reflect_every: args.reflect_every,
        dry_run: args.dry_run,
    };
    let summary = backfill.run(&transcripts, &options)?;
    print!("{}", format_summary(&summary, args.dry_run));
    Ok(())
}

fn format_summary(summary: &BackfillSummary, dry_run: bool) -> String {
    let mut out = format!(
        "Found {} transcript(s), {} unprocessed\n",
        summary.found,
        summary.pending.len()
    );

    if dry_run {
        for path in &summary.pending {
            out.push_str(&format!("  {}\n", path.display()));
        }
        return out;
    }
    if summary.pending.is_empty() {
        out.push_str("All transcripts already processed. Nothing to do.\n");
        return out;
    }

    for failure in &summary.failures {
        out.push_str(&format!("  ERROR {}: {}\n", failure.path.display(), failure.error));
    }
    if summary.limit_reached {
        out.push_str(&format!("Stopped after {} transcript(s).\n", summary.processed));
    }
    out.push_str(&format!(
        "Backfill complete: {} transcript(s), {} chars of observations, {} error(s), {} reflection pass(es)",
        summary.processed,
        summary.chars,
        summary.failures.len(),
        summary.reflections
    ));
    if summary.reflect_errors > 0 {
        out.push_str(&format!(", {} reflector error(s)", summary.reflect_errors));
    }
    out.push('\n');
    out
}
