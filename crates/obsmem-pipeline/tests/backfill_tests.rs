mod common;

use chrono::{DateTime, TimeZone, Utc};
use common::{conversation, Harness};
use obsmem_compress::ScriptedCompressor;
use obsmem_pipeline::{Backfill, BackfillOptions};
use std::path::PathBuf;

const REFLECTIONS: &str = "# Reflections\n\n## Core Identity\n- Backend developer\n";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 10, 14, 32, 0).unwrap()
}

fn transcripts(h: &Harness, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| h.write_transcript(&format!("session-{}.jsonl", i), &conversation(i * 10, 5, true)))
        .collect()
}

fn options(reflect_every: usize, limit: Option<usize>) -> BackfillOptions {
    BackfillOptions {
        chunk_size: 200,
        limit,
        reflect_every,
        dry_run: false,
    }
}

fn reflector_calls(oracle: &ScriptedCompressor) -> usize {
    oracle
        .calls()
        .iter()
        .filter(|c| c.max_output_tokens == 8192)
        .count()
}

#[test]
fn test_reflects_on_cadence_and_at_the_end() {
    let h = Harness::new();
    let paths = transcripts(&h, 5);
    let oracle = ScriptedCompressor::new()
        .with_response("## 2026-02-05\n- first")
        .with_response("## 2026-02-06\n- second")
        .with_response(REFLECTIONS)
        .with_response("## 2026-02-07\n- third")
        .with_response("## 2026-02-08\n- fourth")
        .with_response(REFLECTIONS)
        .with_response("## 2026-02-09\n- fifth")
        .with_response(REFLECTIONS);

    let summary = Backfill::new(h.ctx(&oracle))
        .run_at(&paths, &options(2, None), now())
        .unwrap();

    assert_eq!(summary.found, 5);
    assert_eq!(summary.pending.len(), 5);
    assert_eq!(summary.processed, 5);
    assert!(summary.failures.is_empty());
    assert_eq!(summary.reflections, 3);
    assert_eq!(summary.reflect_errors, 0);
    assert!(!summary.limit_reached);

    let calls = oracle.calls();
    assert_eq!(calls.len(), 8);
    let reflect_at: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, c)| c.max_output_tokens == 8192)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(reflect_at, vec![2, 5, 7]);

    let reflections = h.reflections().unwrap();
    assert!(reflections.contains("*Last reflected: 2026-02-09*"));
}

#[test]
fn test_limit_and_failures_do_not_abort() {
    let h = Harness::new();
    let mut paths = transcripts(&h, 3);
    paths.insert(1, h.root().join("vanished.jsonl"));
    let oracle = ScriptedCompressor::repeating("## 2026-02-10\n- note");

    let summary = Backfill::new(h.ctx(&oracle))
        .run_at(&paths, &options(0, Some(3)), now())
        .unwrap();

    assert_eq!(summary.pending.len(), 4);
    assert_eq!(summary.processed, 3);
    assert!(summary.limit_reached);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].path, h.root().join("vanished.jsonl"));
    assert!(summary.failures[0].error.contains("vanished.jsonl"));

    // two transcripts observed, one final reflection
    assert_eq!(oracle.call_count(), 3);
    assert_eq!(reflector_calls(&oracle), 1);
    assert_eq!(summary.reflections, 1);
}

#[test]
fn test_second_run_skips_cursored_transcripts() {
    let h = Harness::new();
    let paths = transcripts(&h, 2);
    let oracle = ScriptedCompressor::new()
        .with_response("## 2026-02-09\n- a")
        .with_response("## 2026-02-10\n- b")
        .with_response(REFLECTIONS);
    let backfill = Backfill::new(h.ctx(&oracle));

    let first = backfill.run_at(&paths, &options(20, None), now()).unwrap();
    assert_eq!(first.processed, 2);
    assert_eq!(oracle.call_count(), 3);

    let second = backfill.run_at(&paths, &options(20, None), now()).unwrap();
    assert_eq!(second.found, 2);
    assert!(second.pending.is_empty());
    assert_eq!(second.processed, 0);
    assert_eq!(second.reflections, 0);
    assert_eq!(oracle.call_count(), 3);
}

#[test]
fn test_dry_run_lists_pending_only() {
    let h = Harness::new();
    let paths = transcripts(&h, 3);
    let oracle = ScriptedCompressor::repeating("## 2026-02-10\n- note");

    let dry = BackfillOptions {
        dry_run: true,
        ..options(1, Some(2))
    };
    let summary = Backfill::new(h.ctx(&oracle)).run_at(&paths, &dry, now()).unwrap();

    assert_eq!(summary.pending, paths[..2].to_vec());
    assert_eq!(summary.processed, 0);
    assert_eq!(oracle.call_count(), 0);
    assert!(h.observations().is_none());
    assert!(!h.paths.cursor_path().exists());
}

#[test]
fn test_reflector_failure_is_counted() {
    let h = Harness::new();
    let paths = transcripts(&h, 1);
    let oracle = ScriptedCompressor::new()
        .with_response("## 2026-02-10\n- note")
        .with_failure("overloaded");

    let summary = Backfill::new(h.ctx(&oracle))
        .run_at(&paths, &options(20, None), now())
        .unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.reflect_errors, 1);
    assert_eq!(summary.reflections, 0);
    assert!(h.observations().unwrap().contains("- note"));
    assert!(h.reflections().is_none());
}
