use anyhow::Result;
use obsmem_core::SearchBackendKind;
use obsmem_index::{reindex, SearchResult};

use super::Workspace;

const PREVIEW_LINES: usize = 5;
const JSON_CONTENT_CHARS: usize = 500;

pub fn run(query: &str, limit: usize, force_reindex: bool, json: bool) -> Result<()> {
    let ws = Workspace::load()?;
    if ws.config.search_backend == SearchBackendKind::None {
        println!("Search is disabled (search_backend = none).");
        return Ok(());
    }

    let backend = ws.search();
    if force_reindex || !backend.is_ready() {
        let count = reindex(&ws.paths, backend.as_ref())?;
        tracing::info!(documents = count, "built search index");
    }

    let results = backend.search(query, limit)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&json_results(&results))?);
    } else if results.is_empty() {
        println!("No results for {:?}", query);
    } else {
        print!("{}", format_results(&results));
    }
    Ok(())
}

fn json_results(results: &[SearchResult]) -> serde_json::Value {
    results
        .iter()
        .map(|r| {
            serde_json::json!({
                "rank": r.rank,
                "score": r.score,
                "doc_id": r.document.doc_id,
                "source": r.document.source.as_str(),
                "heading": r.document.heading,
                "content": r.document.content.chars().take(JSON_CONTENT_CHARS).collect::<String>(),
            })
        })
        .collect()
}

fn format_results(results: &[SearchResult]) -> String {
    let mut out = String::new();
    for r in results {
        out.push_str(&format!(
            "\n--- [{}] {} (score: {:.2}) ---\n",
            r.rank, r.document.heading, r.score
        ));
        let lines: Vec<&str> = r.document.content.trim().lines().collect();
        for line in lines.iter().take(PREVIEW_LINES) {
            out.push_str(&format!("  {}\n", line));
        }
        if lines.len() > PREVIEW_LINES {
            out.push_str(&format!("  ... ({} more lines)\n", lines.len() - PREVIEW_LINES));
        }
    }
    out
}
