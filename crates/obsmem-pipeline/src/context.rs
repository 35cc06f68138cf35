//! Session-start memory: reflections plus the observations worth recalling

use anyhow::{Context, Result};
use obsmem_index::{DocumentSource, SearchBackend};
use obsmem_store::{read_or_empty, Paths};

/// Broad query used to pull recent working context out of the index
pub const CONTEXT_QUERY: &str = "recent context current tasks projects";
pub const CONTEXT_RESULTS: usize = 10;

const REFLECTIONS_HEADING: &str = "## Long-Term Memory (Reflections)";
const OBSERVATIONS_HEADING: &str = "## Recent Observations";
const SEPARATOR: &str = "\n\n---\n\n";

/// Memory to hand a new agent session.
///
/// Always carries the full reflections. Observations come from search when
/// the index is ready and returns observation sections; otherwise the whole
/// observations file is used. `None` when both memory files are empty.
pub fn build_context(paths: &Paths, search: &dyn SearchBackend) -> Result<Option<String>> {
    let reflections_path = paths.reflections_path();
    let reflections = read_or_empty(&reflections_path)
        .with_context(|| format!("reading {}", reflections_path.display()))?;

    let mut parts = Vec::new();
    if !reflections.trim().is_empty() {
        parts.push(format!("{}\n\n{}", REFLECTIONS_HEADING, reflections));
    }

    let observations = match searched_observations(search) {
        Some(found) => found,
        None => {
            let path = paths.observations_path();
            read_or_empty(&path).with_context(|| format!("reading {}", path.display()))?
        }
    };
    if !observations.trim().is_empty() {
        parts.push(format!("{}\n\n{}", OBSERVATIONS_HEADING, observations));
    }

    if parts.is_empty() {
        return Ok(None);
    }
    Ok(Some(parts.join(SEPARATOR)))
}

fn searched_observations(search: &dyn SearchBackend) -> Option<String> {
    if !search.is_ready() {
        tracing::debug!(backend = search.name(), "index not ready, using full observations");
        return None;
    }

    let results = match search.search(CONTEXT_QUERY, CONTEXT_RESULTS) {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!(error = %e, "context search failed, using full observations");
            return None;
        }
    };

    let sections: Vec<&str> = results
        .iter()
        .filter(|r| r.document.source == DocumentSource::Observations)
        .map(|r| r.document.content.as_str())
        .collect();
    if sections.is_empty() {
        return None;
    }
    Some(sections.join("\n\n"))
}
