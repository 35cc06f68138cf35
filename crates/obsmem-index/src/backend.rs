use anyhow::{Context, Result};
use obsmem_core::SearchBackendKind;
use obsmem_store::{read_or_empty, Paths};

use crate::document::{Document, SearchResult};
use crate::parser::{parse_observations, parse_reflections};
use crate::sqlite::Bm25Backend;

/// Keyword search over memory documents
pub trait SearchBackend {
    fn name(&self) -> &str;

    /// Replace the whole index with `documents`
    fn index(&self, documents: &[Document]) -> Result<()>;

    /// Best matches first, at most `limit`, only positive scores
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>>;

    fn is_ready(&self) -> bool;
}

/// Indexing disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneBackend;

impl SearchBackend for NoneBackend {
    fn name(&self) -> &str {
        "none"
    }

    fn index(&self, _documents: &[Document]) -> Result<()> {
        Ok(())
    }

    fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchResult>> {
        Ok(Vec::new())
    }

    fn is_ready(&self) -> bool {
        false
    }
}

pub fn open_backend(kind: SearchBackendKind, paths: &Paths) -> Result<Box<dyn SearchBackend>> {
    match kind {
        SearchBackendKind::Bm25 => Ok(Box::new(Bm25Backend::new(paths.bm25_db_path())?)),
        SearchBackendKind::None => Ok(Box::new(NoneBackend)),
    }
}

/// Re-derive every document from the memory files and rebuild the index.
/// Returns the number of documents indexed.
pub fn reindex(paths: &Paths, backend: &dyn SearchBackend) -> Result<usize> {
    let observations = read_or_empty(&paths.observations_path())
        .with_context(|| format!("reading {}", paths.observations_path().display()))?;
    let reflections = read_or_empty(&paths.reflections_path())
        .with_context(|| format!("reading {}", paths.reflections_path().display()))?;

    let mut documents = parse_observations(&observations);
    documents.extend(parse_reflections(&reflections));

    backend.index(&documents)?;
    tracing::debug!(backend = backend.name(), documents = documents.len(), "search index rebuilt");
    Ok(documents.len())
}
