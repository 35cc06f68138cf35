//! Observe transcripts into dated notes, reflect notes into long-term memory

mod backfill;
mod chunk;
mod context;
mod observer;
mod reflector;
mod transcript;
mod trim;

pub use backfill::{
    discover_transcripts, Backfill, BackfillOptions, BackfillSummary, TranscriptFailure,
    DEFAULT_REFLECT_EVERY,
};
pub use chunk::{chunk_sections, Chunk};
pub use context::{build_context, CONTEXT_QUERY};
pub use observer::{BackfillReport, ObserveMode, ObserveOutcome, Observer, WriteMode};
pub use reflector::{NothingToDo, ReflectOutcome, ReflectReport, Reflector};
pub use transcript::{load_messages, position_after, render_transcript, resume_offset};
pub use trim::{retain_recent, trim_observations, TrimReport};

use obsmem_compress::Compressor;
use obsmem_core::{Config, PromptProvider, SearchBackendKind};
use obsmem_index::SearchBackend;
use obsmem_store::Paths;

/// Everything one observe or reflect run needs
#[derive(Clone, Copy)]
pub struct MemoryContext<'a> {
    pub config: &'a Config,
    pub paths: &'a Paths,
    pub compressor: &'a dyn Compressor,
    pub prompts: &'a dyn PromptProvider,
    pub search: &'a dyn SearchBackend,
}

impl MemoryContext<'_> {
    /// Rebuild the search index. Failures are logged and dropped; the memory
    /// files are the source of truth and are already written at this point.
    pub(crate) fn reindex_best_effort(&self) {
        if self.config.search_backend == SearchBackendKind::None {
            return;
        }
        match obsmem_index::reindex(self.paths, self.search) {
            Ok(count) => tracing::debug!(documents = count, "reindexed memory"),
            Err(e) => tracing::warn!(error = %e, "search reindex failed"),
        }
    }
}
