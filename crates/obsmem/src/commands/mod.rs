pub mod backfill;
pub mod context;
pub mod observe;
pub mod reflect;
pub mod reindex;
pub mod search;
pub mod status;
pub mod version;

use anyhow::Result;
use obsmem_core::{Config, DefaultPrompts, DirPrompts, PromptProvider};
use obsmem_index::{open_backend, NoneBackend, SearchBackend};
use obsmem_store::Paths;

/// Resolved memory location plus its config
pub struct Workspace {
    pub paths: Paths,
    pub config: Config,
}

impl Workspace {
    pub fn load() -> Result<Self> {
        let paths = Paths::new()?;
        let config = Config::load(&paths.config_path());
        Ok(Self { paths, config })
    }

    pub fn prompts(&self) -> Result<Box<dyn PromptProvider>> {
        match &self.config.prompts_dir {
            Some(dir) => Ok(Box::new(DirPrompts::load(dir)?)),
            None => Ok(Box::new(DefaultPrompts)),
        }
    }

    /// Configured backend; falls back to no indexing if it cannot be opened
    pub fn search(&self) -> Box<dyn SearchBackend> {
        match open_backend(self.config.search_backend, &self.paths) {
            Ok(backend) => backend,
            Err(e) => {
                tracing::warn!(error = %e, "search backend unavailable, indexing disabled");
                Box::new(NoneBackend)
            }
        }
    }
}
