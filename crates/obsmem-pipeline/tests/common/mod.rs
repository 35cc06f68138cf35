#![allow(dead_code)]

use anyhow::{bail, Result};
use obsmem_compress::Compressor;
use obsmem_core::{Config, DefaultPrompts, Message, Role};
use obsmem_index::{Bm25Backend, Document, SearchBackend, SearchResult};
use obsmem_pipeline::MemoryContext;
use obsmem_store::Paths;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated memory directory with a real BM25 index
pub struct Harness {
    temp: TempDir,
    pub paths: Paths,
    pub config: Config,
    pub search: Box<dyn SearchBackend>,
}

impl Harness {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let paths = Paths::with_memory_dir(temp.path().join("memory"));
        let search = Box::new(Bm25Backend::new(paths.bm25_db_path()).unwrap());
        Self {
            temp,
            paths,
            config: Config::new(),
            search,
        }
    }

    pub fn with_search(mut self, search: Box<dyn SearchBackend>) -> Self {
        self.search = search;
        self
    }

    pub fn ctx<'a>(&'a self, compressor: &'a dyn Compressor) -> MemoryContext<'a> {
        MemoryContext {
            config: &self.config,
            paths: &self.paths,
            compressor,
            prompts: &DefaultPrompts,
            search: self.search.as_ref(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn write_observations(&self, text: &str) {
        std::fs::create_dir_all(&self.paths.memory_dir).unwrap();
        std::fs::write(self.paths.observations_path(), text).unwrap();
    }

    pub fn write_reflections(&self, text: &str) {
        std::fs::create_dir_all(&self.paths.memory_dir).unwrap();
        std::fs::write(self.paths.reflections_path(), text).unwrap();
    }

    pub fn observations(&self) -> Option<String> {
        std::fs::read_to_string(self.paths.observations_path()).ok()
    }

    pub fn reflections(&self) -> Option<String> {
        std::fs::read_to_string(self.paths.reflections_path()).ok()
    }

    /// Write a JSONL transcript under the temp root
    pub fn write_transcript(&self, name: &str, messages: &[Message]) -> PathBuf {
        let path = self.temp.path().join(name);
        let body: String = messages
            .iter()
            .map(|m| format!("{}\n", serde_json::to_string(m).unwrap()))
            .collect();
        std::fs::write(&path, body).unwrap();
        path
    }
}

/// Alternating user/assistant turns, optionally with stable ids
pub fn conversation(start: usize, count: usize, with_ids: bool) -> Vec<Message> {
    (start..start + count)
        .map(|i| {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            let msg = Message::new(role, format!("message number {}", i))
                .with_timestamp(format!("2026-02-10T14:{:02}:00Z", i % 60))
                .with_source("claude");
            if with_ids {
                msg.with_id(format!("m{}", i))
            } else {
                msg
            }
        })
        .collect()
}

/// Index that always fails
pub struct FailingBackend;

impl SearchBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    fn index(&self, _documents: &[Document]) -> Result<()> {
        bail!("index unavailable")
    }

    fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchResult>> {
        bail!("index unavailable")
    }

    fn is_ready(&self) -> bool {
        false
    }
}
