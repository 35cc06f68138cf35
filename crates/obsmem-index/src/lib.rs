//! Keyword search over the observations and reflections documents

mod backend;
mod bm25;
mod document;
mod parser;
mod sqlite;

pub use backend::{open_backend, reindex, NoneBackend, SearchBackend};
pub use bm25::{tokenize, BM25};
pub use document::{Document, DocumentSource, SearchResult};
pub use parser::{parse_observations, parse_reflections};
pub use sqlite::Bm25Backend;
