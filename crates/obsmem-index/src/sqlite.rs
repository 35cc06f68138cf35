//! BM25 backend with documents persisted in SQLite

use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

use crate::backend::SearchBackend;
use crate::bm25::{tokenize, BM25};
use crate::document::{Document, SearchResult};

pub struct Bm25Backend {
    db_path: PathBuf,
}

impl Bm25Backend {
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let backend = Self { db_path };
        backend.init_db()?;
        Ok(backend)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                position INTEGER PRIMARY KEY,
                doc_id TEXT NOT NULL,
                source TEXT NOT NULL,
                heading TEXT NOT NULL,
                content TEXT NOT NULL,
                date TEXT,
                indexed_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    pub fn document_count(&self) -> Result<usize> {
        let conn = Connection::open(&self.db_path)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn load_documents(&self) -> Result<Vec<Document>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT doc_id, source, heading, content, date FROM documents ORDER BY position",
        )?;
        let rows = stmt.query_map([], |row| {
            let source: String = row.get(1)?;
            let source = source.parse().map_err(|e: String| {
                rusqlite::Error::FromSqlConversionFailure(
                    1,
                    rusqlite::types::Type::Text,
                    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
                )
            })?;
            Ok(Document {
                doc_id: row.get(0)?,
                source,
                heading: row.get(2)?,
                content: row.get(3)?,
                date: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

impl SearchBackend for Bm25Backend {
    fn name(&self) -> &str {
        "bm25"
    }

    fn index(&self, documents: &[Document]) -> Result<()> {
        let mut conn = Connection::open(&self.db_path)?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM documents", [])?;

        let indexed_at = Utc::now().to_rfc3339();
        for (position, doc) in documents.iter().enumerate() {
            tx.execute(
                "INSERT INTO documents (position, doc_id, source, heading, content, date, indexed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    position as i64,
                    &doc.doc_id,
                    doc.source.as_str(),
                    &doc.heading,
                    &doc.content,
                    &doc.date,
                    &indexed_at
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let documents = self.load_documents()?;
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let mut bm25 = BM25::new();
        bm25.index(
            documents
                .iter()
                .enumerate()
                .map(|(i, doc)| (i.to_string(), tokenize(&doc.content)))
                .collect(),
        );

        let results = bm25
            .search(&query_tokens, documents.len())
            .into_iter()
            .filter(|(_, score)| *score > 0.0)
            .take(limit)
            .enumerate()
            .filter_map(|(rank, (idx, score))| {
                let document = documents.get(idx.parse::<usize>().ok()?)?.clone();
                Some(SearchResult {
                    document,
                    score,
                    rank: rank + 1,
                })
            })
            .collect();
        Ok(results)
    }

    fn is_ready(&self) -> bool {
        self.document_count().map(|n| n > 0).unwrap_or(false)
    }
}
