//! Hand-rolled Okapi BM25

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

const K1: f64 = 1.5;
const B: f64 = 0.75;

static TOKENIZE_RE: OnceLock<Regex> = OnceLock::new();

const STOPWORDS: &[&str] = &[
    "the", "an", "is", "are", "was", "were", "in", "on", "at", "to", "for", "of", "and", "or",
    "but", "not", "with", "by", "from",
];

/// Lowercase word tokens with stop-words removed. Markdown punctuation and
/// priority emoji never form tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let re = TOKENIZE_RE.get_or_init(|| Regex::new(r"[a-z0-9][a-z0-9_]+").expect("valid regex"));
    re.find_iter(&text.to_lowercase())
        .map(|m| m.as_str())
        .filter(|token| !STOPWORDS.contains(token))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct BM25 {
    doc_count: usize,
    avg_doc_len: f64,
    doc_lens: Vec<usize>,
    doc_ids: Vec<String>,
    term_freqs: Vec<HashMap<String, usize>>,
    idf: HashMap<String, f64>,
}

impl BM25 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the corpus
    pub fn index(&mut self, documents: Vec<(String, Vec<String>)>) {
        *self = Self::new();
        self.doc_count = documents.len();
        if self.doc_count == 0 {
            return;
        }

        let mut total_len = 0;
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for (doc_id, tokens) in documents {
            total_len += tokens.len();
            self.doc_lens.push(tokens.len());
            self.doc_ids.push(doc_id);

            let unique: HashSet<&String> = tokens.iter().collect();
            for token in unique {
                *doc_freq.entry(token.clone()).or_insert(0) += 1;
            }

            let mut tf: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *tf.entry(token).or_insert(0) += 1;
            }
            self.term_freqs.push(tf);
        }

        self.avg_doc_len = total_len as f64 / self.doc_count as f64;

        for (term, df) in doc_freq {
            let idf = ((self.doc_count as f64 - df as f64 + 0.5) / (df as f64 + 0.5) + 1.0).ln();
            self.idf.insert(term, idf);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.doc_count == 0
    }

    /// Top `k` documents by score, best first. Zero scores are included.
    pub fn search(&self, query_tokens: &[String], k: usize) -> Vec<(String, f64)> {
        if self.doc_count == 0 {
            return Vec::new();
        }

        let mut scores: Vec<(String, f64)> = self
            .doc_ids
            .iter()
            .enumerate()
            .map(|(idx, doc_id)| (doc_id.clone(), self.compute_score(idx, query_tokens)))
            .collect();

        // stable sort keeps corpus order among ties
        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scores.truncate(k);
        scores
    }

    fn compute_score(&self, doc_idx: usize, query_tokens: &[String]) -> f64 {
        let doc_len = self.doc_lens[doc_idx] as f64;
        let avg = if self.avg_doc_len > 0.0 { self.avg_doc_len } else { 1.0 };
        let tfs = &self.term_freqs[doc_idx];
        let mut score = 0.0;

        for term in query_tokens {
            let (Some(&idf), Some(&tf)) = (self.idf.get(term), tfs.get(term)) else {
                continue;
            };
            let tf = tf as f64;
            let norm = tf + K1 * (1.0 - B + B * doc_len / avg);
            score += idf * tf * (K1 + 1.0) / norm;
        }

        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_tokenize_strips_markdown_and_stopwords() {
        let tokens = tokenize("## 2026-02-10\n- 🔴 14:00 Prefers **Postgres** over the SQLite db");
        assert_eq!(
            tokens,
            toks(&["2026", "02", "10", "14", "00", "prefers", "postgres", "over", "sqlite", "db"])
        );
    }

    #[test]
    fn test_bm25_empty() {
        let bm25 = BM25::new();
        assert!(bm25.search(&toks(&["test"]), 10).is_empty());
    }

    #[test]
    fn test_bm25_ranks_relevant_higher() {
        let mut bm25 = BM25::new();
        bm25.index(vec![
            ("doc1".to_string(), toks(&["rust", "programming"])),
            ("doc2".to_string(), toks(&["python", "programming"])),
            ("doc3".to_string(), toks(&["rust", "systems"])),
        ]);

        let results = bm25.search(&toks(&["rust"]), 3);
        assert_eq!(results.len(), 3);
        let top: Vec<_> = results[..2].iter().map(|(id, _)| id.as_str()).collect();
        assert!(top.contains(&"doc1") && top.contains(&"doc3"));
        assert_eq!(results[2].1, 0.0);
    }

    #[test]
    fn test_bm25_term_frequency_matters() {
        let mut bm25 = BM25::new();
        bm25.index(vec![
            ("once".to_string(), toks(&["atlas", "deploy", "notes", "misc"])),
            ("thrice".to_string(), toks(&["atlas", "atlas", "atlas", "misc"])),
            ("none".to_string(), toks(&["other", "words", "here", "misc"])),
        ]);

        let results = bm25.search(&toks(&["atlas"]), 2);
        assert_eq!(results[0].0, "thrice");
        assert_eq!(results[1].0, "once");
    }

    #[test]
    fn test_reindex_replaces_corpus() {
        let mut bm25 = BM25::new();
        bm25.index(vec![("old".to_string(), toks(&["alpha"]))]);
        bm25.index(vec![("new".to_string(), toks(&["beta"]))]);

        let results = bm25.search(&toks(&["alpha", "beta"]), 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "new");
    }
}
