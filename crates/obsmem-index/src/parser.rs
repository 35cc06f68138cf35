//! Split memory files into searchable documents

use obsmem_core::SplitDocument;
use regex::Regex;
use std::sync::OnceLock;

use crate::document::{Document, DocumentSource};

static SECTION_RE: OnceLock<Regex> = OnceLock::new();
static SLUG_RE: OnceLock<Regex> = OnceLock::new();

/// One document per date section; the header is not indexed
pub fn parse_observations(text: &str) -> Vec<Document> {
    SplitDocument::parse(text)
        .sections
        .iter()
        .map(|section| Document {
            doc_id: format!("obs:{}", section.date),
            source: DocumentSource::Observations,
            heading: format!("## {}", section.date),
            content: section.text.trim().to_string(),
            date: Some(section.date.to_string()),
        })
        .collect()
}

/// One document per `## ` section; the title and metadata lines are not indexed
pub fn parse_reflections(text: &str) -> Vec<Document> {
    let section_re = SECTION_RE.get_or_init(|| Regex::new(r"(?m)^## ").expect("valid regex"));
    let starts: Vec<usize> = section_re.find_iter(text).map(|m| m.start()).collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            let section = text[start..end].trim();
            let heading = section.lines().next()?.trim_start_matches("## ").trim();
            if heading.is_empty() {
                return None;
            }
            Some(Document {
                doc_id: format!("ref:{}", slugify(heading)),
                source: DocumentSource::Reflections,
                heading: format!("## {}", heading),
                content: section.to_string(),
                date: None,
            })
        })
        .collect()
}

fn slugify(heading: &str) -> String {
    let slug_re = SLUG_RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));
    slug_re
        .replace_all(&heading.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_observations() {
        let text = "# Observations\n\n## 2026-02-09\n\n- 🔴 a\n\n## 2026-02-10\n- 🟡 b\n";
        let docs = parse_observations(text);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].doc_id, "obs:2026-02-09");
        assert_eq!(docs[0].content, "## 2026-02-09\n\n- 🔴 a");
        assert_eq!(docs[1].date.as_deref(), Some("2026-02-10"));
    }

    #[test]
    fn test_parse_reflections() {
        let text = "# Reflections\n*Last updated: 2026-02-10 14:32 UTC*\n\n## Core Identity\n- Alex\n\n### Details\n- backend\n\n## Active Projects & Goals\n- Atlas\n";
        let docs = parse_reflections(text);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].doc_id, "ref:core-identity");
        assert!(docs[0].content.contains("### Details"));
        assert_eq!(docs[1].doc_id, "ref:active-projects-goals");
        assert_eq!(docs[1].heading, "## Active Projects & Goals");
        assert_eq!(docs[1].source, DocumentSource::Reflections);
    }

    #[test]
    fn test_parse_empty_documents() {
        assert!(parse_observations("").is_empty());
        assert!(parse_reflections("# Reflections\n").is_empty());
    }
}
