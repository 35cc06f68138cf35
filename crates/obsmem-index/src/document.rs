use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which memory file a document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSource {
    Observations,
    Reflections,
}

impl DocumentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Observations => "observations",
            Self::Reflections => "reflections",
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "observations" => Ok(Self::Observations),
            "reflections" => Ok(Self::Reflections),
            other => Err(format!("unknown document source: {}", other)),
        }
    }
}

/// A searchable unit of memory: one date section or one reflections section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// `obs:2026-02-10` or `ref:active-projects`
    pub doc_id: String,
    pub source: DocumentSource,
    /// `## 2026-02-10` or `## Active Projects`
    pub heading: String,
    /// Full section text, heading included
    pub content: String,
    /// Set for observation sections
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub document: Document,
    pub score: f64,
    /// 1-based
    pub rank: usize,
}
