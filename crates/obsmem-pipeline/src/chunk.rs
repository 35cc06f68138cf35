//! Grouping date sections into budget-sized chunks for the reflector

use obsmem_core::SplitDocument;
use obsmem_store::char_len;

/// Header plus one or more whole date sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// Dates of the sections in this chunk, in document order
    pub dates: Vec<String>,
}

struct Builder<'a> {
    header: &'a str,
    text: String,
    chars: usize,
    dates: Vec<String>,
}

impl<'a> Builder<'a> {
    fn new(header: &'a str) -> Self {
        Self {
            header,
            text: header.to_string(),
            chars: char_len(header),
            dates: Vec::new(),
        }
    }

    /// Hand out the filled chunk and start over from the header
    fn take(&mut self) -> Chunk {
        let full = std::mem::replace(self, Builder::new(self.header));
        Chunk {
            text: full.text,
            dates: full.dates,
        }
    }
}

/// Pack consecutive sections into chunks of at most `budget_chars`
/// characters, header included.
///
/// Sections are never split. A section that would push a non-empty chunk over
/// the budget starts the next chunk; a section larger than the budget on its
/// own becomes a chunk by itself.
pub fn chunk_sections(doc: &SplitDocument<'_>, budget_chars: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = Builder::new(doc.header);

    for section in &doc.sections {
        let section_chars = char_len(section.text);
        if !current.dates.is_empty() && current.chars + section_chars > budget_chars {
            chunks.push(current.take());
        }
        current.text.push_str(section.text);
        current.chars += section_chars;
        current.dates.push(section.date.to_string());
    }

    if !current.dates.is_empty() {
        chunks.push(current.take());
    }
    chunks
}
