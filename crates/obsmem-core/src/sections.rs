//! Date-section splitting for observation documents
//!
//! An observations document is a header followed by sections that each start
//! with a `## YYYY-MM-DD` line. Sections are delimited only by those header
//! lines; everything before the first one is the document header.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

static DATE_HEADER_RE: OnceLock<Regex> = OnceLock::new();

fn date_header_re() -> &'static Regex {
    DATE_HEADER_RE.get_or_init(|| {
        Regex::new(r"(?m)^## ([0-9]{4}-[0-9]{2}-[0-9]{2})").expect("valid date header regex")
    })
}

/// One `## YYYY-MM-DD` section, header line included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSection<'a> {
    /// `YYYY-MM-DD` as written; compares chronologically as a string
    pub date: &'a str,
    pub text: &'a str,
}

impl DateSection<'_> {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date, "%Y-%m-%d").ok()
    }
}

/// A document split at date headers, borrowing from the original text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDocument<'a> {
    pub header: &'a str,
    pub sections: Vec<DateSection<'a>>,
}

impl<'a> SplitDocument<'a> {
    pub fn parse(text: &'a str) -> Self {
        let starts: Vec<(usize, &'a str)> = date_header_re()
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let date = caps.get(1)?;
                Some((whole.start(), date.as_str()))
            })
            .collect();

        let header_end = starts.first().map(|(start, _)| *start).unwrap_or(text.len());
        let sections = starts
            .iter()
            .enumerate()
            .map(|(i, (start, date))| {
                let end = starts.get(i + 1).map(|(next, _)| *next).unwrap_or(text.len());
                DateSection {
                    date: *date,
                    text: &text[*start..end],
                }
            })
            .collect();

        Self {
            header: &text[..header_end],
            sections,
        }
    }

    pub fn has_sections(&self) -> bool {
        !self.sections.is_empty()
    }

    /// Latest section date, regardless of on-disk order
    pub fn max_date(&self) -> Option<&'a str> {
        self.sections.iter().map(|s| s.date).max()
    }

    /// Keep the header and every section dated on or after `date`.
    /// `None` keeps everything.
    pub fn since(&self, date: Option<&str>) -> SplitDocument<'a> {
        let sections = match date {
            Some(cutoff) => self
                .sections
                .iter()
                .filter(|s| s.date >= cutoff)
                .copied()
                .collect(),
            None => self.sections.clone(),
        };
        SplitDocument {
            header: self.header,
            sections,
        }
    }

    /// Header followed by the sections, in order
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(
            self.header.len() + self.sections.iter().map(|s| s.text.len()).sum::<usize>(),
        );
        out.push_str(self.header);
        for section in &self.sections {
            out.push_str(section.text);
        }
        out
    }
}

/// Latest `## YYYY-MM-DD` date anywhere in `text`
pub fn max_date(text: &str) -> Option<String> {
    SplitDocument::parse(text).max_date().map(str::to_string)
}
