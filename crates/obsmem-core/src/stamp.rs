//! Metadata lines of the reflections document
//!
//! The reflections document carries two bookkeeping lines under its title:
//!
//! ```text
//! *Last updated: 2026-02-10 14:32 UTC*
//! *Last reflected: 2026-02-10*
//! ```
//!
//! "Last reflected" is the high-water mark of observation dates already
//! folded in. Both lines are rewritten by the pipeline after every pass; the
//! oracle's own rendition of them is never trusted.
//!
//! Metadata lives in the preamble, before the first `## ` section heading.
//! Section bodies are never searched for it.

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::sync::OnceLock;

static UPDATED_LINE_RE: OnceLock<Regex> = OnceLock::new();
static REFLECTED_LINE_RE: OnceLock<Regex> = OnceLock::new();
static REFLECTED_DATE_RE: OnceLock<Regex> = OnceLock::new();
static SECTION_HEADING_RE: OnceLock<Regex> = OnceLock::new();

fn updated_line_re() -> &'static Regex {
    UPDATED_LINE_RE
        .get_or_init(|| Regex::new(r"^\s*[*_]{0,2}Last updated:").expect("valid regex"))
}

fn reflected_line_re() -> &'static Regex {
    REFLECTED_LINE_RE
        .get_or_init(|| Regex::new(r"^\s*[*_]{0,2}Last reflected:").expect("valid regex"))
}

fn reflected_date_re() -> &'static Regex {
    REFLECTED_DATE_RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*[*_]{0,2}Last reflected:[*_]{0,2}\s*([0-9]{4}-[0-9]{2}-[0-9]{2})")
            .expect("valid regex")
    })
}

fn section_heading_re() -> &'static Regex {
    SECTION_HEADING_RE.get_or_init(|| Regex::new(r"(?m)^## ").expect("valid regex"))
}

/// Text before the first `## ` section heading
fn preamble(text: &str) -> &str {
    match section_heading_re().find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}

pub fn updated_line(now: DateTime<Utc>) -> String {
    format!("*Last updated: {}*", now.format("%Y-%m-%d %H:%M UTC"))
}

pub fn reflected_line(date: &str) -> String {
    format!("*Last reflected: {}*", date)
}

/// Date on the first "Last reflected" line of the preamble, if it holds a
/// real calendar date
pub fn parse_last_reflected(text: &str) -> Option<String> {
    let caps = reflected_date_re().captures(preamble(text))?;
    let date = caps.get(1)?.as_str();
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some(date.to_string())
}

fn split_eol(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

fn ensure_eol(line: &mut String) {
    if !line.ends_with('\n') {
        line.push('\n');
    }
}

fn replace_keeping_eol(line: &str, replacement: &str) -> String {
    let (_, eol) = split_eol(line);
    format!("{}{}", replacement, eol)
}

/// Insert `new_lines` after index `after`, or at the top when `None`
fn insert_lines(lines: &mut Vec<String>, after: Option<usize>, new_lines: Vec<String>) {
    let at = match after {
        Some(i) => {
            ensure_eol(&mut lines[i]);
            i + 1
        }
        None => 0,
    };
    for (offset, line) in new_lines.into_iter().enumerate() {
        lines.insert(at + offset, format!("{}\n", line));
    }
}

/// Rewrite the metadata lines of a reflections document.
///
/// Only the two metadata lines are replaced or inserted; every other line is
/// returned byte-for-byte. With `last_reflected` of `None` an existing
/// "Last reflected" line is left as is and none is inserted.
pub fn stamp(text: &str, now: DateTime<Utc>, last_reflected: Option<&str>) -> String {
    let mut lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
    let preamble_len = lines
        .iter()
        .position(|l| l.starts_with("## "))
        .unwrap_or(lines.len());

    let head = &lines[..preamble_len];
    let updated_idx = head.iter().position(|l| updated_line_re().is_match(l));
    let reflected_idx = head.iter().position(|l| reflected_line_re().is_match(l));
    let updated = updated_line(now);
    let reflected = last_reflected.map(reflected_line);

    match (updated_idx, reflected_idx) {
        (Some(u), Some(r)) => {
            lines[u] = replace_keeping_eol(&lines[u], &updated);
            if let Some(reflected) = &reflected {
                lines[r] = replace_keeping_eol(&lines[r], reflected);
            }
        }
        (Some(u), None) => {
            lines[u] = replace_keeping_eol(&lines[u], &updated);
            if let Some(reflected) = reflected {
                insert_lines(&mut lines, Some(u), vec![reflected]);
            }
        }
        (None, Some(r)) => {
            if let Some(reflected) = &reflected {
                lines[r] = replace_keeping_eol(&lines[r], reflected);
            }
            lines.insert(r, format!("{}\n", updated));
        }
        (None, None) => {
            // a document opening straight into a section gets the lines on top
            let heading = lines[..preamble_len]
                .iter()
                .position(|l| l.trim_start().starts_with('#'));
            let mut new_lines = vec![updated];
            new_lines.extend(reflected);
            insert_lines(&mut lines, heading, new_lines);
        }
    }

    lines.concat()
}
