//! Retention trimming of the observations document

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use obsmem_core::SplitDocument;
use obsmem_store::atomic_write;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimReport {
    pub kept: usize,
    pub removed: usize,
    /// Oldest date still kept
    pub cutoff: String,
}

/// Header plus sections dated on or after `today - retention_days`,
/// right-trimmed with a single trailing newline.
pub fn retain_recent(text: &str, retention_days: u32, today: NaiveDate) -> (String, TrimReport) {
    let cutoff = (today - Duration::days(i64::from(retention_days)))
        .format("%Y-%m-%d")
        .to_string();
    let doc = SplitDocument::parse(text);
    let kept = doc.since(Some(&cutoff));

    let report = TrimReport {
        kept: kept.sections.len(),
        removed: doc.sections.len() - kept.sections.len(),
        cutoff,
    };
    let mut out = kept.render().trim_end().to_string();
    out.push('\n');
    (out, report)
}

/// Drop observation sections older than the retention window.
/// A missing file is left alone and yields `None`.
pub fn trim_observations(
    path: &Path,
    retention_days: u32,
    today: NaiveDate,
) -> Result<Option<TrimReport>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };

    let (trimmed, report) = retain_recent(&text, retention_days, today);
    atomic_write(path, trimmed.as_bytes())
        .with_context(|| format!("writing {}", path.display()))?;

    if report.removed > 0 {
        tracing::info!(
            removed = report.removed,
            kept = report.kept,
            cutoff = %report.cutoff,
            "trimmed old observations"
        );
    }
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
    }

    #[test]
    fn test_retention_boundary_is_inclusive() {
        let text = "# Observations\n\n## 2026-02-02\n- old\n\n## 2026-02-03\n- edge\n\n## 2026-02-10\n- new\n";
        let (out, report) = retain_recent(text, 7, today());

        assert_eq!(out, "# Observations\n\n## 2026-02-03\n- edge\n\n## 2026-02-10\n- new\n");
        assert_eq!(report.kept, 2);
        assert_eq!(report.removed, 1);
        assert_eq!(report.cutoff, "2026-02-03");
    }

    #[test]
    fn test_header_survives_when_everything_expires() {
        let (out, report) = retain_recent("# Observations\n\n## 2025-01-01\n- ancient\n", 7, today());
        assert_eq!(out, "# Observations\n");
        assert_eq!(report.kept, 0);
    }

    #[test]
    fn test_zero_sections_is_safe() {
        let (out, report) = retain_recent("# Observations\n\n\n", 7, today());
        assert_eq!(out, "# Observations\n");
        assert_eq!(report.removed, 0);
    }

    #[test]
    fn test_trim_missing_file_is_noop() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("observations.md");
        assert!(trim_observations(&path, 7, today()).unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_trim_rewrites_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("observations.md");
        std::fs::write(&path, "# Observations\n\n## 2026-01-01\n- gone\n\n## 2026-02-09\n- stays\n").unwrap();

        let report = trim_observations(&path, 7, today()).unwrap().unwrap();
        assert_eq!(report.removed, 1);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# Observations\n\n## 2026-02-09\n- stays\n"
        );
    }
}
