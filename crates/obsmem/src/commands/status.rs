use anyhow::Result;
use obsmem_compress::detect_provider;
use obsmem_core::{stamp, Config, SplitDocument};
use obsmem_store::{read_or_empty, CursorStore, Paths};

use super::Workspace;

pub fn run() -> Result<()> {
    let ws = Workspace::load()?;
    let output = collect(&ws.paths, &ws.config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn collect(paths: &Paths, config: &Config) -> Result<serde_json::Value> {
    let observations_path = paths.observations_path();
    let observations = if observations_path.exists() {
        let text = read_or_empty(&observations_path)?;
        let doc = SplitDocument::parse(&text);
        serde_json::json!({
            "path": observations_path.display().to_string(),
            "bytes": text.len(),
            "sections": doc.sections.len(),
            "latest": doc.max_date(),
        })
    } else {
        serde_json::Value::Null
    };

    let reflections_path = paths.reflections_path();
    let reflections = if reflections_path.exists() {
        let text = read_or_empty(&reflections_path)?;
        serde_json::json!({
            "path": reflections_path.display().to_string(),
            "bytes": text.len(),
            "lines": text.lines().count(),
            "last_reflected": stamp::parse_last_reflected(&text),
        })
    } else {
        serde_json::Value::Null
    };

    let cursor = CursorStore::new(paths.cursor_path()).load()?;
    let provider = detect_provider(config).ok();

    Ok(serde_json::json!({
        "memory_dir": paths.memory_dir.display().to_string(),
        "exists": paths.memory_dir.exists(),
        "observations": observations,
        "reflections": reflections,
        "transcripts_tracked": cursor.len(),
        "llm_provider": provider,
        "search_backend": config.search_backend,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use obsmem_core::LlmProvider;

    #[test]
    fn test_status_empty_memory() {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = Paths::with_memory_dir(temp.path().join("memory"));
        let mut config = Config::new();
        config.llm_provider = Some(LlmProvider::Anthropic);

        let status = collect(&paths, &config).unwrap();
        assert_eq!(status["exists"], false);
        assert!(status["observations"].is_null());
        assert!(status["reflections"].is_null());
        assert_eq!(status["transcripts_tracked"], 0);
        assert_eq!(status["llm_provider"], "anthropic");
        assert_eq!(status["search_backend"], "bm25");
    }

    #[test]
    fn test_status_reports_files() {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = Paths::with_memory_dir(temp.path());
        std::fs::write(
            paths.observations_path(),
            "# Observations\n\n## 2026-02-10\n- a\n\n## 2026-02-07\n- b\n",
        )
        .unwrap();
        std::fs::write(
            paths.reflections_path(),
            "# Reflections\n*Last updated: 2026-02-10 14:32 UTC*\n*Last reflected: 2026-02-09*\n",
        )
        .unwrap();
        std::fs::write(paths.cursor_path(), r#"{"/tmp/a.jsonl": 12, "/tmp/b.jsonl": "m4"}"#).unwrap();

        let mut config = Config::new();
        config.llm_provider = Some(LlmProvider::OpenAi);
        let status = collect(&paths, &config).unwrap();
        assert_eq!(status["observations"]["sections"], 2);
        assert_eq!(status["observations"]["latest"], "2026-02-10");
        assert_eq!(status["reflections"]["last_reflected"], "2026-02-09");
        assert_eq!(status["transcripts_tracked"], 2);
        assert_eq!(status["llm_provider"], "openai");
    }
}
