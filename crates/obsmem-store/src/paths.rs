//! Path resolution for memory files

use std::path::{Path, PathBuf};

/// Environment variable overriding the memory directory
pub const MEMORY_DIR_ENV: &str = "OBSMEM_MEMORY_DIR";

const MEMORY_DIR_NAME: &str = "observational-memory";

/// Resolves standard paths for memory files
#[derive(Debug, Clone)]
pub struct Paths {
    pub memory_dir: PathBuf,
}

impl Paths {
    /// Resolve the memory directory from `OBSMEM_MEMORY_DIR`, falling back to
    /// the platform data dir (`$XDG_DATA_HOME` on Linux)
    pub fn new() -> std::io::Result<Self> {
        if let Some(dir) = std::env::var_os(MEMORY_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_memory_dir(dir));
        }

        let data_dir = dirs::data_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "data directory not found")
        })?;

        Ok(Self::with_memory_dir(data_dir.join(MEMORY_DIR_NAME)))
    }

    /// Use an explicit memory directory
    pub fn with_memory_dir(memory_dir: impl Into<PathBuf>) -> Self {
        Self {
            memory_dir: memory_dir.into(),
        }
    }

    pub fn observations_path(&self) -> PathBuf {
        self.memory_dir.join("observations.md")
    }

    pub fn reflections_path(&self) -> PathBuf {
        self.memory_dir.join("reflections.md")
    }

    /// Per-transcript resume markers
    pub fn cursor_path(&self) -> PathBuf {
        self.memory_dir.join(".cursor.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.memory_dir.join("config.json")
    }

    pub fn search_index_dir(&self) -> PathBuf {
        self.memory_dir.join(".search-index")
    }

    /// SQLite file backing the BM25 search backend
    pub fn bm25_db_path(&self) -> PathBuf {
        self.search_index_dir().join("bm25.db")
    }

    pub fn ensure_memory_dir(&self) -> std::io::Result<&Path> {
        std::fs::create_dir_all(&self.memory_dir)?;
        Ok(&self.memory_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_memory_files_live_under_memory_dir() {
        let paths = Paths::with_memory_dir("/tmp/om");
        assert_eq!(paths.observations_path(), PathBuf::from("/tmp/om/observations.md"));
        assert_eq!(paths.reflections_path(), PathBuf::from("/tmp/om/reflections.md"));
        assert_eq!(paths.cursor_path(), PathBuf::from("/tmp/om/.cursor.json"));
        assert!(paths.bm25_db_path().ends_with(".search-index/bm25.db"));
    }

    #[test]
    #[serial]
    fn test_env_override() {
        std::env::set_var(MEMORY_DIR_ENV, "/tmp/override-memory");
        let paths = Paths::new().unwrap();
        std::env::remove_var(MEMORY_DIR_ENV);
        assert_eq!(paths.memory_dir, PathBuf::from("/tmp/override-memory"));
    }

    #[test]
    #[serial]
    fn test_default_dir_name() {
        std::env::remove_var(MEMORY_DIR_ENV);
        if let Ok(paths) = Paths::new() {
            assert!(paths.memory_dir.ends_with(MEMORY_DIR_NAME));
        }
    }

    #[test]
    fn test_ensure_memory_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = Paths::with_memory_dir(temp.path().join("nested").join("memory"));
        paths.ensure_memory_dir().unwrap();
        assert!(paths.memory_dir.is_dir());
    }
}
