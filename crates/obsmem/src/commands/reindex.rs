use anyhow::Result;
use obsmem_core::SearchBackendKind;

use super::Workspace;

pub fn run() -> Result<()> {
    let ws = Workspace::load()?;
    if ws.config.search_backend == SearchBackendKind::None {
        println!("Search is disabled (search_backend = none).");
        return Ok(());
    }

    let backend = ws.search();
    let count = obsmem_index::reindex(&ws.paths, backend.as_ref())?;
    println!("Indexed {} document(s) with {}", count, backend.name());
    Ok(())
}
