use anyhow::Result;
use obsmem_compress::ApiCompressor;
use obsmem_pipeline::{MemoryContext, NothingToDo, ReflectOutcome, Reflector};

use super::Workspace;

pub fn run(dry_run: bool) -> Result<()> {
    let ws = Workspace::load()?;
    let prompts = ws.prompts()?;
    let compressor = ApiCompressor::from_config(&ws.config)?;
    let search = ws.search();
    let reflector = Reflector::new(MemoryContext {
        config: &ws.config,
        paths: &ws.paths,
        compressor: &compressor,
        prompts: prompts.as_ref(),
        search: search.as_ref(),
    });

    match reflector.run(dry_run)? {
        ReflectOutcome::NothingToDo(NothingToDo::NoObservations) => {
            println!("No observations to reflect on.");
        }
        ReflectOutcome::NothingToDo(NothingToDo::AlreadyReflected { last_reflected }) => {
            println!(
                "Nothing new since last reflection ({}).",
                last_reflected.as_deref().unwrap_or("never")
            );
        }
        ReflectOutcome::Reflected(report) if !report.written => {
            println!("{}", report.text.trim_end());
        }
        ReflectOutcome::Reflected(report) => {
            println!(
                "Reflections updated ({} chars, {} pass(es), last reflected {})",
                report.text.chars().count(),
                report.passes,
                report.last_reflected.as_deref().unwrap_or("-")
            );
            if let Some(trim) = report.trimmed.filter(|t| t.removed > 0) {
                println!("Trimmed {} observation section(s) before {}", trim.removed, trim.cutoff);
            }
        }
    }
    Ok(())
}
