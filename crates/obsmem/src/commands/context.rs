use anyhow::Result;
use obsmem_pipeline::build_context;

use super::Workspace;

pub fn run(json: bool) -> Result<()> {
    let ws = Workspace::load()?;
    let search = ws.search();
    let Some(context) = build_context(&ws.paths, search.as_ref())? else {
        tracing::debug!("no memory to load");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string(&session_start_payload(&context))?);
    } else {
        println!("{}", context.trim_end());
    }
    Ok(())
}

/// Payload shape agent session-start hooks read additional context from
fn session_start_payload(context: &str) -> serde_json::Value {
    serde_json::json!({
        "hookSpecificOutput": {
            "hookEventName": "SessionStart",
            "additionalContext": context,
        }
    })
}
