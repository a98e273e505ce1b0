use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use loadmod_core::depgraph::{dump_needed, DepGraph};
use loadmod_core::invoke::ToolInvoker;

use crate::write_output;

/// Build the module dependency graph and emit it as DOT (or JSON).
///
/// Node names are the modules' file names; the graph deduplicates repeated
/// NEEDED entries. A failing target keeps its node out of the graph but
/// does not abort the remaining targets.
pub fn depgraph_command(
    modules: &[PathBuf],
    timeout_secs: Option<u64>,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let invoker = ToolInvoker::with_timeout(timeout_secs.map(Duration::from_secs));
    let mut graph = DepGraph::new();
    let mut failed = 0usize;

    for module in modules {
        let node = module
            .file_name()
            .map(|os| os.to_string_lossy().to_string())
            .unwrap_or_else(|| module.display().to_string());
        match dump_needed(&invoker, module) {
            Ok(deps) => {
                graph.add_module(&node);
                for dep in deps {
                    graph.add_dep(&node, &dep);
                }
            }
            Err(err) => {
                eprintln!("error: {}: {}", module.display(), err);
                failed += 1;
            }
        }
    }

    let body = if json {
        let mut serialized =
            serde_json::to_string_pretty(&graph).context("failed to serialize graph to JSON")?;
        serialized.push('\n');
        serialized
    } else {
        graph.to_dot()
    };
    write_output(output, &body)?;

    if failed > 0 {
        return Err(anyhow!("{failed} of {} target(s) failed", modules.len()));
    }
    Ok(())
}
