use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use loadmod_core::disas::{disas_command as build_disas_command, disassemble, find_function};
use loadmod_core::invoke::{render_command, ToolInvoker};
use loadmod_core::symtab::dump_symbols;

/// Disassemble each requested function from each load module.
///
/// Every function/module pair is attempted; a function absent from a module
/// is a warning-level skip (matching the symbol-table tool's behavior), and
/// a failing module is reported without aborting the rest.
pub fn disas_command(
    functions: &[String],
    modules: &[PathBuf],
    timeout_secs: Option<u64>,
    dry_run: bool,
) -> Result<()> {
    let invoker = ToolInvoker::with_timeout(timeout_secs.map(Duration::from_secs));
    let mut failed = 0usize;

    for module in modules {
        for function in functions {
            if dry_run {
                // Resolve the range but echo the command instead of running it.
                let symbols = match dump_symbols(&invoker, module) {
                    Ok(symbols) => symbols,
                    Err(err) => {
                        eprintln!("error: {}: {}", module.display(), err);
                        failed += 1;
                        continue;
                    }
                };
                match find_function(&symbols, function) {
                    Some(range) => {
                        let (objdump, args) = build_disas_command(module, &range);
                        let mut cmd = std::process::Command::new(objdump);
                        cmd.args(args);
                        eprintln!("would execute: {}", render_command(&cmd));
                    }
                    None => eprintln!(
                        "warning: {} not found in {}, skipping",
                        function,
                        module.display()
                    ),
                }
                continue;
            }

            match disassemble(&invoker, module, function) {
                Ok(Some(listing)) => print!("{listing}"),
                Ok(None) => {}
                Err(err) => {
                    eprintln!("error: {} in {}: {}", function, module.display(), err);
                    failed += 1;
                }
            }
        }
    }

    if failed > 0 {
        return Err(anyhow!("{failed} disassembly target(s) failed"));
    }
    Ok(())
}
