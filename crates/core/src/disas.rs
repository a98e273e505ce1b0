//! Single-function disassembly from a load module.
//!
//! Finds the function's address range in `objdump -t` output, then runs a
//! bounded `objdump -dl` over exactly that range. A function missing from a
//! module is a per-target skip, not a fatal error, so multi-target runs can
//! keep going.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::invoke::{objdump_path, InvokeError, ToolInvoker};
use crate::model::SymbolRecord;
use crate::symtab::{dump_symbols, SymtabError};

/// Environment variable naming a file that stands in for the bounded
/// `objdump -dl` stdout in tests.
pub const FAKE_DISAS_ENV: &str = "LMTOOL_FAKE_DISAS";

#[derive(Debug, Error)]
pub enum DisasError {
    #[error(transparent)]
    Symtab(#[from] SymtabError),
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

/// Resolved [start, end) address range for one function symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRange {
    pub name: String,
    pub start: u64,
    pub end: u64,
}

/// Locate `function` among parsed symbol records and return its range.
///
/// A symbol reported with size zero gets a minimal 4-byte range so the
/// disassembler still shows something; objdump emits such sizes for some
/// hand-written assembly entry points.
pub fn find_function(symbols: &[SymbolRecord], function: &str) -> Option<FunctionRange> {
    let sym = symbols.iter().find(|s| s.name == function)?;
    let size = if sym.size == 0 {
        tracing::warn!("malformed zero size for function {}, assuming 4 bytes", function);
        4
    } else {
        sym.size
    };
    Some(FunctionRange { name: sym.name.clone(), start: sym.address, end: sym.address + size })
}

/// Build the bounded disassembly command for a resolved range.
pub fn disas_command(module: &Path, range: &FunctionRange) -> (PathBuf, Vec<OsString>) {
    let args = vec![
        OsString::from("--no-show-raw-insn"),
        OsString::from("--wide"),
        OsString::from("-dl"),
        OsString::from(format!("--start-address=0x{:x}", range.start)),
        OsString::from(format!("--stop-address=0x{:x}", range.end)),
        module.as_os_str().to_os_string(),
    ];
    (objdump_path(), args)
}

/// Disassemble one function from one load module.
///
/// Returns `Ok(None)` (after a warning) when the function is not present in
/// the module's symbol table.
pub fn disassemble(
    invoker: &ToolInvoker,
    module: &Path,
    function: &str,
) -> Result<Option<String>, DisasError> {
    let symbols = dump_symbols(invoker, module)?;
    let range = match find_function(&symbols, function) {
        Some(range) => range,
        None => {
            tracing::warn!(
                "could not find {} in output of objdump -t {}, skipping",
                function,
                module.display()
            );
            return Ok(None);
        }
    };

    if let Some(fake) = env::var_os(FAKE_DISAS_ENV) {
        let body = fs::read_to_string(&fake).map_err(|source| {
            DisasError::Invoke(InvokeError::Io { tool: format!("{FAKE_DISAS_ENV} fake"), source })
        })?;
        return Ok(Some(body));
    }

    let (objdump, args) = disas_command(module, &range);
    let output = invoker.run(objdump.as_os_str(), args)?;
    Ok(Some(output))
}
