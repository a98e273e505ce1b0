//! Parser for `objdump -t` symbol-table output.
//!
//! The matching rules live behind the narrow [`parse_symbol_line`] seam so
//! that drift in the tool's output format only requires touching this
//! module. Lines that match no known record pattern are skipped rather than
//! failing the run; a parse only fails when non-empty output yields zero
//! records, which signals a totally incompatible format.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use regex::Regex;
use thiserror::Error;

use crate::invoke::{objdump_path, InvokeError, ToolInvoker};
use crate::model::{Section, SymbolRecord};

/// Environment variable naming a file whose contents stand in for
/// `objdump -t` stdout, so tests do not need objdump installed.
pub const FAKE_SYMTAB_ENV: &str = "LMTOOL_FAKE_SYMTAB";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(
        "no symbol records found in non-empty {tool} output; \
         the tool's output format may have changed"
    )]
    NoRecords { tool: String },
}

#[derive(Debug, Error)]
pub enum SymtabError {
    #[error("load module not found at {0}")]
    MissingModule(std::path::PathBuf),
    #[error(transparent)]
    Invoke(#[from] InvokeError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// One `objdump -t` entry: address, 7-column flag field, section, size,
/// optional `.hidden` marker, then the symbol name.
fn symbol_line_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<addr>[0-9a-fA-F]+)\s.{7}\s(?P<sect>\S+)\s+(?P<size>[0-9a-fA-F]+)\s+(?:\.hidden\s+)?(?P<name>\S+)\s*$",
        )
        .unwrap()
    })
}

/// Parse one line of `objdump -t` output into a symbol record.
///
/// Returns `None` for headers, blank lines, and anything else that does not
/// look like a symbol entry.
pub fn parse_symbol_line(line: &str, module: &str) -> Option<SymbolRecord> {
    let caps = symbol_line_regex().captures(line)?;
    let address = u64::from_str_radix(&caps["addr"], 16).ok()?;
    let size = u64::from_str_radix(&caps["size"], 16).ok()?;
    Some(SymbolRecord {
        name: caps["name"].to_string(),
        address,
        size,
        section: Section::classify(&caps["sect"]),
        module: module.to_string(),
    })
}

/// Parse a full `objdump -t` dump, preserving input order.
pub fn parse_symbol_table(output: &str, module: &str) -> Result<Vec<SymbolRecord>, ParseError> {
    let records: Vec<SymbolRecord> =
        output.lines().filter_map(|line| parse_symbol_line(line, module)).collect();
    if records.is_empty() && !output.trim().is_empty() {
        return Err(ParseError::NoRecords { tool: "objdump -t".to_string() });
    }
    Ok(records)
}

/// Run `objdump -t` on a load module (or read the test fake) and parse the
/// result into symbol records.
pub fn dump_symbols(
    invoker: &ToolInvoker,
    module: &Path,
) -> Result<Vec<SymbolRecord>, SymtabError> {
    let module_name = module.display().to_string();

    if let Some(fake) = env::var_os(FAKE_SYMTAB_ENV) {
        let body = fs::read_to_string(&fake).map_err(|source| {
            SymtabError::Invoke(InvokeError::Io { tool: format!("{FAKE_SYMTAB_ENV} fake"), source })
        })?;
        return Ok(parse_symbol_table(&body, &module_name)?);
    }

    if !module.is_file() {
        return Err(SymtabError::MissingModule(module.to_path_buf()));
    }

    let objdump = objdump_path();
    let output = invoker.run(objdump.as_os_str(), [OsStr::new("-t"), module.as_os_str()])?;
    Ok(parse_symbol_table(&output, &module_name)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_plain_function_symbol() {
        let line = "0000000000001139 g     F .text\t000000000000002b              main";
        let rec = parse_symbol_line(line, "a.out").expect("should match");
        assert_eq!(rec.name, "main");
        assert_eq!(rec.address, 0x1139);
        assert_eq!(rec.size, 0x2b);
        assert_eq!(rec.section, Section::Text);
        assert_eq!(rec.module, "a.out");
    }

    #[test]
    fn parses_a_hidden_symbol() {
        let line =
            "00000000000c1f40 g     F .text\t0000000000000184 .hidden runtime.morestack";
        let rec = parse_symbol_line(line, "libgo.so").expect("should match");
        assert_eq!(rec.name, "runtime.morestack");
        assert_eq!(rec.address, 0xc1f40);
        assert_eq!(rec.size, 0x184);
    }

    #[test]
    fn skips_headers_and_blank_lines() {
        assert!(parse_symbol_line("SYMBOL TABLE:", "m").is_none());
        assert!(parse_symbol_line("", "m").is_none());
        assert!(parse_symbol_line("libgo.so:     file format elf64-x86-64", "m").is_none());
    }
}
